//! Sender reference counting.
//!
//! Several sender endpoints may share one channel (fan-in). The channel must
//! be closed exactly once, after the last of them has finished. Every
//! channel carries one [`SenderCount`]; every handle of the channel sees the
//! same counter, so senders bound by different networks are counted
//! together.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of sender endpoints currently attached to a channel.
#[derive(Debug, Clone, Default)]
pub struct SenderCount(Arc<AtomicUsize>);

impl SenderCount {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register one more sender. Returns the new count.
  pub fn acquire(&self) -> usize {
    self.0.fetch_add(1, Ordering::AcqRel) + 1
  }

  /// Unregister a sender. Returns `true` when the caller may close the
  /// channel, i.e. the count reached zero.
  ///
  /// Releasing at zero is tolerated and also returns `true`: a sender may
  /// try to close a channel it never acquired.
  pub fn release(&self) -> bool {
    match self
      .0
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
        count.checked_sub(1)
      }) {
      Ok(previous) => previous == 1,
      Err(_) => true,
    }
  }

  /// Current number of attached senders.
  pub fn get(&self) -> usize {
    self.0.load(Ordering::Acquire)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_release_reports_last_sender() {
    let count = SenderCount::new();
    assert_eq!(count.acquire(), 1);
    assert_eq!(count.acquire(), 2);

    assert!(!count.release());
    assert_eq!(count.get(), 1);
    assert!(count.release());
    assert_eq!(count.get(), 0);
  }

  #[test]
  fn test_release_at_zero_is_tolerated() {
    let count = SenderCount::new();
    assert!(count.release());
    assert_eq!(count.get(), 0);
  }

  #[test]
  fn test_clones_share_the_counter() {
    let count = SenderCount::new();
    let other = count.clone();
    count.acquire();
    other.acquire();
    assert_eq!(count.get(), 2);
  }

  #[test]
  fn test_concurrent_release_closes_once() {
    let count = SenderCount::new();
    for _ in 0..8 {
      count.acquire();
    }

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let count = count.clone();
        std::thread::spawn(move || count.release())
      })
      .collect();

    let closers = handles
      .into_iter()
      .map(|h| h.join().unwrap())
      .filter(|closed| *closed)
      .count();
    assert_eq!(closers, 1);
  }
}
