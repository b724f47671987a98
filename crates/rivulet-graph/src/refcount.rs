//! Per-network view of sender reference counts.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rivulet_port::{AnyChannel, ChannelId, SenderCount};

/// Sender counts of the channels this network has bound senders to.
///
/// The counters themselves live in the channels, so a channel shared by an
/// enclosing network and a subnetwork is counted once across both tables.
#[derive(Debug, Default)]
pub(crate) struct SenderRefTable {
  counts: Mutex<HashMap<ChannelId, SenderCount>>,
}

impl SenderRefTable {
  /// Record one more sender bound to `channel`. Returns the new count.
  pub(crate) fn inc(&self, channel: &AnyChannel) -> usize {
    let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
    counts
      .entry(channel.id())
      .or_insert_with(|| channel.senders().clone())
      .acquire()
  }

  /// Release one sender of `id`. Returns `true` when the channel may be
  /// closed, which includes channels this table never saw.
  pub(crate) fn dec(&self, id: ChannelId) -> bool {
    let count = {
      let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
      counts.get(&id).cloned()
    };
    match count {
      Some(count) => count.release(),
      None => true,
    }
  }

  pub(crate) fn count(&self, id: ChannelId) -> usize {
    let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
    counts.get(&id).map(SenderCount::get).unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use rivulet_port::Channel;

  use super::*;

  #[test]
  fn test_counts_are_per_channel() {
    let table = SenderRefTable::default();
    let a = Channel::<i32>::new(0).erase();
    let b = Channel::<i32>::new(0).erase();

    assert_eq!(table.inc(&a), 1);
    assert_eq!(table.inc(&a), 2);
    assert_eq!(table.inc(&b), 1);

    assert!(!table.dec(a.id()));
    assert!(table.dec(b.id()));
    assert_eq!(table.count(a.id()), 1);
    assert_eq!(table.count(b.id()), 0);
  }

  #[test]
  fn test_unknown_channel_may_close() {
    let table = SenderRefTable::default();
    let c = Channel::<i32>::new(0).erase();
    assert!(table.dec(c.id()));
    assert_eq!(table.count(c.id()), 0);
  }

  #[test]
  fn test_tables_share_channel_counter() {
    let outer = SenderRefTable::default();
    let inner = SenderRefTable::default();
    let c = Channel::<i32>::new(0).erase();

    outer.inc(&c);
    assert_eq!(inner.inc(&c), 2);
    assert!(!outer.dec(c.id()));
    assert!(inner.dec(c.id()));
  }
}
