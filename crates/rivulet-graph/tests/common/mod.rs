#![allow(dead_code)]

//! Test components and helpers shared by the graph integration tests.

use std::collections::BTreeMap;
use std::time::Duration;

use rivulet_graph::Network;
use rivulet_port::{Channel, Component, InPort, OutPort, Port, async_trait};

/// Upper bound for any single wait in these tests.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Drain `channel` until it closes.
pub async fn collect<T: Send + 'static>(channel: &Channel<T>) -> Vec<T> {
  let mut values = Vec::new();
  loop {
    match tokio::time::timeout(TIMEOUT, channel.recv()).await {
      Ok(Some(value)) => values.push(value),
      Ok(None) => return values,
      Err(_) => panic!("channel did not close; received {} values", values.len()),
    }
  }
}

/// Forwards every packet from `In` to `Out`.
pub struct Echo<T> {
  pub input: InPort<T>,
  pub output: OutPort<T>,
}

impl<T: Send + 'static> Echo<T> {
  pub fn new() -> Self {
    Self {
      input: InPort::new(),
      output: OutPort::new(),
    }
  }
}

#[async_trait]
impl<T: Send + 'static> Component for Echo<T> {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "In" => Some(&mut self.input),
      "Out" => Some(&mut self.output),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    while let Some(value) = self.input.recv().await {
      let _ = self.output.send(value).await;
    }
  }
}

/// Sends a fixed list of values, optionally pausing before each one.
pub struct Generator {
  pub values: Vec<i32>,
  pub delay: Option<Duration>,
  pub output: OutPort<i32>,
}

impl Generator {
  pub fn new(values: Vec<i32>) -> Self {
    Self {
      values,
      delay: None,
      output: OutPort::new(),
    }
  }

  pub fn slow(values: Vec<i32>, delay: Duration) -> Self {
    Self {
      delay: Some(delay),
      ..Self::new(values)
    }
  }
}

#[async_trait]
impl Component for Generator {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "Out" => Some(&mut self.output),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    for value in self.values.iter().copied() {
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      let _ = self.output.send(value).await;
    }
  }
}

/// Emits the last word once per the last count, whenever either changes.
pub struct Repeater {
  pub word: InPort<String>,
  pub times: InPort<i64>,
  pub words: OutPort<String>,
}

impl Repeater {
  pub fn new() -> Self {
    Self {
      word: InPort::new(),
      times: InPort::new(),
      words: OutPort::new(),
    }
  }
}

#[async_trait]
impl Component for Repeater {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "Word" => Some(&mut self.word),
      "Times" => Some(&mut self.times),
      "Words" => Some(&mut self.words),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    let mut word = String::new();
    let mut times = 0i64;
    let mut word_open = true;
    let mut times_open = true;

    while word_open || times_open {
      tokio::select! {
        next = self.word.recv(), if word_open => match next {
          Some(w) => word = w,
          None => {
            word_open = false;
            continue;
          }
        },
        next = self.times.recv(), if times_open => match next {
          Some(t) => times = t,
          None => {
            times_open = false;
            continue;
          }
        },
      }

      if word.is_empty() {
        continue;
      }
      for _ in 0..times {
        let _ = self.words.send(word.clone()).await;
      }
    }
  }
}

/// Broadcasts every packet to each keyed outport `Out[key]`.
pub struct Splitter {
  pub input: InPort<i32>,
  pub outputs: BTreeMap<String, OutPort<i32>>,
}

impl Splitter {
  pub fn new() -> Self {
    Self {
      input: InPort::new(),
      outputs: BTreeMap::new(),
    }
  }
}

#[async_trait]
impl Component for Splitter {
  fn port(&mut self, name: &str, key: &str) -> Option<&mut dyn Port> {
    match name {
      "In" => Some(&mut self.input),
      "Out" if !key.is_empty() => Some(self.outputs.entry(key.to_string()).or_default()),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    while let Some(value) = self.input.recv().await {
      for output in self.outputs.values() {
        let _ = output.send(value).await;
      }
    }
  }
}

/// A component that manages its own channels.
pub struct Sealed {
  pub input: InPort<i32>,
}

#[async_trait]
impl Component for Sealed {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "In" => Some(&mut self.input),
      _ => None,
    }
  }

  fn is_settable(&self) -> bool {
    false
  }

  async fn run(self: Box<Self>) {}
}

/// Sends one value, then panics.
pub struct Panicker {
  pub output: OutPort<i32>,
}

#[async_trait]
impl Component for Panicker {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "Out" => Some(&mut self.output),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    let _ = self.output.send(1).await;
    panic!("component failure");
  }
}

/// `In -> e1 -> e2 -> Out`.
pub fn double_echo<T: Send + 'static>() -> Network {
  let mut net = Network::default();
  net.add("e1", Echo::<T>::new()).unwrap();
  net.add("e2", Echo::<T>::new()).unwrap();
  net.connect("e1", "Out", "e2", "In").unwrap();
  net.map_in_port("In", "e1", "In").unwrap();
  net.map_out_port("Out", "e2", "Out").unwrap();
  net
}
