use rivulet_port::{Component, InPort, OutPort, Port, async_trait};
use serde_json::Value;
use tracing::warn;

/// Repeats a word.
///
/// Remembers the last packet seen on `Word` and the last count seen on
/// `Times`. Whenever either changes, emits the word `times` times on
/// `Words`. Finishes once both inputs are closed.
#[derive(Default)]
pub struct Repeat {
  word: InPort<Value>,
  times: InPort<Value>,
  words: OutPort<Value>,
}

impl Repeat {
  pub fn new() -> Self {
    Self::default()
  }
}

fn is_blank(word: &Value) -> bool {
  match word {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    _ => false,
  }
}

#[async_trait]
impl Component for Repeat {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "Word" => Some(&mut self.word),
      "Times" => Some(&mut self.times),
      "Words" => Some(&mut self.words),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    let mut word = Value::Null;
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
          Some(t) => match t.as_i64() {
            Some(t) => times = t,
            None => {
              warn!(packet = %t, "repeat_times_not_a_count");
              continue;
            }
          },
          None => {
            times_open = false;
            continue;
          }
        },
      }

      if is_blank(&word) {
        continue;
      }
      for _ in 0..times {
        let _ = self.words.send(word.clone()).await;
      }
    }
  }
}
