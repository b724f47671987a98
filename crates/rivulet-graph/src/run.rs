//! Network scheduler.
//!
//! Starting a network delivers its IIPs, spawns every process on its own
//! task, and returns a [`Wait`] that resolves once all of them have
//! finished.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rivulet_port::Direction;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::iip::Delivery;
use crate::network::Network;
use crate::process::Process;

/// Completion handle of a running network.
#[derive(Debug, Clone)]
pub struct Wait {
  done: watch::Receiver<bool>,
}

impl Wait {
  fn new() -> (watch::Sender<bool>, Self) {
    let (tx, done) = watch::channel(false);
    (tx, Self { done })
  }

  /// Wait until every process of the network has finished.
  pub async fn wait(&self) {
    let mut done = self.done.clone();
    // An error means the supervisor is gone, which also ends the run.
    let _ = done.wait_for(|finished| *finished).await;
  }

  /// Block the current thread until the network has finished. Must not be
  /// called from within an async context.
  pub fn blocking_wait(&self) {
    futures::executor::block_on(self.wait());
  }

  pub fn is_done(&self) -> bool {
    *self.done.borrow()
  }
}

enum Finished {
  Process { name: String, panicked: bool },
  Iip { address: String },
}

/// Start `network`. See [`Network::run`].
pub fn run(network: Network) -> Wait {
  network.run()
}

impl Network {
  /// Start the network on the current tokio runtime.
  ///
  /// IIPs are delivered before any process starts, including those of
  /// nested networks. An IIP whose target channel is already full at start
  /// is sent as soon as a slot frees, so it queues behind the values
  /// already buffered there. The returned handle resolves after the last
  /// process finishes, whether it returned or panicked.
  pub fn run(mut self) -> Wait {
    let run_id = Uuid::new_v4();
    let span = info_span!("network_run", run_id = %run_id);
    let _entered = span.enter();

    let (done, wait) = Wait::new();
    let mut tasks = JoinSet::new();

    info!(
      processes = self.processes.len(),
      iips = self.iips.len(),
      "network_started"
    );

    self.deliver_iips(&mut tasks);

    for (name, process) in std::mem::take(&mut self.processes) {
      let process_span = info_span!("process", name = %name);
      tasks.spawn(
        async move {
          let outcome = AssertUnwindSafe(process.run()).catch_unwind().await;
          Finished::Process {
            name,
            panicked: outcome.is_err(),
          }
        }
        .instrument(process_span),
      );
    }

    tokio::spawn(supervise(tasks, done).instrument(span.clone()));
    wait
  }

  /// Deliver this network's IIPs, then those of every nested network, so
  /// all of them land before the first process is spawned.
  fn deliver_iips(&mut self, tasks: &mut JoinSet<Finished>) {
    let capacity = self.config.buffer_size;
    let iips = std::mem::take(&mut self.iips);

    for (address, iip) in iips {
      let element = iip.element;
      let port = match self.resolve_port(&address, Direction::Receive) {
        Ok(port) => port,
        Err(err) => {
          warn!(address = %address, error = %err, "iip_dropped");
          continue;
        }
      };

      match iip.deliver(port, capacity) {
        Ok(Delivery::Sent) => {
          debug!(address = %address, element = %element, "iip_delivered");
        }
        Ok(Delivery::Deferred(send)) => {
          debug!(address = %address, element = %element, "iip_deferred");
          let address = address.to_string();
          tasks.spawn(async move {
            send.await;
            Finished::Iip { address }
          });
        }
        Ok(Delivery::Dropped) => {
          warn!(address = %address, reason = "channel closed", "iip_dropped");
        }
        Err(err) => {
          warn!(address = %address, error = %err, "iip_dropped");
        }
      }
    }

    for process in self.processes.values_mut() {
      if let Process::Network(network) = process {
        network.deliver_iips(tasks);
      }
    }
  }
}

async fn supervise(mut tasks: JoinSet<Finished>, done: watch::Sender<bool>) {
  let mut panicked = 0usize;

  while let Some(result) = tasks.join_next().await {
    match result {
      Ok(Finished::Process {
        name,
        panicked: false,
      }) => {
        debug!(process = %name, "process_finished");
      }
      Ok(Finished::Process {
        name,
        panicked: true,
      }) => {
        panicked += 1;
        error!(process = %name, "process_panicked");
      }
      Ok(Finished::Iip { address }) => {
        debug!(address = %address, "iip_delivered");
      }
      Err(err) => {
        error!(error = %err, "task_failed");
      }
    }
  }

  info!(panicked, "network_finished");
  done.send_replace(true);
}
