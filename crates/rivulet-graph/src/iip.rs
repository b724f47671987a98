//! Initial information packets.
//!
//! An IIP is a constant delivered to a receive endpoint when the network
//! starts. Values are stored type-erased together with a delivery routine
//! that knows their concrete type.

use futures::FutureExt;
use futures::future::BoxFuture;
use rivulet_port::{Address, BindError, Direction, ElementType, Port, TrySendError};
use tracing::debug;

use crate::error::GraphError;
use crate::network::{Network, unresolved_as_port_not_found};

type Deliver = Box<dyn FnOnce(&mut dyn Port, usize) -> Result<Delivery, BindError> + Send>;

/// A pending initial packet.
pub(crate) struct Iip {
  pub(crate) element: ElementType,
  deliver: Deliver,
}

impl Iip {
  fn new<T: Send + 'static>(value: T) -> Self {
    Self {
      element: ElementType::of::<T>(),
      deliver: Box::new(move |port: &mut dyn Port, capacity: usize| {
        deliver(value, port, capacity)
      }),
    }
  }

  /// Put the value onto the endpoint's channel, binding a fresh one first if
  /// the endpoint has none.
  pub(crate) fn deliver(self, port: &mut dyn Port, capacity: usize) -> Result<Delivery, BindError> {
    (self.deliver)(port, capacity)
  }
}

/// Outcome of delivering an IIP.
pub(crate) enum Delivery {
  Sent,
  /// The channel was full. The future completes the send; it holds a
  /// sending handle, so the channel stays open until it runs.
  Deferred(BoxFuture<'static, ()>),
  /// The channel was already closed.
  Dropped,
}

fn deliver<T: Send + 'static>(
  value: T,
  port: &mut dyn Port,
  capacity: usize,
) -> Result<Delivery, BindError> {
  let (channel, owned) = match port.channel() {
    Some(channel) => (channel, false),
    None => {
      let channel = port.make_channel(capacity);
      port.bind(&channel)?;
      (channel, true)
    }
  };

  let typed = channel
    .downcast::<T>()
    .ok_or_else(|| BindError::TypeMismatch {
      expected: ElementType::of::<T>(),
      actual: channel.element_type(),
    })?;

  // A channel created for the IIP alone carries nothing else, so it is
  // closed as soon as the value is handed over.
  match typed.try_send(value) {
    Ok(()) => {
      if owned {
        typed.close();
      }
      Ok(Delivery::Sent)
    }
    Err(TrySendError::Full(value)) => {
      let Some(handle) = typed.sender() else {
        return Ok(Delivery::Dropped);
      };
      if owned {
        typed.close();
      }
      Ok(Delivery::Deferred(
        async move {
          let _ = handle.send(value).await;
        }
        .boxed(),
      ))
    }
    Err(TrySendError::Closed(_)) => Ok(Delivery::Dropped),
  }
}

impl Network {
  /// Queue `value` for delivery to `process.port` when the network starts.
  ///
  /// An IIP already pending for the same address is replaced.
  pub fn add_iip<T: Send + 'static>(
    &mut self,
    process: &str,
    port: &str,
    value: T,
  ) -> Result<(), GraphError> {
    let address = Address::parse(process, port);
    let endpoint = self
      .inspect(&address, Direction::Receive)
      .map_err(|err| unresolved_as_port_not_found(err, &address))?;

    let element = ElementType::of::<T>();
    if endpoint.element != element {
      return Err(GraphError::InvalidPort {
        address: address.to_string(),
        reason: format!(
          "element type mismatch: port carries {}, packet is {}",
          endpoint.element, element
        ),
      });
    }

    if self.iips.insert(address.clone(), Iip::new(value)).is_some() {
      debug!(address = %address, "iip_replaced");
    } else {
      debug!(address = %address, "iip_added");
    }
    Ok(())
  }

  /// Drop the IIP pending for `process.port`.
  pub fn remove_iip(&mut self, process: &str, port: &str) -> Result<(), GraphError> {
    let address = Address::parse(process, port);
    match self.iips.remove(&address) {
      Some(_) => {
        debug!(address = %address, "iip_removed");
        Ok(())
      }
      None => Err(GraphError::IipNotFound {
        address: address.to_string(),
      }),
    }
  }

  /// Number of IIPs waiting for the network to start.
  pub fn iip_count(&self) -> usize {
    self.iips.len()
  }
}
