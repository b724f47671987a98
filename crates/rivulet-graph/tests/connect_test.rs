//! Wiring tests: port resolution, validation, and channel sharing.

mod common;

use common::{Echo, Generator, Sealed, Splitter, double_echo};
use rivulet_graph::{Factory, GraphError, Network, NetworkConfig, Process};
use rivulet_port::{Channel, InPort};
use rivulet_registry::RegistryError;

fn echo_pair() -> Network {
  let mut net = Network::default();
  net.add("e1", Echo::<i32>::new()).unwrap();
  net.add("e2", Echo::<i32>::new()).unwrap();
  net
}

#[test]
fn test_connect_records_connection() {
  let mut net = Network::new(NetworkConfig { buffer_size: 3 });
  net.add("e1", Echo::<i32>::new()).unwrap();
  net.add("e2", Echo::<i32>::new()).unwrap();

  net.connect("e1", "Out", "e2", "In").unwrap();

  let connections = net.connections();
  assert_eq!(connections.len(), 1);
  assert_eq!(connections[0].sender().to_string(), "e1.Out");
  assert_eq!(connections[0].receiver().to_string(), "e2.In");
  assert_eq!(connections[0].buffer_size(), 3);
  assert_eq!(connections[0].channel().capacity(), 3);
  assert_eq!(net.sender_ref_count(connections[0].channel().id()), 1);
}

#[test]
fn test_connect_buf_overrides_default() {
  let mut net = echo_pair();
  net.connect_buf("e1", "Out", "e2", "In", 16).unwrap();
  assert_eq!(net.connections()[0].channel().capacity(), 16);
}

#[test]
fn test_connect_unknown_process() {
  let mut net = echo_pair();
  let err = net.connect("e1", "Out", "nope", "In").unwrap_err();
  assert!(matches!(err, GraphError::ProcessNotFound { process } if process == "nope"));
}

#[test]
fn test_connect_unknown_port() {
  let mut net = echo_pair();
  let err = net.connect("e1", "Missing", "e2", "In").unwrap_err();
  assert!(
    matches!(err, GraphError::PortNotFound { process, port } if process == "e1" && port == "Missing")
  );
}

#[test]
fn test_connect_wrong_direction() {
  let mut net = echo_pair();
  let err = net.connect("e1", "In", "e2", "In").unwrap_err();
  assert!(matches!(err, GraphError::InvalidPort { address, .. } if address == "e1.In"));

  let err = net.connect("e1", "Out", "e2", "Out").unwrap_err();
  assert!(matches!(err, GraphError::InvalidPort { address, .. } if address == "e2.Out"));
  assert!(net.connections().is_empty());
}

#[test]
fn test_connect_type_mismatch() {
  let mut net = Network::default();
  net.add("ints", Echo::<i32>::new()).unwrap();
  net.add("strings", Echo::<String>::new()).unwrap();

  let err = net.connect("ints", "Out", "strings", "In").unwrap_err();
  assert!(matches!(err, GraphError::InvalidPort { address, .. } if address == "strings.In"));
}

#[test]
fn test_connect_non_settable_process() {
  let mut net = Network::default();
  net.add("gen", Generator::new(vec![1])).unwrap();
  net
    .add(
      "sealed",
      Sealed {
        input: InPort::new(),
      },
    )
    .unwrap();

  let err = net.connect("gen", "Out", "sealed", "In").unwrap_err();
  assert!(matches!(err, GraphError::ProcessNotSettable { process } if process == "sealed"));
}

#[test]
fn test_fan_in_shares_receiver_channel() {
  let mut net = Network::default();
  net.add("g1", Generator::new(vec![1])).unwrap();
  net.add("g2", Generator::new(vec![2])).unwrap();
  net.add("sink", Echo::<i32>::new()).unwrap();

  net.connect("g1", "Out", "sink", "In").unwrap();
  net.connect("g2", "Out", "sink", "In").unwrap();

  let connections = net.connections();
  let first = connections[0].channel().id();
  assert_eq!(connections[1].channel().id(), first);
  assert_eq!(net.sender_ref_count(first), 2);
}

#[test]
fn test_fan_out_reuses_sender_channel() {
  let mut net = echo_pair();
  net.add("e3", Echo::<i32>::new()).unwrap();

  net.connect("e1", "Out", "e2", "In").unwrap();
  net.connect("e1", "Out", "e3", "In").unwrap();

  let connections = net.connections();
  let id = connections[0].channel().id();
  assert_eq!(connections[1].channel().id(), id);
  // The sender was bound once, so it is counted once.
  assert_eq!(net.sender_ref_count(id), 1);
}

#[test]
fn test_ports_already_in_use() {
  let mut net = echo_pair();
  net.add("e3", Echo::<i32>::new()).unwrap();
  net.add("e4", Echo::<i32>::new()).unwrap();

  net.connect("e1", "Out", "e2", "In").unwrap();
  net.connect("e3", "Out", "e4", "In").unwrap();

  let err = net.connect("e1", "Out", "e4", "In").unwrap_err();
  assert!(
    matches!(err, GraphError::PortsAlreadyInUse { sender, receiver } if sender == "e1.Out" && receiver == "e4.In")
  );
}

#[test]
fn test_reconnect_same_pair_binds_nothing() {
  let mut net = echo_pair();
  net.connect("e1", "Out", "e2", "In").unwrap();
  net.connect("e1", "Out", "e2", "In").unwrap();

  let id = net.connections()[0].channel().id();
  assert_eq!(net.connections().len(), 2);
  assert_eq!(net.sender_ref_count(id), 1);
}

#[test]
fn test_keyed_ports_resolve_separately() {
  let mut net = Network::default();
  net.add("split", Splitter::new()).unwrap();
  net.add("a", Echo::<i32>::new()).unwrap();
  net.add("b", Echo::<i32>::new()).unwrap();

  net.connect("split", "Out[a]", "a", "In").unwrap();
  net.connect("split", "Out[b]", "b", "In").unwrap();

  let connections = net.connections();
  assert_eq!(connections[0].sender().key, "a");
  assert_eq!(connections[1].sender().key, "b");
  assert_ne!(connections[0].channel().id(), connections[1].channel().id());
}

#[test]
fn test_duplicate_process_name() {
  let mut net = echo_pair();
  let err = net.add("e1", Echo::<i32>::new()).unwrap_err();
  assert!(matches!(err, GraphError::DuplicateName { name } if name == "e1"));
  assert_eq!(net.len(), 2);
}

#[test]
fn test_add_new_from_factory() {
  let factory = Factory::new();
  factory
    .register("test/echo", || Process::component(Echo::<i32>::new()), None)
    .unwrap();

  let mut net = Network::default();
  net.add_new("e1", "test/echo", &factory).unwrap();
  assert_eq!(net.process_names().collect::<Vec<_>>(), ["e1"]);

  let err = net.add_new("e2", "test/missing", &factory).unwrap_err();
  assert!(matches!(
    err,
    GraphError::Registry(RegistryError::TypeNotFound { .. })
  ));
}

#[test]
fn test_connect_through_subnetwork() {
  let mut net = Network::default();
  net.add("src", Echo::<String>::new()).unwrap();
  net.add_network("d", double_echo::<String>()).unwrap();
  net.add("sink", Echo::<String>::new()).unwrap();

  net.connect("src", "Out", "d", "In").unwrap();
  net.connect("d", "Out", "sink", "In").unwrap();
  assert_eq!(net.connections().len(), 2);

  // Exposed names are directional.
  let err = net.connect("d", "In", "sink", "In").unwrap_err();
  assert!(matches!(err, GraphError::PortNotFound { process, port } if process == "d" && port == "In"));
}

#[test]
fn test_map_ports_validate_target() {
  let mut net = echo_pair();
  net.map_in_port("In", "e1", "In").unwrap();
  assert_eq!(net.in_port("In").map(ToString::to_string), Some("e1.In".to_string()));

  let err = net.map_in_port("X", "ghost", "In").unwrap_err();
  assert!(matches!(err, GraphError::PortNotFound { .. }));

  let err = net.map_out_port("Y", "e2", "In").unwrap_err();
  assert!(matches!(err, GraphError::InvalidPort { .. }));
  assert!(net.out_port("Y").is_none());

  // Re-mapping replaces the old target.
  net.map_in_port("In", "e2", "In").unwrap();
  assert_eq!(net.in_port("In").map(ToString::to_string), Some("e2.In".to_string()));
}

#[test]
fn test_set_ports_bind_external_channels() {
  let mut net = double_echo::<String>();
  let input = Channel::<String>::new(1);
  let output = Channel::<String>::new(1);

  net.set_in_port("In", &input).unwrap();
  net.set_out_port("Out", &output).unwrap();
  assert_eq!(net.sender_ref_count(output.id()), 1);
  assert_eq!(output.senders().get(), 1);

  let external: Vec<_> = net
    .connections()
    .iter()
    .filter(|c| c.sender().is_external() || c.receiver().is_external())
    .collect();
  assert_eq!(external.len(), 2);

  let err = net.set_in_port("Nope", &input).unwrap_err();
  assert!(matches!(err, GraphError::PortNotFound { .. }));

  let other = Channel::<String>::new(1);
  let err = net.set_out_port("Out", &other).unwrap_err();
  assert!(matches!(err, GraphError::PortsAlreadyInUse { .. }));

  let wrong = Channel::<i32>::new(1);
  let mut net = double_echo::<String>();
  let err = net.set_in_port("In", &wrong).unwrap_err();
  assert!(matches!(err, GraphError::InvalidPort { .. }));
}

#[test]
fn test_manual_sender_refs() {
  let net = Network::default();
  let channel = Channel::<i32>::new(0).erase();

  assert_eq!(net.inc_sender_ref(&channel), 1);
  assert_eq!(net.inc_sender_ref(&channel), 2);
  assert!(!net.dec_sender_ref(channel.id()));
  assert!(net.dec_sender_ref(channel.id()));
  assert_eq!(net.sender_ref_count(channel.id()), 0);
  // Releasing past zero still reports that the channel may close.
  assert!(net.dec_sender_ref(channel.id()));
}
