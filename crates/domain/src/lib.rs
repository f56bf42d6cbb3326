//! 领域模型与端口抽象

pub mod fleet;
pub mod graph;
pub mod key_paths;
pub mod operation;
pub mod ports;
pub mod release;
pub mod trace;

pub use fleet::{DeviceAvailability, FleetInventory};
pub use graph::{
    Edge, ForwardingNode, LayerProtocol, PortDirection, TerminationPoint, TerminationPointChain,
    TransportKind,
};
pub use operation::{OperationDescriptor, TransportTarget};
pub use ports::{
    CollectionRequest, DataCollector, GraphStore, OperationTransport, OutboundRequest,
    OutboundResponse, TelemetrySection,
};
pub use release::{ApplicationRelease, SuccessorRelease};
pub use trace::{TraceContext, TraceSequence};

pub use fleetctl_core::{ControlError, ControlResult, ResolutionFailure};
