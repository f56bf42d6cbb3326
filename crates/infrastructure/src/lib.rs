pub mod graph_store;
pub mod http_transport;
pub mod observability;

pub use graph_store::{GraphSeed, InMemoryGraphStore};
pub use http_transport::HttpOperationTransport;
pub use observability::{install_prometheus_recorder, MetricsCollector};
