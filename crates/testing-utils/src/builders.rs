//! Forwarding graph fixtures
//!
//! Node identifiers follow the `<prefix>-op-fc-<n>` convention so profile
//! lookups derived from them behave like a deployed graph.

use fleetctl_domain::{key_paths, Edge, ForwardingNode, LayerProtocol, TerminationPoint};
use fleetctl_infrastructure::{GraphSeed, InMemoryGraphStore};
use serde_json::{json, Value};

pub const DEFAULT_PREFIX: &str = "mwdi-1-0-0";

#[derive(Debug, Default)]
pub struct GraphFixture {
    seed: GraphSeed,
}

impl GraphFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node whose output edge is an operation client one hop above an HTTP client
    pub fn http_operation(
        self,
        node_name: &str,
        operation_name: &str,
        operation_key: &str,
        address: &str,
        port: u16,
    ) -> Self {
        let op = format!("{node_name}-op-c");
        let http = format!("{node_name}-http-c");
        self.operation_node(node_name, &op)
            .termination_point(
                TerminationPoint::new(
                    op.clone(),
                    LayerProtocol::OperationClient {
                        operation_name: Some(operation_name.to_string()),
                        operation_key: Some(operation_key.to_string()),
                    },
                )
                .with_server(http.clone()),
            )
            .termination_point(
                TerminationPoint::new(http, transport_client(address, port)).with_client(op),
            )
    }

    /// Same as [`GraphFixture::http_operation`] plus a TCP client attached to the
    /// HTTP client as a sibling binding
    pub fn tcp_operation(
        self,
        node_name: &str,
        operation_name: &str,
        operation_key: &str,
        http: (&str, u16),
        tcp: (&str, u16),
    ) -> Self {
        let http_uuid = format!("{node_name}-http-c");
        self.http_operation(node_name, operation_name, operation_key, http.0, http.1)
            .termination_point(
                TerminationPoint::new(
                    format!("{node_name}-tcp-c"),
                    transport_client(tcp.0, tcp.1),
                )
                .with_client(http_uuid),
            )
    }

    /// Node bound to an event-stream client instead of an operation client
    pub fn event_stream_operation(
        self,
        node_name: &str,
        index_alias: &str,
        authorization: &str,
        address: &str,
        port: u16,
    ) -> Self {
        let es = format!("{node_name}-es-c");
        let http = format!("{node_name}-http-c");
        self.operation_node(node_name, &es)
            .termination_point(
                TerminationPoint::new(
                    es.clone(),
                    LayerProtocol::EventStreamClient {
                        authorization: Some(authorization.to_string()),
                        index_alias: Some(index_alias.to_string()),
                    },
                )
                .with_server(http.clone()),
            )
            .termination_point(
                TerminationPoint::new(http, transport_client(address, port)).with_client(es),
            )
    }

    pub fn node(mut self, name: &str, uuid: &str, edges: Vec<Edge>) -> Self {
        self.seed.forwarding_nodes.push(ForwardingNode {
            name: name.to_string(),
            uuid: uuid.to_string(),
            edges,
        });
        self
    }

    pub fn termination_point(mut self, tp: TerminationPoint) -> Self {
        self.seed.termination_points.push(tp);
        self
    }

    pub fn value(mut self, key_path: &str, value: Value) -> Self {
        self.seed.values.insert(key_path.to_string(), value);
        self
    }

    pub fn current_release(self, application_name: &str, release_number: &str) -> Self {
        self.value(key_paths::APPLICATION_NAME, json!(application_name))
            .value(key_paths::RELEASE_NUMBER, json!(release_number))
    }

    /// Integer profile addressed from the default prefix
    pub fn integer_profile(self, suffix: &str, value: u64) -> Self {
        let id = key_paths::profile_id(DEFAULT_PREFIX, suffix);
        self.value(&key_paths::profile_integer_value(&id), json!(value))
    }

    pub fn build(self) -> InMemoryGraphStore {
        InMemoryGraphStore::from_seed(self.seed)
    }

    fn operation_node(self, node_name: &str, output_ref: &str) -> Self {
        let index = self.seed.forwarding_nodes.len();
        let uuid = format!("{DEFAULT_PREFIX}-op-fc-bm-{index:03}");
        self.node(
            node_name,
            &uuid,
            vec![
                Edge::input(format!("{node_name}-op-s")),
                Edge::output(output_ref),
            ],
        )
    }
}

pub fn transport_client(address: &str, port: u16) -> LayerProtocol {
    LayerProtocol::TransportClient {
        remote_address: address.to_string(),
        remote_port: port,
    }
}
