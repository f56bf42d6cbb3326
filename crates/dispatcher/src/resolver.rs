//! 转发图解析器
//!
//! 由转发节点名称出发，经唯一的输出边得到终结点链，再从链上取出传输目标与
//! 操作描述。解析只读、无副作用，可以并发重复调用。

use std::sync::Arc;

use fleetctl_core::{ControlResult, ResolutionFailure};
use fleetctl_domain::{
    ForwardingNode, GraphStore, LayerProtocol, OperationDescriptor, TerminationPoint,
    TerminationPointChain, TransportKind, TransportTarget,
};
use tracing::{debug, warn};

/// 一次解析得到的完整路由
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub node: ForwardingNode,
    pub operation: OperationDescriptor,
    pub target: TransportTarget,
}

#[derive(Clone)]
pub struct ForwardingGraphResolver {
    store: Arc<dyn GraphStore>,
}

impl ForwardingGraphResolver {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub async fn resolve_node(&self, node_name: &str) -> ControlResult<ForwardingNode> {
        self.store
            .forwarding_node(node_name)
            .await?
            .ok_or_else(|| {
                ResolutionFailure::NodeMissing {
                    node: node_name.to_string(),
                }
                .into()
            })
    }

    pub async fn resolve_transport_target(
        &self,
        node_name: &str,
        kind: TransportKind,
    ) -> ControlResult<TransportTarget> {
        let node = self.resolve_node(node_name).await?;
        let chain = self.chain_of(&node).await?;
        self.transport_target_of(&node, &chain, kind).await
    }

    /// 链上没有操作层时返回未绑定的描述，而不是错误
    pub async fn resolve_operation(&self, node_name: &str) -> ControlResult<OperationDescriptor> {
        let node = self.resolve_node(node_name).await?;
        let chain = self.chain_of(&node).await?;
        Ok(operation_of(&chain))
    }

    /// 一次读取节点与链，同时得到操作描述和传输目标
    pub async fn resolve_route(
        &self,
        node_name: &str,
        kind: TransportKind,
    ) -> ControlResult<ResolvedRoute> {
        let node = self.resolve_node(node_name).await?;
        let chain = self.chain_of(&node).await?;
        let operation = operation_of(&chain);
        let target = self.transport_target_of(&node, &chain, kind).await?;

        debug!(
            node = %node.name,
            operation = operation.operation_name.as_deref().unwrap_or("<unbound>"),
            transport = %target,
            "转发节点解析完成"
        );

        Ok(ResolvedRoute {
            node,
            operation,
            target,
        })
    }

    /// 从唯一输出边引用的终结点开始，沿第一个 server 引用逐层向下
    pub async fn chain_of(&self, node: &ForwardingNode) -> ControlResult<TerminationPointChain> {
        let mut outputs = node.output_edges();
        let output = match (outputs.next(), outputs.next()) {
            (Some(edge), None) => edge,
            _ => {
                return Err(ResolutionFailure::AmbiguousOutput {
                    node: node.name.clone(),
                    count: node.output_edges().count(),
                }
                .into())
            }
        };

        let head = self
            .store
            .termination_point(&output.termination_point_ref)
            .await?
            .ok_or_else(|| ResolutionFailure::TerminationPointMissing {
                node: node.name.clone(),
                uuid: output.termination_point_ref.clone(),
            })?;

        let mut layers = vec![head];
        loop {
            let Some(server) = layers.last().and_then(|tp| tp.server_refs.first()).cloned() else {
                break;
            };
            if layers.iter().any(|tp| tp.uuid == server) {
                warn!(node = %node.name, "终结点链存在环路: {}", server);
                break;
            }
            match self.store.termination_point(&server).await? {
                Some(tp) => layers.push(tp),
                None => {
                    // 下层缺失只影响传输解析，操作层仍然可用
                    warn!(node = %node.name, "终结点链引用的下层不存在: {}", server);
                    break;
                }
            }
        }

        Ok(TerminationPointChain::new(layers))
    }

    async fn transport_target_of(
        &self,
        node: &ForwardingNode,
        chain: &TerminationPointChain,
        kind: TransportKind,
    ) -> ControlResult<TransportTarget> {
        let missing = || ResolutionFailure::TransportBindingMissing {
            node: node.name.clone(),
        };

        let transport = match kind {
            // 输出边下方恰好一跳
            TransportKind::Http => chain
                .layers()
                .get(1)
                .filter(|tp| tp.is_transport_client())
                .cloned(),
            // 传输绑定挂在兄弟终结点上：取操作层的第一个 server 引用，
            // 再找把它列为 client 的传输客户端
            TransportKind::Tcp => {
                let server = chain
                    .head()
                    .and_then(|tp| tp.server_refs.first())
                    .ok_or_else(missing)?;
                self.store
                    .termination_points_serving(server)
                    .await?
                    .into_iter()
                    .find(TerminationPoint::is_transport_client)
            }
        };

        match transport.map(|tp| tp.layer) {
            Some(LayerProtocol::TransportClient {
                remote_address,
                remote_port,
            }) => Ok(TransportTarget::new(remote_address, remote_port)),
            _ => Err(missing().into()),
        }
    }
}

fn operation_of(chain: &TerminationPointChain) -> OperationDescriptor {
    match chain.first_operation_layer().map(|tp| &tp.layer) {
        Some(LayerProtocol::OperationClient {
            operation_name,
            operation_key,
        }) => OperationDescriptor {
            operation_name: operation_name.clone(),
            security_key: operation_key.clone(),
        },
        Some(LayerProtocol::EventStreamClient {
            authorization,
            index_alias,
        }) => OperationDescriptor {
            operation_name: index_alias.clone(),
            security_key: authorization.clone(),
        },
        _ => OperationDescriptor::unbound(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetctl_domain::Edge;
    use fleetctl_testing_utils::GraphFixture;

    fn resolver(fixture: GraphFixture) -> ForwardingGraphResolver {
        ForwardingGraphResolver::new(Arc::new(fixture.build()))
    }

    #[tokio::test]
    async fn test_http_route_resolves_one_hop() {
        let resolver = resolver(GraphFixture::new().http_operation(
            "Broadcast",
            "/v1/relay-server-replacement",
            "k1",
            "10.0.0.5",
            8443,
        ));

        let route = resolver
            .resolve_route("Broadcast", TransportKind::Http)
            .await
            .unwrap();
        assert_eq!(route.target, TransportTarget::new("10.0.0.5", 8443));
        assert_eq!(
            route.operation,
            OperationDescriptor::new("/v1/relay-server-replacement", "k1")
        );
    }

    #[tokio::test]
    async fn test_tcp_route_uses_sibling_binding() {
        let resolver = resolver(GraphFixture::new().tcp_operation(
            "ReadFromDevice",
            "/v1/read",
            "k2",
            ("10.0.0.5", 8443),
            ("10.0.0.9", 3000),
        ));

        let tcp = resolver
            .resolve_transport_target("ReadFromDevice", TransportKind::Tcp)
            .await
            .unwrap();
        assert_eq!(tcp, TransportTarget::new("10.0.0.9", 3000));

        let http = resolver
            .resolve_transport_target("ReadFromDevice", TransportKind::Http)
            .await
            .unwrap();
        assert_eq!(http, TransportTarget::new("10.0.0.5", 8443));
    }

    #[tokio::test]
    async fn test_event_stream_binding_maps_alias_and_authorization() {
        let resolver = resolver(GraphFixture::new().event_stream_operation(
            "RecordServiceRequest",
            "eatl_service_records",
            "Basic abc",
            "10.0.0.7",
            9200,
        ));

        let operation = resolver
            .resolve_operation("RecordServiceRequest")
            .await
            .unwrap();
        assert_eq!(
            operation,
            OperationDescriptor::new("eatl_service_records", "Basic abc")
        );
    }

    #[tokio::test]
    async fn test_missing_operation_layer_is_unbound() {
        let resolver = resolver(
            GraphFixture::new()
                .node("TransportOnly", "x-op-fc-000", vec![Edge::output("tp-http")])
                .termination_point(TerminationPoint::new(
                    "tp-http",
                    fleetctl_testing_utils::transport_client("10.0.0.1", 80),
                )),
        );

        let operation = resolver.resolve_operation("TransportOnly").await.unwrap();
        assert!(!operation.is_bound());
    }

    #[tokio::test]
    async fn test_missing_node() {
        let resolver = resolver(GraphFixture::new());
        let err = resolver.resolve_operation("Nowhere").await.unwrap_err();
        assert!(err.is_resolution_error());
        assert!(err.to_string().contains("Nowhere"));
    }

    #[tokio::test]
    async fn test_transport_binding_missing() {
        let resolver = resolver(
            GraphFixture::new()
                .node("Dangling", "x-op-fc-000", vec![Edge::output("op")])
                .termination_point(
                    TerminationPoint::new(
                        "op",
                        LayerProtocol::OperationClient {
                            operation_name: Some("/v1/x".to_string()),
                            operation_key: None,
                        },
                    )
                    .with_server("gone"),
                ),
        );

        // 操作层仍可解析
        assert!(resolver.resolve_operation("Dangling").await.unwrap().is_bound());

        let err = resolver
            .resolve_transport_target("Dangling", TransportKind::Http)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            fleetctl_core::ControlError::GraphResolution(
                ResolutionFailure::TransportBindingMissing { .. }
            )
        ));
    }

    #[tokio::test]
    async fn test_cyclic_chain_terminates() {
        let resolver = resolver(
            GraphFixture::new()
                .node("Loop", "x-op-fc-000", vec![Edge::output("a")])
                .termination_point(
                    TerminationPoint::new(
                        "a",
                        LayerProtocol::OperationClient {
                            operation_name: Some("/v1/loop".to_string()),
                            operation_key: Some("k".to_string()),
                        },
                    )
                    .with_server("b"),
                )
                .termination_point(
                    TerminationPoint::new("b", fleetctl_testing_utils::transport_client("h", 1))
                        .with_server("a"),
                ),
        );

        let node = resolver.resolve_node("Loop").await.unwrap();
        let chain = resolver.chain_of(&node).await.unwrap();
        assert_eq!(chain.len(), 2);
    }
}
