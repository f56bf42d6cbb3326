#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use fleetctl_core::{ControlError, ControlResult, RefreshConfig, ResolutionFailure};
    use fleetctl_dispatcher::{
        CorrelatedDispatcher, ForwardingGraphResolver, RefreshController, RefreshState,
    };
    use fleetctl_domain::{
        Edge, FleetInventory, LayerProtocol, OperationTransport, OutboundRequest,
        OutboundResponse, TerminationPoint, TraceContext,
    };
    use fleetctl_testing_utils::{transport_client, GraphFixture, RecordingTransport};
    use serde_json::json;
    use tokio::sync::Notify;

    const REFRESH_OP: &str = "/v1/provide-list-of-connected-devices";
    const INTERVAL: Duration = Duration::from_secs(2 * 60);

    fn fixture() -> GraphFixture {
        GraphFixture::new()
            .http_operation("RefreshDeviceList", REFRESH_OP, "k3", "10.0.0.8", 3001)
            .integer_profile("integer-p-000", 2)
    }

    fn config(fallback: Option<u64>) -> RefreshConfig {
        RefreshConfig {
            enabled: true,
            node: "RefreshDeviceList".to_string(),
            profile_suffix: "integer-p-000".to_string(),
            fallback_interval_minutes: fallback,
        }
    }

    fn controller(fixture: GraphFixture, transport: &RecordingTransport) -> RefreshController {
        let resolver = ForwardingGraphResolver::new(Arc::new(fixture.build()));
        let dispatcher = CorrelatedDispatcher::new(Arc::new(transport.clone()), "http");
        RefreshController::new(resolver, dispatcher, config(None), FleetInventory::new())
    }

    fn seed() -> TraceContext {
        TraceContext::new("fleetctl", "DeviceInventory").with_trace_indicator("1")
    }

    /// 发出请求后挂起，直到测试放行
    #[derive(Clone, Default)]
    struct GatedTransport {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        sends: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OperationTransport for GatedTransport {
        async fn send(&self, _request: OutboundRequest) -> ControlResult<OutboundResponse> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(OutboundResponse {
                status: 200,
                body: Some(json!([{"node-id": "513250009"}])),
            })
        }
    }

    /// 暂停时钟下的等待会自动推进时间，期间到期的定时器任务都会执行
    async fn wait_intervals(count: u32) {
        tokio::time::sleep(INTERVAL * count + Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_refreshes_immediately_and_on_each_tick() {
        let transport = RecordingTransport::new();
        transport.respond(REFRESH_OP, 200, Some(json!([{"node-id": "513250009"}])));
        let controller = controller(fixture(), &transport);

        assert!(controller.start(&seed()).await.unwrap());
        assert_eq!(controller.state(), RefreshState::Running);
        assert_eq!(controller.refresh_interval(), Some(INTERVAL));
        assert_eq!(transport.count(), 1);
        assert_eq!(
            controller.snapshot().await,
            Some(json!([{"node-id": "513250009"}]))
        );

        wait_intervals(2).await;
        assert_eq!(transport.count(), 3);

        // 每个周期复用同一个追踪上下文
        let requests = transport.requests();
        assert!(requests
            .iter()
            .all(|r| r.header("trace-indicator") == Some("1.1")));
        assert_eq!(requests[0].body, json!({}));

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_timer() {
        let transport = RecordingTransport::new();
        let controller = controller(fixture(), &transport);

        assert!(controller.start(&seed()).await.unwrap());
        assert!(!controller.start(&seed()).await.unwrap());

        wait_intervals(3).await;
        assert_eq!(transport.count(), 4);

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_start_has_one_winner() {
        let transport = RecordingTransport::new();
        let controller = controller(fixture(), &transport);
        let seed = seed();

        let (a, b) = tokio::join!(controller.start(&seed), controller.start(&seed));
        assert!(a.unwrap() ^ b.unwrap());

        wait_intervals(1).await;
        assert_eq!(transport.count(), 2);

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_keeps_cycle_running() {
        let transport = RecordingTransport::new();
        transport.fail(REFRESH_OP, "connection reset");
        let controller = controller(fixture(), &transport);

        assert!(controller.start(&seed()).await.unwrap());
        wait_intervals(2).await;

        assert_eq!(transport.count(), 3);
        assert!(controller.is_running());
        assert!(controller.snapshot().await.is_none());

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_further_ticks() {
        let transport = RecordingTransport::new();
        let controller = controller(fixture(), &transport);

        controller.start(&seed()).await.unwrap();
        wait_intervals(2).await;
        assert_eq!(transport.count(), 3);

        controller.stop().await;
        assert_eq!(controller.state(), RefreshState::Stopped);

        wait_intervals(5).await;
        assert_eq!(transport.count(), 3);

        // 重复停止是空操作
        controller.stop().await;
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let transport = RecordingTransport::new();
        let controller = controller(fixture(), &transport);

        controller.start(&seed()).await.unwrap();
        controller.stop().await;
        assert!(controller.start(&seed()).await.unwrap());

        wait_intervals(1).await;
        assert_eq!(transport.count(), 3);

        controller.stop().await;
    }

    #[tokio::test]
    async fn test_missing_profile_fails_start() {
        let transport = RecordingTransport::new();
        let controller = controller(
            GraphFixture::new().http_operation("RefreshDeviceList", REFRESH_OP, "k3", "h", 1),
            &transport,
        );

        let err = controller.start(&seed()).await.unwrap_err();
        assert!(err.to_string().contains("integer-p-000"));
        assert_eq!(controller.state(), RefreshState::Stopped);
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_node_fails_start() {
        let transport = RecordingTransport::new();
        let controller = controller(GraphFixture::new(), &transport);

        let err = controller.start(&seed()).await.unwrap_err();
        assert!(err.is_resolution_error());
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_interval_when_profile_missing() {
        let transport = RecordingTransport::new();
        let resolver = ForwardingGraphResolver::new(Arc::new(
            GraphFixture::new()
                .http_operation("RefreshDeviceList", REFRESH_OP, "k3", "h", 1)
                .build(),
        ));
        let controller = RefreshController::new(
            resolver,
            CorrelatedDispatcher::new(Arc::new(transport.clone()), "http"),
            config(Some(5)),
            FleetInventory::new(),
        );

        controller.start(&seed()).await.unwrap();
        assert_eq!(
            controller.refresh_interval(),
            Some(Duration::from_secs(5 * 60))
        );

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_node_without_operation_layer_fails_start() {
        let transport = RecordingTransport::new();
        let fixture = GraphFixture::new()
            .node(
                "RefreshDeviceList",
                "mwdi-1-0-0-op-fc-is-009",
                vec![Edge::output("mwdi-1-0-0-tcp-s-009")],
            )
            .termination_point(
                TerminationPoint::new(
                    "mwdi-1-0-0-tcp-s-009",
                    LayerProtocol::TransportServer {
                        local_address: "0.0.0.0".to_string(),
                        local_port: 4000,
                    },
                )
                .with_server("mwdi-1-0-0-http-c-009"),
            )
            .termination_point(TerminationPoint::new(
                "mwdi-1-0-0-http-c-009",
                transport_client("10.0.0.8", 3001),
            ))
            .integer_profile("integer-p-000", 2);
        let controller = controller(fixture, &transport);

        let err = controller.start(&seed()).await.unwrap_err();
        assert!(matches!(
            err,
            ControlError::GraphResolution(ResolutionFailure::OperationBindingMissing { .. })
        ));
        assert_eq!(controller.state(), RefreshState::Stopped);

        wait_intervals(3).await;
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_profile_interval_is_rejected() {
        let transport = RecordingTransport::new();
        let controller = controller(
            GraphFixture::new()
                .http_operation("RefreshDeviceList", REFRESH_OP, "k3", "10.0.0.8", 3001)
                .integer_profile("integer-p-000", 1_000_000_000_000_000),
            &transport,
        );

        let err = controller.start(&seed()).await.unwrap_err();
        assert!(matches!(err, ControlError::Configuration(_)));
        assert!(!controller.is_running());
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_first_dispatch_discards_result() {
        let transport = GatedTransport::default();
        let resolver = ForwardingGraphResolver::new(Arc::new(fixture().build()));
        let controller = RefreshController::new(
            resolver,
            CorrelatedDispatcher::new(Arc::new(transport.clone()), "http"),
            config(None),
            FleetInventory::new(),
        );

        let starting = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.start(&seed()).await })
        };

        transport.entered.notified().await;
        controller.stop().await;
        transport.release.notify_one();

        // 进行中的调用正常完成，但结果被丢弃且不再调度定时器
        assert!(starting.await.unwrap().unwrap());
        assert_eq!(controller.state(), RefreshState::Stopped);
        assert!(controller.snapshot().await.is_none());

        wait_intervals(3).await;
        assert_eq!(transport.sends.load(Ordering::SeqCst), 1);
    }
}
