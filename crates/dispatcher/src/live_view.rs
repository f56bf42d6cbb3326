//! 实时网络视图聚合
//!
//! 各数据段由 [`DataCollector`] 并发读取后按段名合并成一个 JSON 对象，
//! 任一数据段失败则整个操作失败。

use std::sync::Arc;

use async_trait::async_trait;
use fleetctl_core::{ControlResult, LiveViewConfig};
use fleetctl_domain::{
    CollectionRequest, DataCollector, TelemetrySection, TraceContext, TransportKind,
};
use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::correlated::CorrelatedDispatcher;
use crate::resolver::ForwardingGraphResolver;

const ACCEPTANCE_SECTIONS: &[TelemetrySection] = &[
    TelemetrySection::AirInterface,
    TelemetrySection::Vlan,
    TelemetrySection::Inventory,
    TelemetrySection::Alarms,
];
const EQUIPMENT_SECTIONS: &[TelemetrySection] = &[TelemetrySection::Inventory];
const STATUS_SECTIONS: &[TelemetrySection] =
    &[TelemetrySection::AirInterface, TelemetrySection::Alarms];

#[derive(Clone)]
pub struct LiveNetViewAggregator {
    collector: Arc<dyn DataCollector>,
}

impl LiveNetViewAggregator {
    pub fn new(collector: Arc<dyn DataCollector>) -> Self {
        Self { collector }
    }

    pub async fn acceptance_data(
        &self,
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value> {
        self.collect_sections(ACCEPTANCE_SECTIONS, request, trace)
            .await
    }

    pub async fn equipment_info(
        &self,
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value> {
        self.collect_sections(EQUIPMENT_SECTIONS, request, trace)
            .await
    }

    pub async fn status(
        &self,
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value> {
        self.collect_sections(STATUS_SECTIONS, request, trace).await
    }

    /// 第 i 个数据段使用追踪路径 `<P>.<i+1>`
    async fn collect_sections(
        &self,
        sections: &[TelemetrySection],
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value> {
        let futures = sections.iter().enumerate().map(|(index, section)| {
            let context = trace.extended(index as u32 + 1);
            async move {
                let data = self.collector.collect(*section, request, &context).await;
                (*section, data)
            }
        });

        let mut merged = Map::new();
        for (section, data) in join_all(futures).await {
            match data {
                Ok(value) => {
                    merged.insert(section.as_str().to_string(), value);
                }
                Err(e) => {
                    warn!(
                        mount_name = %request.mount_name,
                        section = section.as_str(),
                        "读取设备数据失败: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }

        debug!(
            mount_name = %request.mount_name,
            sections = merged.len(),
            "实时视图数据已合并"
        );
        Ok(Value::Object(merged))
    }
}

/// 经由转发图解析出目标后读取设备数据的默认实现
#[derive(Clone)]
pub struct GraphBackedCollector {
    resolver: ForwardingGraphResolver,
    dispatcher: CorrelatedDispatcher,
    config: LiveViewConfig,
}

impl GraphBackedCollector {
    pub fn new(
        resolver: ForwardingGraphResolver,
        dispatcher: CorrelatedDispatcher,
        config: LiveViewConfig,
    ) -> Self {
        Self {
            resolver,
            dispatcher,
            config,
        }
    }

    fn node_for(&self, section: TelemetrySection) -> &str {
        match section {
            TelemetrySection::AirInterface => &self.config.air_interface_node,
            TelemetrySection::Vlan => &self.config.vlan_node,
            TelemetrySection::Inventory => &self.config.inventory_node,
            TelemetrySection::Alarms => &self.config.alarms_node,
        }
    }
}

#[async_trait]
impl DataCollector for GraphBackedCollector {
    async fn collect(
        &self,
        section: TelemetrySection,
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value> {
        let route = self
            .resolver
            .resolve_route(self.node_for(section), TransportKind::Http)
            .await?;
        let operation = route.operation.operation_name.clone().unwrap_or_default();

        let outcome = self
            .dispatcher
            .dispatch_with_context(
                &route.operation,
                &route.target,
                serde_json::to_value(request)?,
                trace,
            )
            .await?
            .accepted(&operation)?;

        Ok(outcome.body.unwrap_or(Value::Null))
    }
}
