//! 周期刷新控制器
//!
//! 状态只有 `Stopped` 与 `Running`，通过比较并交换切换，同一实例上并发的
//! `start` 只会有一个生效。每次 `start` 产生新的代次，`stop` 之后仍在进行中的
//! 调用会正常完成，但其结果按代次丢弃。

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fleetctl_core::{ControlError, ControlResult, RefreshConfig, ResolutionFailure};
use fleetctl_domain::{
    key_paths, FleetInventory, ForwardingNode, GraphStore, OperationDescriptor, TraceContext,
    TransportKind, TransportTarget,
};
use fleetctl_infrastructure::MetricsCollector;
use serde_json::{json, Value};
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::correlated::CorrelatedDispatcher;
use crate::resolver::ForwardingGraphResolver;

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Stopped,
    Running,
}

/// 一次 `start` 解析出的刷新计划，整个周期内不变
#[derive(Debug, Clone)]
struct RefreshPlan {
    operation: OperationDescriptor,
    target: TransportTarget,
    /// 每个周期复用同一个上下文，追踪路径不递增
    context: TraceContext,
    interval: Duration,
}

struct RefreshInner {
    store: Arc<dyn GraphStore>,
    resolver: ForwardingGraphResolver,
    dispatcher: CorrelatedDispatcher,
    config: RefreshConfig,
    inventory: FleetInventory,
    metrics: MetricsCollector,
    state: AtomicU8,
    generation: AtomicU64,
    interval_ms: AtomicU64,
    timer: Mutex<Option<watch::Sender<bool>>>,
}

#[derive(Clone)]
pub struct RefreshController {
    inner: Arc<RefreshInner>,
}

impl RefreshController {
    pub fn new(
        resolver: ForwardingGraphResolver,
        dispatcher: CorrelatedDispatcher,
        config: RefreshConfig,
        inventory: FleetInventory,
    ) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                store: resolver.store().clone(),
                resolver,
                dispatcher,
                config,
                inventory,
                metrics: MetricsCollector::new(),
                state: AtomicU8::new(STOPPED),
                generation: AtomicU64::new(0),
                interval_ms: AtomicU64::new(0),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> RefreshState {
        match self.inner.state.load(Ordering::Acquire) {
            RUNNING => RefreshState::Running,
            _ => RefreshState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RefreshState::Running
    }

    pub fn inventory(&self) -> &FleetInventory {
        &self.inner.inventory
    }

    pub async fn snapshot(&self) -> Option<Value> {
        self.inner.inventory.snapshot().await
    }

    /// 最近一次 `start` 读取到的刷新间隔
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.inner.interval_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// 启动刷新周期
    ///
    /// 已在运行时立即返回 `Ok(false)`。解析或 profile 读取失败时状态回到
    /// `Stopped` 并返回错误。
    pub async fn start(&self, seed: &TraceContext) -> ControlResult<bool> {
        if self
            .inner
            .state
            .compare_exchange(STOPPED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("刷新周期已在运行，忽略重复启动");
            return Ok(false);
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let plan = match self.plan(seed).await {
            Ok(plan) => plan,
            Err(e) => {
                error!("刷新周期启动失败: {}", e);
                if self.inner.generation.load(Ordering::Acquire) == generation {
                    self.inner
                        .state
                        .compare_exchange(RUNNING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
                        .ok();
                }
                return Err(e);
            }
        };
        self.inner
            .interval_ms
            .store(plan.interval.as_millis() as u64, Ordering::Release);

        info!(
            node = %self.inner.config.node,
            interval_ms = plan.interval.as_millis() as u64,
            "启动设备清单刷新周期"
        );
        self.inner.refresh_once(&plan, generation).await;

        let mut timer = self.inner.timer.lock().await;
        if !self.inner.is_current(generation) {
            debug!("刷新周期在首次调用期间被停止");
            return Ok(true);
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        *timer = Some(stop_tx);
        drop(timer);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.run_timer(plan, generation, stop_rx).await;
        });

        Ok(true)
    }

    /// 停止刷新周期；已停止时为空操作
    pub async fn stop(&self) {
        let was_running = self.inner.state.swap(STOPPED, Ordering::AcqRel) == RUNNING;
        self.inner.generation.fetch_add(1, Ordering::AcqRel);

        if let Some(stop_tx) = self.inner.timer.lock().await.take() {
            stop_tx.send(true).ok();
        }
        if was_running {
            info!("设备清单刷新周期已停止");
        }
    }

    async fn plan(&self, seed: &TraceContext) -> ControlResult<RefreshPlan> {
        let route = self
            .inner
            .resolver
            .resolve_route(&self.inner.config.node, TransportKind::Http)
            .await?;
        // 未绑定操作层时每个周期都会被拒绝，直接视为解析失败
        if !route.operation.is_bound() {
            return Err(ResolutionFailure::OperationBindingMissing {
                node: self.inner.config.node.clone(),
            }
            .into());
        }
        let minutes = self.inner.interval_minutes(&route.node).await?;
        let interval_ms = minutes.checked_mul(60_000).ok_or_else(|| {
            ControlError::config_error(format!("刷新间隔超出范围: {minutes} 分钟"))
        })?;

        Ok(RefreshPlan {
            operation: route.operation,
            target: route.target,
            context: seed.sequence().next_context(),
            interval: Duration::from_millis(interval_ms),
        })
    }
}

impl RefreshInner {
    fn is_current(&self, generation: u64) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
            && self.generation.load(Ordering::Acquire) == generation
    }

    /// profile 标识由节点标识前缀和固定后缀拼接而成
    async fn interval_minutes(&self, node: &ForwardingNode) -> ControlResult<u64> {
        let profile_id =
            key_paths::profile_id(node.identifier_prefix(), &self.config.profile_suffix);
        let key = key_paths::profile_integer_value(&profile_id);

        let minutes = match self.store.value(&key).await? {
            Some(value) => value
                .as_u64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| {
                    ControlError::config_error(format!("profile {key} 不是整数: {value}"))
                })?,
            None => self.config.fallback_interval_minutes.ok_or_else(|| {
                ControlError::config_error(format!("刷新间隔 profile 缺失: {key}"))
            })?,
        };

        if minutes == 0 {
            return Err(ControlError::config_error(format!("刷新间隔必须大于0: {key}")));
        }
        Ok(minutes)
    }

    async fn run_timer(
        &self,
        plan: RefreshPlan,
        generation: u64,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = interval_at(Instant::now() + plan.interval, plan.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {
                    if !self.is_current(generation) {
                        break;
                    }
                    self.refresh_once(&plan, generation).await;
                }
            }
        }
        debug!(generation, "刷新定时器退出");
    }

    /// 单次刷新；失败只记录日志，不影响后续周期
    async fn refresh_once(&self, plan: &RefreshPlan, generation: u64) {
        let result = self
            .dispatcher
            .dispatch_with_context(&plan.operation, &plan.target, json!({}), &plan.context)
            .await
            .and_then(|outcome| {
                let operation = plan.operation.operation_name.as_deref().unwrap_or_default();
                outcome.accepted(operation)
            });

        match result {
            Ok(outcome) => {
                if !self.is_current(generation) {
                    debug!("刷新周期已停止，丢弃本次结果");
                    return;
                }
                match outcome.body {
                    Some(fleet) => {
                        self.inventory.replace(fleet).await;
                        self.metrics.record_refresh_tick("success");
                        let devices = self.inventory.device_count().await;
                        debug!(devices, "设备清单已刷新");
                    }
                    None => {
                        self.metrics.record_refresh_tick("empty");
                        warn!("设备清单刷新响应为空，保留上一次快照");
                    }
                }
            }
            Err(e) => {
                self.metrics.record_refresh_tick("failure");
                warn!(
                    trace_indicator = %plan.context.trace_indicator,
                    "设备清单刷新失败，等待下一周期: {}",
                    e
                );
            }
        }
    }
}
