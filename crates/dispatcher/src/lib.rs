//! 转发图解析、关联调用以及建立在其上的交接与周期刷新流程

pub mod correlated;
pub mod handover;
pub mod live_view;
pub mod refresh_controller;
pub mod resolver;

pub use correlated::{CorrelatedDispatcher, DispatchOutcome};
pub use handover::{BroadcastReplacement, DeregisterRelease, HandoverOutcome, ReleaseHandover};
pub use live_view::{GraphBackedCollector, LiveNetViewAggregator};
pub use refresh_controller::{RefreshController, RefreshState};
pub use resolver::{ForwardingGraphResolver, ResolvedRoute};
