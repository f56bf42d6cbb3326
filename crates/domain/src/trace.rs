//! 调用链追踪上下文
//!
//! trace-indicator 是以点分隔的整数序列。每个调用点持有自己的步进计数器，
//! 出站请求的路径为 `<继承路径>.<下一步>`，上下文本身从不原地修改。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TraceContext {
    pub user: String,
    pub originator: String,
    pub x_correlator: String,
    pub trace_indicator: String,
    pub customer_journey: String,
}

impl TraceContext {
    pub fn new<U: Into<String>, O: Into<String>>(user: U, originator: O) -> Self {
        Self {
            user: user.into(),
            originator: originator.into(),
            x_correlator: uuid::Uuid::new_v4().to_string(),
            trace_indicator: "1".to_string(),
            customer_journey: "unknown".to_string(),
        }
    }

    pub fn with_trace_indicator<S: Into<String>>(mut self, trace_indicator: S) -> Self {
        self.trace_indicator = trace_indicator.into();
        self
    }

    pub fn with_correlator<S: Into<String>>(mut self, x_correlator: S) -> Self {
        self.x_correlator = x_correlator.into();
        self
    }

    pub fn with_customer_journey<S: Into<String>>(mut self, customer_journey: S) -> Self {
        self.customer_journey = customer_journey.into();
        self
    }

    /// 返回追加了一级步骤的副本
    pub fn extended(&self, step: u32) -> Self {
        Self {
            trace_indicator: format!("{}.{}", self.trace_indicator, step),
            ..self.clone()
        }
    }

    pub fn sequence(&self) -> TraceSequence {
        TraceSequence::new(self.clone())
    }
}

/// 调用点私有的步进计数器
///
/// 只有请求确实发出后才调用 [`TraceSequence::advance`]，调用方重试时会复用同一步。
#[derive(Debug, Clone)]
pub struct TraceSequence {
    base: TraceContext,
    next_step: u32,
}

impl TraceSequence {
    pub fn new(base: TraceContext) -> Self {
        Self { base, next_step: 1 }
    }
    pub fn base(&self) -> &TraceContext {
        &self.base
    }
    pub fn next_step(&self) -> u32 {
        self.next_step
    }
    /// 下一次出站调用使用的上下文
    pub fn next_context(&self) -> TraceContext {
        self.base.extended(self.next_step)
    }
    pub fn advance(&mut self) {
        self.next_step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_does_not_mutate_original() {
        let base = TraceContext::new("user", "app").with_trace_indicator("3.2");
        let extended = base.extended(1);

        assert_eq!(base.trace_indicator, "3.2");
        assert_eq!(extended.trace_indicator, "3.2.1");
        assert_eq!(extended.x_correlator, base.x_correlator);
    }

    #[test]
    fn test_sequence_advances_only_on_request() {
        let mut sequence = TraceContext::new("user", "app")
            .with_trace_indicator("7")
            .sequence();

        assert_eq!(sequence.next_context().trace_indicator, "7.1");
        // 未发送时重复读取得到同一步
        assert_eq!(sequence.next_context().trace_indicator, "7.1");

        sequence.advance();
        assert_eq!(sequence.next_context().trace_indicator, "7.2");
        assert_eq!(sequence.next_step(), 2);
    }

    #[test]
    fn test_new_context_generates_correlator() {
        let a = TraceContext::new("user", "app");
        let b = TraceContext::new("user", "app");
        assert_ne!(a.x_correlator, b.x_correlator);
        assert_eq!(a.trace_indicator, "1");
        assert_eq!(a.customer_journey, "unknown");
    }
}
