//! Recording test doubles for the outbound ports

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fleetctl_core::{ControlError, ControlResult};
use fleetctl_domain::{
    CollectionRequest, DataCollector, OperationTransport, OutboundRequest, OutboundResponse,
    TelemetrySection, TraceContext,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
enum ScriptedReply {
    Respond(OutboundResponse),
    Fail(String),
}

/// Transport that records every request and answers from a per-operation script
///
/// Requests are matched by the URL ending with the operation path; unmatched
/// requests get `204 No Content`.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
    replies: Arc<Mutex<HashMap<String, ScriptedReply>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, operation: &str, status: u16, body: Option<Value>) {
        self.replies.lock().unwrap().insert(
            operation.to_string(),
            ScriptedReply::Respond(OutboundResponse { status, body }),
        );
    }

    /// Requests to `operation` fail before a response is received
    pub fn fail(&self, operation: &str, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(operation.to_string(), ScriptedReply::Fail(message.to_string()));
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, operation: &str) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(operation))
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl OperationTransport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> ControlResult<OutboundResponse> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(operation, _)| request.url.ends_with(operation.as_str()))
            .map(|(_, reply)| reply.clone());
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(ScriptedReply::Respond(response)) => Ok(response),
            Some(ScriptedReply::Fail(message)) => Err(ControlError::dispatch(url, message)),
            None => Ok(OutboundResponse {
                status: 204,
                body: None,
            }),
        }
    }
}

/// Collector answering `{"section", "mount-name"}` for every section
#[derive(Debug, Clone, Default)]
pub struct StaticCollector {
    failing: HashSet<TelemetrySection>,
    calls: Arc<Mutex<Vec<(TelemetrySection, TraceContext)>>>,
}

impl StaticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, section: TelemetrySection) -> Self {
        self.failing.insert(section);
        self
    }

    pub fn calls(&self) -> Vec<(TelemetrySection, TraceContext)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataCollector for StaticCollector {
    async fn collect(
        &self,
        section: TelemetrySection,
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value> {
        self.calls.lock().unwrap().push((section, trace.clone()));
        if self.failing.contains(&section) {
            return Err(ControlError::dispatch(section.as_str(), "device unreachable"));
        }
        Ok(json!({
            "section": section.as_str(),
            "mount-name": request.mount_name,
        }))
    }
}
