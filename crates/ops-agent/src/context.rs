//! # Agent Context
//!
//! Shared state for request handling: where snapshots come from, where
//! assignments go, and how free text is parsed. One request runs one cycle:
//! load a fresh snapshot, route, then write back if the router asked to.

use std::sync::Arc;

use ops_engine::SeverityPolicy;
use ops_store::{RowSink, RowSource, SnapshotLoader, SnapshotSource, apply_assignment};

use crate::error::Result;
use crate::request::{JsonRequestParser, RequestParser, StructuredRequest};
use crate::response::{AgentResponse, ResponsePayload};
use crate::router::route;

/// Application context shared by every handler
#[derive(Clone)]
pub struct AgentContext {
    snapshots: Arc<dyn SnapshotSource>,
    sink: Arc<dyn RowSink>,
    parser: Arc<dyn RequestParser>,
    policy: SeverityPolicy,
}

impl AgentContext {
    pub fn new(
        snapshots: Arc<dyn SnapshotSource>,
        sink: Arc<dyn RowSink>,
        policy: SeverityPolicy,
    ) -> Self {
        Self {
            snapshots,
            sink,
            parser: Arc::new(JsonRequestParser),
            policy,
        }
    }

    /// Context reading and writing through one row store
    pub fn over_store<S>(store: Arc<S>, policy: SeverityPolicy) -> Self
    where
        S: RowSource + RowSink + 'static,
    {
        Self::new(
            Arc::new(SnapshotLoader::new(Arc::clone(&store))),
            store,
            policy,
        )
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn RequestParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn policy(&self) -> &SeverityPolicy {
        &self.policy
    }

    /// Run one request cycle.
    ///
    /// # Errors
    ///
    /// Store failures surface unchanged: connectivity as
    /// [`AgentError::Connectivity`](crate::AgentError::Connectivity), a row
    /// that moved since the snapshot as
    /// [`AgentError::Conflict`](crate::AgentError::Conflict). Nothing is
    /// retried.
    pub async fn handle(&self, request: &StructuredRequest) -> Result<AgentResponse> {
        let snapshot = self.snapshots.load_snapshot().await?;
        let routed = route(&snapshot, &self.policy, request)?;
        let mut response = routed.response;

        if let Some(update) = routed.write {
            let version = apply_assignment(self.sink.as_ref(), &update).await?;
            if let ResponsePayload::Reassignment(report) = &mut response.payload {
                report.committed_version = Some(version);
            }
        }

        Ok(response)
    }

    /// Parse free text, then run it like a structured request
    ///
    /// # Errors
    ///
    /// Parse failures, plus everything [`Self::handle`] can return.
    pub async fn ask(&self, text: &str) -> Result<AgentResponse> {
        let request = self.parser.parse(text).await?;
        tracing::debug!(kind = %request.kind, "Parsed free-text request");
        self.handle(&request).await
    }
}
