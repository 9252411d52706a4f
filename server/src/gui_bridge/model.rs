use crate::workflow::runner::WorkflowResult;
use ridercore::{RecordStore, SessionConfig};

/// Read-only state served to viewers. Built once after the dataset loads.
pub struct BridgeModel {
    pub store: RecordStore,
    pub session: SessionConfig,
    pub summary: WorkflowResult,
}

impl BridgeModel {
    pub fn new(store: RecordStore, session: SessionConfig, summary: WorkflowResult) -> Self {
        Self {
            store,
            session,
            summary,
        }
    }
}
