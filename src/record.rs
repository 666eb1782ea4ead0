use crate::aggregator::RiskAssessment;
use crate::error::ScanError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Only this many characters of the submitted email survive into the record.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// A completed scan ready for persistence. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScanRecord {
    pub principal_id: String,
    pub created_at: DateTime<Utc>,
    pub email_preview: String,
    pub assessment: RiskAssessment,
}

/// A persisted scan, owned by exactly one principal and read-only once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub principal_id: String,
    pub created_at: DateTime<Utc>,
    pub email_preview: String,
    pub assessment: RiskAssessment,
}

pub fn email_preview(text: &str) -> String {
    text.chars().take(PREVIEW_MAX_CHARS).collect()
}

/// Package an assessment with its owner and a bounded preview of the raw
/// input. Persistence failure is surfaced by the store, not retried here.
pub fn build_record(
    assessment: RiskAssessment,
    principal_id: &str,
    email_text: &str,
) -> NewScanRecord {
    NewScanRecord {
        principal_id: principal_id.to_string(),
        created_at: Utc::now(),
        email_preview: email_preview(email_text),
        assessment,
    }
}

/// Persistence boundary for scan records. Append/read-only from the
/// engine's perspective; deletion is the collaborator's concern.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn create(&self, record: NewScanRecord) -> Result<ScanRecord, ScanError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ScanRecord>, ScanError>;
    async fn find_by_owner(&self, principal_id: &str) -> Result<Vec<ScanRecord>, ScanError>;
}

/// In-memory store used by the CLI and tests.
#[derive(Default)]
pub struct MemoryScanStore {
    records: Arc<RwLock<HashMap<String, ScanRecord>>>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn create(&self, record: NewScanRecord) -> Result<ScanRecord, ScanError> {
        let stored = ScanRecord {
            id: Uuid::new_v4().to_string(),
            principal_id: record.principal_id,
            created_at: record.created_at,
            email_preview: record.email_preview,
            assessment: record.assessment,
        };
        let mut records = self.records.write().await;
        records.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ScanRecord>, ScanError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn find_by_owner(&self, principal_id: &str) -> Result<Vec<ScanRecord>, ScanError> {
        let records = self.records.read().await;
        let mut owned: Vec<ScanRecord> = records
            .values()
            .filter(|r| r.principal_id == principal_id)
            .cloned()
            .collect();
        owned.sort_by_key(|r| r.created_at);
        Ok(owned)
    }
}
