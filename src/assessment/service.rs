use std::sync::Arc;

use log::info;
use serde_json::Value;
use uuid::Uuid;

use super::{AssessmentError, Result};
use crate::database::{MonthlyCount, RecordStore, TestKind, TestRecord, TestStatus};
use crate::openai::Scorer;

/// Test record operations. Every operation is scoped to the requesting user
/// except the admin listing and analytics.
///
/// Concurrency: last writer wins. There is no per-record lock or version
/// check, so two concurrent `complete` calls may both reach the scorer; the
/// domain (one user editing their own draft) makes that race rare.
pub struct AssessmentService {
    store: Arc<dyn RecordStore>,
    scorer: Arc<dyn Scorer>,
}

impl AssessmentService {
    pub fn new(store: Arc<dyn RecordStore>, scorer: Arc<dyn Scorer>) -> Self {
        Self { store, scorer }
    }

    /// Upsert keyed on (id, owner): an id that exists under another owner
    /// behaves exactly like a missing id and creates a fresh record, so
    /// foreign record existence never leaks.
    pub async fn save_progress(
        &self,
        owner: Uuid,
        kind: TestKind,
        id: Option<Uuid>,
        answers: Value,
    ) -> Result<TestRecord> {
        if let Some(id) = id {
            if let Some(mut record) = self.store.fetch_owned(id, owner).await? {
                record.save_answers(answers);
                self.store.update(&record).await?;
                info!("💾 Saved draft {} at {}%", record.id, record.progress);
                return Ok(record);
            }
        }

        let record = TestRecord::new(owner, kind, answers);
        self.store.insert(&record).await?;
        info!("💾 Created draft {} at {}%", record.id, record.progress);
        Ok(record)
    }

    /// One-shot submit-and-score. The scorer runs first; a scoring failure
    /// aborts the whole operation and nothing is persisted.
    pub async fn submit_for_scoring(
        &self,
        owner: Uuid,
        kind: TestKind,
        answers: Value,
    ) -> Result<TestRecord> {
        let result = self.scorer.evaluate_answers(&answers).await?;

        let mut record = TestRecord::new(owner, kind, answers);
        record.apply_evaluation(result);
        record.mark_completed();
        self.store.insert(&record).await?;

        info!("🧠 Scored and stored {} test {}", kind.as_str(), record.id);
        Ok(record)
    }

    /// Idempotent finalize. Already completed or reviewed records are
    /// returned unchanged and never re-scored. A record that carries scores
    /// from an earlier attempt but never had its status flipped is completed
    /// without calling the scorer again.
    pub async fn complete(&self, owner: Uuid, id: Uuid) -> Result<TestRecord> {
        let mut record = self
            .store
            .fetch_owned(id, owner)
            .await?
            .ok_or(AssessmentError::NotFound)?;

        if record.status != TestStatus::InProgress {
            return Ok(record);
        }

        if !record.is_scored() {
            let result = self.scorer.evaluate_answers(&record.answers).await?;
            record.apply_evaluation(result);
            info!("🧠 Scored test {} on completion", record.id);
        }

        record.mark_completed();
        self.store.update(&record).await?;

        info!("✅ Completed test {}", record.id);
        Ok(record)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<TestRecord> {
        self.store
            .fetch_owned(id, owner)
            .await?
            .ok_or(AssessmentError::NotFound)
    }

    pub async fn list_for_owner(&self, owner: Uuid, kind: TestKind) -> Result<Vec<TestRecord>> {
        Ok(self.store.list_by_owner(owner, kind).await?)
    }

    pub async fn list_all(&self, kind: TestKind) -> Result<Vec<TestRecord>> {
        Ok(self.store.list_all(kind).await?)
    }

    pub async fn monthly_counts(&self, kind: TestKind) -> Result<Vec<MonthlyCount>> {
        Ok(self.store.count_by_month(kind).await?)
    }

    /// Admin delete. No cascade; the record simply goes away.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(AssessmentError::NotFound)
        }
    }
}
