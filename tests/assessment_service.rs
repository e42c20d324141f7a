use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use brandpulse::assessment::{AssessmentError, AssessmentService};
use brandpulse::database::{
    DatabaseError, MonthlyCount, RecordStore, TestKind, TestRecord, TestStatus,
};
use brandpulse::openai::{EvaluationResult, Scorer, ScoringError};

#[derive(Default)]
struct MemoryStore {
    records: Mutex<HashMap<Uuid, TestRecord>>,
}

impl MemoryStore {
    async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    async fn get(&self, id: Uuid) -> Option<TestRecord> {
        self.records.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &TestRecord) -> Result<(), DatabaseError> {
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<TestRecord>, DatabaseError> {
        Ok(self.records.lock().await.get(&id).cloned())
    }

    async fn fetch_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<TestRecord>, DatabaseError> {
        Ok(self
            .records
            .lock()
            .await
            .get(&id)
            .filter(|r| r.owner == owner)
            .cloned())
    }

    async fn update(&self, record: &TestRecord) -> Result<(), DatabaseError> {
        let mut records = self.records.lock().await;
        if !records.contains_key(&record.id) {
            return Err(DatabaseError::RecordNotFound(record.id.to_string()));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner: Uuid, kind: TestKind) -> Result<Vec<TestRecord>, DatabaseError> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|r| r.owner == owner && r.kind == kind)
            .cloned()
            .collect())
    }

    async fn list_all(&self, kind: TestKind) -> Result<Vec<TestRecord>, DatabaseError> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }

    async fn count_by_month(&self, kind: TestKind) -> Result<Vec<MonthlyCount>, DatabaseError> {
        let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
        for record in self.records.lock().await.values() {
            if record.kind == kind {
                *buckets
                    .entry(record.created_at.format("%Y-%m").to_string())
                    .or_default() += 1;
            }
        }
        Ok(buckets
            .into_iter()
            .map(|(month, count)| MonthlyCount { month, count })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.records.lock().await.remove(&id).is_some())
    }
}

struct StubScorer {
    calls: AtomicUsize,
    fail: bool,
}

impl StubScorer {
    fn succeeding() -> Self {
        Self { calls: AtomicUsize::new(0), fail: false }
    }

    fn failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail: true }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn canned_result() -> EvaluationResult {
    let mut scores = BTreeMap::new();
    scores.insert("Market Research Quality".to_string(), 7u8);
    let mut feedback = BTreeMap::new();
    feedback.insert("Market Research Quality".to_string(), "solid".to_string());
    let mut recommendations = BTreeMap::new();
    recommendations.insert("Market Research Quality".to_string(), "keep the cadence".to_string());
    EvaluationResult {
        scores,
        feedback,
        recommendations,
        overall: "A promising foundation.".to_string(),
    }
}

#[async_trait]
impl Scorer for StubScorer {
    async fn evaluate_answers(&self, _answers: &Value) -> Result<EvaluationResult, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ScoringError::Upstream("connection refused".to_string()))
        } else {
            Ok(canned_result())
        }
    }
}

fn service_with(
    store: Arc<MemoryStore>,
    scorer: Arc<StubScorer>,
) -> AssessmentService {
    AssessmentService::new(store, scorer)
}

fn answers_v1() -> Value {
    json!({"assess": {"marketResearch": "agency tracker", "consumerSegmentation": ""}})
}

fn answers_v2() -> Value {
    json!({"assess": {"marketResearch": "agency tracker", "consumerSegmentation": "needs-based"}})
}

#[tokio::test]
async fn save_progress_without_id_creates_a_draft() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store.clone(), Arc::new(StubScorer::succeeding()));
    let owner = Uuid::new_v4();

    let record = service
        .save_progress(owner, TestKind::Simple, None, answers_v1())
        .await
        .unwrap();

    assert_eq!(record.status, TestStatus::InProgress);
    assert_eq!(record.progress, 50);
    assert!(!record.is_scored());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn save_progress_with_returned_id_mutates_the_same_record() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store.clone(), Arc::new(StubScorer::succeeding()));
    let owner = Uuid::new_v4();

    let first = service
        .save_progress(owner, TestKind::Simple, None, answers_v1())
        .await
        .unwrap();
    let second = service
        .save_progress(owner, TestKind::Simple, Some(first.id), answers_v2())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.len().await, 1);
    let stored = store.get(first.id).await.unwrap();
    assert_eq!(stored.answers, answers_v2());
    assert_eq!(stored.progress, 100);
}

#[tokio::test]
async fn foreign_id_behaves_like_a_missing_id() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store.clone(), Arc::new(StubScorer::succeeding()));
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let alices = service
        .save_progress(alice, TestKind::Simple, None, answers_v1())
        .await
        .unwrap();
    let bobs = service
        .save_progress(bob, TestKind::Simple, Some(alices.id), answers_v2())
        .await
        .unwrap();

    assert_ne!(bobs.id, alices.id);
    assert_eq!(store.len().await, 2);
    // Alice's record is untouched.
    let stored = store.get(alices.id).await.unwrap();
    assert_eq!(stored.answers, answers_v1());
}

#[tokio::test]
async fn submit_for_scoring_stores_a_completed_record() {
    let store = Arc::new(MemoryStore::default());
    let scorer = Arc::new(StubScorer::succeeding());
    let service = service_with(store.clone(), scorer.clone());
    let owner = Uuid::new_v4();

    let record = service
        .submit_for_scoring(owner, TestKind::Advanced, answers_v2())
        .await
        .unwrap();

    assert_eq!(record.status, TestStatus::Completed);
    assert_eq!(record.progress, 100);
    assert!(record.is_scored());
    assert!(!record.overall.is_empty());
    assert_eq!(scorer.call_count(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn scoring_failure_during_submit_persists_nothing() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store.clone(), Arc::new(StubScorer::failing()));
    let owner = Uuid::new_v4();

    let err = service
        .submit_for_scoring(owner, TestKind::Simple, answers_v1())
        .await
        .unwrap_err();

    assert!(matches!(err, AssessmentError::Scoring(_)));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn scoring_failure_during_complete_leaves_the_draft_untouched() {
    let store = Arc::new(MemoryStore::default());
    let failing = Arc::new(StubScorer::failing());
    let service = service_with(store.clone(), failing);
    let owner = Uuid::new_v4();

    let draft = service
        .save_progress(owner, TestKind::Simple, None, answers_v1())
        .await
        .unwrap();
    let err = service.complete(owner, draft.id).await.unwrap_err();

    assert!(matches!(err, AssessmentError::Scoring(_)));
    let stored = store.get(draft.id).await.unwrap();
    assert_eq!(stored.status, TestStatus::InProgress);
    assert!(!stored.is_scored());
    assert_eq!(stored.progress, 50);
}

#[tokio::test]
async fn complete_is_idempotent() {
    let store = Arc::new(MemoryStore::default());
    let scorer = Arc::new(StubScorer::succeeding());
    let service = service_with(store.clone(), scorer.clone());
    let owner = Uuid::new_v4();

    let draft = service
        .save_progress(owner, TestKind::Simple, None, answers_v1())
        .await
        .unwrap();

    let first = service.complete(owner, draft.id).await.unwrap();
    let second = service.complete(owner, draft.id).await.unwrap();

    assert_eq!(first.status, TestStatus::Completed);
    assert_eq!(first.scores, second.scores);
    assert_eq!(first.feedback, second.feedback);
    assert_eq!(first.recommendations, second.recommendations);
    assert_eq!(first.overall, second.overall);
    // The second call is a no-op; the scorer ran exactly once.
    assert_eq!(scorer.call_count(), 1);
}

#[tokio::test]
async fn complete_resumes_without_rescoring() {
    let store = Arc::new(MemoryStore::default());
    let scorer = Arc::new(StubScorer::succeeding());
    let service = service_with(store.clone(), scorer.clone());
    let owner = Uuid::new_v4();

    // Simulate a crash between score-fill and status-flip: scores are
    // populated but the record is still in progress.
    let mut record = TestRecord::new(owner, TestKind::Simple, answers_v1());
    record.apply_evaluation(canned_result());
    store.insert(&record).await.unwrap();

    let completed = service.complete(owner, record.id).await.unwrap();

    assert_eq!(scorer.call_count(), 0);
    assert_eq!(completed.status, TestStatus::Completed);
    assert_eq!(completed.progress, 100);
    assert_eq!(completed.scores, record.scores);
}

#[tokio::test]
async fn get_is_owner_scoped() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store.clone(), Arc::new(StubScorer::succeeding()));
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let record = service
        .save_progress(owner, TestKind::Simple, None, answers_v1())
        .await
        .unwrap();

    assert!(service.get(owner, record.id).await.is_ok());
    assert!(matches!(
        service.get(stranger, record.id).await,
        Err(AssessmentError::NotFound)
    ));
}

#[tokio::test]
async fn listing_filters_by_owner_and_kind() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store.clone(), Arc::new(StubScorer::succeeding()));
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    service.save_progress(alice, TestKind::Simple, None, answers_v1()).await.unwrap();
    service.save_progress(alice, TestKind::Advanced, None, answers_v1()).await.unwrap();
    service.save_progress(bob, TestKind::Simple, None, answers_v1()).await.unwrap();

    assert_eq!(service.list_for_owner(alice, TestKind::Simple).await.unwrap().len(), 1);
    assert_eq!(service.list_for_owner(alice, TestKind::Advanced).await.unwrap().len(), 1);
    assert_eq!(service.list_all(TestKind::Simple).await.unwrap().len(), 2);

    let months = service.monthly_counts(TestKind::Simple).await.unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].count, 2);
}

#[tokio::test]
async fn delete_reports_not_found_for_unknown_id() {
    let store = Arc::new(MemoryStore::default());
    let service = service_with(store, Arc::new(StubScorer::succeeding()));

    assert!(matches!(
        service.delete(Uuid::new_v4()).await,
        Err(AssessmentError::NotFound)
    ));
}
