pub mod models;
pub mod postgres;

pub use models::{
    Assignment, AssignmentKind, AssignmentStatus, MonthlyCount, TestKind, TestRecord, TestStatus,
};
pub use postgres::DatabaseManager;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Assignment not found: {0}")]
    AssignmentNotFound(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Persistence seam for test records. Postgres in production, an in-memory
/// map in the integration tests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &TestRecord) -> Result<()>;
    async fn fetch(&self, id: Uuid) -> Result<Option<TestRecord>>;
    /// Owner-scoped fetch: an id that exists under a different owner is
    /// reported as absent, never as a permission error.
    async fn fetch_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<TestRecord>>;
    async fn update(&self, record: &TestRecord) -> Result<()>;
    async fn list_by_owner(&self, owner: Uuid, kind: TestKind) -> Result<Vec<TestRecord>>;
    async fn list_all(&self, kind: TestKind) -> Result<Vec<TestRecord>>;
    async fn count_by_month(&self, kind: TestKind) -> Result<Vec<MonthlyCount>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
