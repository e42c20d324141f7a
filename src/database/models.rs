use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::assessment::calculate_progress;
use crate::openai::EvaluationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Simple,
    Advanced,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Simple => "simple",
            TestKind::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(TestKind::Simple),
            "advanced" => Some(TestKind::Advanced),
            _ => None,
        }
    }
}

/// Lifecycle status. `Reviewed` is reserved: defined in the schema and
/// reachable via direct update, but never assigned by any flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "reviewed")]
    Reviewed,
    #[serde(rename = "completed")]
    Completed,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::InProgress => "in progress",
            TestStatus::Reviewed => "reviewed",
            TestStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in progress" => Some(TestStatus::InProgress),
            "reviewed" => Some(TestStatus::Reviewed),
            "completed" => Some(TestStatus::Completed),
            _ => None,
        }
    }
}

/// One questionnaire record, Simple or Advanced. The two kinds differ only
/// in the nesting depth of `answers`; all score fields are keyed by
/// human-readable criterion label.
///
/// Write-side invariant, never re-checked on read: `Completed` implies the
/// score fields are non-empty and `progress == 100`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: Uuid,
    pub owner: Uuid,
    pub kind: TestKind,
    pub answers: Value,
    pub scores: BTreeMap<String, u8>,
    pub feedback: BTreeMap<String, String>,
    pub recommendations: BTreeMap<String, String>,
    pub overall: String,
    pub progress: i32,
    pub status: TestStatus,
    pub created_at: DateTime<Utc>,
}

impl TestRecord {
    pub fn new(owner: Uuid, kind: TestKind, answers: Value) -> Self {
        let progress = calculate_progress(&answers);
        TestRecord {
            id: Uuid::new_v4(),
            owner,
            kind,
            answers,
            scores: BTreeMap::new(),
            feedback: BTreeMap::new(),
            recommendations: BTreeMap::new(),
            overall: String::new(),
            progress,
            status: TestStatus::InProgress,
            created_at: Utc::now(),
        }
    }

    pub fn is_scored(&self) -> bool {
        !self.scores.is_empty()
    }

    /// Fills the score fields from a successful evaluation. Does not flip
    /// status; completion is a separate step so it stays resumable.
    pub fn apply_evaluation(&mut self, result: EvaluationResult) {
        self.scores = result.scores;
        self.feedback = result.feedback;
        self.recommendations = result.recommendations;
        self.overall = result.overall;
    }

    /// Finalizes the record. Callers must only invoke this once the score
    /// fields are populated, to keep the completion invariant intact.
    pub fn mark_completed(&mut self) {
        self.status = TestStatus::Completed;
        self.progress = 100;
    }

    /// Overwrites the answers and recomputes progress; a saved draft always
    /// drops back to `in progress`.
    pub fn save_answers(&mut self, answers: Value) {
        self.progress = calculate_progress(&answers);
        self.answers = answers;
        self.status = TestStatus::InProgress;
    }
}

/// Month bucket for the admin analytics view, keyed `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentKind {
    // Historic wire spelling, kept for client compatibility.
    #[serde(rename = "assignement")]
    Assignement,
    #[serde(rename = "template")]
    Template,
}

impl AssignmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Assignement => "assignement",
            AssignmentKind::Template => "template",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "assignement" => Some(AssignmentKind::Assignement),
            "template" => Some(AssignmentKind::Template),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "finished")]
    Finished,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::InProgress => "in progress",
            AssignmentStatus::Finished => "finished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in progress" => Some(AssignmentStatus::InProgress),
            "finished" => Some(AssignmentStatus::Finished),
            _ => None,
        }
    }
}

/// Client assignment or reusable template. Plain CRUD entity; a template is
/// copied into a fresh assignment instance on "assign".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub name: String,
    pub kind: AssignmentKind,
    pub status: AssignmentStatus,
    pub client: Option<Uuid>,
    pub resources: Value,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(name: String, kind: AssignmentKind, client: Option<Uuid>, resources: Value) -> Self {
        Assignment {
            id: Uuid::new_v4(),
            name,
            kind,
            status: AssignmentStatus::InProgress,
            client,
            resources,
            created_at: Utc::now(),
        }
    }

    /// Copies this template into a new assignment instance for a client.
    pub fn instantiate_for(&self, client: Uuid) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            kind: AssignmentKind::Assignement,
            status: AssignmentStatus::InProgress,
            client: Some(client),
            resources: self.resources.clone(),
            created_at: Utc::now(),
        }
    }
}
