use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use log::{error, info};
use serde_json::Value;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use super::models::*;
use super::{DatabaseError, RecordStore, Result};
use crate::config::DatabaseConfig;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS test_records (
    id              UUID PRIMARY KEY,
    owner           UUID NOT NULL,
    kind            TEXT NOT NULL,
    answers         JSONB NOT NULL,
    scores          JSONB NOT NULL DEFAULT '{}'::jsonb,
    feedback        JSONB NOT NULL DEFAULT '{}'::jsonb,
    recommendations JSONB NOT NULL DEFAULT '{}'::jsonb,
    overall         TEXT NOT NULL DEFAULT '',
    progress        INTEGER NOT NULL DEFAULT 0,
    status          TEXT NOT NULL DEFAULT 'in progress',
    created_at      TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_test_records_owner ON test_records (owner);

CREATE TABLE IF NOT EXISTS assignments (
    id         UUID PRIMARY KEY,
    name       TEXT NOT NULL,
    kind       TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'in progress',
    client     UUID,
    resources  JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at TIMESTAMPTZ NOT NULL
);
"#;

const TEST_RECORD_COLUMNS: &str =
    "id, owner, kind, answers, scores, feedback, recommendations, overall, progress, status, created_at";

#[derive(Debug)]
pub struct DatabaseManager {
    pool: Pool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to database: {}@{}:{}/{}",
            config.user, config.host, config.port, config.dbname
        );

        let mut cfg = PoolConfig::new();
        cfg.url = Some(config.url());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Pool creation failed: {}", e)))?;

        // Test connection
        let _client = pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        info!("Database connection established successfully");

        Ok(DatabaseManager { pool })
    }

    pub async fn initialize_schema(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Schema setup failed: {}", e)))?;

        info!("Database schema is in place");
        Ok(())
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
    }

    pub async fn insert_assignment(&self, assignment: &Assignment) -> Result<()> {
        let client = self.client().await?;
        client
            .execute(
                r#"
                INSERT INTO assignments (id, name, kind, status, client, resources, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
                &[
                    &assignment.id,
                    &assignment.name,
                    &assignment.kind.as_str(),
                    &assignment.status.as_str(),
                    &assignment.client,
                    &assignment.resources,
                    &assignment.created_at,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert assignment {}: {}", assignment.id, e);
                DatabaseError::QueryFailed(format!("Failed to insert assignment: {}", e))
            })?;
        Ok(())
    }

    pub async fn fetch_assignment(&self, id: Uuid) -> Result<Option<Assignment>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, name, kind, status, client, resources, created_at \
                 FROM assignments WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(|r| row_to_assignment(&r)).transpose()
    }

    pub async fn list_assignments(&self, kind: Option<AssignmentKind>) -> Result<Vec<Assignment>> {
        let client = self.client().await?;
        let rows = match kind {
            Some(kind) => {
                client
                    .query(
                        "SELECT id, name, kind, status, client, resources, created_at \
                         FROM assignments WHERE kind = $1 ORDER BY created_at DESC",
                        &[&kind.as_str()],
                    )
                    .await
            }
            None => {
                client
                    .query(
                        "SELECT id, name, kind, status, client, resources, created_at \
                         FROM assignments ORDER BY created_at DESC",
                        &[],
                    )
                    .await
            }
        }
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_assignment).collect()
    }

    pub async fn update_assignment(&self, assignment: &Assignment) -> Result<()> {
        let client = self.client().await?;
        let rows_affected = client
            .execute(
                r#"
                UPDATE assignments
                SET name = $2, kind = $3, status = $4, client = $5, resources = $6
                WHERE id = $1
                "#,
                &[
                    &assignment.id,
                    &assignment.name,
                    &assignment.kind.as_str(),
                    &assignment.status.as_str(),
                    &assignment.client,
                    &assignment.resources,
                ],
            )
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::AssignmentNotFound(assignment.id.to_string()));
        }
        Ok(())
    }

    pub async fn delete_assignment(&self, id: Uuid) -> Result<bool> {
        let client = self.client().await?;
        let rows_affected = client
            .execute("DELETE FROM assignments WHERE id = $1", &[&id])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(rows_affected > 0)
    }
}

#[async_trait]
impl RecordStore for DatabaseManager {
    async fn insert(&self, record: &TestRecord) -> Result<()> {
        let client = self.client().await?;
        let sql = format!(
            "INSERT INTO test_records ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            TEST_RECORD_COLUMNS
        );
        client
            .execute(
                sql.as_str(),
                &[
                    &record.id,
                    &record.owner,
                    &record.kind.as_str(),
                    &record.answers,
                    &map_to_json(&record.scores)?,
                    &map_to_json(&record.feedback)?,
                    &map_to_json(&record.recommendations)?,
                    &record.overall,
                    &record.progress,
                    &record.status.as_str(),
                    &record.created_at,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert test record {}: {}", record.id, e);
                DatabaseError::QueryFailed(format!("Failed to insert test record: {}", e))
            })?;
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<TestRecord>> {
        let client = self.client().await?;
        let sql = format!("SELECT {} FROM test_records WHERE id = $1", TEST_RECORD_COLUMNS);
        let row = client
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(|r| row_to_test_record(&r)).transpose()
    }

    async fn fetch_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<TestRecord>> {
        let client = self.client().await?;
        let sql = format!(
            "SELECT {} FROM test_records WHERE id = $1 AND owner = $2",
            TEST_RECORD_COLUMNS
        );
        let row = client
            .query_opt(sql.as_str(), &[&id, &owner])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(|r| row_to_test_record(&r)).transpose()
    }

    async fn update(&self, record: &TestRecord) -> Result<()> {
        let client = self.client().await?;
        let rows_affected = client
            .execute(
                r#"
                UPDATE test_records
                SET answers = $2, scores = $3, feedback = $4, recommendations = $5,
                    overall = $6, progress = $7, status = $8
                WHERE id = $1
                "#,
                &[
                    &record.id,
                    &record.answers,
                    &map_to_json(&record.scores)?,
                    &map_to_json(&record.feedback)?,
                    &map_to_json(&record.recommendations)?,
                    &record.overall,
                    &record.progress,
                    &record.status.as_str(),
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to update test record {}: {}", record.id, e);
                DatabaseError::QueryFailed(format!("Failed to update test record: {}", e))
            })?;

        if rows_affected == 0 {
            return Err(DatabaseError::RecordNotFound(record.id.to_string()));
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner: Uuid, kind: TestKind) -> Result<Vec<TestRecord>> {
        let client = self.client().await?;
        let sql = format!(
            "SELECT {} FROM test_records WHERE owner = $1 AND kind = $2 \
             ORDER BY created_at DESC",
            TEST_RECORD_COLUMNS
        );
        let rows = client
            .query(sql.as_str(), &[&owner, &kind.as_str()])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_test_record).collect()
    }

    async fn list_all(&self, kind: TestKind) -> Result<Vec<TestRecord>> {
        let client = self.client().await?;
        let sql = format!(
            "SELECT {} FROM test_records WHERE kind = $1 ORDER BY created_at DESC",
            TEST_RECORD_COLUMNS
        );
        let rows = client
            .query(sql.as_str(), &[&kind.as_str()])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_test_record).collect()
    }

    async fn count_by_month(&self, kind: TestKind) -> Result<Vec<MonthlyCount>> {
        let client = self.client().await?;
        let rows = client
            .query(
                r#"
                SELECT to_char(created_at, 'YYYY-MM') AS month, COUNT(*) AS count
                FROM test_records
                WHERE kind = $1
                GROUP BY month
                ORDER BY month
                "#,
                &[&kind.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| MonthlyCount {
                month: row.get(0),
                count: row.get(1),
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let client = self.client().await?;
        let rows_affected = client
            .execute("DELETE FROM test_records WHERE id = $1", &[&id])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(rows_affected > 0)
    }
}

fn map_to_json<T: serde::Serialize>(map: &T) -> Result<Value> {
    serde_json::to_value(map).map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

fn row_to_test_record(row: &Row) -> Result<TestRecord> {
    let kind: String = row.get(2);
    let status: String = row.get(9);

    Ok(TestRecord {
        id: row.get(0),
        owner: row.get(1),
        kind: TestKind::from_str(&kind)
            .ok_or_else(|| DatabaseError::QueryFailed(format!("unknown test kind '{}'", kind)))?,
        answers: row.get(3),
        scores: json_to_map(row.get(4))?,
        feedback: json_to_map(row.get(5))?,
        recommendations: json_to_map(row.get(6))?,
        overall: row.get(7),
        progress: row.get(8),
        status: TestStatus::from_str(&status)
            .ok_or_else(|| DatabaseError::QueryFailed(format!("unknown status '{}'", status)))?,
        created_at: row.get(10),
    })
}

fn json_to_map<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

fn row_to_assignment(row: &Row) -> Result<Assignment> {
    let kind: String = row.get(2);
    let status: String = row.get(3);

    Ok(Assignment {
        id: row.get(0),
        name: row.get(1),
        kind: AssignmentKind::from_str(&kind).ok_or_else(|| {
            DatabaseError::QueryFailed(format!("unknown assignment kind '{}'", kind))
        })?,
        status: AssignmentStatus::from_str(&status).ok_or_else(|| {
            DatabaseError::QueryFailed(format!("unknown assignment status '{}'", status))
        })?,
        client: row.get(4),
        resources: row.get(5),
        created_at: row.get(6),
    })
}
