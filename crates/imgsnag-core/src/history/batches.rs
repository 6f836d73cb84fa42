//! Batch and job rows: record and list.

use anyhow::Result;
use sqlx::Row;

use super::db::{unix_timestamp, HistoryDb};
use super::types::{BatchId, BatchSummary, JobEntry};
use crate::naming::NamingParameters;
use crate::orchestrator::{DownloadOutcome, JobRecord};

impl HistoryDb {
    /// Insert a new batch and return its id. `params` should be sanitized.
    pub async fn begin_batch(&self, params: &NamingParameters, requested: usize) -> Result<BatchId> {
        let res = sqlx::query(
            r#"
            INSERT INTO batches (base_name, subfolder, requested, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&params.base_name)
        .bind(&params.subfolder)
        .bind(requested as i64)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    /// Store the outcome of one job.
    pub async fn record_job(&self, batch_id: BatchId, record: &JobRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO jobs
                (batch_id, ordinal, reference, target_path, write_id, outcome, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(batch_id)
        .bind(record.ordinal as i64)
        .bind(record.reference.as_str())
        .bind(&record.target_path)
        .bind(record.write_id.map(|id| id.0 as i64))
        .bind(record.outcome.as_str())
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn finish_batch(&self, batch_id: BatchId) -> Result<()> {
        sqlx::query("UPDATE batches SET finished_at = ?1 WHERE id = ?2")
            .bind(unix_timestamp())
            .bind(batch_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Most recent batches first, with per-outcome counts.
    pub async fn recent_batches(&self, limit: u32) -> Result<Vec<BatchSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.base_name, b.subfolder, b.requested, b.created_at, b.finished_at,
                   COALESCE(SUM(j.outcome = 'complete'), 0) AS complete,
                   COALESCE(SUM(j.outcome = 'interrupted'), 0) AS interrupted,
                   COALESCE(SUM(j.outcome = 'timeout'), 0) AS timeout
            FROM batches b
            LEFT JOIN jobs j ON j.batch_id = b.id
            GROUP BY b.id
            ORDER BY b.created_at DESC, b.id DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(BatchSummary {
                id: row.get("id"),
                base_name: row.get("base_name"),
                subfolder: row.get("subfolder"),
                requested: row.get("requested"),
                created_at: row.get("created_at"),
                finished_at: row.get("finished_at"),
                complete: row.get("complete"),
                interrupted: row.get("interrupted"),
                timeout: row.get("timeout"),
            });
        }
        Ok(out)
    }

    /// Jobs of one batch in ordinal order.
    pub async fn batch_jobs(&self, batch_id: BatchId) -> Result<Vec<JobEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT ordinal, reference, target_path, write_id, outcome, recorded_at
            FROM jobs
            WHERE batch_id = ?1
            ORDER BY ordinal
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let outcome: String = row.get("outcome");
            out.push(JobEntry {
                ordinal: row.get("ordinal"),
                reference: row.get("reference"),
                target_path: row.get("target_path"),
                write_id: row.get("write_id"),
                outcome: outcome.parse::<DownloadOutcome>()?,
                recorded_at: row.get("recorded_at"),
            });
        }
        Ok(out)
    }
}
