//! Tests for the history database (in-memory).

use super::open_memory;
use super::HistoryDb;
use crate::naming::NamingParameters;
use crate::orchestrator::{DownloadOutcome, JobRecord};
use crate::store::WriteId;

fn record(ordinal: usize, outcome: DownloadOutcome, write_id: Option<u64>) -> JobRecord {
    JobRecord {
        ordinal,
        reference: format!("https://img.example/{ordinal}.png"),
        target_path: format!("set/p-{ordinal}.png"),
        write_id: write_id.map(WriteId),
        outcome,
        error: None,
    }
}

#[tokio::test]
async fn batch_counts_by_outcome() {
    let db = open_memory().await.unwrap();
    let id = db
        .begin_batch(&NamingParameters::new("p", "set"), 4)
        .await
        .unwrap();
    db.record_job(id, &record(1, DownloadOutcome::Complete, Some(1))).await.unwrap();
    db.record_job(id, &record(2, DownloadOutcome::Interrupted, None)).await.unwrap();
    db.record_job(id, &record(3, DownloadOutcome::Timeout, Some(2))).await.unwrap();

    let batches = db.recent_batches(5).await.unwrap();
    assert_eq!(batches.len(), 1);
    let b = &batches[0];
    assert_eq!((b.complete, b.interrupted, b.timeout), (1, 1, 1));
    assert_eq!(b.requested, 4);
    assert_eq!(b.recorded(), 3);
    assert!(b.finished_at.is_none());

    db.finish_batch(id).await.unwrap();
    assert!(db.recent_batches(5).await.unwrap()[0].finished_at.is_some());
}

#[tokio::test]
async fn jobs_listed_in_ordinal_order() {
    let db = open_memory().await.unwrap();
    let id = db.begin_batch(&NamingParameters::new("p", ""), 2).await.unwrap();
    db.record_job(id, &record(2, DownloadOutcome::Complete, Some(9))).await.unwrap();
    db.record_job(id, &record(1, DownloadOutcome::Interrupted, None)).await.unwrap();

    let jobs = db.batch_jobs(id).await.unwrap();
    assert_eq!(jobs.iter().map(|j| j.ordinal).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(jobs[0].write_id, None);
    assert_eq!(jobs[1].write_id, Some(9));
    assert_eq!(jobs[1].outcome, DownloadOutcome::Complete);
    assert_eq!(jobs[1].reference, "https://img.example/2.png");
}

#[tokio::test]
async fn empty_batch_has_zero_counts_and_limit_applies() {
    let db = open_memory().await.unwrap();
    for n in 0..3 {
        db.begin_batch(&NamingParameters::new(format!("b{n}"), ""), 0)
            .await
            .unwrap();
    }
    let batches = db.recent_batches(2).await.unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].base_name, "b2");
    assert_eq!(batches[0].recorded(), 0);
}

#[tokio::test]
async fn open_at_creates_file_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested dir").join("history.db");
    {
        let db = HistoryDb::open_at(&path).await.unwrap();
        db.begin_batch(&NamingParameters::new("a", ""), 1).await.unwrap();
    }
    assert!(path.exists());
    let db = HistoryDb::open_at(&path).await.unwrap();
    assert_eq!(db.recent_batches(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_stored_outcome_is_an_error() {
    let db = open_memory().await.unwrap();
    let id = db.begin_batch(&NamingParameters::new("p", ""), 1).await.unwrap();
    sqlx::query(
        "INSERT INTO jobs (batch_id, ordinal, reference, target_path, outcome, recorded_at)
         VALUES (?1, 1, 'https://x/1.png', 'p-1.png', 'paused', 0)",
    )
    .bind(id)
    .execute(&db.pool)
    .await
    .unwrap();
    let err = db.batch_jobs(id).await.unwrap_err();
    assert!(err.to_string().contains("unknown download outcome"));
}
