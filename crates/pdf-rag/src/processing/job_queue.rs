//! Durable ingestion queue backed by SQLite
//!
//! The server only produces jobs. An out-of-process worker picks up `waiting`
//! rows, parses and embeds the PDF, and writes the chunks into Qdrant.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Job name used for freshly uploaded PDFs
pub const FILE_READY_JOB: &str = "file-ready";

/// Payload of a `file-ready` job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReadyPayload {
    /// Saved filename (unique-suffixed)
    pub filename: String,
    /// Upload directory
    pub destination: String,
    /// Full path on disk
    pub path: String,
}

/// Job status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobStatus {
    fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Waiting => "waiting",
            JobStatus::Active => "active",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "active" => JobStatus::Active,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Waiting,
        }
    }
}

/// A queued job as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: Uuid,
    pub queue: String,
    pub name: String,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

/// Producer side of the named ingestion queue
pub struct IngestionQueue {
    name: String,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl IngestionQueue {
    /// Create or open the queue database at the given path
    pub fn open<P: AsRef<Path>>(path: P, name: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Queue(format!("Failed to open queue database: {}", e)))?;
        Self::with_connection(conn, name.into())
    }

    /// Create an in-memory queue (tests and local experiments)
    pub fn in_memory(name: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Queue(format!("Failed to open in-memory queue: {}", e)))?;
        Self::with_connection(conn, name.into())
    }

    fn with_connection(conn: Connection, name: String) -> Result<Self> {
        let queue = Self {
            name,
            conn: Arc::new(Mutex::new(Some(conn))),
        };
        queue.migrate()?;
        Ok(queue)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                r#"
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;

                CREATE TABLE IF NOT EXISTS queue_jobs (
                    id TEXT PRIMARY KEY,
                    queue TEXT NOT NULL,
                    name TEXT NOT NULL,
                    payload TEXT NOT NULL,
                    status TEXT NOT NULL,
                    attempts INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_queue_jobs_status ON queue_jobs(queue, status);
                "#,
            )?;
            Ok(())
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| Error::Queue(format!("Queue '{}' is closed", self.name)))?;
        f(conn)
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a job; returns its id
    pub fn add<T: Serialize>(&self, job_name: &str, payload: &T) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_string(payload)?;
        let now = Utc::now();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO queue_jobs (id, queue, name, payload, status, attempts, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
                params![id.to_string(), self.name, job_name, payload, JobStatus::Waiting.as_str(), now],
            )?;
            Ok(())
        })?;

        tracing::info!("Enqueued job {} ({}) on '{}'", id, job_name, self.name);
        Ok(id)
    }

    /// Jobs still waiting for a worker, oldest first
    pub fn waiting(&self) -> Result<Vec<QueuedJob>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, queue, name, payload, status, attempts, created_at
                 FROM queue_jobs WHERE queue = ?1 AND status = ?2
                 ORDER BY created_at ASC, rowid ASC",
            )?;

            let rows = stmt.query_map(params![self.name, JobStatus::Waiting.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, DateTime<Utc>>(6)?,
                ))
            })?;

            let mut jobs = Vec::new();
            for row in rows {
                let (id, queue, name, payload, status, attempts, created_at) = row?;
                jobs.push(QueuedJob {
                    id: Uuid::parse_str(&id)
                        .map_err(|e| Error::Queue(format!("Corrupt job id {}: {}", id, e)))?,
                    queue,
                    name,
                    payload: serde_json::from_str(&payload)?,
                    status: JobStatus::parse(&status),
                    attempts,
                    created_at,
                });
            }
            Ok(jobs)
        })
    }

    /// Number of waiting jobs
    pub fn len(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM queue_jobs WHERE queue = ?1 AND status = ?2",
                params![self.name, JobStatus::Waiting.as_str()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    /// Whether no job is waiting
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Release the database handle; later calls fail with `Error::Queue`
    pub fn close(&self) {
        if self.conn.lock().take().is_some() {
            tracing::info!("Ingestion queue '{}' closed", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> FileReadyPayload {
        FileReadyPayload {
            filename: format!("1700000000000-42-{}", name),
            destination: "/srv/uploads".to_string(),
            path: format!("/srv/uploads/1700000000000-42-{}", name),
        }
    }

    #[test]
    fn test_add_and_list_waiting() {
        let queue = IngestionQueue::in_memory("file-upload-queue").unwrap();
        assert!(queue.is_empty().unwrap());

        let first = queue.add(FILE_READY_JOB, &payload("a.pdf")).unwrap();
        let second = queue.add(FILE_READY_JOB, &payload("b.pdf")).unwrap();

        let jobs = queue.waiting().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, first);
        assert_eq!(jobs[1].id, second);
        assert_eq!(jobs[0].name, "file-ready");
        assert_eq!(jobs[0].status, JobStatus::Waiting);

        let stored: FileReadyPayload = serde_json::from_value(jobs[0].payload.clone()).unwrap();
        assert_eq!(stored, payload("a.pdf"));
    }

    #[test]
    fn test_queues_are_isolated_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.db");

        let uploads = IngestionQueue::open(&path, "file-upload-queue").unwrap();
        let other = IngestionQueue::open(&path, "other-queue").unwrap();
        uploads.add(FILE_READY_JOB, &payload("a.pdf")).unwrap();

        assert_eq!(uploads.len().unwrap(), 1);
        assert_eq!(other.len().unwrap(), 0);
    }

    #[test]
    fn test_jobs_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("queue.db");

        {
            let queue = IngestionQueue::open(&path, "file-upload-queue").unwrap();
            queue.add(FILE_READY_JOB, &payload("a.pdf")).unwrap();
            queue.close();
        }

        let reopened = IngestionQueue::open(&path, "file-upload-queue").unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_closed_queue_rejects_jobs() {
        let queue = IngestionQueue::in_memory("file-upload-queue").unwrap();
        queue.close();
        let err = queue.add(FILE_READY_JOB, &payload("a.pdf")).unwrap_err();
        assert!(matches!(err, Error::Queue(_)));
    }

    #[test]
    fn test_created_at_is_stored_as_timestamp() {
        let queue = IngestionQueue::in_memory("file-upload-queue").unwrap();
        let before = Utc::now();
        queue.add(FILE_READY_JOB, &payload("a.pdf")).unwrap();
        let after = Utc::now();

        let created_at = queue.waiting().unwrap()[0].created_at;
        assert!(created_at >= before && created_at <= after);
    }
}
