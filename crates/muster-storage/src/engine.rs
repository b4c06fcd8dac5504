//! StorageEngine: owns the ConnectionPool and exposes the pending mutation
//! queue and the local mirror as async operations.

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;

use muster_core::config::StorageConfig;
use muster_core::errors::MusterResult;
use muster_core::models::{
    AttendanceMark, EntityType, GroupSnapshot, Meeting, Member, MirrorRecord, MutationAction,
    PendingMutation,
};

use crate::pool::ConnectionPool;
use crate::queries::{mirror_ops, queue_ops};

/// The local store handle. Opened once at engine start, closed on drop.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk with default settings.
    pub fn open(path: &Path) -> MusterResult<Self> {
        let config = StorageConfig {
            db_path: path.display().to_string(),
            ..StorageConfig::default()
        };
        Self::open_with_config(&config)
    }

    /// Open the database named by `config.db_path`.
    pub fn open_with_config(config: &StorageConfig) -> MusterResult<Self> {
        let pool = ConnectionPool::open(Path::new(&config.db_path), config)?;
        tracing::debug!(db_path = %config.db_path, "storage opened");
        Ok(Self { pool })
    }

    /// Open an in-memory storage engine (for testing).
    /// All reads go through the writer.
    pub fn open_in_memory() -> MusterResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    /// File-backed: uses the read pool. In-memory: uses the writer.
    async fn with_reader<F, T>(&self, f: F) -> MusterResult<T>
    where
        F: FnOnce(&Connection) -> MusterResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f).await,
        }
    }

    // --- Pending mutation queue ---

    /// Durably append a write intent and return its `local_seq`.
    pub async fn enqueue(
        &self,
        entity_type: EntityType,
        action: MutationAction,
        payload: &serde_json::Value,
    ) -> MusterResult<i64> {
        let now = Utc::now();
        let local_seq = self
            .pool
            .writer
            .with_conn(|conn| queue_ops::enqueue(conn, entity_type, action, payload, now))
            .await?;
        tracing::debug!(local_seq, %entity_type, %action, "mutation enqueued");
        Ok(local_seq)
    }

    /// Every pending mutation in FIFO order. Read-only.
    ///
    /// Served by the writer so a pass always sees its own removals.
    pub async fn drain(&self) -> MusterResult<Vec<PendingMutation>> {
        self.pool.writer.with_conn(queue_ops::drain).await
    }

    pub async fn get(&self, local_seq: i64) -> MusterResult<Option<PendingMutation>> {
        self.pool
            .writer
            .with_conn(|conn| queue_ops::get(conn, local_seq))
            .await
    }

    /// Remove one mutation. Absent ids are a no-op and return `false`.
    pub async fn remove(&self, local_seq: i64) -> MusterResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| queue_ops::remove(conn, local_seq))
            .await
    }

    /// Record a failed replay attempt on a mutation that stays queued.
    pub async fn record_failure(&self, local_seq: i64, error: &str) -> MusterResult<bool> {
        let now = Utc::now();
        self.pool
            .writer
            .with_conn(|conn| queue_ops::record_failure(conn, local_seq, error, now))
            .await
    }

    /// Current queue depth.
    pub async fn count(&self) -> MusterResult<usize> {
        self.pool.writer.with_conn(queue_ops::count).await
    }

    /// Manually discard every pending mutation.
    pub async fn clear(&self) -> MusterResult<usize> {
        let removed = self.pool.writer.with_conn(queue_ops::clear).await?;
        tracing::warn!(removed, "pending mutation queue cleared");
        Ok(removed)
    }

    // --- Local mirror ---

    /// Rebuild the mirror rows of one group from a server snapshot.
    pub async fn replace_group_snapshot(&self, snapshot: &GroupSnapshot) -> MusterResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| mirror_ops::replace_group_snapshot(conn, snapshot))
            .await
    }

    pub async fn mirror_members(&self, group_id: &str) -> MusterResult<Vec<MirrorRecord<Member>>> {
        self.with_reader(|conn| mirror_ops::members(conn, group_id))
            .await
    }

    pub async fn mirror_member(&self, id: &str) -> MusterResult<Option<MirrorRecord<Member>>> {
        self.with_reader(|conn| mirror_ops::member(conn, id)).await
    }

    pub async fn mirror_meetings(
        &self,
        group_id: &str,
    ) -> MusterResult<Vec<MirrorRecord<Meeting>>> {
        self.with_reader(|conn| mirror_ops::meetings(conn, group_id))
            .await
    }

    pub async fn mirror_attendance(
        &self,
        meeting_id: &str,
    ) -> MusterResult<Vec<MirrorRecord<AttendanceMark>>> {
        self.with_reader(|conn| mirror_ops::attendance(conn, meeting_id))
            .await
    }
}
