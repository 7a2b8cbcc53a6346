//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use tessera_core::{
    Blake3Hash, Commit, CommitHeader, CommitId, CommitKind, Ed25519PublicKey, Ed25519Signature,
    StreamId, StreamState,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via an internal mutex. All operations run on the blocking
/// thread pool so they never stall the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

fn blob32(bytes: Vec<u8>, column: &str) -> rusqlite::Result<[u8; 32]> {
    bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, column.into(), rusqlite::types::Type::Blob)
    })
}

/// Convert a row (in the SELECT column order used below) to a Commit.
fn row_to_commit(row: &rusqlite::Row<'_>) -> rusqlite::Result<Commit> {
    let version: u8 = row.get("version")?;
    let author_bytes: Vec<u8> = row.get("author")?;
    let stream_id_bytes: Vec<u8> = row.get("stream_id")?;
    let seq: i64 = row.get("seq")?;
    let timestamp: i64 = row.get("timestamp")?;
    let kind_raw: u16 = row.get("kind")?;
    let prev_bytes: Option<Vec<u8>> = row.get("prev_commit_id")?;
    let schema_bytes: Option<Vec<u8>> = row.get("schema_id")?;
    let nonce_bytes: Option<Vec<u8>> = row.get("nonce")?;
    let payload_hash_bytes: Vec<u8> = row.get("payload_hash")?;
    let payload: Vec<u8> = row.get("payload")?;
    let signature_bytes: Vec<u8> = row.get("signature")?;

    let kind = CommitKind::from_u16(kind_raw).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(5, "kind".into(), rusqlite::types::Type::Integer)
    })?;

    let prev_commit_id = prev_bytes
        .map(|b| blob32(b, "prev_commit_id").map(CommitId::from_bytes))
        .transpose()?;
    let schema_id = schema_bytes
        .map(|b| blob32(b, "schema_id").map(CommitId::from_bytes))
        .transpose()?;
    let nonce = nonce_bytes.map(|b| blob32(b, "nonce")).transpose()?;

    let signature: [u8; 64] = signature_bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(11, "signature".into(), rusqlite::types::Type::Blob)
    })?;

    Ok(Commit {
        header: CommitHeader {
            version,
            author: Ed25519PublicKey(blob32(author_bytes, "author")?),
            stream_id: StreamId::from_bytes(blob32(stream_id_bytes, "stream_id")?),
            seq: seq as u64,
            timestamp,
            kind,
            prev_commit_id,
            schema_id,
            nonce,
            payload_hash: Blake3Hash(blob32(payload_hash_bytes, "payload_hash")?),
        },
        payload: Bytes::from(payload),
        signature: Ed25519Signature(signature),
    })
}

const COMMIT_COLUMNS: &str = "version, author, stream_id, seq, timestamp, kind, \
     prev_commit_id, schema_id, nonce, payload_hash, payload, signature";

#[async_trait]
impl Store for SqliteStore {
    async fn insert_commit(&self, commit: &Commit, canonical: &[u8]) -> Result<InsertResult> {
        let commit = commit.clone();
        let canonical = canonical.to_vec();

        self.blocking(move |conn| {
            let commit_id = commit.compute_id();
            let now = now_millis();

            let existing_by_id: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT commit_id FROM commits WHERE commit_id = ?1",
                    params![commit_id.0.as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            if existing_by_id.is_some() {
                return Ok(InsertResult::AlreadyExists);
            }

            let existing_at_pos: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT commit_id FROM commits WHERE stream_id = ?1 AND seq = ?2",
                    params![commit.stream_id().as_bytes().as_slice(), commit.seq() as i64],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_bytes) = existing_at_pos {
                let arr: [u8; 32] = existing_bytes
                    .try_into()
                    .map_err(|_| StoreError::InvalidData("bad commit_id length".into()))?;
                return Ok(InsertResult::Conflict {
                    existing: CommitId::from_bytes(arr),
                });
            }

            conn.execute(
                "INSERT INTO commits (
                    commit_id, stream_id, seq, version, author, timestamp, kind,
                    prev_commit_id, schema_id, nonce, payload_hash, payload,
                    signature, canonical_bytes, ingested_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    commit_id.0.as_slice(),
                    commit.stream_id().as_bytes().as_slice(),
                    commit.seq() as i64,
                    commit.header.version,
                    commit.author().0.as_slice(),
                    commit.header.timestamp,
                    commit.kind().to_u16() as i64,
                    commit.header.prev_commit_id.as_ref().map(|id| id.0.as_slice()),
                    commit.header.schema_id.as_ref().map(|id| id.0.as_slice()),
                    commit.header.nonce.as_ref().map(|n| n.as_slice()),
                    commit.header.payload_hash.0.as_slice(),
                    commit.payload.as_ref(),
                    commit.signature.0.as_slice(),
                    canonical.as_slice(),
                    now,
                ],
            )?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_commit(&self, id: &CommitId) -> Result<Option<Commit>> {
        let id = *id;
        self.blocking(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM commits WHERE commit_id = ?1",
                    COMMIT_COLUMNS
                ),
                params![id.0.as_slice()],
                row_to_commit,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_commit_ids(&self, stream_id: &StreamId) -> Result<Vec<(u64, CommitId)>> {
        let stream_id = *stream_id;
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT seq, commit_id FROM commits WHERE stream_id = ?1 ORDER BY seq",
            )?;

            let pairs = stmt
                .query_map(params![stream_id.as_bytes().as_slice()], |row| {
                    let seq: i64 = row.get(0)?;
                    let id_bytes: Vec<u8> = row.get(1)?;
                    Ok((seq as u64, blob32(id_bytes, "commit_id")?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(pairs
                .into_iter()
                .map(|(seq, arr)| (seq, CommitId::from_bytes(arr)))
                .collect())
        })
        .await
    }

    async fn has_commit(&self, id: &CommitId) -> Result<bool> {
        let id = *id;
        self.blocking(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM commits WHERE commit_id = ?1)",
                params![id.0.as_slice()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn get_stream_state(&self, stream_id: &StreamId) -> Result<Option<StreamState>> {
        let stream_id = *stream_id;
        self.blocking(move |conn| {
            let row: Option<(Vec<u8>, Option<Vec<u8>>, Vec<u8>, i64, Vec<u8>, i64, i64)> = conn
                .query_row(
                    "SELECT owner, schema_id, genesis_id, head_seq, head_commit_id,
                            created_at, updated_at
                     FROM streams WHERE stream_id = ?1",
                    params![stream_id.as_bytes().as_slice()],
                    |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                            row.get(6)?,
                        ))
                    },
                )
                .optional()?;

            let Some((owner, schema_id, genesis_id, head_seq, head_commit_id, created_at, updated_at)) =
                row
            else {
                return Ok(None);
            };

            let to_arr = |b: Vec<u8>, what: &str| -> Result<[u8; 32]> {
                b.try_into()
                    .map_err(|_| StoreError::InvalidData(format!("bad {} length", what)))
            };

            Ok(Some(StreamState {
                stream_id,
                owner: Ed25519PublicKey(to_arr(owner, "owner")?),
                schema_id: schema_id
                    .map(|b| to_arr(b, "schema_id").map(CommitId::from_bytes))
                    .transpose()?,
                genesis_id: CommitId::from_bytes(to_arr(genesis_id, "genesis_id")?),
                head_seq: head_seq as u64,
                head_commit_id: CommitId::from_bytes(to_arr(head_commit_id, "head_commit_id")?),
                created_at,
                updated_at,
            }))
        })
        .await
    }

    async fn upsert_stream_state(&self, state: &StreamState) -> Result<()> {
        let state = state.clone();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO streams (
                    stream_id, owner, schema_id, genesis_id, head_seq,
                    head_commit_id, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(stream_id) DO UPDATE SET
                    head_seq = excluded.head_seq,
                    head_commit_id = excluded.head_commit_id,
                    updated_at = excluded.updated_at",
                params![
                    state.stream_id.as_bytes().as_slice(),
                    state.owner.0.as_slice(),
                    state.schema_id.as_ref().map(|id| id.0.as_slice()),
                    state.genesis_id.0.as_slice(),
                    state.head_seq as i64,
                    state.head_commit_id.0.as_slice(),
                    state.created_at,
                    state.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_streams(&self, owner: Option<&Ed25519PublicKey>) -> Result<Vec<StreamId>> {
        let owner = owner.copied();
        self.blocking(move |conn| {
            let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<[u8; 32]> {
                let bytes: Vec<u8> = row.get(0)?;
                blob32(bytes, "stream_id")
            };

            let ids = match owner {
                Some(owner) => {
                    let mut stmt =
                        conn.prepare("SELECT stream_id FROM streams WHERE owner = ?1")?;
                    let rows = stmt.query_map(params![owner.0.as_slice()], map_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare("SELECT stream_id FROM streams")?;
                    let rows = stmt.query_map([], map_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
            };

            Ok(ids.into_iter().map(StreamId::from_bytes).collect())
        })
        .await
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
