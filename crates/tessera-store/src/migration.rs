//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system. Each migration is a SQL batch that
//! transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            tracing::info!(version, "applied schema migration");

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Commits: the append-only document history
        CREATE TABLE commits (
            commit_id BLOB PRIMARY KEY,       -- 32 bytes, Blake3 of canonical bytes
            stream_id BLOB NOT NULL,          -- 32 bytes
            seq INTEGER NOT NULL,             -- sequence number within stream
            version INTEGER NOT NULL,         -- commit schema version
            author BLOB NOT NULL,             -- 32 bytes, Ed25519 public key
            timestamp INTEGER NOT NULL,       -- author-claimed timestamp (Unix ms)
            kind INTEGER NOT NULL,            -- CommitKind as u16
            prev_commit_id BLOB,              -- 32 bytes, NULL for genesis
            schema_id BLOB,                   -- 32 bytes, genesis only, optional
            nonce BLOB,                       -- 32 bytes, genesis only
            payload_hash BLOB NOT NULL,       -- 32 bytes, Blake3 of payload
            payload BLOB NOT NULL,            -- canonical content bytes
            signature BLOB NOT NULL,          -- 64 bytes, Ed25519 signature
            canonical_bytes BLOB NOT NULL,    -- cached canonical encoding
            ingested_at INTEGER NOT NULL,     -- local timestamp of insertion

            UNIQUE(stream_id, seq)
        );

        -- Stream state: owner, schema reference, and head position
        CREATE TABLE streams (
            stream_id BLOB PRIMARY KEY,
            owner BLOB NOT NULL,
            schema_id BLOB,
            genesis_id BLOB NOT NULL,
            head_seq INTEGER NOT NULL,
            head_commit_id BLOB NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Indexes for common queries
        CREATE INDEX idx_commits_stream_seq ON commits(stream_id, seq);
        CREATE INDEX idx_commits_author ON commits(author);
        CREATE INDEX idx_streams_owner ON streams(owner);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
