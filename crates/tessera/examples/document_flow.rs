//! Full document lifecycle walkthrough.
//!
//! Run with: cargo run --example document_flow

use anyhow::Result;
use serde_json::json;
use tessera::store::MemoryStore;
use tessera::{
    resolve, DocumentStore, Error, FieldKind, FieldRule, Identity, SchemaShape, Seed, Session,
    UpdateRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let docs = DocumentStore::new(MemoryStore::new());

    // ── 1. Deterministic identities ─────────────────────────────────────────
    let seed = Seed::from_bytes([0x42; 32]);
    let alice = Session::from_seed(&seed);
    let alice_handle = alice.handle().expect("authenticated").to_string();
    println!("alice: {}", alice_handle);

    // The handle is self-certifying: resolution recovers the key offline
    let descriptor = resolve(&alice_handle)?;
    println!(
        "resolved verification method: {}",
        descriptor.verification_method.method_type
    );

    // ── 2. Create and read a document ───────────────────────────────────────
    let stream_id = docs
        .create_document(&alice, json!({ "test": "123" }), None)
        .await?;
    println!("created stream {}", stream_id);

    let doc = docs.load_document(&stream_id).await?;
    println!("v{}: {}", doc.seq, doc.content);

    // ── 3. Update: the stream id follows, old commit ids stay pinned ────────
    let v1 = doc.commit_id;
    docs.update(
        &alice,
        &stream_id,
        UpdateRequest::Merge(json!({ "updated": true })),
    )
    .await?;

    let latest = docs.load_document(&stream_id).await?;
    let pinned = docs.load_commit(&v1).await?;
    println!("latest v{}: {}", latest.seq, latest.content);
    println!("pinned v{}: {}", pinned.seq, pinned.content);

    // ── 4. Only the owner may mutate ────────────────────────────────────────
    let mallory = Session::authenticated(Identity::generate());
    match docs
        .update(
            &mallory,
            &stream_id,
            UpdateRequest::Replace(json!({ "hijacked": true })),
        )
        .await
    {
        Err(Error::OwnershipViolation { owner, signer }) => {
            println!("rejected: {} tried to write {}'s document", signer, owner);
        }
        other => anyhow::bail!("expected ownership violation, got {:?}", other),
    }

    // ── 5. Schema-gated documents ───────────────────────────────────────────
    let shape = SchemaShape::builder()
        .required_field("name", FieldRule::of(FieldKind::String).max_length(150))
        .build();
    let schema_id = docs.create_schema(&alice, &shape).await?;

    let person = docs
        .create_document(&alice, json!({ "name": "Alice" }), Some(schema_id))
        .await?;
    println!("schema-gated document {} created", person);

    match docs
        .update(
            &alice,
            &person,
            UpdateRequest::Replace(json!({ "nickname": "Al" })),
        )
        .await
    {
        Err(Error::SchemaViolation(e)) => {
            for violation in e.violations() {
                println!("rejected: {}", violation);
            }
        }
        other => anyhow::bail!("expected schema violation, got {:?}", other),
    }

    // ── 6. History ──────────────────────────────────────────────────────────
    let log = docs.document_log(&stream_id).await?;
    println!("history of {}: {} commits", stream_id, log.len());
    for (i, id) in log.iter().enumerate() {
        println!("  seq {} -> {}", i + 1, id);
    }

    Ok(())
}
