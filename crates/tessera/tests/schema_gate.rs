//! Schema enforcement across the document lifecycle.

use serde_json::json;
use tessera::store::MemoryStore;
use tessera::{
    DocumentStore, Error, FieldKind, FieldRule, Identity, SchemaShape, Session, UpdateRequest,
};

fn docs() -> DocumentStore<MemoryStore> {
    DocumentStore::new(MemoryStore::new())
}

fn person_shape() -> SchemaShape {
    SchemaShape::builder()
        .required_field("name", FieldRule::of(FieldKind::String).max_length(150))
        .build()
}

#[tokio::test]
async fn schema_gates_creation() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    let schema_id = docs.create_schema(&session, &person_shape()).await.unwrap();

    // Conforming content is accepted
    let stream_id = docs
        .create_document(&session, json!({ "name": "Alice" }), Some(schema_id))
        .await
        .unwrap();
    let doc = docs.load_document(&stream_id).await.unwrap();
    assert_eq!(doc.schema_id, Some(schema_id));

    // Missing required field is rejected, nothing persisted
    let before = docs.list_streams(None).await.unwrap().len();
    let err = docs
        .create_document(&session, json!({ "age": 30 }), Some(schema_id))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaViolation(_)));
    assert_eq!(docs.list_streams(None).await.unwrap().len(), before);
}

#[tokio::test]
async fn schema_gates_every_update() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    let schema_id = docs.create_schema(&session, &person_shape()).await.unwrap();
    let stream_id = docs
        .create_document(&session, json!({ "name": "Alice" }), Some(schema_id))
        .await
        .unwrap();

    // Conforming update passes
    docs.update(
        &session,
        &stream_id,
        UpdateRequest::Replace(json!({ "name": "Bob" })),
    )
    .await
    .unwrap();

    // Nonconforming replacement is rejected
    let err = docs
        .update(
            &session,
            &stream_id,
            UpdateRequest::Replace(json!({ "nickname": "B" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaViolation(_)));

    // Merge that breaks the shape is rejected too
    let err = docs
        .update(
            &session,
            &stream_id,
            UpdateRequest::Merge(json!({ "name": 42 })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaViolation(_)));

    // History is unchanged by the rejections
    let doc = docs.load_document(&stream_id).await.unwrap();
    assert_eq!(doc.content, json!({ "name": "Bob" }));
    assert_eq!(doc.seq, 2);
}

#[tokio::test]
async fn schema_violation_reports_all_fields() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    let shape = SchemaShape::builder()
        .required_field("name", FieldRule::of(FieldKind::String))
        .required_field("age", FieldRule::of(FieldKind::Integer))
        .build();
    let schema_id = docs.create_schema(&session, &shape).await.unwrap();

    let err = docs
        .create_document(&session, json!({ "age": "thirty" }), Some(schema_id))
        .await
        .unwrap_err();

    match err {
        Error::SchemaViolation(schema_err) => {
            // Missing "name" and mistyped "age"
            assert_eq!(schema_err.violations().len(), 2);
        }
        other => panic!("expected SchemaViolation, got {:?}", other),
    }
}

#[tokio::test]
async fn string_length_bound_enforced() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    let schema_id = docs.create_schema(&session, &person_shape()).await.unwrap();

    let long_name = "x".repeat(151);
    let err = docs
        .create_document(&session, json!({ "name": long_name }), Some(schema_id))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaViolation(_)));

    let ok_name = "x".repeat(150);
    docs.create_document(&session, json!({ "name": ok_name }), Some(schema_id))
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_schema_reference_is_not_found() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    let bogus = tessera::CommitId::from_bytes([0xee; 32]);
    let err = docs
        .create_document(&session, json!({ "name": "Alice" }), Some(bogus))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn non_shape_schema_reference_is_invalid_input() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    // An ordinary document is not a schema shape
    let stream_id = docs
        .create_document(&session, json!({ "just": "data" }), None)
        .await
        .unwrap();
    let not_a_shape = docs.load_document(&stream_id).await.unwrap().commit_id;

    let err = docs
        .create_document(&session, json!({ "name": "Alice" }), Some(not_a_shape))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn ownership_checked_before_schema() {
    let docs = docs();
    let alice = Session::authenticated(Identity::generate());
    let bob = Session::authenticated(Identity::generate());

    let schema_id = docs.create_schema(&alice, &person_shape()).await.unwrap();
    let stream_id = docs
        .create_document(&alice, json!({ "name": "Alice" }), Some(schema_id))
        .await
        .unwrap();

    // Bob's update violates BOTH ownership and schema; ownership wins
    let err = docs
        .update(&bob, &stream_id, UpdateRequest::Replace(json!({ "bad": 1 })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OwnershipViolation { .. }));
}

#[tokio::test]
async fn schema_shape_survives_storage() {
    let docs = docs();
    let session = Session::authenticated(Identity::generate());

    let shape = SchemaShape::builder()
        .required_field(
            "code",
            FieldRule::of(FieldKind::String).min_length(2).max_length(8),
        )
        .field("tags", FieldRule::of(FieldKind::Array))
        .deny_unknown()
        .build();
    let schema_id = docs.create_schema(&session, &shape).await.unwrap();

    // The published shape round-trips through document content
    let stored = docs.load_commit(&schema_id).await.unwrap();
    let recovered: SchemaShape = serde_json::from_value(stored.content).unwrap();
    assert_eq!(recovered, shape);

    // deny_unknown is enforced from the stored copy
    let err = docs
        .create_document(
            &session,
            json!({ "code": "ok", "extra": true }),
            Some(schema_id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaViolation(_)));
}
