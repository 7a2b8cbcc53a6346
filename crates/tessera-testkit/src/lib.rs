//! # Tessera Testkit
//!
//! Testing utilities for the Tessera document store.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Helper structs for setting up commit chains and identities
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use tessera_testkit::fixtures::TestFixture;
//! use serde_json::json;
//!
//! let fixture = TestFixture::new();
//! let genesis = fixture.make_genesis([0x11; 32], &json!({ "title": "hello" }));
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tessera_testkit::generators::{commit_from_params, CommitParams};
//!
//! proptest! {
//!     #[test]
//!     fn commit_id_is_deterministic(params: CommitParams) {
//!         let c1 = commit_from_params(&params);
//!         let c2 = commit_from_params(&params);
//!         prop_assert_eq!(c1.compute_id(), c2.compute_id());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{commit_from_params, CommitParams};
