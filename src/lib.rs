#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # UBL Core
//!
//! > **Schema-driven business documents and conditional business actions.**
//!
//! This crate is the engine behind UBL 2.1 business processes (ordering,
//! billing, tendering, catalogues and the rest). Process components never build
//! documents or call each other's operations directly. They go through two
//! subsystems:
//!
//! - the **Document Factory & Cache**, which turns a document type name such as
//!   `"Invoice"` into an independent, default-initialized record, and
//! - the **Action Registry & Runner**, which records named business actions,
//!   their override history, and executes them behind gating conditions with
//!   an asserted outcome.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Synthesize once, copy often
//! Turning a field list into a record shape is the expensive step. The factory
//! does it once per document type and keeps the result as a *prototype*;
//! every later request only copies the prototype's values.
//!
//! ### The cache never owns anything
//! Prototypes are held by the records copied from them. The cache keeps weak
//! handles only, so a type nobody uses any more is reclaimed and simply
//! rebuilt on the next request. A reclaimed entry is a miss, never an error.
//!
//! ### Indirection instead of patching
//! Overriding a business operation swaps an entry in a [`MemberTable`](action::MemberTable)
//! that callers look up through. The previous executable goes to the action's
//! history with a timestamp.
//!
//! ### Declare intent, trigger later
//! An [`ActionRequest`](action::ActionRequest) says what should run, who asked,
//! who performs it, under which conditions and with what result. Execution is a
//! separate call, and every attempt lands in an audit trail.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Contracts ([`schema`])
//! - **Role**: What the core reads: field definitions, schema references and the
//!   documents each business process exchanges.
//! - **Key items**: [`SchemaRegistry`](schema::SchemaRegistry),
//!   [`ProcessLookup`](schema::ProcessLookup),
//!   [`InMemorySchemaRegistry`](schema::InMemorySchemaRegistry),
//!   [`MockSchemaRegistry`](schema::mock::MockSchemaRegistry).
//!
//! ### 2. The Documents ([`document`])
//! - **Role**: Record synthesis, the prototype cache, the factory and the revision log.
//! - **Key items**: [`DocumentFactory`](document::DocumentFactory),
//!   [`PrototypeCache`](document::PrototypeCache),
//!   [`DocumentRecord`](document::DocumentRecord).
//!
//! ### 3. The Actions ([`action`])
//! - **Role**: Identity hashing, registration with history, gated execution.
//! - **Key items**: [`ActionRegistry`](action::ActionRegistry),
//!   [`ActionRunner`](action::ActionRunner).
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Role**: Configuration, tracing, and the composition root that owns one
//!   of everything.
//! - **Key items**: [`DocumentSystem`](lifecycle::DocumentSystem),
//!   [`SystemConfig`](lifecycle::SystemConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```
//! use serde_json::json;
//! use ubl_core::action::{ActionRequest, Executable};
//! use ubl_core::document::FieldValue;
//! use ubl_core::lifecycle::{DocumentSystem, SystemConfig};
//!
//! let system = DocumentSystem::with_ubl_catalogue(SystemConfig::default());
//!
//! let mut order = system.factory.produce("Order").unwrap();
//! order.set("ID", FieldValue::Identifier("PO-1001".into())).unwrap();
//!
//! system.runner.register_request(
//!     ActionRequest::new(Executable::infallible("approve_order", |_| json!(true)))
//!         .requester("buyer")
//!         .condition(true)
//!         .expect_outcome(true),
//! );
//! assert_eq!(system.runner.execute("approve_order").unwrap(), json!(true));
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod action;
pub mod document;
pub mod lifecycle;
pub mod schema;
