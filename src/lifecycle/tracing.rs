//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose
//! level comes from `RUST_LOG`.
//!
//! ```bash
//! # Synthesis, registration and execution
//! RUST_LOG=info cargo run
//!
//! # Every cache hit/miss and lookup
//! RUST_LOG=debug cargo run
//! ```
//!
//! Events carry structured fields rather than formatted text, e.g.:
//!
//! ```text
//! INFO Synthesized document type document="Invoice" fields=12 schema="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
//! DEBUG Prototype cache hit document="Invoice"
//! INFO Action registered action=issue_invoice key=3f1c0a9b2e7d namespace=billing
//! WARN Action gated action=ship condition=1
//! INFO Action completed action=approve outcome=42
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
