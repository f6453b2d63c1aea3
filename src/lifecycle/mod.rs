//! # System Lifecycle
//!
//! Everything needed to stand the core up:
//!
//! - [`SystemConfig`] - serde-loadable knobs with safe defaults
//! - [`DocumentSystem`] - the composition root that builds and owns exactly one
//!   cache, factory, action registry, action runner and revision log
//! - [`setup_tracing`] - subscriber initialization
//!
//! ## One Instance, Explicitly
//!
//! The cache, registry and runner each exist once per system, and the system
//! is constructed explicitly and passed to whoever needs it. Code that wants
//! a process-wide instance calls [`DocumentSystem::install`] once at
//! startup; a second install is an [`SystemError::InstantiationNotAllowed`].
//!
//! ```rust,ignore
//! setup_tracing();
//! let config = SystemConfig::from_json(&std::fs::read_to_string("ubl.json")?)?;
//! let system = DocumentSystem::install(DocumentSystem::with_ubl_catalogue(config))?;
//!
//! for record in system.factory.produce_for_process(BusinessProcess::Billing, None) {
//!     let record = record?;
//!     system.record_revision("draft", &record);
//! }
//! ```

mod config;
mod document_system;
mod error;
pub mod tracing;

pub use config::SystemConfig;
pub use document_system::DocumentSystem;
pub use error::SystemError;
pub use self::tracing::setup_tracing;
