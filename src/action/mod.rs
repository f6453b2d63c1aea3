//! Action Registry & Runner.
//!
//! - [`Executable`] - a named handler over JSON arguments
//! - [`ActionIdentity`] / [`ActionKey`] - how actions are named and keyed
//! - [`MemberTable`] - indirection table a component's callers look up through
//! - [`ActionRegistry`] - key to executable, with supersede history
//! - [`ActionRunner`] - stored requests, gated execution, outcome checks

mod error;
mod executable;
mod identity;
mod member;
mod registry;
mod runner;

pub use error::{ActionError, MismatchReason};
pub use executable::{ActionParams, Executable, ExecutionFailure};
pub use identity::{ActionIdentity, ActionKey, ProcessStep};
pub use member::{ActionTarget, MemberTable};
pub use registry::{
    ActionRegistration, ActionRegistry, Namespace, Registration, Superseded, GLOBAL_NAMESPACE,
};
pub use runner::{
    ActionRef, ActionRequest, ActionRunner, Condition, ExecutionRecord, RequestStatus,
};
