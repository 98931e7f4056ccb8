//! Business logic services
//!
//! This module contains the reconciliation engine, the update coordinator
//! that owns the roster lock, the change-log renderer, and the member
//! command service.

pub mod changelog;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod lock;
pub mod member;
pub mod reconcile;

// Re-export all services for convenience
pub use changelog::ChangeReport;
pub use context::ServiceContext;
pub use coordinator::{next_fire_delay, UpdateCoordinator, UPDATE_REASON};
pub use error::{ServiceError, ServiceResult};
pub use lock::{RosterGuard, RosterLock};
pub use member::{EditableField, MemberService};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileOutcome, ReconcilePhase};
