//! # clan-service
//!
//! Application layer: the reconciliation engine, the update coordinator,
//! the change log, and the staff command services.

pub mod services;

pub use services::{
    next_fire_delay, reconcile, ChangeReport, EditableField, MemberService, ReconcileOptions,
    ReconcileOutcome, ReconcilePhase, RosterGuard, RosterLock, ServiceContext, ServiceError,
    ServiceResult, UpdateCoordinator, UPDATE_REASON,
};
