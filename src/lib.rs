//! Patrol: recurring checkpoint-inspection scheduling and lifecycle engine.
//!
//! This crate turns time-based recurrence rules into concrete, time-boxed
//! inspection tasks, tracks their lifecycle, and validates field submissions
//! against temporal and anti-abuse constraints.
//!
//! # Architecture
//!
//! Patrol follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, filesystem)
//!
//! # Modules
//!
//! - [`inspection`]: Schedules, task generation, submission validation,
//!   record review, and the background lifecycle sweeper
//! - [`config`]: Tunable policy knobs with sensible defaults

pub mod config;
pub mod inspection;
