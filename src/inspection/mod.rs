//! Inspection task lifecycle and scheduling engine.
//!
//! This module materializes recurring checkpoint schedules into discrete,
//! time-boxed tasks, enforces the task state machine
//! (pending → completed / overdue), validates field submissions against
//! temporal and anti-abuse constraints, and runs the background maintenance
//! jobs that keep stored state consistent over time. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
