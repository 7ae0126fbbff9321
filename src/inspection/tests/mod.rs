//! Test suite for the inspection context.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::unreachable,
    reason = "Test doubles mark contract methods a scenario never calls"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Test code reuses variable names for clarity in sequential assertions"
)]

mod query_tests;
mod submission_tests;
mod support;
mod sweeper_tests;
mod task_domain_tests;
