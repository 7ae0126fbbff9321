//! Service layer orchestrating generation, queries, submission, review,
//! maintenance, and background sweeping.

pub mod generator;
pub mod maintenance;
pub mod queries;
pub mod review;
pub mod submission;
pub mod sweeper;

pub use generator::{GenerationError, GenerationResult, TaskGenerator};
pub use maintenance::{MaintenanceError, MaintenanceResult, TaskMaintenanceService};
pub use queries::{
    AreaRollup, CheckpointRollup, TaskQueryError, TaskQueryResult, TaskQueryService, TaskView,
};
pub use review::{ReviewError, ReviewResult, ReviewService};
pub use submission::{
    PhotoUpload, SubmissionError, SubmissionPolicy, SubmissionReceipt, SubmissionRequest,
    SubmissionResult, SubmissionService,
};
pub use sweeper::{spawn_overdue_sweep, spawn_retention_cleanup};
