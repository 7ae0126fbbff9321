//! Port contracts for the inspection engine.
//!
//! Ports define infrastructure-agnostic interfaces used by inspection
//! services: persistence for schedules, tasks, and records, the external
//! photo file store, and the external checkpoint catalog.

pub mod checkpoint_directory;
pub mod photo_store;
pub mod record_repository;
pub mod schedule_repository;
pub mod task_repository;

pub use checkpoint_directory::{
    AreaInfo, CheckpointDirectory, CheckpointDirectoryError, CheckpointDirectoryResult,
    CheckpointInfo,
};
pub use photo_store::{PhotoStore, PhotoStoreError, PhotoStoreResult, StoredPhoto};
pub use record_repository::{
    RecordRepository, RecordRepositoryError, RecordRepositoryResult, RecordSummary, ReviewOutcome,
};
pub use schedule_repository::{
    ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult,
};
pub use task_repository::{
    DeletionManifest, Page, PageRequest, TaskFilter, TaskRepository, TaskRepositoryError,
    TaskRepositoryResult, TaskStats,
};
