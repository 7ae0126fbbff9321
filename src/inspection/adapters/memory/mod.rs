//! In-memory adapters for tests and single-process experimentation.

mod directory;
mod photo;
mod store;

pub use directory::StaticCheckpointDirectory;
pub use photo::InMemoryPhotoStore;
pub use store::InMemoryInspectionStore;
