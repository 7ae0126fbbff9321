//! `PostgreSQL` adapters for inspection persistence.

mod models;
mod record;
mod schedule;
mod schema;
mod task;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type shared by the inspection adapters.
pub type InspectionPgPool = Pool<ConnectionManager<PgConnection>>;

pub use record::PostgresRecordRepository;
pub use schedule::PostgresScheduleRepository;
pub use task::PostgresTaskRepository;
