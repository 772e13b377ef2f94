//! Database access: async connection pool and embedded migrations.

mod migrate;
mod pool;

pub use migrate::{pending_migrations, revert_migrations, run_migrations};
pub use pool::{AsyncDbPool, MIGRATIONS, establish_async_connection_pool};
