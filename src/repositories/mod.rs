//! Repository layer for data access operations.
//!
//! [`SettingsStore`] is the seam plugins read through; [`NotifierRepository`]
//! backs it with PostgreSQL and [`InMemorySettingsStore`] with a map.

mod memory_store;
mod notifier_repo;
mod settings_store;

pub use memory_store::InMemorySettingsStore;
pub use notifier_repo::NotifierRepository;
pub use settings_store::SettingsStore;
