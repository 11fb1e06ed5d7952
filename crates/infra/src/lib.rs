//! Infrastructure layer: user store backends and seed data.

pub mod seed;
pub mod user_store;

pub use seed::{SeedError, SeedUser, load_seed_file, seed_users};
pub use user_store::{Authority, InMemoryUserStore, PostgresUserStore};
