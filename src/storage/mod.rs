pub mod chat;
pub mod database;
pub mod farm;
pub mod inventory;
pub mod users;

pub use chat::ChatStore;
pub use database::{Database, PoolConfig, SharedDatabase};
pub use farm::{FieldStore, LivestockStore};
pub use inventory::{FeedStore, FertilizerStore};
pub use users::UserStore;
