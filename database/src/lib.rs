pub mod config;
pub mod error;
pub mod game_store;
pub mod models;
pub mod predicate;
pub mod repository;
pub mod retry;
pub mod store;

pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use game_store::{GameStore, NoopStore};
pub use models::{ArtworkRecord, GameEntity, ImageEntity, LogoEntity};
pub use predicate::{Operator, Predicate, Scalar};
pub use repository::GameRepository;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use store::{EntityKind, LocalStore, Record, RecordHandle, Stored, StoreScope};
