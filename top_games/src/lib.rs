pub mod config;
pub mod error;
pub mod pipeline;
pub mod sync;

pub use config::AppConfig;
pub use error::SyncError;
pub use sync::TopGamesSync;
