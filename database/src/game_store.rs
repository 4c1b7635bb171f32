use async_trait::async_trait;
use types::GameModel;

use crate::DatabaseError;

/// What the sync layer needs from the local cache.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Inserts or updates the game and then its image and logo. Returns the
    /// model marked as recorded.
    async fn sync_game(&self, model: &GameModel) -> Result<GameModel, DatabaseError>;

    /// Copies the persisted favorite flag onto `model`. Leaves the model as is
    /// when the game was never persisted.
    async fn check_favorite(&self, model: GameModel) -> Result<GameModel, DatabaseError>;

    async fn set_favorite(
        &self,
        model: &GameModel,
        is_favorite: bool,
    ) -> Result<GameModel, DatabaseError>;

    /// Every cached game, most watched first.
    async fn load_games(&self) -> Result<Vec<GameModel>, DatabaseError>;

    /// The favorited subset of [`GameStore::load_games`].
    async fn favorites(&self) -> Result<Vec<GameModel>, DatabaseError> {
        let games = self.load_games().await?;
        Ok(games.into_iter().filter(|model| model.is_favorited).collect())
    }

    async fn delete_game(&self, id: i64) -> Result<u64, DatabaseError>;

    async fn delete_all(&self) -> Result<(), DatabaseError>;
}

/// A store that keeps nothing, for running without a cache.
pub struct NoopStore;

#[async_trait]
impl GameStore for NoopStore {
    async fn sync_game(&self, model: &GameModel) -> Result<GameModel, DatabaseError> {
        Ok(model.clone())
    }

    async fn check_favorite(&self, model: GameModel) -> Result<GameModel, DatabaseError> {
        Ok(model)
    }

    async fn set_favorite(
        &self,
        model: &GameModel,
        is_favorite: bool,
    ) -> Result<GameModel, DatabaseError> {
        let mut model = model.clone();
        model.is_favorited = is_favorite;
        Ok(model)
    }

    async fn load_games(&self) -> Result<Vec<GameModel>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn delete_game(&self, _id: i64) -> Result<u64, DatabaseError> {
        Ok(0)
    }

    async fn delete_all(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
