use std::sync::Arc;

use database::{DatabaseError, GameStore};
use network::{Router, ServiceConfig, TopGamesService, Transport};
use types::GameModel;

use crate::{pipeline, SyncError};

/// Fetches the top games list, ranks it and keeps the local cache in step.
pub struct TopGamesSync<S, T = reqwest::Client> {
    router: Router<TopGamesService, T>,
    config: Arc<ServiceConfig>,
    store: S,
}

impl<S: GameStore> TopGamesSync<S, reqwest::Client> {
    pub fn with_default_client(store: S, config: ServiceConfig) -> Self {
        Self::new(store, reqwest::Client::new(), config)
    }
}

impl<S: GameStore, T: Transport> TopGamesSync<S, T> {
    /// `config` is final here; a page size of zero becomes one.
    pub fn new(store: S, transport: T, mut config: ServiceConfig) -> Self {
        config.page_size = config.page_size.max(1);
        Self {
            router: Router::new(transport),
            config: Arc::new(config),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    /// One page of the ranking with favorites restored from the cache.
    /// Nothing is written.
    pub async fn fetch_top_games(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GameModel>, SyncError> {
        let route = TopGamesService::top_games(Arc::clone(&self.config), limit, offset);
        let response = self.router.request(&route).await?;
        let models = pipeline::run(&self.store, &response.body).await?;
        log::info!("fetched {} games (limit {limit}, offset {offset})", models.len());
        Ok(models)
    }

    /// Like [`Self::fetch_top_games`], then writes every game to the cache.
    /// The cache is untouched when the fetch fails.
    pub async fn fetch_and_sync(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GameModel>, SyncError> {
        let models = self.fetch_top_games(limit, offset).await?;
        let mut synced = Vec::with_capacity(models.len());
        for model in &models {
            synced.push(self.store.sync_game(model).await?);
        }
        log::info!("synced {} games", synced.len());
        Ok(synced)
    }

    pub async fn cached_top_games(&self) -> Result<Vec<GameModel>, SyncError> {
        Ok(self.store.load_games().await?)
    }

    pub async fn favorite_games(&self) -> Result<Vec<GameModel>, SyncError> {
        Ok(self.store.favorites().await?)
    }

    pub async fn set_favorite(
        &self,
        model: &GameModel,
        is_favorite: bool,
    ) -> Result<GameModel, SyncError> {
        Ok(self.store.set_favorite(model, is_favorite).await?)
    }

    /// Flags a game that is already cached.
    pub async fn set_favorite_by_id(
        &self,
        id: i64,
        is_favorite: bool,
    ) -> Result<GameModel, SyncError> {
        let cached = self.store.load_games().await?;
        let model = cached
            .iter()
            .find(|model| model.id() == id)
            .ok_or(DatabaseError::GameNotFound(id))?;
        self.set_favorite(model, is_favorite).await
    }

    pub async fn clear_cache(&self) -> Result<(), SyncError> {
        self.store.delete_all().await?;
        Ok(())
    }

    /// Aborts the request in flight, if any.
    pub fn cancel(&self) {
        self.router.cancel();
    }
}
