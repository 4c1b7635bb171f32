use std::collections::HashMap;

use tracing::{debug, instrument, warn};
use types::{Artwork, GameModel};

use crate::game_store::GameStore;
use crate::models::{fields, ArtworkRecord, GameEntity, ImageEntity, LogoEntity};
use crate::predicate::{Operator, Predicate};
use crate::store::{LocalStore, Stored};
use crate::DatabaseError;

/// The upsert engine over the local cache.
///
/// Every write opens its own scope and commits it before the next write
/// starts, so a game's row is durable before its image and logo are touched.
/// When a game commit fails the dependent writes are skipped.
#[derive(Debug, Clone)]
pub struct GameRepository {
    store: LocalStore,
}

fn game_predicate(id: i64) -> Option<Predicate> {
    Predicate::with_id(Some(id), fields::ID, Operator::Equal)
}

fn artwork_predicate(game_id: i64) -> Option<Predicate> {
    Predicate::with_id(Some(game_id), fields::GAME_ID, Operator::Equal)
}

impl GameRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    async fn upsert_game(&self, model: &GameModel) -> Result<(), DatabaseError> {
        let mut scope = self.store.scope().await?;
        let existing = scope
            .query::<GameEntity>(game_predicate(model.id()).as_ref())
            .await?;

        if existing.is_empty() {
            let entity = GameEntity::from_model(model, model.is_favorited);
            scope.insert(&entity).await?;
            debug!("inserted game");
        } else {
            if existing.len() > 1 {
                warn!(rows = existing.len(), "duplicate rows for one game, updating all");
            }
            for Stored { handle, record } in &existing {
                let entity = GameEntity::from_model(model, record.is_favorite);
                scope.update(*handle, &entity).await?;
            }
            debug!(rows = existing.len(), "updated game");
        }

        scope.commit().await
    }

    pub(crate) async fn upsert_artwork<R: ArtworkRecord>(
        &self,
        game_id: i64,
        artwork: &Artwork,
    ) -> Result<(), DatabaseError> {
        let mut scope = self.store.scope().await?;
        let existing = scope.query::<R>(artwork_predicate(game_id).as_ref()).await?;

        if existing.is_empty() {
            let owner = scope
                .query::<GameEntity>(game_predicate(game_id).as_ref())
                .await?;
            if owner.is_empty() {
                scope.rollback().await?;
                return Err(DatabaseError::GameNotFound(game_id));
            }
            scope.insert(&R::for_game(game_id, artwork)).await?;
        } else {
            let record = R::for_game(game_id, artwork);
            for stored in &existing {
                scope.update(stored.handle, &record).await?;
            }
        }

        scope.commit().await?;
        debug!(kind = %R::KIND, game_id, "artwork synced");
        Ok(())
    }

    /// Cached games matching `predicate` with their artwork, most watched
    /// first.
    async fn load_where(
        &self,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<GameModel>, DatabaseError> {
        let mut scope = self.store.scope().await?;
        let games = scope.query::<GameEntity>(predicate).await?;
        let images = scope.query::<ImageEntity>(None).await?;
        let logos = scope.query::<LogoEntity>(None).await?;
        scope.commit().await?;

        let images = by_game(images);
        let logos = by_game(logos);

        let mut models = games
            .into_iter()
            .map(|stored| {
                let id = stored.record.id;
                stored
                    .record
                    .into_model(images.get(&id).cloned(), logos.get(&id).cloned())
            })
            .collect::<Vec<_>>();
        models.sort_by(|a, b| b.viewers.cmp(&a.viewers));
        Ok(models)
    }

    async fn clear_artwork<R: ArtworkRecord>(&self, game_id: i64) -> Result<(), DatabaseError> {
        let mut scope = self.store.scope().await?;
        let deleted = scope
            .batch_delete::<R>(artwork_predicate(game_id).as_ref())
            .await?;
        scope.commit().await?;
        if deleted > 0 {
            debug!(kind = %R::KIND, game_id, deleted, "artwork cleared");
        }
        Ok(())
    }

    /// Artwork absent from the model is removed, so the cache holds exactly
    /// what the latest sync carried.
    async fn cascade(&self, model: &GameModel) -> Result<(), DatabaseError> {
        match &model.game.image {
            Some(image) => self.upsert_artwork::<ImageEntity>(model.id(), image).await?,
            None => self.clear_artwork::<ImageEntity>(model.id()).await?,
        }
        match &model.game.logo {
            Some(logo) => self.upsert_artwork::<LogoEntity>(model.id(), logo).await?,
            None => self.clear_artwork::<LogoEntity>(model.id()).await?,
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameStore for GameRepository {
    #[instrument(skip(self, model), fields(game_id = model.id()))]
    async fn sync_game(&self, model: &GameModel) -> Result<GameModel, DatabaseError> {
        // A failed game commit returns here, before any artwork is written.
        self.upsert_game(model).await?;
        self.cascade(model).await?;

        let mut synced = model.clone();
        synced.is_recorded = true;
        Ok(synced)
    }

    async fn check_favorite(&self, mut model: GameModel) -> Result<GameModel, DatabaseError> {
        let mut scope = self.store.scope().await?;
        let existing = scope
            .query::<GameEntity>(game_predicate(model.id()).as_ref())
            .await?;
        scope.commit().await?;

        if !existing.is_empty() {
            model.is_favorited = existing.iter().any(|stored| stored.record.is_favorite);
        }
        Ok(model)
    }

    #[instrument(skip(self, model), fields(game_id = model.id()))]
    async fn set_favorite(
        &self,
        model: &GameModel,
        is_favorite: bool,
    ) -> Result<GameModel, DatabaseError> {
        let mut scope = self.store.scope().await?;
        let existing = scope
            .query::<GameEntity>(game_predicate(model.id()).as_ref())
            .await?;

        let inserted = existing.is_empty();
        if inserted {
            scope
                .insert(&GameEntity::from_model(model, is_favorite))
                .await?;
        } else {
            for Stored { handle, mut record } in existing {
                record.is_favorite = is_favorite;
                scope.update(handle, &record).await?;
            }
        }
        scope.commit().await?;

        if inserted {
            self.cascade(model).await?;
        }
        debug!(is_favorite, inserted, "favorite updated");

        let mut updated = model.clone();
        updated.is_favorited = is_favorite;
        updated.is_recorded = true;
        Ok(updated)
    }

    async fn load_games(&self) -> Result<Vec<GameModel>, DatabaseError> {
        self.load_where(None).await
    }

    async fn favorites(&self) -> Result<Vec<GameModel>, DatabaseError> {
        self.load_where(Some(&Predicate::equal(fields::IS_FAVORITE, 1i64)))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, id: i64) -> Result<u64, DatabaseError> {
        let mut scope = self.store.scope().await?;
        scope
            .batch_delete::<ImageEntity>(artwork_predicate(id).as_ref())
            .await?;
        scope
            .batch_delete::<LogoEntity>(artwork_predicate(id).as_ref())
            .await?;
        let deleted = scope
            .batch_delete::<GameEntity>(game_predicate(id).as_ref())
            .await?;
        scope.commit().await?;
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> Result<(), DatabaseError> {
        let mut scope = self.store.scope().await?;
        scope.batch_delete::<ImageEntity>(None).await?;
        scope.batch_delete::<LogoEntity>(None).await?;
        let games = scope.batch_delete::<GameEntity>(None).await?;
        scope.commit().await?;
        tracing::info!(games, "cache cleared");
        Ok(())
    }
}

fn by_game<R: ArtworkRecord>(rows: Vec<Stored<R>>) -> HashMap<i64, Artwork> {
    let mut artwork = HashMap::new();
    for stored in rows {
        artwork
            .entry(stored.record.game_id())
            .or_insert_with(|| stored.record.artwork());
    }
    artwork
}
