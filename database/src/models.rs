use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use types::{Artwork, Game, GameModel};

use crate::store::{EntityKind, Record, Value};

/// Column names shared by predicates and records.
pub mod fields {
    pub const ID: &str = "id";
    pub const GAME_ID: &str = "game_id";
    pub const NAME: &str = "name";
    pub const LOCALE: &str = "locale";
    pub const IS_FAVORITE: &str = "is_favorite";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    pub id: i64,
    pub giantbomb_id: i64,
    pub popularity: i64,
    pub name: String,
    pub localized_name: String,
    pub locale: String,
    pub viewers: i64,
    pub channels: i64,
    pub is_favorite: bool,
    pub synced_at: Option<DateTime<Utc>>,
}

impl GameEntity {
    /// Projects every remotely owned field of `model`. The favorite flag is
    /// passed separately because it is never taken from a fetched model.
    pub fn from_model(model: &GameModel, is_favorite: bool) -> Self {
        let game = &model.game;
        Self {
            id: game.id,
            giantbomb_id: game.giantbomb_id,
            popularity: game.popularity,
            name: game.name.clone(),
            localized_name: game.localized_name.clone(),
            locale: game.locale.clone(),
            viewers: model.viewers,
            channels: model.channels,
            is_favorite,
            synced_at: Some(Utc::now()),
        }
    }

    pub fn into_model(self, image: Option<Artwork>, logo: Option<Artwork>) -> GameModel {
        let game = Game {
            id: self.id,
            giantbomb_id: self.giantbomb_id,
            popularity: self.popularity,
            name: self.name,
            localized_name: self.localized_name,
            locale: self.locale,
            image,
            logo,
        };
        GameModel {
            game,
            viewers: self.viewers,
            channels: self.channels,
            is_favorited: self.is_favorite,
            is_recorded: true,
        }
    }
}

impl Record for GameEntity {
    const KIND: EntityKind = EntityKind::Game;

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            (fields::ID, Value::Integer(self.id)),
            ("giantbomb_id", Value::Integer(self.giantbomb_id)),
            ("popularity", Value::Integer(self.popularity)),
            (fields::NAME, Value::Text(self.name.clone())),
            ("localized_name", Value::Text(self.localized_name.clone())),
            (fields::LOCALE, Value::Text(self.locale.clone())),
            ("viewers", Value::Integer(self.viewers)),
            ("channels", Value::Integer(self.channels)),
            (fields::IS_FAVORITE, Value::Bool(self.is_favorite)),
            ("synced_at", Value::Timestamp(self.synced_at)),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get(fields::ID)?,
            giantbomb_id: row.try_get("giantbomb_id")?,
            popularity: row.try_get("popularity")?,
            name: row.try_get(fields::NAME)?,
            localized_name: row.try_get("localized_name")?,
            locale: row.try_get(fields::LOCALE)?,
            viewers: row.try_get("viewers")?,
            channels: row.try_get("channels")?,
            is_favorite: row.try_get(fields::IS_FAVORITE)?,
            synced_at: row.try_get("synced_at")?,
        })
    }
}

/// Image and logo rows have the same columns and no identity of their own;
/// they are found through the id of the game that owns them.
pub trait ArtworkRecord: Record {
    fn for_game(game_id: i64, artwork: &Artwork) -> Self;
    fn game_id(&self) -> i64;
    fn artwork(&self) -> Artwork;
}

macro_rules! artwork_entity {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub game_id: i64,
            pub small: String,
            pub medium: String,
            pub large: String,
        }

        impl Record for $name {
            const KIND: EntityKind = $kind;

            fn values(&self) -> Vec<(&'static str, Value)> {
                vec![
                    (fields::GAME_ID, Value::Integer(self.game_id)),
                    ("small", Value::Text(self.small.clone())),
                    ("medium", Value::Text(self.medium.clone())),
                    ("large", Value::Text(self.large.clone())),
                ]
            }

            fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
                Ok(Self {
                    game_id: row.try_get(fields::GAME_ID)?,
                    small: row.try_get("small")?,
                    medium: row.try_get("medium")?,
                    large: row.try_get("large")?,
                })
            }
        }

        impl ArtworkRecord for $name {
            fn for_game(game_id: i64, artwork: &Artwork) -> Self {
                Self {
                    game_id,
                    small: artwork.small.clone(),
                    medium: artwork.medium.clone(),
                    large: artwork.large.clone(),
                }
            }

            fn game_id(&self) -> i64 {
                self.game_id
            }

            fn artwork(&self) -> Artwork {
                Artwork::new(&self.small, &self.medium, &self.large)
            }
        }
    };
}

artwork_entity!(ImageEntity, EntityKind::Image);
artwork_entity!(LogoEntity, EntityKind::Logo);
