use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{null_as_default, Game};

/// One entry of the top games ranking: the game plus its live audience and
/// the locally owned flags.
///
/// `is_favorited` and `is_recorded` are never read from the wire, so a remote
/// payload can not set them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameModel {
    pub game: Game,
    #[serde(default, deserialize_with = "null_as_default")]
    pub viewers: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: i64,
    #[serde(skip_deserializing)]
    pub is_favorited: bool,
    #[serde(skip_deserializing)]
    pub is_recorded: bool,
}

impl GameModel {
    pub fn new(game: Game, viewers: i64, channels: i64) -> Self {
        Self {
            game,
            viewers,
            channels,
            is_favorited: false,
            is_recorded: false,
        }
    }

    pub fn id(&self) -> i64 {
        self.game.id
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl Display for GameModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let star = if self.is_favorited { " *" } else { "" };
        write!(
            f,
            "#{} {}{}: {} viewers, {} channels",
            self.game.id,
            self.game.display_name(),
            star,
            self.viewers,
            self.channels
        )
    }
}
