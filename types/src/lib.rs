pub mod artwork;
pub mod game;
pub mod game_model;

pub use artwork::{Artwork, Image, Logo};
pub use game::Game;
pub use game_model::GameModel;

use serde::{Deserialize, Deserializer};

/// The remote service sends `null` for strings and numbers it has no value
/// for; treat those the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
