use serde::{Deserialize, Serialize};

use crate::{null_as_default, Image, Logo};

/// A game as described by the remote service. Field names on the wire are
/// fixed by the remote contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(
        rename = "giantbomb_id",
        alias = "giantbombId",
        default,
        deserialize_with = "null_as_default"
    )]
    pub giantbomb_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub localized_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locale: String,
    #[serde(rename = "box", default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub logo: Option<Logo>,
}

impl Game {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            giantbomb_id: 0,
            popularity: 0,
            name: name.to_string(),
            localized_name: name.to_string(),
            locale: String::new(),
            image: None,
            logo: None,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.localized_name.is_empty() {
            &self.name
        } else {
            &self.localized_name
        }
    }
}
