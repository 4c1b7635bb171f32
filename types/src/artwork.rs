use serde::{Deserialize, Serialize};

use crate::null_as_default;

/// A set of image URLs at three sizes. The box art and the logo of a game
/// share this shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    #[serde(default, deserialize_with = "null_as_default")]
    pub small: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub medium: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub large: String,
}

pub type Image = Artwork;
pub type Logo = Artwork;

impl Artwork {
    pub fn new(small: &str, medium: &str, large: &str) -> Self {
        Self {
            small: small.to_string(),
            medium: medium.to_string(),
            large: large.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_keys_are_ignored() {
        let artwork: Artwork = serde_json::from_value(serde_json::json!({
            "small": "s.jpg",
            "medium": "m.jpg",
            "large": "l.jpg",
            "template": "{width}x{height}.jpg"
        }))
        .unwrap();

        assert_eq!(artwork, Artwork::new("s.jpg", "m.jpg", "l.jpg"));
    }

    #[test]
    fn test_missing_sizes_are_empty() {
        let artwork: Artwork =
            serde_json::from_value(serde_json::json!({ "large": null })).unwrap();
        assert_eq!(artwork, Artwork::new("", "", ""));
    }
}
