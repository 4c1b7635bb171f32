use std::cmp::Reverse;

use database::{DatabaseError, GameStore};
use itertools::Itertools;
use serde_json::Value;
use types::GameModel;

use crate::SyncError;

/// The entries of a top games response. The service wraps them as
/// `{"top": [...]}`; a bare array is accepted too.
pub fn entries(payload: &[u8]) -> Result<Vec<Value>, SyncError> {
    let entries = match serde_json::from_slice::<Value>(payload)? {
        Value::Array(entries) => entries,
        Value::Object(mut envelope) => match envelope.remove("top") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(entries)
}

/// Entries that do not decode are dropped.
pub fn decode(entries: Vec<Value>) -> Vec<GameModel> {
    entries
        .into_iter()
        .filter_map(|entry| match GameModel::from_json(entry) {
            Ok(model) => Some(model),
            Err(e) => {
                log::debug!("dropping undecodable entry: {e}");
                None
            }
        })
        .collect()
}

/// Keeps the first entry seen for each game id.
pub fn deduplicate(models: Vec<GameModel>) -> Vec<GameModel> {
    models.into_iter().unique_by(|model| model.id()).collect()
}

/// Most viewers first; ties keep their order.
pub fn order_by_viewers(models: Vec<GameModel>) -> Vec<GameModel> {
    models
        .into_iter()
        .sorted_by_key(|model| Reverse(model.viewers))
        .collect()
}

pub async fn overlay_favorites<S: GameStore + ?Sized>(
    store: &S,
    models: Vec<GameModel>,
) -> Result<Vec<GameModel>, DatabaseError> {
    let mut overlaid = Vec::with_capacity(models.len());
    for model in models {
        overlaid.push(store.check_favorite(model).await?);
    }
    Ok(overlaid)
}

/// Decode, deduplicate and rank a raw payload.
pub fn transform(payload: &[u8]) -> Result<Vec<GameModel>, SyncError> {
    let entries = entries(payload)?;
    let total = entries.len();
    let models = order_by_viewers(deduplicate(decode(entries)));
    log::debug!("{} of {total} entries kept", models.len());
    Ok(models)
}

pub async fn run<S: GameStore + ?Sized>(
    store: &S,
    payload: &[u8],
) -> Result<Vec<GameModel>, SyncError> {
    let models = transform(payload)?;
    Ok(overlay_favorites(store, models).await?)
}
