//! Integration tests for the local cache through its public API.

use database::{DatabaseConfig, GameRepository, GameStore, LocalStore, NoopStore};
use types::{Artwork, Game, GameModel};

fn temp_db_path(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("{name}-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn model(id: i64, viewers: i64) -> GameModel {
    let mut game = Game::new(id, &format!("Game {id}"));
    game.image = Some(Artwork::new("s", "m", "l"));
    GameModel::new(game, viewers, 1)
}

/// The cache and the favorite flag outlive the process that wrote them
#[tokio::test]
async fn test_file_store_survives_reconnect() {
    let path = temp_db_path("top-games-reconnect");
    let config = DatabaseConfig::new(path.to_string_lossy().to_string());

    let store = LocalStore::connect(&config)
        .await
        .expect("Failed to open store");
    let repository = GameRepository::new(store.clone());
    repository.sync_game(&model(1, 10)).await.unwrap();
    repository.set_favorite(&model(2, 20), true).await.unwrap();
    store.close().await;

    let store = LocalStore::connect(&config)
        .await
        .expect("Failed to reopen store");
    let repository = GameRepository::new(store.clone());
    let cached = repository.load_games().await.unwrap();
    store.close().await;
    let _ = std::fs::remove_file(&path);

    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].id(), 2);
    assert!(cached[0].is_favorited);
    assert!(!cached[1].is_favorited);
    assert_eq!(cached[1].game.image, Some(Artwork::new("s", "m", "l")));
}

/// Schema creation is idempotent
#[tokio::test]
async fn test_ensure_schema_twice() {
    let store = LocalStore::in_memory().await.unwrap();
    store
        .ensure_schema()
        .await
        .expect("Second schema pass should be a no-op");
}

/// Stores can be used behind a trait object
#[tokio::test]
async fn test_store_trait_objects() {
    let store = LocalStore::in_memory().await.unwrap();
    let stores: Vec<Box<dyn GameStore>> =
        vec![Box::new(GameRepository::new(store)), Box::new(NoopStore)];

    for store in &stores {
        let synced = store.sync_game(&model(5, 50)).await.unwrap();
        assert_eq!(synced.id(), 5);
    }
}

/// Clones of one store see each other's writes
#[tokio::test]
async fn test_cloned_store_shares_state() {
    let store = LocalStore::in_memory().await.unwrap();
    let writer = GameRepository::new(store.clone());
    let reader = GameRepository::new(store);

    writer.sync_game(&model(8, 80)).await.unwrap();

    let cached = reader.load_games().await.unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].viewers, 80);
}
