use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{config::Config, game::Game, store::DocumentStore};
use axum::extract::FromRef;
use tokio::sync::RwLock;

/// Games untouched for this long are dropped from the registry.
pub const GAME_IDLE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// A game in progress and when it was last played.
pub struct GameSlot {
    pub game: Game,
    pub touched: Instant,
}

impl GameSlot {
    pub fn new(game: Game, now: Instant) -> Self {
        Self { game, touched: now }
    }
}

/// Brain Bucks games in progress, keyed by game id.
pub type GameRegistry = Arc<RwLock<HashMap<String, GameSlot>>>;

/// Removes games idle for longer than [`GAME_IDLE_TTL`] and returns how many were dropped.
pub fn prune_idle_games(games: &mut HashMap<String, GameSlot>, now: Instant) -> usize {
    let before = games.len();
    games.retain(|_, slot| now.saturating_duration_since(slot.touched) <= GAME_IDLE_TTL);
    before - games.len()
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Config,
    pub games: GameRegistry,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            config,
            games: GameRegistry::default(),
        }
    }
}

impl FromRef<AppState> for Arc<dyn DocumentStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for GameRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.games.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_idle_games() {
        let start = Instant::now();
        let mut games = HashMap::new();
        games.insert("old".to_string(), GameSlot::new(Game::new(Vec::new()), start));
        games.insert(
            "fresh".to_string(),
            GameSlot::new(Game::new(Vec::new()), start + GAME_IDLE_TTL),
        );

        assert_eq!(prune_idle_games(&mut games, start + GAME_IDLE_TTL), 0);
        let later = start + GAME_IDLE_TTL + Duration::from_secs(1);
        assert_eq!(prune_idle_games(&mut games, later), 1);
        assert!(games.contains_key("fresh"));
    }
}
