// src/handlers/brain_bucks.rs

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    game::{Game, GameView, Stage},
    models::brain_bucks::{
        ActiveTeamRequest, Card, CardRequest, CreateGameRequest, JudgeRequest, RevealCellRequest,
        TeamNameRequest,
    },
    state::{GameRegistry, GameSlot, prune_idle_games},
    store::{self, Collection, DocumentStore, Timestamp},
    utils::html::clean_text,
};

fn card_from_request(payload: CardRequest) -> Card {
    Card {
        id: String::new(),
        value: payload.value,
        question: clean_text(&payload.question),
        answer: clean_text(&payload.answer),
        time: Timestamp::Pending,
    }
}

/// Cards in play order: oldest first.
async fn load_cards(store: &dyn DocumentStore) -> Result<Vec<Card>, AppError> {
    let mut cards: Vec<Card> = store::fetch_all(store, Collection::BrainBucks).await?;
    cards.sort_by_key(|c| c.time.millis());
    Ok(cards)
}

/// Lists Brain Bucks cards, oldest first.
pub async fn list_cards(
    State(store): State<Arc<dyn DocumentStore>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_cards(store.as_ref()).await?))
}

pub async fn create_card(
    State(store): State<Arc<dyn DocumentStore>>,
    Json(payload): Json<CardRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let card = card_from_request(payload);
    let id = store::insert(store.as_ref(), Collection::BrainBucks, &card).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Replaces a card's value, question and answer.
///
/// The card is stored again under a new id, so an edited card moves to the
/// end of the play order for its value.
pub async fn update_card(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
    Json(payload): Json<CardRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !store.delete(Collection::BrainBucks, &id).await? {
        return Err(AppError::NotFound("Card not found".to_string()));
    }
    let card = card_from_request(payload);
    let new_id = store::insert(store.as_ref(), Collection::BrainBucks, &card).await?;
    tracing::info!("Brain Bucks card {} replaced by {}", id, new_id);

    Ok(Json(serde_json::json!({"id": new_id})))
}

pub async fn delete_card(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete(Collection::BrainBucks, &id).await? {
        return Err(AppError::NotFound("Card not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Starts a new game with the current cards.
pub async fn create_game(
    State(store): State<Arc<dyn DocumentStore>>,
    State(games): State<GameRegistry>,
    payload: Option<Json<CreateGameRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let cards = load_cards(store.as_ref()).await?;

    let game = if payload.teams.is_empty() {
        Game::new(cards)
    } else {
        Game::with_teams(cards, payload.teams)
    };

    let id = Uuid::new_v4().simple().to_string();
    let view = game.view();
    let now = Instant::now();
    let mut games = games.write().await;
    let pruned = prune_idle_games(&mut games, now);
    if pruned > 0 {
        tracing::info!("Dropped {} idle Brain Bucks games", pruned);
    }
    games.insert(id.clone(), GameSlot::new(game, now));
    tracing::info!("Brain Bucks game {} created", id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "game": view })),
    ))
}

/// Runs `f` against a game and returns its new state.
/// A finished game is removed once its final state has been returned.
async fn with_game<F>(games: &GameRegistry, id: &str, f: F) -> Result<Json<GameView>, AppError>
where
    F: FnOnce(&mut Game) -> Result<(), AppError>,
{
    let mut games = games.write().await;
    let slot = games
        .get_mut(id)
        .ok_or(AppError::NotFound("Game not found".to_string()))?;
    f(&mut slot.game)?;
    slot.touched = Instant::now();

    let view = slot.game.view();
    if slot.game.stage() == Stage::Results {
        games.remove(id);
        tracing::info!("Brain Bucks game {} finished", id);
    }
    Ok(Json(view))
}

pub async fn get_game(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |_| Ok(())).await
}

pub async fn delete_game(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if games.write().await.remove(&id).is_none() {
        return Err(AppError::NotFound("Game not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_team(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
    Json(payload): Json<TeamNameRequest>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |game| {
        game.add_team(payload.name)?;
        Ok(())
    })
    .await
}

pub async fn rename_team(
    State(games): State<GameRegistry>,
    Path((id, team_id)): Path<(String, u32)>,
    Json(payload): Json<TeamNameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload
        .name
        .ok_or(AppError::BadRequest("name is required".to_string()))?;
    with_game(&games, &id, |game| Ok(game.rename_team(team_id, &name)?)).await
}

pub async fn remove_team(
    State(games): State<GameRegistry>,
    Path((id, team_id)): Path<(String, u32)>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |game| Ok(game.remove_team(team_id)?)).await
}

pub async fn start_game(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |game| Ok(game.start()?)).await
}

pub async fn select_active_team(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
    Json(payload): Json<ActiveTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |game| Ok(game.select_active_team(payload.team_id)?)).await
}

/// Opens a board cell and shows its question.
pub async fn reveal_cell(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
    Json(payload): Json<RevealCellRequest>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |game| {
        game.reveal(payload.row, payload.col)?;
        Ok(())
    })
    .await
}

/// Scores the open question for the active team.
pub async fn judge_answer(
    State(games): State<GameRegistry>,
    Path(id): Path<String>,
    Json(payload): Json<JudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    with_game(&games, &id, |game| Ok(game.judge(payload.correct)?)).await
}
