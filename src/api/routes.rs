//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{OperationContext, RunningStat, StatDomain};
use crate::error::AppResult;
use crate::handlers::{
    battle_key, rating_key, BattleVoteCommand, BattleVoteHandler, RateJokeCommand,
    RateJokeHandler, RegisterJokeCommand, RegisterJokeHandler,
};
use crate::updater::AggregateStatUpdater;

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RateRequest {
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateResponse {
    pub joke_id: String,
    pub value: f64,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BattleVoteRequest {
    pub winner_id: String,
    pub loser_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatResponse {
    pub key: String,
    pub value: f64,
    pub count: u64,
    pub version: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatValue {
    pub value: f64,
    pub count: u64,
}

impl From<RunningStat> for StatValue {
    fn from(stat: RunningStat) -> Self {
        Self {
            value: stat.value,
            count: stat.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub joke_id: String,
    pub rating: StatValue,
    pub battle: StatValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BattleVoteResponse {
    pub winner: StatValue,
    pub loser: StatValue,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/jokes/:joke_id/stats", post(register_joke))
        .route("/jokes/:joke_id/rating", get(get_rating))
        .route("/jokes/:joke_id/rate", post(rate_joke))
        .route("/jokes/:joke_id/battle", get(get_battle))
        .route("/battles", post(battle_vote))
}

// =========================================================================
// POST /jokes/:joke_id/stats
// =========================================================================

/// Create the empty statistics of a newly submitted joke
async fn register_joke(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(joke_id): Path<String>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let handler = RegisterJokeHandler::new(state.store.clone());

    let result = handler
        .execute(RegisterJokeCommand::new(joke_id), &context)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            joke_id: result.joke_id,
            rating: result.rating.into(),
            battle: result.battle.into(),
        }),
    ))
}

// =========================================================================
// GET /jokes/:joke_id/rating, GET /jokes/:joke_id/battle
// =========================================================================

async fn read_stat(
    state: &AppState,
    domain: StatDomain,
    key: String,
) -> AppResult<StatResponse> {
    let stored = AggregateStatUpdater::new(domain)
        .current(&*state.store, &key)
        .await?;

    Ok(StatResponse {
        key,
        value: stored.stat.value,
        count: stored.stat.count,
        version: stored.version,
    })
}

/// Get a joke's average star rating
async fn get_rating(
    State(state): State<AppState>,
    Path(joke_id): Path<String>,
) -> AppResult<Json<StatResponse>> {
    let key = rating_key(&joke_id)?;
    Ok(Json(read_stat(&state, StatDomain::STAR_RATING, key).await?))
}

/// Get a joke's battle win rate
async fn get_battle(
    State(state): State<AppState>,
    Path(joke_id): Path<String>,
) -> AppResult<Json<StatResponse>> {
    let key = battle_key(&joke_id)?;
    Ok(Json(read_stat(&state, StatDomain::BATTLE_OUTCOME, key).await?))
}

// =========================================================================
// POST /jokes/:joke_id/rate
// =========================================================================

/// Rate a joke
async fn rate_joke(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(joke_id): Path<String>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> AppResult<Json<RateResponse>> {
    let Json(request) = payload?;
    let handler = RateJokeHandler::new(state.store.clone(), state.mode, state.options);

    let result = handler
        .execute(RateJokeCommand::new(joke_id, request.rating), &context)
        .await?;

    Ok(Json(RateResponse {
        joke_id: result.joke_id,
        value: result.value,
        count: result.count,
    }))
}

// =========================================================================
// POST /battles
// =========================================================================

/// Record a joke battle vote
async fn battle_vote(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<BattleVoteRequest>, JsonRejection>,
) -> AppResult<Json<BattleVoteResponse>> {
    let Json(request) = payload?;
    let handler = BattleVoteHandler::new(state.store.clone(), state.mode, state.options);

    let result = handler
        .execute(
            BattleVoteCommand::new(request.winner_id, request.loser_id),
            &context,
        )
        .await?;

    Ok(Json(BattleVoteResponse {
        winner: result.winner.into(),
        loser: result.loser.into(),
    }))
}
