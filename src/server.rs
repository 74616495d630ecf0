//! REST API for tombola sessions.

use crate::error::TombolaError;
use crate::games::tombola::{
    AchievementReport, CalledNumbers, DrawOutcome, GameView, Number, Ticket, WinnerCheck,
};
use crate::session::{SessionId, SessionManager};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Request for creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    /// Number of players (3-5).
    pub player_count: usize,
}

/// Response for a created game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameResponse {
    /// Session ID.
    pub game_id: SessionId,
    /// Number of players.
    pub player_count: usize,
    /// Tickets in player-index order.
    pub tickets: Vec<Ticket>,
    /// Status message.
    pub message: String,
}

/// Response for opening the draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartDrawResponse {
    /// Status message.
    pub message: String,
    /// Numbers in the call sequence.
    pub total_numbers: usize,
}

/// Response for drawing a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextNumberResponse {
    /// A number was revealed.
    Called {
        /// The number.
        number: Number,
        /// 1-based position in the sequence.
        position: usize,
        /// Length of the sequence.
        total: usize,
        /// True when this was the last number.
        is_finished: bool,
    },
    /// Nothing left to reveal.
    Exhausted {
        /// Always null.
        number: Option<Number>,
        /// Always true.
        is_finished: bool,
        /// The complete sequence.
        all_numbers: Vec<Number>,
        /// Status message.
        message: String,
    },
}

impl From<DrawOutcome> for NextNumberResponse {
    fn from(outcome: DrawOutcome) -> Self {
        match outcome {
            DrawOutcome::Called {
                number,
                position,
                total,
                is_finished,
            } => Self::Called {
                number,
                position,
                total,
                is_finished,
            },
            DrawOutcome::Exhausted { all_numbers } => Self::Exhausted {
                number: None,
                is_finished: true,
                all_numbers,
                message: "All numbers called".to_string(),
            },
        }
    }
}

/// Query for the random numbers endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomNumbersQuery {
    /// How many numbers to draw.
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    15
}

/// Response for the random numbers endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomNumbersResponse {
    /// Sorted distinct numbers.
    pub numbers: Vec<Number>,
}

/// Body of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// What went wrong.
    pub detail: String,
}

impl IntoResponse for TombolaError {
    fn into_response(self) -> Response {
        let status = match &self {
            TombolaError::NotFound(_) => StatusCode::NOT_FOUND,
            TombolaError::InvalidArgument(_) | TombolaError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        let detail = match self {
            TombolaError::NotFound(_) => "Game not found".to_string(),
            TombolaError::InvalidArgument(msg) | TombolaError::InvalidState(msg) => msg,
        };
        warn!(%status, %detail, "Request rejected");
        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// HTTP front end over a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct GameServer {
    sessions: SessionManager,
}

impl GameServer {
    /// Creates a game server with its own session manager.
    #[instrument]
    pub fn new() -> Self {
        Self::with_sessions(SessionManager::new())
    }

    /// Creates a game server with shared session manager.
    #[instrument(skip(sessions))]
    pub fn with_sessions(sessions: SessionManager) -> Self {
        info!("Creating game server with shared session manager");
        Self { sessions }
    }

    /// Builds the router.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/api/start-game", post(start_game))
            .route("/api/game/{game_id}", get(get_game))
            .route("/api/game/{game_id}/start", post(start_draw))
            .route("/api/game/{game_id}/next-number", get(next_number))
            .route("/api/game/{game_id}/all-numbers", get(all_numbers))
            .route("/api/game/{game_id}/check-winner", post(check_winner))
            .route(
                "/api/game/{game_id}/check-achievements",
                post(check_achievements),
            )
            .route("/api/random-numbers", get(random_numbers))
            .with_state(self.sessions)
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Tombola Game API",
        "status": "running"
    }))
}

#[instrument(skip(sessions))]
async fn start_game(
    State(sessions): State<SessionManager>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>, TombolaError> {
    let created = sessions.create_session(request.player_count)?;
    Ok(Json(StartGameResponse {
        game_id: created.game_id,
        player_count: created.player_count,
        tickets: created.tickets,
        message: "Game created successfully".to_string(),
    }))
}

#[instrument(skip(sessions))]
async fn get_game(
    State(sessions): State<SessionManager>,
    Path(game_id): Path<SessionId>,
) -> Result<Json<GameView>, TombolaError> {
    sessions.get_session(&game_id).map(Json)
}

#[instrument(skip(sessions))]
async fn start_draw(
    State(sessions): State<SessionManager>,
    Path(game_id): Path<SessionId>,
) -> Result<Json<StartDrawResponse>, TombolaError> {
    let total_numbers = sessions.start(&game_id)?;
    Ok(Json(StartDrawResponse {
        message: "Game started".to_string(),
        total_numbers,
    }))
}

#[instrument(skip(sessions))]
async fn next_number(
    State(sessions): State<SessionManager>,
    Path(game_id): Path<SessionId>,
) -> Result<Json<NextNumberResponse>, TombolaError> {
    sessions
        .next_number(&game_id)
        .map(|outcome| Json(outcome.into()))
}

#[instrument(skip(sessions))]
async fn all_numbers(
    State(sessions): State<SessionManager>,
    Path(game_id): Path<SessionId>,
) -> Result<Json<CalledNumbers>, TombolaError> {
    sessions.called_numbers(&game_id).map(Json)
}

#[instrument(skip(sessions))]
async fn check_winner(
    State(sessions): State<SessionManager>,
    Path(game_id): Path<SessionId>,
) -> Result<Json<WinnerCheck>, TombolaError> {
    sessions.check_winner(&game_id).map(Json)
}

#[instrument(skip(sessions, claimed))]
async fn check_achievements(
    State(sessions): State<SessionManager>,
    Path(game_id): Path<SessionId>,
    Json(claimed): Json<BTreeMap<usize, Vec<i64>>>,
) -> Result<Json<AchievementReport>, TombolaError> {
    sessions
        .check_achievements(&game_id, &playable_marks(claimed))
        .map(Json)
}

/// Drops marks that cannot be a tombola number. They could never have been
/// called, so they would not count anyway.
fn playable_marks(claimed: BTreeMap<usize, Vec<i64>>) -> BTreeMap<usize, Vec<Number>> {
    claimed
        .into_iter()
        .map(|(player, marks)| {
            let marks = marks
                .into_iter()
                .filter_map(|n| Number::try_from(n).ok())
                .collect();
            (player, marks)
        })
        .collect()
}

#[instrument(skip(sessions))]
async fn random_numbers(
    State(sessions): State<SessionManager>,
    Query(query): Query<RandomNumbersQuery>,
) -> Result<Json<RandomNumbersResponse>, TombolaError> {
    let numbers = sessions.random_numbers(query.count)?;
    Ok(Json(RandomNumbersResponse { numbers }))
}
