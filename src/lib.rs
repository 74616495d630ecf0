//! Strictly Tombola library - tombola game server
//!
//! Deals tickets, runs the number draw and scores achievements over a REST API.
//!
//! # Architecture
//!
//! - **Games**: Ticket/sequence generation and the per-game state machine
//! - **Session**: Lock-guarded session store and the manager mediating transitions
//! - **Server**: axum router mapping HTTP requests onto the session manager
//! - **Config**: TOML server configuration
//!
//! # Example
//!
//! ```no_run
//! use strictly_tombola::{GameServer, ServerConfig, SessionManager};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default().with_port(8000);
//! let server = GameServer::with_sessions(SessionManager::from_config(&config));
//!
//! let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//! axum::serve(listener, server.router()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod games;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Errors
pub use error::TombolaError;

// Crate-level exports - Server types
pub use server::{
    ErrorBody, GameServer, NextNumberResponse, RandomNumbersQuery, RandomNumbersResponse,
    StartDrawResponse, StartGameRequest, StartGameResponse,
};

// Crate-level exports - Session management
pub use session::{
    CreatedSession, MemoryStore, SessionHandle, SessionId, SessionManager, SessionStore,
};

// Crate-level exports - Game types (tombola)
pub use games::tombola::{
    Achievement, AchievementKind, AchievementRegistry, AchievementReport, COLUMNS,
    CalledNumbers, DrawOutcome, FlatLayout, FlatTicket, GameStatus, GameView, LayoutKind,
    MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_FLAT_COLUMN, NUMBERS_PER_SECTION, Number, PLAYER_RANGE,
    ROWS, ROWS_PER_SECTION, Ranking, SECTIONS, SHORT_FORM_LEN, SectionedLayout, SectionedTicket,
    SequenceKind, Ticket, TicketLayout, TombolaGame, WinnerCheck, column_range,
    generate_call_sequence, generate_random_numbers, generate_ticket,
};
