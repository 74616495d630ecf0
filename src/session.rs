//! Tombola session management.

use crate::config::ServerConfig;
use crate::error::TombolaError;
use crate::games::tombola::{
    AchievementReport, CalledNumbers, DrawOutcome, GameView, LayoutKind, Number, PLAYER_RANGE,
    SequenceKind, Ticket, TicketLayout, TombolaGame, WinnerCheck, generate_call_sequence,
    generate_random_numbers,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Shared handle to one session. Holding its lock gives exclusive access.
pub type SessionHandle = Arc<Mutex<TombolaGame>>;

/// Attempts at finding an unused session ID before giving up.
const MAX_ID_ATTEMPTS: usize = 8;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Storage for live sessions.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Stores a new session. Fails if the ID is taken.
    fn insert(&self, game: TombolaGame) -> Result<SessionHandle, TombolaError>;

    /// Looks up a session.
    fn get(&self, id: &str) -> Option<SessionHandle>;

    /// Lists all session IDs.
    fn ids(&self) -> Vec<SessionId>;
}

/// Process-lifetime session store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    #[instrument(skip(self, game), fields(session_id = %game.id()))]
    fn insert(&self, game: TombolaGame) -> Result<SessionHandle, TombolaError> {
        let mut sessions = lock(&self.sessions);
        if sessions.contains_key(game.id()) {
            warn!("Session already exists");
            return Err(TombolaError::InvalidState(format!(
                "Session {} already exists",
                game.id()
            )));
        }
        let id = game.id().clone();
        let handle = Arc::new(Mutex::new(game));
        sessions.insert(id, Arc::clone(&handle));
        debug!(count = sessions.len(), "Session stored");
        Ok(handle)
    }

    fn get(&self, id: &str) -> Option<SessionHandle> {
        lock(&self.sessions).get(id).cloned()
    }

    fn ids(&self) -> Vec<SessionId> {
        lock(&self.sessions).keys().cloned().collect()
    }
}

/// Response to creating a session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CreatedSession {
    /// Session ID.
    pub game_id: SessionId,
    /// Number of players.
    pub player_count: usize,
    /// Tickets in player-index order.
    pub tickets: Vec<Ticket>,
}

/// Manages all game sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    layout: Arc<dyn TicketLayout>,
    sequence: SequenceKind,
    rng: Arc<Mutex<Pcg64>>,
}

impl SessionManager {
    /// Creates a session manager with an in-memory store and default rules.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::with_store(
            Arc::new(MemoryStore::new()),
            LayoutKind::default(),
            SequenceKind::default(),
            None,
        )
    }

    /// Creates a session manager over the given store.
    ///
    /// A fixed `seed` makes tickets, sequences and session IDs reproducible.
    #[instrument(skip(store))]
    pub fn with_store(
        store: Arc<dyn SessionStore>,
        layout: LayoutKind,
        sequence: SequenceKind,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };
        Self {
            store,
            layout: Arc::from(layout.layout()),
            sequence,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Creates a session manager from server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::with_store(
            Arc::new(MemoryStore::new()),
            *config.ticket_layout(),
            *config.call_sequence(),
            *config.seed(),
        )
    }

    /// Deals tickets and a call sequence into a new waiting session.
    #[instrument(skip(self))]
    pub fn create_session(&self, player_count: usize) -> Result<CreatedSession, TombolaError> {
        if !PLAYER_RANGE.contains(&player_count) {
            warn!("Rejected player count");
            return Err(TombolaError::InvalidArgument(
                "Player count must be between 3 and 5".to_string(),
            ));
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let (id, tickets, call_sequence) = {
                let mut rng = lock(&self.rng);
                let id = format!("game_{:016x}", rng.random::<u64>());
                let tickets: Vec<Ticket> = (0..player_count)
                    .map(|_| self.layout.generate(&mut *rng))
                    .collect();
                let call_sequence = generate_call_sequence(self.sequence, &mut *rng);
                (id, tickets, call_sequence)
            };

            let game = TombolaGame::new(id.clone(), tickets.clone(), call_sequence)?;
            match self.store.insert(game) {
                Ok(_) => {
                    info!(session_id = %id, player_count, "Created new session");
                    return Ok(CreatedSession {
                        game_id: id,
                        player_count,
                        tickets,
                    });
                }
                Err(e) => debug!(error = %e, "Session ID collision, retrying"),
            }
        }

        Err(TombolaError::InvalidState(
            "Could not allocate a session ID".to_string(),
        ))
    }

    /// Runs `f` with exclusive access to a session.
    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut TombolaGame) -> T,
    ) -> Result<T, TombolaError> {
        let handle = self.store.get(id).ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            TombolaError::NotFound(id.to_string())
        })?;
        let mut game = lock(&handle);
        Ok(f(&mut *game))
    }

    /// Gets a snapshot of a session.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Result<GameView, TombolaError> {
        self.with_session(id, |game| game.view())
    }

    /// Opens the draw. Returns the number of calls in the sequence.
    #[instrument(skip(self))]
    pub fn start(&self, id: &str) -> Result<usize, TombolaError> {
        self.with_session(id, TombolaGame::start)?
    }

    /// Reveals the next number.
    #[instrument(skip(self))]
    pub fn next_number(&self, id: &str) -> Result<DrawOutcome, TombolaError> {
        self.with_session(id, TombolaGame::draw_next)?
    }

    /// Lists the numbers called so far.
    #[instrument(skip(self))]
    pub fn called_numbers(&self, id: &str) -> Result<CalledNumbers, TombolaError> {
        self.with_session(id, |game| game.called())
    }

    /// Returns called and target numbers for manual checking.
    #[instrument(skip(self))]
    pub fn check_winner(&self, id: &str) -> Result<WinnerCheck, TombolaError> {
        self.with_session(id, |game| game.winner_check())
    }

    /// Scores players' marked numbers.
    #[instrument(skip(self, marked))]
    pub fn check_achievements(
        &self,
        id: &str,
        marked: &BTreeMap<usize, Vec<Number>>,
    ) -> Result<AchievementReport, TombolaError> {
        self.with_session(id, |game| game.check_achievements(marked))
    }

    /// Draws `count` distinct sorted numbers from 1-90.
    #[instrument(skip(self))]
    pub fn random_numbers(&self, count: usize) -> Result<Vec<Number>, TombolaError> {
        generate_random_numbers(count, &mut *lock(&self.rng))
    }

    /// Lists all session IDs.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let ids = self.store.ids();
        info!(count = ids.len(), "Listed sessions");
        ids
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::with_store(
            Arc::new(MemoryStore::new()),
            LayoutKind::Sectioned,
            SequenceKind::Continuous,
            Some(99),
        )
    }

    #[test]
    fn unknown_session_is_not_found() {
        let sessions = manager();
        assert_eq!(
            sessions.start("game_missing"),
            Err(TombolaError::NotFound("game_missing".to_string()))
        );
        assert!(sessions.check_achievements("nope", &BTreeMap::new()).is_err());
    }

    #[test]
    fn store_rejects_duplicate_ids() {
        let sessions = manager();
        let created = sessions.create_session(3).unwrap();
        let handle = sessions.store.get(&created.game_id).unwrap();
        let copy = lock(&handle).clone();
        assert!(matches!(
            sessions.store.insert(copy),
            Err(TombolaError::InvalidState(_))
        ));
    }

    #[test]
    fn seeded_managers_deal_identical_games() {
        let a = manager().create_session(3).unwrap();
        let b = manager().create_session(3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sessions_are_listed() {
        let sessions = manager();
        let first = sessions.create_session(3).unwrap();
        let second = sessions.create_session(5).unwrap();
        let mut ids = sessions.list_sessions();
        ids.sort();
        let mut expected = vec![first.game_id, second.game_id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
