//! Tombola session state machine and achievement scoring.

use super::types::{
    Achievement, AchievementKind, AchievementRegistry, GameStatus, Number, Ranking, Ticket,
};
use crate::error::TombolaError;
use derive_getters::Getters;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

/// Allowed number of players in a game.
pub const PLAYER_RANGE: RangeInclusive<usize> = 3..=5;

/// One tombola game: dealt tickets, call sequence and draw progress.
#[derive(Debug, Clone, Getters)]
pub struct TombolaGame {
    /// Session ID.
    id: String,
    /// Tickets in player-index order.
    tickets: Vec<Ticket>,
    /// Order in which numbers are called.
    call_sequence: Vec<Number>,
    /// Position of the last called number.
    #[getter(skip)]
    cursor: Option<usize>,
    /// Lifecycle status.
    #[getter(skip)]
    status: GameStatus,
    /// Player who scored the full house.
    #[getter(skip)]
    winner: Option<usize>,
    /// Achievements earned so far.
    achievements: AchievementRegistry,
    /// Accumulated points per player.
    player_points: Vec<u32>,
}

/// Result of drawing the next number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
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
        /// The complete sequence.
        all_numbers: Vec<Number>,
    },
}

/// Public view of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Session ID.
    pub game_id: String,
    /// Number of players.
    pub player_count: usize,
    /// Tickets in player-index order.
    pub tickets: Vec<Ticket>,
    /// Last called number.
    pub current_number: Option<Number>,
    /// Lifecycle status.
    pub game_status: GameStatus,
    /// Full house winner.
    pub winner: Option<usize>,
    /// How many numbers have been called.
    pub called_numbers_count: usize,
}

/// Numbers called so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalledNumbers {
    /// Called numbers in call order.
    pub called_numbers: Vec<Number>,
    /// Last called number.
    pub current_number: Option<Number>,
    /// Lifecycle status.
    pub game_status: GameStatus,
}

/// Material for players to check their tickets by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinnerCheck {
    /// Called numbers in call order.
    pub called_numbers: Vec<Number>,
    /// How many numbers have been called.
    pub total_called: usize,
    /// The full call sequence.
    pub target_numbers: Vec<Number>,
    /// Lifecycle status.
    pub game_status: GameStatus,
    /// Reminder for the client.
    pub message: String,
}

/// Outcome of an achievement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementReport {
    /// Achievements earned by this check.
    pub new_achievements: Vec<Achievement>,
    /// Every achievement earned so far.
    pub achievements: AchievementRegistry,
    /// Points per player.
    pub player_points: Vec<u32>,
    /// Players by points, highest first.
    pub rankings: Vec<Ranking>,
    /// Lifecycle status after the check.
    pub game_status: GameStatus,
    /// True if this check ended the game.
    pub game_ended: bool,
    /// Winner, reported only when this check ended the game.
    pub winner: Option<usize>,
    /// Called numbers in call order.
    pub all_called_numbers: Vec<Number>,
}

impl TombolaGame {
    /// Creates a waiting game from dealt tickets and a call sequence.
    #[instrument(skip(tickets, call_sequence), fields(players = tickets.len()))]
    pub fn new(
        id: String,
        tickets: Vec<Ticket>,
        call_sequence: Vec<Number>,
    ) -> Result<Self, TombolaError> {
        if !PLAYER_RANGE.contains(&tickets.len()) {
            warn!(players = tickets.len(), "Rejected player count");
            return Err(TombolaError::InvalidArgument(
                "Player count must be between 3 and 5".to_string(),
            ));
        }
        info!(session_id = %id, "Creating new tombola game");
        let player_points = vec![0; tickets.len()];
        Ok(Self {
            id,
            tickets,
            call_sequence,
            cursor: None,
            status: GameStatus::Waiting,
            winner: None,
            achievements: AchievementRegistry::default(),
            player_points,
        })
    }

    /// Number of players.
    pub fn player_count(&self) -> usize {
        self.tickets.len()
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Full house winner, if any.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Last called number.
    pub fn current_number(&self) -> Option<Number> {
        self.cursor.and_then(|pos| self.call_sequence.get(pos).copied())
    }

    /// Numbers called so far, in call order.
    pub fn called_numbers(&self) -> &[Number] {
        match self.cursor {
            Some(pos) => &self.call_sequence[..=pos],
            None => &[],
        }
    }

    /// Opens the draw. Returns the length of the call sequence.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn start(&mut self) -> Result<usize, TombolaError> {
        if self.status != GameStatus::Waiting {
            warn!(status = %self.status, "Start rejected");
            return Err(TombolaError::InvalidState(
                "Game already started or finished".to_string(),
            ));
        }
        self.status = GameStatus::Active;
        info!(total = self.call_sequence.len(), "Draw started");
        Ok(self.call_sequence.len())
    }

    /// Reveals the number after the cursor.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn draw_next(&mut self) -> Result<DrawOutcome, TombolaError> {
        if self.status != GameStatus::Active {
            warn!(status = %self.status, "Draw rejected");
            return Err(TombolaError::InvalidState("Game is not active".to_string()));
        }

        let next = self.cursor.map_or(0, |pos| pos + 1);
        let total = self.call_sequence.len();
        let Some(&number) = self.call_sequence.get(next) else {
            self.status = GameStatus::Finished;
            info!("All numbers called");
            return Ok(DrawOutcome::Exhausted {
                all_numbers: self.call_sequence.clone(),
            });
        };

        self.cursor = Some(next);
        let is_finished = next + 1 == total;
        if is_finished {
            self.status = GameStatus::Finished;
            info!("Last number called");
        }
        debug!(number, position = next + 1, total, "Number called");
        Ok(DrawOutcome::Called {
            number,
            position: next + 1,
            total,
            is_finished,
        })
    }

    /// Scores players' marked numbers against the numbers called so far.
    ///
    /// Players are processed in ascending index order, so the lowest index
    /// wins a simultaneous full house. Indices outside the game are ignored.
    #[instrument(skip(self, marked), fields(session_id = %self.id, players = marked.len()))]
    pub fn check_achievements(
        &mut self,
        marked: &BTreeMap<usize, Vec<Number>>,
    ) -> AchievementReport {
        let called: HashSet<Number> = self.called_numbers().iter().copied().collect();
        let mut new_achievements = Vec::new();
        let mut game_ended = false;

        for (&player, numbers) in marked {
            if player >= self.player_count() {
                debug!(player, "Ignoring unknown player");
                continue;
            }
            let valid = numbers
                .iter()
                .filter(|n| called.contains(*n))
                .collect::<HashSet<_>>()
                .len();

            for kind in AchievementKind::iter() {
                if valid < kind.threshold() || !self.achievements.record(kind, player) {
                    continue;
                }
                self.player_points[player] += kind.points();
                new_achievements.push(Achievement::new(kind, player, kind.points()));
                info!(player, achievement = %kind, points = kind.points(), "Achievement earned");

                if kind.ends_game() {
                    self.status = GameStatus::Finished;
                    if self.winner.is_none() {
                        self.winner = Some(player);
                        game_ended = true;
                        info!(player, "Full house, game over");
                    }
                }
            }
        }

        AchievementReport {
            new_achievements,
            achievements: self.achievements.clone(),
            player_points: self.player_points.clone(),
            rankings: self.rankings(),
            game_status: self.status,
            game_ended,
            winner: if game_ended { self.winner } else { None },
            all_called_numbers: self.called_numbers().to_vec(),
        }
    }

    /// All players ordered by points, highest first; ties by index.
    pub fn rankings(&self) -> Vec<Ranking> {
        let mut rankings: Vec<Ranking> = self
            .player_points
            .iter()
            .enumerate()
            .map(|(player, &points)| Ranking { player, points })
            .collect();
        rankings.sort_by(|a, b| b.points.cmp(&a.points).then(a.player.cmp(&b.player)));
        rankings
    }

    /// Snapshot for clients.
    pub fn view(&self) -> GameView {
        GameView {
            game_id: self.id.clone(),
            player_count: self.player_count(),
            tickets: self.tickets.clone(),
            current_number: self.current_number(),
            game_status: self.status,
            winner: self.winner,
            called_numbers_count: self.called_numbers().len(),
        }
    }

    /// Called numbers with the current number and status.
    pub fn called(&self) -> CalledNumbers {
        CalledNumbers {
            called_numbers: self.called_numbers().to_vec(),
            current_number: self.current_number(),
            game_status: self.status,
        }
    }

    /// Called numbers alongside the full sequence for manual checking.
    pub fn winner_check(&self) -> WinnerCheck {
        let called_numbers = self.called_numbers().to_vec();
        WinnerCheck {
            total_called: called_numbers.len(),
            called_numbers,
            target_numbers: self.call_sequence.clone(),
            game_status: self.status,
            message: "Players must manually check their tickets".to_string(),
        }
    }
}
