//! Core domain types for tombola.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A number on a ticket or in the call sequence (1-90).
pub type Number = u8;

/// Smallest number in play.
pub const MIN_NUMBER: Number = 1;

/// Largest number in play.
pub const MAX_NUMBER: Number = 90;

/// Number of horizontal sections on a ticket.
pub const SECTIONS: usize = 3;

/// Rows in each section of a sectioned ticket.
pub const ROWS_PER_SECTION: usize = 3;

/// Total rows of a sectioned ticket.
pub const ROWS: usize = SECTIONS * ROWS_PER_SECTION;

/// Columns of a ticket.
pub const COLUMNS: usize = 3;

/// Filled cells in each section of a sectioned ticket.
pub const NUMBERS_PER_SECTION: usize = 5;

/// Numbers per column in each section of a flat ticket.
pub const NUMBERS_PER_FLAT_COLUMN: usize = 5;

/// Returns the sub-range a column may draw from within a section.
///
/// Column 0 of section 0 is 1-10, column 1 is 11-20, column 2 is 21-30;
/// section 1 continues at 31 and section 2 at 61. Returns `None` outside
/// the 3x3 table.
pub fn column_range(column: usize, section: usize) -> Option<RangeInclusive<Number>> {
    if column >= COLUMNS || section >= SECTIONS {
        return None;
    }
    let start = Number::try_from(section * 30 + column * 10).ok()? + MIN_NUMBER;
    Some(start..=start + 9)
}

/// 9x3 ticket where every section holds exactly five numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionedTicket {
    rows: [[Option<Number>; COLUMNS]; ROWS],
}

impl SectionedTicket {
    pub(crate) fn new(rows: [[Option<Number>; COLUMNS]; ROWS]) -> Self {
        Self { rows }
    }

    /// Returns all rows, top to bottom.
    pub fn rows(&self) -> &[[Option<Number>; COLUMNS]; ROWS] {
        &self.rows
    }

    /// Numbers present in one section, row-major.
    pub fn section_numbers(&self, section: usize) -> Vec<Number> {
        let start = section * ROWS_PER_SECTION;
        self.rows
            .iter()
            .skip(start)
            .take(ROWS_PER_SECTION)
            .flat_map(|row| row.iter().flatten().copied())
            .collect()
    }
}

/// Three sections of fifteen numbers, five per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatTicket {
    sections: Vec<Vec<Number>>,
}

impl FlatTicket {
    pub(crate) fn new(sections: Vec<Vec<Number>>) -> Self {
        Self { sections }
    }

    /// Returns the sections in order.
    pub fn sections(&self) -> &[Vec<Number>] {
        &self.sections
    }

    /// Numbers of one column within a section.
    pub fn column(&self, section: usize, column: usize) -> &[Number] {
        let start = column * NUMBERS_PER_FLAT_COLUMN;
        self.sections
            .get(section)
            .and_then(|s| s.get(start..start + NUMBERS_PER_FLAT_COLUMN))
            .unwrap_or(&[])
    }
}

/// A player's ticket in one of the supported layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ticket {
    /// 9x3 grid with empty cells.
    Sectioned(SectionedTicket),
    /// Three dense sections.
    Flat(FlatTicket),
}

impl Ticket {
    /// All numbers on the ticket.
    pub fn numbers(&self) -> Vec<Number> {
        match self {
            Ticket::Sectioned(t) => t.rows.iter().flat_map(|r| r.iter().flatten().copied()).collect(),
            Ticket::Flat(t) => t.sections.iter().flatten().copied().collect(),
        }
    }

    /// Numbers grouped by section.
    pub fn sections(&self) -> Vec<Vec<Number>> {
        match self {
            Ticket::Sectioned(t) => (0..SECTIONS).map(|s| t.section_numbers(s)).collect(),
            Ticket::Flat(t) => t.sections.clone(),
        }
    }

    /// Formats the ticket as a human-readable string.
    pub fn display(&self) -> String {
        let lines: Vec<String> = match self {
            Ticket::Sectioned(t) => t
                .rows
                .chunks(ROWS_PER_SECTION)
                .map(|section| {
                    section
                        .iter()
                        .map(|row| {
                            row.iter()
                                .map(|cell| match cell {
                                    Some(n) => format!("{:>2}", n),
                                    None => " .".to_string(),
                                })
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect(),
            Ticket::Flat(t) => t
                .sections
                .iter()
                .map(|section| {
                    section
                        .iter()
                        .map(|n| format!("{:>2}", n))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
        };
        lines.join("\n--------\n")
    }
}

/// Lifecycle status of a tombola game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Tickets dealt, no number revealed yet.
    Waiting,
    /// Numbers are being drawn.
    Active,
    /// Sequence exhausted or full house scored.
    Finished,
}

/// Achievements a player can earn once per game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AchievementKind {
    /// Five called numbers marked.
    FirstFive,
    /// Seven called numbers marked.
    EarlySeven,
    /// Fifteen called numbers marked. Ends the game.
    FullHouse,
}

impl AchievementKind {
    /// Marks needed to earn this achievement.
    pub fn threshold(self) -> usize {
        match self {
            Self::FirstFive => 5,
            Self::EarlySeven => 7,
            Self::FullHouse => 15,
        }
    }

    /// Points awarded.
    pub fn points(self) -> u32 {
        match self {
            Self::FirstFive => 50,
            Self::EarlySeven => 100,
            Self::FullHouse => 200,
        }
    }

    /// Whether earning this ends the game.
    pub fn ends_game(self) -> bool {
        matches!(self, Self::FullHouse)
    }
}

/// An achievement awarded to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Achievement {
    /// Which achievement.
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    /// Player index.
    pub player: usize,
    /// Points awarded for it.
    pub points: u32,
}

/// Players holding each achievement, in the order they earned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRegistry {
    first_five: Vec<usize>,
    early_seven: Vec<usize>,
    full_house: Vec<usize>,
}

impl AchievementRegistry {
    /// Players holding an achievement.
    pub fn players(&self, kind: AchievementKind) -> &[usize] {
        match kind {
            AchievementKind::FirstFive => &self.first_five,
            AchievementKind::EarlySeven => &self.early_seven,
            AchievementKind::FullHouse => &self.full_house,
        }
    }

    /// Checks whether a player already holds an achievement.
    pub fn has(&self, kind: AchievementKind, player: usize) -> bool {
        self.players(kind).contains(&player)
    }

    /// Records an achievement. Returns false if the player already had it.
    pub(crate) fn record(&mut self, kind: AchievementKind, player: usize) -> bool {
        if self.has(kind, player) {
            return false;
        }
        let slot = match kind {
            AchievementKind::FirstFive => &mut self.first_five,
            AchievementKind::EarlySeven => &mut self.early_seven,
            AchievementKind::FullHouse => &mut self.full_house,
        };
        slot.push(player);
        true
    }
}

/// One row of the points ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    /// Player index.
    pub player: usize,
    /// Total points.
    pub points: u32,
}
