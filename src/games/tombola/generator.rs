//! Ticket and call sequence generation.
//!
//! Every function takes its random source as an argument so callers can
//! seed it for reproducible output.

use super::types::{
    COLUMNS, FlatTicket, MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_FLAT_COLUMN, NUMBERS_PER_SECTION,
    Number, ROWS, ROWS_PER_SECTION, SECTIONS, SectionedTicket, Ticket, column_range,
};
use crate::error::TombolaError;
use rand::seq::{IndexedRandom, SliceRandom, index};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use tracing::{debug, instrument};

/// Length of a short-form call sequence.
pub const SHORT_FORM_LEN: usize = 15;

/// Ranges a short-form sequence is spread across: 1-9, 10-19, ..., 80-89, 90.
const DECADES: Number = MAX_NUMBER / 10 + 1;

/// Strategy for laying out the numbers of a ticket.
pub trait TicketLayout: Send + Sync + std::fmt::Debug {
    /// Which layout this is.
    fn kind(&self) -> LayoutKind;

    /// Generates one ticket.
    fn generate(&self, rng: &mut dyn RngCore) -> Ticket;
}

/// Selects a ticket layout by name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutKind {
    /// 9x3 grid, five numbers per section.
    #[default]
    Sectioned,
    /// Three sections of fifteen numbers.
    Flat,
}

impl LayoutKind {
    /// Returns the layout strategy for this kind.
    pub fn layout(self) -> Box<dyn TicketLayout> {
        match self {
            Self::Sectioned => Box::new(SectionedLayout),
            Self::Flat => Box::new(FlatLayout),
        }
    }
}

/// 9x3 grid: one or two cells per row, then each section corrected to five.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionedLayout;

impl TicketLayout for SectionedLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Sectioned
    }

    #[instrument(skip_all)]
    fn generate(&self, rng: &mut dyn RngCore) -> Ticket {
        let mut rows = [[None; COLUMNS]; ROWS];
        let mut used = HashSet::new();

        for (row_idx, row) in rows.iter_mut().enumerate() {
            let section = row_idx / ROWS_PER_SECTION;
            let fill = rng.random_range(1..=2);
            for column in index::sample(rng, COLUMNS, fill) {
                if let Some(n) =
                    column_range(column, section).and_then(|r| pick_available(rng, r, &used))
                {
                    used.insert(n);
                    row[column] = Some(n);
                }
            }
        }

        for section in 0..SECTIONS {
            let cells: Vec<(usize, usize)> = (section * ROWS_PER_SECTION
                ..(section + 1) * ROWS_PER_SECTION)
                .flat_map(|r| (0..COLUMNS).map(move |c| (r, c)))
                .collect();
            let (filled, empty): (Vec<_>, Vec<_>) =
                cells.into_iter().partition(|&(r, c)| rows[r][c].is_some());

            match filled.len().cmp(&NUMBERS_PER_SECTION) {
                Ordering::Greater => {
                    let excess: Vec<_> = filled
                        .choose_multiple(rng, filled.len() - NUMBERS_PER_SECTION)
                        .copied()
                        .collect();
                    for (r, c) in excess {
                        if let Some(n) = rows[r][c].take() {
                            used.remove(&n);
                        }
                    }
                }
                Ordering::Less => {
                    let targets: Vec<_> = empty
                        .choose_multiple(rng, NUMBERS_PER_SECTION - filled.len())
                        .copied()
                        .collect();
                    for (r, c) in targets {
                        if let Some(n) =
                            column_range(c, section).and_then(|r| pick_available(rng, r, &used))
                        {
                            used.insert(n);
                            rows[r][c] = Some(n);
                        }
                    }
                }
                Ordering::Equal => {}
            }
        }

        debug!(numbers = used.len(), "Generated sectioned ticket");
        Ticket::Sectioned(SectionedTicket::new(rows))
    }
}

/// Three sections, each column a sample of five from its sub-range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatLayout;

impl TicketLayout for FlatLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Flat
    }

    #[instrument(skip_all)]
    fn generate(&self, rng: &mut dyn RngCore) -> Ticket {
        let mut sections = Vec::with_capacity(SECTIONS);
        for section in 0..SECTIONS {
            let mut numbers = Vec::with_capacity(COLUMNS * NUMBERS_PER_FLAT_COLUMN);
            for column in 0..COLUMNS {
                let mut picked = column_range(column, section)
                    .map(|r| sample_range(rng, r, NUMBERS_PER_FLAT_COLUMN))
                    .unwrap_or_default();
                picked.sort_unstable();
                numbers.extend(picked);
            }
            sections.push(numbers);
        }
        debug!("Generated flat ticket");
        Ticket::Flat(FlatTicket::new(sections))
    }
}

/// Generates one ticket with the given layout.
pub fn generate_ticket(layout: &dyn TicketLayout, rng: &mut dyn RngCore) -> Ticket {
    layout.generate(rng)
}

/// Order in which numbers are called.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SequenceKind {
    /// Every number 1-90 in random order.
    #[default]
    Continuous,
    /// Fifteen numbers spread across the ten decades.
    ShortForm,
}

impl SequenceKind {
    /// Number of calls in a sequence of this kind.
    pub fn call_count(self) -> usize {
        match self {
            Self::Continuous => usize::from(MAX_NUMBER),
            Self::ShortForm => SHORT_FORM_LEN,
        }
    }
}

/// Generates the ordered call sequence for a game.
#[instrument(skip(rng))]
pub fn generate_call_sequence<R: Rng + ?Sized>(kind: SequenceKind, rng: &mut R) -> Vec<Number> {
    match kind {
        SequenceKind::Continuous => {
            let mut numbers: Vec<Number> = (MIN_NUMBER..=MAX_NUMBER).collect();
            numbers.shuffle(rng);
            numbers
        }
        SequenceKind::ShortForm => {
            let mut numbers = Vec::with_capacity(20);
            for decade in 0..DECADES {
                let take = rng.random_range(1..=2);
                numbers.extend(sample_range(rng, decade_range(decade), take));
            }
            while numbers.len() < SHORT_FORM_LEN {
                let n = rng.random_range(MIN_NUMBER..=MAX_NUMBER);
                if !numbers.contains(&n) {
                    numbers.push(n);
                }
            }
            numbers.truncate(SHORT_FORM_LEN);
            numbers.shuffle(rng);
            numbers
        }
    }
}

/// Returns `count` distinct numbers from 1-90, sorted ascending.
#[instrument(skip(rng))]
pub fn generate_random_numbers<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
) -> Result<Vec<Number>, TombolaError> {
    if !(1..=usize::from(MAX_NUMBER)).contains(&count) {
        return Err(TombolaError::InvalidArgument(
            "Count must be between 1 and 90".to_string(),
        ));
    }
    let mut numbers = sample_range(rng, MIN_NUMBER..=MAX_NUMBER, count);
    numbers.sort_unstable();
    Ok(numbers)
}

fn decade_range(decade: Number) -> RangeInclusive<Number> {
    let lo = (decade * 10).max(MIN_NUMBER);
    let hi = (decade * 10 + 9).min(MAX_NUMBER);
    lo..=hi
}

fn sample_range<R: Rng + ?Sized>(
    rng: &mut R,
    range: RangeInclusive<Number>,
    amount: usize,
) -> Vec<Number> {
    let pool: Vec<Number> = range.collect();
    pool.choose_multiple(rng, amount).copied().collect()
}

fn pick_available<R: Rng + ?Sized>(
    rng: &mut R,
    range: RangeInclusive<Number>,
    used: &HashSet<Number>,
) -> Option<Number> {
    let available: Vec<Number> = range.filter(|n| !used.contains(n)).collect();
    available.choose(rng).copied()
}
