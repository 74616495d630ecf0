mod game;
mod generator;
mod types;

pub use game::{
    AchievementReport, CalledNumbers, DrawOutcome, GameView, PLAYER_RANGE, TombolaGame,
    WinnerCheck,
};
pub use generator::{
    FlatLayout, LayoutKind, SHORT_FORM_LEN, SectionedLayout, SequenceKind, TicketLayout,
    generate_call_sequence, generate_random_numbers, generate_ticket,
};
pub use types::{
    Achievement, AchievementKind, AchievementRegistry, COLUMNS, FlatTicket, GameStatus,
    MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_FLAT_COLUMN, NUMBERS_PER_SECTION, Number, ROWS,
    ROWS_PER_SECTION, Ranking, SECTIONS, SectionedTicket, Ticket, column_range,
};
