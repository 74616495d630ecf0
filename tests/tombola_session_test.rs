//! Scenario tests for the session manager and game state machine.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::thread;
use strictly_tombola::{
    AchievementKind, COLUMNS, DrawOutcome, GameStatus, LayoutKind, MemoryStore,
    NUMBERS_PER_FLAT_COLUMN, Number, SECTIONS, SequenceKind, SessionManager, Ticket,
    TombolaError,
};

fn seeded_manager(sequence: SequenceKind) -> SessionManager {
    SessionManager::with_store(
        Arc::new(MemoryStore::new()),
        LayoutKind::Sectioned,
        sequence,
        Some(1234),
    )
}

/// Draws `count` numbers and returns them.
fn draw(sessions: &SessionManager, id: &str, count: usize) -> Vec<Number> {
    (0..count)
        .map(|_| match sessions.next_number(id).expect("draw") {
            DrawOutcome::Called { number, .. } => number,
            DrawOutcome::Exhausted { .. } => panic!("sequence exhausted early"),
        })
        .collect()
}

#[test]
fn test_full_continuous_game() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    let created = sessions.create_session(4).expect("create");
    assert_eq!(created.tickets.len(), 4);
    assert!(created.game_id.starts_with("game_"));

    let view = sessions.get_session(&created.game_id).expect("get");
    assert_eq!(view.game_status, GameStatus::Waiting);
    assert_eq!(view.current_number, None);
    assert_eq!(view.called_numbers_count, 0);

    assert_eq!(sessions.start(&created.game_id).expect("start"), 90);
    assert_eq!(
        sessions.get_session(&created.game_id).unwrap().game_status,
        GameStatus::Active
    );

    let mut seen = HashSet::new();
    for call in 1..=90 {
        match sessions.next_number(&created.game_id).expect("draw") {
            DrawOutcome::Called {
                number,
                position,
                total,
                is_finished,
            } => {
                assert_eq!(position, call);
                assert_eq!(total, 90);
                assert_eq!(is_finished, call == 90);
                assert!(seen.insert(number), "number {} repeated", number);
            }
            DrawOutcome::Exhausted { .. } => panic!("exhausted at call {}", call),
        }
    }
    assert_eq!(seen, (1..=90).collect::<HashSet<Number>>());

    let view = sessions.get_session(&created.game_id).unwrap();
    assert_eq!(view.game_status, GameStatus::Finished);
    assert_eq!(view.called_numbers_count, 90);
    assert!(matches!(
        sessions.next_number(&created.game_id),
        Err(TombolaError::InvalidState(_))
    ));
    assert!(matches!(
        sessions.start(&created.game_id),
        Err(TombolaError::InvalidState(_))
    ));
}

#[test]
fn test_flat_layout_session_plays_short_form() {
    let sessions = SessionManager::with_store(
        Arc::new(MemoryStore::new()),
        LayoutKind::Flat,
        SequenceKind::ShortForm,
        Some(99),
    );
    let created = sessions.create_session(5).expect("create");
    assert_eq!(created.tickets.len(), 5);
    for ticket in &created.tickets {
        let Ticket::Flat(flat) = ticket else {
            panic!("flat layout dealt {:?}", ticket);
        };
        assert_eq!(flat.sections().len(), SECTIONS);
        for section in flat.sections() {
            assert_eq!(section.len(), COLUMNS * NUMBERS_PER_FLAT_COLUMN);
        }
        let numbers: HashSet<Number> = ticket.numbers().into_iter().collect();
        assert_eq!(numbers.len(), SECTIONS * COLUMNS * NUMBERS_PER_FLAT_COLUMN);
        assert!(numbers.iter().all(|n| (1..=90).contains(n)));
    }

    let view = sessions.get_session(&created.game_id).expect("get");
    assert_eq!(view.tickets, created.tickets);

    assert_eq!(sessions.start(&created.game_id).expect("start"), 15);
    let called = draw(&sessions, &created.game_id, 15);
    assert!(called.iter().all(|n| (1..=90).contains(n)));
    assert_eq!(called.iter().collect::<HashSet<_>>().len(), 15);
    assert_eq!(
        sessions.get_session(&created.game_id).unwrap().game_status,
        GameStatus::Finished
    );
}

#[test]
fn test_player_count_bounds() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    for count in [0, 1, 2, 6, 100] {
        assert!(matches!(
            sessions.create_session(count),
            Err(TombolaError::InvalidArgument(_))
        ));
    }
    for count in 3..=5 {
        assert_eq!(sessions.create_session(count).unwrap().tickets.len(), count);
    }
}

#[test]
fn test_full_house_in_one_check() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    let id = sessions.create_session(3).unwrap().game_id;
    sessions.start(&id).unwrap();
    let called = draw(&sessions, &id, 15);

    let marked = BTreeMap::from([(1, called.clone())]);
    let report = sessions.check_achievements(&id, &marked).unwrap();

    let kinds: Vec<_> = report.new_achievements.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AchievementKind::FirstFive,
            AchievementKind::EarlySeven,
            AchievementKind::FullHouse
        ]
    );
    assert!(report.new_achievements.iter().all(|a| a.player == 1));
    assert_eq!(report.player_points, vec![0, 350, 0]);
    assert_eq!(report.game_status, GameStatus::Finished);
    assert!(report.game_ended);
    assert_eq!(report.winner, Some(1));
    assert_eq!(report.rankings[0].player, 1);
    assert_eq!(report.all_called_numbers, called);

    let view = sessions.get_session(&id).unwrap();
    assert_eq!(view.winner, Some(1));
    assert!(matches!(
        sessions.next_number(&id),
        Err(TombolaError::InvalidState(_))
    ));
}

#[test]
fn test_achievement_check_is_idempotent() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    let id = sessions.create_session(3).unwrap().game_id;
    sessions.start(&id).unwrap();
    let called = draw(&sessions, &id, 8);

    let marked = BTreeMap::from([(0, called[..7].to_vec())]);
    let first = sessions.check_achievements(&id, &marked).unwrap();
    assert_eq!(first.new_achievements.len(), 2);
    assert_eq!(first.player_points[0], 150);

    let second = sessions.check_achievements(&id, &marked).unwrap();
    assert!(second.new_achievements.is_empty());
    assert_eq!(second.player_points[0], 150);
    assert_eq!(second.achievements.players(AchievementKind::FirstFive), &[0]);
    assert_eq!(second.game_status, GameStatus::Active);
    assert!(!second.game_ended);
}

#[test]
fn test_unknown_player_index_ignored() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    let id = sessions.create_session(3).unwrap().game_id;
    sessions.start(&id).unwrap();
    let called = draw(&sessions, &id, 5);

    let marked = BTreeMap::from([(2, called.clone()), (3, called.clone()), (99, called)]);
    let report = sessions.check_achievements(&id, &marked).unwrap();
    assert_eq!(report.new_achievements.len(), 1);
    assert_eq!(report.new_achievements[0].player, 2);
    assert_eq!(report.player_points.len(), 3);
    assert_eq!(report.rankings.len(), 3);
}

#[test]
fn test_ranking_ties_break_by_index() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    let id = sessions.create_session(5).unwrap().game_id;
    sessions.start(&id).unwrap();
    let called = draw(&sessions, &id, 7);

    let marked = BTreeMap::from([(4, called[..5].to_vec()), (1, called[..5].to_vec())]);
    let report = sessions.check_achievements(&id, &marked).unwrap();
    let order: Vec<_> = report.rankings.iter().map(|r| r.player).collect();
    assert_eq!(order, vec![1, 4, 0, 2, 3]);
}

#[test]
fn test_unknown_session_rejected() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    assert!(matches!(
        sessions.get_session("game_nope"),
        Err(TombolaError::NotFound(_))
    ));
    assert!(matches!(
        sessions.next_number("game_nope"),
        Err(TombolaError::NotFound(_))
    ));
    assert!(matches!(
        sessions.called_numbers("game_nope"),
        Err(TombolaError::NotFound(_))
    ));
    assert!(matches!(
        sessions.check_winner("game_nope"),
        Err(TombolaError::NotFound(_))
    ));
    assert!(matches!(
        sessions.check_achievements("game_nope", &BTreeMap::new()),
        Err(TombolaError::NotFound(_))
    ));
}

#[test]
fn test_called_numbers_and_winner_check() {
    let sessions = seeded_manager(SequenceKind::ShortForm);
    let id = sessions.create_session(3).unwrap().game_id;
    assert_eq!(sessions.start(&id).unwrap(), 15);

    let before = sessions.called_numbers(&id).unwrap();
    assert!(before.called_numbers.is_empty());
    assert_eq!(before.current_number, None);

    let drawn = draw(&sessions, &id, 4);
    let called = sessions.called_numbers(&id).unwrap();
    assert_eq!(called.called_numbers, drawn);
    assert_eq!(called.current_number, drawn.last().copied());
    assert_eq!(called.game_status, GameStatus::Active);

    let check = sessions.check_winner(&id).unwrap();
    assert_eq!(check.called_numbers, drawn);
    assert_eq!(check.total_called, 4);
    assert_eq!(check.target_numbers.len(), 15);
    assert_eq!(&check.target_numbers[..4], drawn.as_slice());
}

#[test]
fn test_concurrent_draws_never_repeat() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    let id = sessions.create_session(3).unwrap().game_id;
    sessions.start(&id).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let sessions = sessions.clone();
            let id = id.clone();
            thread::spawn(move || {
                let mut drawn = Vec::new();
                for _ in 0..15 {
                    if let Ok(DrawOutcome::Called { number, .. }) = sessions.next_number(&id) {
                        drawn.push(number);
                    }
                }
                drawn
            })
        })
        .collect();

    let mut all: Vec<Number> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("thread panicked"))
        .collect();
    assert_eq!(all.len(), 90);
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 90);
    assert_eq!(
        sessions.get_session(&id).unwrap().game_status,
        GameStatus::Finished
    );
}

#[test]
fn test_random_numbers_via_manager() {
    let sessions = seeded_manager(SequenceKind::Continuous);
    assert!(matches!(
        sessions.random_numbers(0),
        Err(TombolaError::InvalidArgument(_))
    ));
    assert!(matches!(
        sessions.random_numbers(91),
        Err(TombolaError::InvalidArgument(_))
    ));
    let numbers = sessions.random_numbers(15).unwrap();
    assert_eq!(numbers.len(), 15);
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
}
