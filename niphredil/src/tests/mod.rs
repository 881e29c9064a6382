//! End-to-end search scenarios, driven through the public surface the
//! UCI front-end uses.

use crate::evaluate::cache::EvalCache;
use crate::evaluate::Score;
use crate::evaluate::ScoreExt;
use crate::history_tables::history::HistoryTable;
use crate::history_tables::pv::PvTable;
use crate::logger::NullLogger;
use crate::position::Position;
use crate::search::SearchReport;
use crate::search::Searcher;
use crate::time_control::TimeController;
use crate::transpositions::TTable;
use chess::board::Board;
use chess::variant::Variant;
use std::time::Duration;
use uci::time_control::TimeControl;

fn search_position(position: &Position, tc_type: TimeControl) -> SearchReport {
    let mut tt = TTable::with_capacity(16);
    let mut pv_table = PvTable::new();
    let mut history = HistoryTable::new();
    let mut eval_cache = EvalCache::new();

    let (mut tc, _handle) = TimeController::new(tc_type, &position.board, false, false);

    Searcher::new(
        &mut tc,
        &mut tt,
        &mut pv_table,
        &mut history,
        &mut eval_cache,
    )
    .play(position, &mut NullLogger)
}

fn search_fen(fen: &str, variant: Variant, depth: usize) -> SearchReport {
    let board = Board::from_fen(fen, variant).unwrap();
    search_position(&Position::new(board), TimeControl::Depth(depth))
}

#[test]
fn startpos_returns_a_legal_move() {
    let position = Position::new(Board::default());
    let report = search_position(&position, TimeControl::Depth(1));

    let best = report.best_move().expect("depth 1 finds a move");
    assert!(position.board.legal_moves().contains(&best));
    assert!(report.nodes > 20);
}

#[test]
fn mate_in_one_is_found() {
    // A back-rank mate: Re8 is the only mating move.
    let report = search_fen("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1", Variant::Standard, 4);

    assert_eq!(report.best_move().unwrap().to_string(), "e1e8");
    assert_eq!(report.score, Score::MATE - 1);
}

#[test]
fn rook_endgame_is_winning() {
    let report = search_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Variant::Standard, 5);

    assert!(report.score > 300, "score was {}", report.score);
    assert!(report.best_move().is_some());
}

#[test]
fn dead_draws_return_an_empty_pv() {
    let report = search_fen("8/8/8/8/8/8/8/K1k5 w - - 0 1", Variant::Standard, 4);

    assert!(report.pv.is_empty());
    assert_eq!(report.score, 0);
}

#[test]
fn threefold_repetition_returns_an_empty_pv() {
    let mut position = Position::new("4k3/8/8/8/8/8/8/4K2R w - - 0 1".parse().unwrap());

    // Two full king shuffles: the start position occurs for the third
    // time.
    for _ in 0..2 {
        for mv in ["e1d1", "e8d8", "d1e1", "d8e8"] {
            position = position.play_bare_move(mv.parse().unwrap()).unwrap();
        }
    }

    assert_eq!(position.repetitions(), 3);

    let report = search_position(&position, TimeControl::Depth(4));
    assert!(report.pv.is_empty());
    assert_eq!(report.score, 0);
}

#[test]
fn racing_kings_never_gives_check() {
    let board =
        Board::from_fen(Variant::RacingKings.start_fen(), Variant::RacingKings).unwrap();
    let position = Position::new(board);

    let report = search_position(&position, TimeControl::Depth(3));
    assert!(!report.pv.is_empty());

    // Replay the PV: no move along it may leave anyone in check.
    let mut current = position;
    for &mv in &report.pv {
        current = current.play_move(mv);
        assert!(!current.board.in_check(), "{mv} delivers a check");
    }
}

#[test]
fn atomic_start_search_completes() {
    let report = search_fen(Variant::Atomic.start_fen(), Variant::Atomic, 4);

    let best = report.best_move().expect("atomic start has moves");
    let board = Board::from_fen(Variant::Atomic.start_fen(), Variant::Atomic).unwrap();
    assert!(board.legal_moves().contains(&best));
}

#[test]
fn horde_start_search_completes() {
    let report = search_fen(Variant::Horde.start_fen(), Variant::Horde, 3);

    let best = report.best_move().expect("horde start has moves");
    let board = Board::from_fen(Variant::Horde.start_fen(), Variant::Horde).unwrap();
    assert!(board.legal_moves().contains(&best));
}

#[test]
fn ignored_root_moves_are_skipped() {
    let board: Board = "6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1".parse().unwrap();
    let position = Position::new(board);

    let mate = position
        .board
        .legal_moves()
        .into_iter()
        .find(|mv| mv.to_string() == "e1e8")
        .unwrap();

    let mut tt = TTable::with_capacity(16);
    let mut pv_table = PvTable::new();
    let mut history = HistoryTable::new();
    let mut eval_cache = EvalCache::new();
    let (mut tc, _handle) =
        TimeController::new(TimeControl::Depth(4), &position.board, false, false);

    let report = Searcher::new(
        &mut tc,
        &mut tt,
        &mut pv_table,
        &mut history,
        &mut eval_cache,
    )
    .ignoring(vec![mate])
    .play(&position, &mut NullLogger);

    let best = report.best_move().expect("other moves remain");
    assert_ne!(best, mate);
    assert_ne!(report.score, Score::MATE - 1);
}

#[test]
fn timed_searches_always_produce_a_move() {
    let position = Position::new(Board::default());
    let report = search_position(
        &position,
        TimeControl::FixedTime(Duration::from_millis(40)),
    );

    assert!(report.best_move().is_some());
}

#[test]
fn deeper_searches_do_not_lose_the_mate() {
    // The mate score must survive the transposition table across
    // iterations, ply adjustment included.
    let report = search_fen("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1", Variant::Standard, 8);

    assert_eq!(report.score, Score::MATE - 1);
    assert_eq!(report.best_move().unwrap().to_string(), "e1e8");
}
