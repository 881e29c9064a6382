//! A fixed-depth benchmark over a small suite of positions, for
//! comparing builds and catching search regressions by node count.

use crate::evaluate::cache::EvalCache;
use crate::history_tables::history::HistoryTable;
use crate::history_tables::pv::PvTable;
use crate::logger::NullLogger;
use crate::position::Position;
use crate::search::Searcher;
use crate::time_control::TimeController;
use crate::transpositions::TTable;
use chess::board::Board;
use chess::variant::Variant;
use colored::Colorize;
use itertools::Itertools;
use std::time::Instant;
use uci::time_control::TimeControl;

const BENCH_POSITIONS: [(&str, Variant); 8] = [
    (
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        Variant::Standard,
    ),
    (
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        Variant::Standard,
    ),
    (
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        Variant::Standard,
    ),
    (
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        Variant::Standard,
    ),
    ("8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1", Variant::RacingKings),
    (
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        Variant::Atomic,
    ),
    (
        "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1",
        Variant::Horde,
    ),
    ("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Variant::Standard),
];

pub fn run(depth: usize) -> anyhow::Result<()> {
    let mut total_nodes = 0;
    let start = Instant::now();

    for (fen, variant) in BENCH_POSITIONS {
        let board = Board::from_fen(fen, variant)?;
        let position = Position::new(board);

        let mut tt = TTable::with_capacity(16);
        let mut pv_table = PvTable::new();
        let mut history = HistoryTable::new();
        let mut eval_cache = EvalCache::new();

        let (mut tc, _handle) =
            TimeController::new(TimeControl::Depth(depth), &position.board, false, false);

        let report = Searcher::new(
            &mut tc,
            &mut tt,
            &mut pv_table,
            &mut history,
            &mut eval_cache,
        )
        .play(&position, &mut NullLogger);

        total_nodes += report.nodes;

        let pv = report.pv.iter().map(|mv| mv.to_string()).join(" ");

        println!(
            "{:>9} nodes  {:>7} {}  {}",
            report.nodes,
            format!("[{variant}]").bright_black(),
            fen,
            pv.blue(),
        );
    }

    let elapsed = start.elapsed();
    let nps = (total_nodes as f64 / elapsed.as_secs_f64()) as u64;

    println!();
    println!(
        "{}: {total_nodes} nodes in {:.2}s ({} nps)",
        "bench".green(),
        elapsed.as_secs_f64(),
        nps
    );

    Ok(())
}
