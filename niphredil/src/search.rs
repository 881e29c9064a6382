//! The search: iterative deepening around an aspiration-windowed,
//! fail-soft negamax with quiescence at the leaves.
//!
//! The deepening loop re-searches the position at increasing depths until
//! the time controller calls a halt. Each completed iteration seeds the
//! next: its score centers the next aspiration window, its exact nodes
//! populate the principal-variation table, and its cutoffs train the
//! killer slots and history counters that order moves the next time
//! around. That reuse is what makes re-searching from scratch cheaper than
//! searching once, deep.
//!
//! Cancellation is cooperative: the searcher polls the time controller
//! every few thousand nodes, and when the hard deadline passes it unwinds
//! without side effects. Only fully completed iterations are ever
//! reported.

pub(crate) mod params;
mod aspiration;
mod negamax;
mod quiescence;

use crate::evaluate::cache::EvalCache;
use crate::evaluate::Score;
use crate::evaluate::ScoreExt;
use crate::history_tables::history::HistoryTable;
use crate::history_tables::pv::PvTable;
use crate::logger::SearchLogger;
use crate::move_picker::MoveStack;
use crate::position::Position;
use crate::time_control::TimeController;
use crate::transpositions::TTable;
use chess::moves::Move;
use self::params::*;
use std::time::Duration;
use uci::search_info::Score as UciScore;
use uci::search_info::SearchInfo;

/// A single search, borrowing the engine's long-lived tables.
pub struct Searcher<'a> {
    pub tc: &'a mut TimeController,
    pub tt: &'a mut TTable,
    pub pv_table: &'a mut PvTable,
    pub history: &'a mut HistoryTable,
    pub eval_cache: &'a mut EvalCache,

    /// Root moves the caller wants left out of this search.
    ignored: Vec<Move>,

    /// Per-ply move ordering state.
    move_stack: MoveStack,

    pub stats: SearchStats,

    /// Latched once the time controller says stop; the unwind discards
    /// everything computed after it.
    stopped: bool,

    /// The node count at which to poll the time controller next.
    next_checkpoint: u64,
}

/// Counters reset at the start of every `play`.
#[derive(Debug, Default, Copy, Clone)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth: i32,
    pub seldepth: i32,
}

impl<'a> Searcher<'a> {
    pub fn new(
        tc: &'a mut TimeController,
        tt: &'a mut TTable,
        pv_table: &'a mut PvTable,
        history: &'a mut HistoryTable,
        eval_cache: &'a mut EvalCache,
    ) -> Self {
        Self {
            tc,
            tt,
            pv_table,
            history,
            eval_cache,
            ignored: Vec::new(),
            move_stack: MoveStack::new(),
            stats: SearchStats::default(),
            stopped: false,
            next_checkpoint: CHECKPOINT_NODES,
        }
    }

    /// Leave the given root moves out of the search entirely.
    pub fn ignoring(mut self, moves: Vec<Move>) -> Self {
        self.ignored = moves;
        self
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Iterative deepening
    //
    ////////////////////////////////////////////////////////////////////////////

    /// Search the position and return the result of the last fully
    /// completed iteration. An empty PV means the game is already over.
    pub fn play(&mut self, pos: &Position, logger: &mut dyn SearchLogger) -> SearchReport {
        self.stats = SearchStats::default();
        self.stopped = false;
        self.next_checkpoint = CHECKPOINT_NODES;
        self.move_stack.clear();
        self.eval_cache.hits = 0;
        self.eval_cache.misses = 0;

        logger.begin_search(pos);

        let mut latest = SearchReport::default();

        for depth in 0..MAX_DEPTH {
            if !self.tc.next_depth(depth) {
                break;
            }

            self.tc.start_depth(depth);

            let score = self.aspiration(pos, depth as i32, latest.score);

            // A stopped iteration is partial garbage; keep the previous one.
            if self.stopped {
                break;
            }

            self.stats.depth = depth as i32;

            latest = SearchReport {
                depth: depth as u8,
                seldepth: self.stats.seldepth as u8,
                nodes: self.stats.nodes,
                cache_hits: self.eval_cache.hits,
                cache_misses: self.eval_cache.misses,
                score,
                pv: self.pv_table.collect(pos),
                duration: self.tc.elapsed(),
                hashfull: self.tt.hashfull(),
            };

            logger.print_pv(&latest);
        }

        logger.end_search(&latest);
        latest
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Search reports
//
////////////////////////////////////////////////////////////////////////////////

/// The outcome of the last completed iteration, as handed to the front-end.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub depth: u8,
    pub seldepth: u8,
    pub nodes: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub score: Score,
    pub pv: Vec<Move>,
    pub duration: Duration,
    pub hashfull: u32,
}

impl SearchReport {
    /// The move to play, if the search found one.
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }

    /// The expected reply, for pondering.
    pub fn ponder_move(&self) -> Option<Move> {
        self.pv.get(1).copied()
    }
}

impl From<&SearchReport> for SearchInfo {
    fn from(report: &SearchReport) -> Self {
        let nps = (1_000_000 * report.nodes as u128)
            .checked_div(report.duration.as_micros())
            .unwrap_or_default() as u64;

        Self {
            depth: Some(report.depth),
            seldepth: Some(report.seldepth),
            time: Some(report.duration.as_millis() as u64),
            nodes: Some(report.nodes),
            nps: Some(nps),
            hashfull: Some(report.hashfull),
            score: Some(report.score.to_uci()),
            pv: report.pv.clone(),
        }
    }
}

trait ScoreUciExt {
    fn to_uci(self) -> UciScore;
}

impl ScoreUciExt for Score {
    fn to_uci(self) -> UciScore {
        if self.is_mate() {
            // Plies to mate, rounded up into full moves, negative when we
            // are the one getting mated.
            UciScore::Mate(self.signum() * (self.mate_distance() + 1) / 2)
        } else {
            UciScore::Cp(self)
        }
    }
}
