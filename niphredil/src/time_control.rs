//! Budgeting the clock for a single search.
//!
//! Two deadlines govern a timed search. The *search deadline* is the
//! point past which starting another deepening iteration is a waste: it
//! divides the move's time budget by a crude branching-factor proxy, since
//! a fresh iteration costs that many times the previous one. The *stop
//! deadline* is the hard wall at which an iteration in progress is
//! abandoned mid-tree.
//!
//! Nothing blocks on these deadlines. The searcher polls, every ten
//! thousand nodes, and the first two iterations are never interrupted so
//! there is always a move to play.
//!
//! Pondering holds both deadlines open; the ponder-hit signal re-anchors
//! them at the current instant, with a bonus for having guessed the
//! opponent's reply.

use chess::board::Board;
use chess::piece::Color;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;
use uci::time_control::TimeControl;

use crate::search::params::MAX_DEPTH;

/// Slack held back from the clock for protocol overhead.
const OVERHEAD: Duration = Duration::from_millis(20);

/// Assumed moves remaining when the clock does not say.
const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Stand-in for "no deadline".
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[derive(Debug)]
struct Deadlines {
    /// Do not start a new iteration past this point.
    search: Instant,

    /// Abandon the search outright past this point.
    stop: Instant,

    /// The move's time budget, kept for ponder-hit recomputation.
    search_time: Duration,

    /// Upper bound on any spend this move.
    limit: Duration,

    /// Branching-factor proxy dividing the per-iteration budget.
    branch: u32,
}

#[derive(Debug)]
struct Shared {
    /// Sticky stop flag: set externally on `stop`, or latched when the
    /// stop deadline passes.
    stopped: AtomicBool,

    /// Whether the opponent has played the move we pondered on.
    ponder_hit: AtomicBool,

    deadlines: Mutex<Deadlines>,
}

pub struct TimeController {
    shared: Arc<Shared>,
    start: Instant,
    depth_limit: usize,
    node_limit: Option<u64>,

    /// The iteration currently being searched; the first two are immune
    /// to every stopping condition.
    current_depth: usize,
}

/// A cloneable handle for the front-end thread to signal the search.
#[derive(Clone)]
pub struct TimeControlHandle {
    shared: Arc<Shared>,
}

impl TimeController {
    /// Set up the clock budget for one search.
    ///
    /// `ponder` holds the deadlines open until the ponder-hit arrives;
    /// `predicted` grants the guessed-right bonus up front, for front-ends
    /// that track expected replies themselves.
    pub fn new(
        tc: TimeControl,
        board: &Board,
        ponder: bool,
        predicted: bool,
    ) -> (Self, TimeControlHandle) {
        let now = Instant::now();
        let far = now + FAR_FUTURE;

        let mut depth_limit = MAX_DEPTH - 1;
        let mut node_limit = None;

        let mut deadlines = Deadlines {
            search: far,
            stop: far,
            search_time: FAR_FUTURE,
            limit: FAR_FUTURE,
            branch: 1,
        };

        match tc {
            TimeControl::Infinite => {}

            TimeControl::Depth(depth) => depth_limit = depth,

            TimeControl::Nodes(nodes) => node_limit = Some(nodes),

            TimeControl::FixedTime(time) => {
                let budget = time.saturating_sub(OVERHEAD).max(Duration::from_millis(1));
                deadlines.search_time = budget;
                deadlines.limit = budget;
                deadlines.search = now + budget;
                deadlines.stop = now + budget;
            }

            TimeControl::Clock {
                wtime,
                btime,
                winc,
                binc,
                movestogo,
            } => {
                let white = board.current == Color::White;
                let time = if white { wtime } else { btime };
                let inc = if white { winc } else { binc }.unwrap_or_default();
                let mtg = movestogo.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);

                // One extra branch step for every six pieces on the board,
                // and more urgency as the time control comes up for
                // renewal.
                let mut branch = 2 + board.all_occupied().count() / 6;
                branch += (mtg <= 4) as u32;
                branch += (mtg <= 2) as u32;
                branch += (mtg <= 1) as u32;

                let mut search_time = time / mtg + inc * (mtg - 1) / mtg;

                if predicted {
                    search_time = search_time * 4 / 3;
                }

                let limit = if time > OVERHEAD * 2 {
                    time - OVERHEAD
                } else if time > OVERHEAD {
                    OVERHEAD
                } else {
                    time
                };

                let search_time = search_time.min(limit);

                deadlines.search_time = search_time;
                deadlines.limit = limit;
                deadlines.branch = branch;
                deadlines.search = now + search_time / branch;
                deadlines.stop = now + (search_time * 4).min(limit);
            }
        }

        // While pondering, the clock is the opponent's problem.
        if ponder {
            deadlines.search = far;
            deadlines.stop = far;
        }

        let shared = Arc::new(Shared {
            stopped: AtomicBool::new(false),
            ponder_hit: AtomicBool::new(!ponder),
            deadlines: Mutex::new(deadlines),
        });

        let controller = TimeController {
            shared: shared.clone(),
            start: now,
            depth_limit,
            node_limit,
            current_depth: 0,
        };

        (controller, TimeControlHandle { shared })
    }

    /// Whether a new iteration at `depth` is worth starting. The first
    /// iterations always are: a search must produce a move.
    pub fn next_depth(&self, depth: usize) -> bool {
        if depth > self.depth_limit {
            return false;
        }

        if depth <= 2 {
            return true;
        }

        if self.shared.stopped.load(Ordering::SeqCst) {
            return false;
        }

        let deadlines = self.shared.deadlines.lock().unwrap();
        Instant::now() < deadlines.search
    }

    /// Note which iteration the searcher is on.
    pub fn start_depth(&mut self, depth: usize) {
        self.current_depth = depth;
    }

    /// Polled from inside the tree. Returns false once the search must
    /// unwind; passing the hard deadline latches the sticky stop flag.
    pub fn should_continue(&self, nodes: u64) -> bool {
        if self.current_depth <= 2 {
            return true;
        }

        if self.node_limit.is_some_and(|limit| nodes >= limit) {
            return false;
        }

        if self.shared.stopped.load(Ordering::SeqCst) {
            return false;
        }

        let deadlines = self.shared.deadlines.lock().unwrap();

        if Instant::now() >= deadlines.stop {
            self.shared.stopped.store(true, Ordering::SeqCst);
            return false;
        }

        true
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    pub fn ponder_hit_received(&self) -> bool {
        self.shared.ponder_hit.load(Ordering::SeqCst)
    }
}

impl TimeControlHandle {
    /// Abort the search as soon as it next polls.
    pub fn stop(&self) {
        self.shared.stopped.store(true, Ordering::SeqCst);
    }

    /// The opponent played the expected move: the ponder search is now
    /// live. Deadlines restart at this instant, with the guessed-right
    /// bonus applied to the budget.
    pub fn ponder_hit(&self) {
        self.shared.ponder_hit.store(true, Ordering::SeqCst);

        let mut deadlines = self.shared.deadlines.lock().unwrap();
        let now = Instant::now();

        if deadlines.search_time < FAR_FUTURE {
            deadlines.search_time = deadlines.search_time * 4 / 3;
            deadlines.search = now + deadlines.search_time / deadlines.branch;
            deadlines.stop = now + (deadlines.search_time * 4).min(deadlines.limit);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_limits_are_enforced() {
        let board = Board::default();
        let (tc, _handle) = TimeController::new(TimeControl::Depth(1), &board, false, false);

        assert!(tc.next_depth(0));
        assert!(tc.next_depth(1));
        assert!(!tc.next_depth(2));
    }

    #[test]
    fn early_depths_never_stop() {
        let board = Board::default();
        let (mut tc, handle) =
            TimeController::new(TimeControl::FixedTime(Duration::ZERO), &board, false, false);

        tc.start_depth(1);
        handle.stop();

        // Even with the flag raised and the deadline long gone, the first
        // iterations run to completion.
        assert!(tc.should_continue(1_000_000));

        tc.start_depth(3);
        assert!(!tc.should_continue(1_000_001));
    }

    #[test]
    fn node_limits_are_enforced() {
        let board = Board::default();
        let (mut tc, _handle) =
            TimeController::new(TimeControl::Nodes(5000), &board, false, false);

        tc.start_depth(5);
        assert!(tc.should_continue(4999));
        assert!(!tc.should_continue(5001));
    }

    #[test]
    fn external_stop_is_sticky() {
        let board = Board::default();
        let (mut tc, handle) =
            TimeController::new(TimeControl::Infinite, &board, false, false);

        tc.start_depth(10);
        assert!(tc.should_continue(50_000));

        handle.stop();
        assert!(!tc.should_continue(60_000));
        assert!(tc.stopped());
        assert!(!tc.next_depth(11));
    }

    #[test]
    fn pondering_holds_the_deadlines_open() {
        let board = Board::default();
        let tc_type = TimeControl::Clock {
            wtime: Duration::from_millis(1),
            btime: Duration::from_millis(1),
            winc: None,
            binc: None,
            movestogo: Some(1),
        };

        let (mut tc, handle) = TimeController::new(tc_type, &board, true, false);
        tc.start_depth(20);

        // One millisecond on the clock, but we are pondering.
        assert!(tc.should_continue(100_000));
        assert!(!tc.ponder_hit_received());

        handle.ponder_hit();
        assert!(tc.ponder_hit_received());
    }
}
