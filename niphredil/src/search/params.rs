//! Fixed search parameters.

use crate::evaluate::Score;

/// The deepest nominal iteration the deepening loop will attempt.
pub const MAX_DEPTH: usize = 64;

/// Hard bound on recursion depth, extensions and quiescence included.
pub const MAX_PLY: usize = 128;

/// How many nodes pass between polls of the time controller.
pub const CHECKPOINT_NODES: u64 = 10_000;

/// Initial half-width of the aspiration window.
pub const ASPIRATION_WINDOW: Score = 21;

/// Futility margin per remaining ply of depth.
pub const FUTILITY_MARGIN: Score = 150;

/// A move is history-pruned when it has failed this many times more often
/// than it has succeeded.
pub const HISTORY_PRUNE_RATIO: u32 = 16;

/// Frontier futility and its friends only fire this close to the leaves.
pub const LEAF_PRUNING_DEPTH: i32 = 3;

/// Late-move reductions only fire above this depth.
pub const LMR_MIN_DEPTH: i32 = 3;

/// Default transposition table size, in MiB.
pub const DEFAULT_TT_SIZE: usize = 64;
