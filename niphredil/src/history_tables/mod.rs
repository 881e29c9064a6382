//! The search's long-lived memory: the history counters and the principal
//! variation table. Both survive across iterations of the deepening loop
//! (and across searches, until a new game clears them).

pub mod history;
pub mod pv;
