//! Search output as a capability.
//!
//! The searcher reports through this trait instead of printing directly,
//! so the UCI driver, the bench harness and the tests can each listen in
//! their own way (or not at all).

use crate::position::Position;
use crate::search::SearchReport;
use std::io::IsTerminal;
use uci::engine::UciEngineMessage;
use uci::search_info::SearchInfo;

pub trait SearchLogger {
    fn begin_search(&mut self, _pos: &Position) {}
    fn print_pv(&mut self, _report: &SearchReport) {}
    fn end_search(&mut self, _report: &SearchReport) {}
}

/// Swallows everything. Satisfies the contract for tests and benches.
pub struct NullLogger;

impl SearchLogger for NullLogger {}

/// Prints one line per completed iteration: pretty when a human is
/// watching, UCI `info` lines when a GUI is driving.
pub struct UciLogger;

impl SearchLogger for UciLogger {
    fn print_pv(&mut self, report: &SearchReport) {
        let info = SearchInfo::from(report);

        if std::io::stdout().is_terminal() {
            println!("{}", info.to_pretty());
        } else {
            println!("{}", UciEngineMessage::Info(info));
        }
    }
}
