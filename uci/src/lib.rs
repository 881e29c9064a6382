//! Types and parsers for the UCI protocol, as spoken between the niphredil
//! engine and a driving GUI or match runner.

pub mod client;
pub mod engine;
pub mod options;
pub mod search_info;
pub mod time_control;
