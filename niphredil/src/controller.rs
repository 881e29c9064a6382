//! The UCI front-end: a listener on stdin that relays commands to a
//! long-lived search thread over a channel.
//!
//! The listener thread never searches; it owns the time-control handle and
//! flips its atomic flags on `stop` and `ponderhit` while the search
//! thread grinds away. The search thread owns every long-lived table.

use crate::evaluate::cache::EvalCache;
use crate::history_tables::history::HistoryTable;
use crate::history_tables::pv::PvTable;
use crate::logger::UciLogger;
use crate::position::Position;
use crate::search::params::DEFAULT_TT_SIZE;
use crate::search::Searcher;
use crate::time_control::TimeControlHandle;
use crate::time_control::TimeController;
use crate::transpositions::TTable;
use chess::board::Board;
use chess::variant::Variant;
use colored::Colorize;
use std::io::BufRead;
use std::io::Write;
use uci::client::UciClientMessage;
use uci::engine::IdType;
use uci::engine::UciEngineMessage;
use uci::options::OptionType;
use uci::options::UciOption;

const NAME: &str = "Niphredil";
const VERSION: &str = env!("CARGO_PKG_VERSION");

const UCI_OPTIONS: [UciOption; 3] = [
    UciOption {
        name: "Hash",
        option_type: OptionType::Spin {
            min: 4,
            max: 1024,
            default: DEFAULT_TT_SIZE as i32,
        },
    },
    UciOption {
        name: "Ponder",
        option_type: OptionType::Check { default: true },
    },
    UciOption {
        name: "UCI_Variant",
        option_type: OptionType::Combo {
            default: "standard",
            choices: &["standard", "racingkings", "atomic", "horde"],
        },
    },
];

/// Wires stdin/stdout of the process to the search thread.
pub struct UciController {
    variant: Variant,
    position: Position,
    tc_handle: Option<TimeControlHandle>,
    search_thread: SearchThread,
}

impl UciController {
    pub fn new() -> Self {
        Self {
            variant: Variant::Standard,
            position: start_position(Variant::Standard),
            tc_handle: None,
            search_thread: SearchThread::spawn(),
        }
    }

    /// Listen on stdin until `quit`.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = std::io::stdin().lock();

        eprintln!("{} {}", NAME.blue(), VERSION.blue());

        for input in stdin.lines() {
            let input = input?;

            if input.trim().is_empty() {
                continue;
            }

            match input.trim().parse::<UciClientMessage>() {
                Ok(command) => {
                    if self.handle(command)? {
                        break;
                    }
                }

                Err(err) => println!("{err}"),
            }

            std::io::stdout().flush()?;
        }

        Ok(())
    }

    /// Process one command. Returns true on `quit`.
    fn handle(&mut self, command: UciClientMessage) -> anyhow::Result<bool> {
        match command {
            UciClientMessage::Uci => {
                println!("{}", UciEngineMessage::Id(IdType::Name(format!("{NAME} {VERSION}"))));
                println!(
                    "{}",
                    UciEngineMessage::Id(IdType::Author("the niphredil authors".into()))
                );

                for option in UCI_OPTIONS {
                    println!("option {option}");
                }

                println!("{}", UciEngineMessage::UciOk);
            }

            UciClientMessage::IsReady => println!("{}", UciEngineMessage::ReadyOk),

            UciClientMessage::Debug(_) => {}

            UciClientMessage::UciNewGame => {
                self.position = start_position(self.variant);
                self.tc_handle = None;
                self.search_thread.clear_tables();
            }

            UciClientMessage::SetOption(name, value) => match name.as_str() {
                "Hash" => self.search_thread.resize_tt(value.parse()?),

                "UCI_Variant" => {
                    self.variant = value.parse()?;
                    self.position = start_position(self.variant);
                }

                // Pondering needs no preparation on our side.
                "Ponder" => {}

                other => eprintln!("Unknown option: {other}"),
            },

            UciClientMessage::Position(fen, moves) => {
                let board = match fen {
                    Some(fen) => Board::from_fen(&fen, self.variant)?,
                    None => Board::from_fen(self.variant.start_fen(), self.variant)?,
                };

                let mut position = Position::new(board);

                for mv in moves {
                    position = position.play_bare_move(mv)?;
                }

                self.position = position;
            }

            UciClientMessage::Go(tc, ponder) => {
                let (controller, handle) =
                    TimeController::new(tc, &self.position.board, ponder, false);

                self.tc_handle = Some(handle);
                self.search_thread.search(self.position.clone(), controller);
            }

            UciClientMessage::PonderHit => {
                if let Some(handle) = &self.tc_handle {
                    handle.ponder_hit();
                }
            }

            UciClientMessage::Stop => {
                if let Some(handle) = &self.tc_handle {
                    handle.stop();
                }
            }

            UciClientMessage::Quit => return Ok(true),
        }

        Ok(false)
    }
}

impl Default for UciController {
    fn default() -> Self {
        Self::new()
    }
}

fn start_position(variant: Variant) -> Position {
    Position::new(
        Board::from_fen(variant.start_fen(), variant).expect("The start FENs parse"),
    )
}

////////////////////////////////////////////////////////////////////////////////
//
// The search thread
//
////////////////////////////////////////////////////////////////////////////////

/// A handle to the thread that owns the tables and runs the searches.
struct SearchThread {
    tx: std::sync::mpsc::Sender<SearchCommand>,
}

enum SearchCommand {
    Search(Position, TimeController),
    Clear,
    ResizeTT(usize),
}

impl SearchThread {
    fn spawn() -> Self {
        let (tx, rx) = std::sync::mpsc::channel::<SearchCommand>();

        std::thread::spawn(move || {
            let mut tt = TTable::with_capacity(DEFAULT_TT_SIZE);
            let mut pv_table = PvTable::new();
            let mut history = HistoryTable::new();
            let mut eval_cache = EvalCache::new();

            for command in rx.iter() {
                match command {
                    SearchCommand::Search(position, mut tc) => {
                        let report = Searcher::new(
                            &mut tc,
                            &mut tt,
                            &mut pv_table,
                            &mut history,
                            &mut eval_cache,
                        )
                        .play(&position, &mut UciLogger);

                        match report.best_move() {
                            Some(best) => println!(
                                "{}",
                                UciEngineMessage::BestMove(best, report.ponder_move())
                            ),

                            // No move to play: the game is already over.
                            None => println!("bestmove (none)"),
                        }
                    }

                    SearchCommand::Clear => {
                        tt.clear();
                        pv_table.clear();
                        history.clear();
                        eval_cache.clear();
                    }

                    SearchCommand::ResizeTT(mb_size) => {
                        tt = TTable::with_capacity(mb_size);
                    }
                }
            }
        });

        Self { tx }
    }

    fn search(&self, position: Position, tc: TimeController) {
        self.tx
            .send(SearchCommand::Search(position, tc))
            .expect("The search thread outlives the listener");
    }

    fn clear_tables(&self) {
        self.tx
            .send(SearchCommand::Clear)
            .expect("The search thread outlives the listener");
    }

    fn resize_tt(&self, mb_size: usize) {
        self.tx
            .send(SearchCommand::ResizeTT(mb_size))
            .expect("The search thread outlives the listener");
    }
}
