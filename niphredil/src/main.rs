//! Niphredil: a UCI chess engine for orthodox chess, Racing Kings,
//! Atomic and Horde.

mod bench;
mod controller;
mod evaluate;
mod history_tables;
mod logger;
mod move_picker;
mod position;
mod search;
#[cfg(test)]
mod tests;
mod time_control;
mod transpositions;
mod zobrist;

use chess::board::Board;
use chess::variant::Variant;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "niphredil", version, about = "A multi-variant UCI chess engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a fixed-depth search over the bench suite and report node
    /// counts.
    Bench {
        #[arg(short, long, default_value_t = 7)]
        depth: usize,
    },

    /// Count move-generation leaf nodes for a position.
    Perft {
        depth: usize,

        #[arg(
            short,
            long,
            default_value = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        )]
        fen: String,

        #[arg(short, long, default_value = "standard")]
        variant: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => controller::UciController::new().run(),

        Some(Command::Bench { depth }) => bench::run(depth),

        Some(Command::Perft {
            depth,
            fen,
            variant,
        }) => {
            let variant: Variant = variant.parse()?;
            let board = Board::from_fen(&fen, variant)?;

            for (mv, nodes) in chess::perft::perft_divide(board, depth) {
                println!("{mv}: {nodes}");
            }

            println!("\n{}", chess::perft::perft(board, depth));
            Ok(())
        }
    }
}
