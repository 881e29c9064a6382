//! The rule sets the engine can play.

use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Variant {
    /// Orthodox chess.
    #[default]
    Standard,

    /// Both kings race for the eighth rank. Checks are forbidden entirely,
    /// there is no castling, and the game ends when a king arrives (with
    /// Black granted one equalising reply to White's arrival).
    RacingKings,

    /// Captures explode: the captured piece, the capturing piece, and every
    /// non-pawn piece on the eight surrounding squares are removed. Blowing
    /// up the enemy king wins.
    Atomic,

    /// White fields a kingless horde of pawns and must be eradicated to
    /// lose; Black plays a regular army and loses by regular checkmate.
    Horde,
}

impl Variant {
    /// The starting position for the variant.
    pub fn start_fen(self) -> &'static str {
        match self {
            Variant::Standard | Variant::Atomic => {
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            }
            Variant::RacingKings => "8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1",
            Variant::Horde => {
                "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1"
            }
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Standard => write!(f, "standard"),
            Variant::RacingKings => write!(f, "racingkings"),
            Variant::Atomic => write!(f, "atomic"),
            Variant::Horde => write!(f, "horde"),
        }
    }
}

impl FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "chess" => Ok(Variant::Standard),
            "racingkings" | "racing" => Ok(Variant::RacingKings),
            "atomic" => Ok(Variant::Atomic),
            "horde" => Ok(Variant::Horde),
            _ => Err(anyhow!("Unknown variant: {s}")),
        }
    }
}
