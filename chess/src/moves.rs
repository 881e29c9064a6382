//! Moves, packed into 16 bits.
//!
//! 6 bits for the source square, 6 bits for the target square, and 4 flag
//! bits encoding captures, promotions, castles, double pushes and en-passant.
//! The flag bits are laid out so that bit 14 doubles as the capture flag and
//! bit 15 as the promotion flag.

use crate::piece::PieceType;
use crate::square::Square;
use anyhow::anyhow;
use itertools::Itertools;
use std::fmt::Display;
use std::str::FromStr;

#[rustfmt::skip]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u16)]
pub enum MoveType {
    Quiet              = 0b0000,
    DoublePush         = 0b0001,
    KingCastle         = 0b0010,
    QueenCastle        = 0b0011,
    Capture            = 0b0100,
    EnPassant          = 0b0101,
    KnightPromo        = 0b1000,
    BishopPromo        = 0b1001,
    RookPromo          = 0b1010,
    QueenPromo         = 0b1011,
    KnightPromoCapture = 0b1100,
    BishopPromoCapture = 0b1101,
    RookPromoCapture   = 0b1110,
    QueenPromoCapture  = 0b1111,
}

impl MoveType {
    // Indexable by the raw flag nibble. The two unused encodings decode as
    // quiet moves.
    const ALL: [MoveType; 16] = [
        MoveType::Quiet,
        MoveType::DoublePush,
        MoveType::KingCastle,
        MoveType::QueenCastle,
        MoveType::Capture,
        MoveType::EnPassant,
        MoveType::Quiet,
        MoveType::Quiet,
        MoveType::KnightPromo,
        MoveType::BishopPromo,
        MoveType::RookPromo,
        MoveType::QueenPromo,
        MoveType::KnightPromoCapture,
        MoveType::BishopPromoCapture,
        MoveType::RookPromoCapture,
        MoveType::QueenPromoCapture,
    ];
}

/// A move, packed into a u16.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Move(u16);

impl Move {
    const SRC_MASK: u16 = 0b0000_0000_0011_1111;
    const TGT_MASK: u16 = 0b0000_1111_1100_0000;
    const TYPE_MASK: u16 = 0b1111_0000_0000_0000;

    /// The all-zero move, used as a sentinel throughout the search tables.
    pub const NULL: Move = Move(0);

    pub fn new(src: Square, tgt: Square, mtype: MoveType) -> Move {
        Move(src as u16 | (tgt as u16) << 6 | (mtype as u16) << 12)
    }

    /// The packed representation, for hashing moves into small tables.
    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn src(self) -> Square {
        Square::from((self.0 & Self::SRC_MASK) as usize)
    }

    pub fn tgt(self) -> Square {
        Square::from(((self.0 & Self::TGT_MASK) >> 6) as usize)
    }

    pub fn move_type(self) -> MoveType {
        MoveType::ALL[((self.0 & Self::TYPE_MASK) >> 12) as usize]
    }

    pub fn is_quiet(self) -> bool {
        self.move_type() == MoveType::Quiet
    }

    pub fn is_capture(self) -> bool {
        self.0 & (1 << 14) != 0
    }

    pub fn is_promotion(self) -> bool {
        self.0 & (1 << 15) != 0
    }

    pub fn is_castle(self) -> bool {
        matches!(
            self.move_type(),
            MoveType::KingCastle | MoveType::QueenCastle
        )
    }

    pub fn is_double_push(self) -> bool {
        self.move_type() == MoveType::DoublePush
    }

    pub fn is_en_passant(self) -> bool {
        self.move_type() == MoveType::EnPassant
    }

    /// Captures and queen promotions. This is the class of moves the
    /// quiescence search explores.
    pub fn is_violent(self) -> bool {
        self.is_capture() || self.promo_type() == Some(PieceType::Queen)
    }

    /// The square the captured piece stands on: the target square, except for
    /// en-passant captures where the victim sits one rank behind the target.
    /// The mover's side is inferred from the target rank, since en-passant
    /// targets only ever sit on ranks 3 and 6.
    pub fn capture_square(self) -> Square {
        if self.is_en_passant() {
            let tgt = self.tgt();
            if tgt.rank() == 5 {
                Square::from(tgt as usize - 8)
            } else {
                Square::from(tgt as usize + 8)
            }
        } else {
            self.tgt()
        }
    }

    pub fn promo_type(self) -> Option<PieceType> {
        use MoveType::*;
        use PieceType::*;

        match self.move_type() {
            KnightPromo | KnightPromoCapture => Some(Knight),
            BishopPromo | BishopPromoCapture => Some(Bishop),
            RookPromo | RookPromoCapture => Some(Rook),
            QueenPromo | QueenPromoCapture => Some(Queen),
            _ => None,
        }
    }
}

impl Display for Move {
    /// Print the move in UCI long algebraic notation, e.g. `e2e4`, `a7a8q`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.src(), self.tgt())?;

        match self.promo_type() {
            Some(PieceType::Knight) => write!(f, "n"),
            Some(PieceType::Bishop) => write!(f, "b"),
            Some(PieceType::Rook) => write!(f, "r"),
            Some(PieceType::Queen) => write!(f, "q"),
            _ => Ok(()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Bare moves
//
// Moves as they come in over the wire: source, target and an optional
// promotion, without any of the flag context a Move carries. A bare move is
// resolved against the legal moves of a position to recover the full Move.
//
////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BareMove {
    pub src: Square,
    pub tgt: Square,
    pub promo_type: Option<PieceType>,
}

impl FromStr for BareMove {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let chunks = s.chars().chunks(2);
        let mut chunks = chunks.into_iter().map(|chunk| chunk.collect::<String>());

        let src: Square = chunks
            .next()
            .ok_or(anyhow!("Not a valid move: {s}"))?
            .parse()?;

        let tgt: Square = chunks
            .next()
            .ok_or(anyhow!("Not a valid move: {s}"))?
            .parse()?;

        let promo_type = match chunks.next().as_deref() {
            Some("n") | Some("N") => Some(PieceType::Knight),
            Some("b") | Some("B") => Some(PieceType::Bishop),
            Some("r") | Some("R") => Some(PieceType::Rook),
            Some("q") | Some("Q") => Some(PieceType::Queen),
            Some(other) => Err(anyhow!("Not a valid promotion: {other}"))?,
            None => None,
        };

        Ok(BareMove {
            src,
            tgt,
            promo_type,
        })
    }
}

impl Display for BareMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.src, self.tgt)?;

        match self.promo_type {
            Some(PieceType::Knight) => write!(f, "n"),
            Some(PieceType::Bishop) => write!(f, "b"),
            Some(PieceType::Rook) => write!(f, "r"),
            Some(PieceType::Queen) => write!(f, "q"),
            _ => Ok(()),
        }
    }
}

impl PartialEq<BareMove> for Move {
    fn eq(&self, bare: &BareMove) -> bool {
        self.src() == bare.src
            && self.tgt() == bare.tgt
            && self.promo_type() == bare.promo_type
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////
