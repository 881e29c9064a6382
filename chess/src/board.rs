//! The board holds the complete state of a game at one instant in time,
//! along with the variant whose rules it is being played under.
//!
//! Boards are copy-make: playing a move returns a fresh board and never
//! mutates the original. History-related state (repetitions and the like)
//! lives with the caller.

use crate::attacks::bishop_attacks;
use crate::attacks::king_attacks;
use crate::attacks::knight_attacks;
use crate::attacks::pawn_attacks;
use crate::attacks::queen_attacks;
use crate::attacks::rook_attacks;
use crate::bitboard::Bitboard;
use crate::bitboard::RANKS;
use crate::moves::Move;
use crate::piece::Color;
use crate::piece::Piece;
use crate::piece::PieceType;
use crate::square::Square;
use crate::variant::Variant;
use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;

/// Squares of one shade, for the same-colored-bishops draw rule.
pub const DARK_SQUARES: Bitboard = Bitboard(0xAA55_AA55_AA55_AA55);
pub const LIGHT_SQUARES: Bitboard = Bitboard(0x55AA_55AA_55AA_55AA);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Board {
    /// The color of the player to move
    pub current: Color,

    /// Squares occupied by a given piece type, either color
    pub piece_bbs: [Bitboard; PieceType::COUNT],

    /// Squares occupied by a given side
    pub occupied_squares: [Bitboard; Color::COUNT],

    /// Per-square piece lookup, kept in sync with the bitboards
    pub piece_list: [Option<Piece>; Square::COUNT],

    /// Which castles are still allowed
    pub castling_rights: CastlingRights,

    /// The en-passant target square, if the last move was a double push
    pub en_passant: Option<Square>,

    /// Plies since the last capture or pawn advance, for the 50-move rule
    pub half_moves: u8,

    /// Full turns, starting at one, incremented after every Black move
    pub full_moves: u16,

    /// The rule set this board is played under
    pub variant: Variant,
}

////////////////////////////////////////////////////////////////////////////////
//
// Accessors
//
////////////////////////////////////////////////////////////////////////////////

impl Board {
    pub const EMPTY: Board = Board {
        current: Color::White,
        piece_bbs: [Bitboard::EMPTY; PieceType::COUNT],
        occupied_squares: [Bitboard::EMPTY; Color::COUNT],
        piece_list: [None; Square::COUNT],
        castling_rights: CastlingRights::NONE,
        en_passant: None,
        half_moves: 0,
        full_moves: 1,
        variant: Variant::Standard,
    };

    /// Get the occupation bitboard for a given side.
    pub fn occupied_by(&self, side: Color) -> Bitboard {
        self.occupied_squares[side]
    }

    /// Get the total occupation of the board
    pub fn all_occupied(&self) -> Bitboard {
        self.occupied_squares[Color::White] | self.occupied_squares[Color::Black]
    }

    /// Get the bitboard for a given piece type and side
    pub fn piece_bb(&self, side: Color, ptype: PieceType) -> Bitboard {
        self.piece_bbs[ptype] & self.occupied_by(side)
    }

    pub fn pawns(&self, side: Color) -> Bitboard {
        self.piece_bb(side, PieceType::Pawn)
    }

    pub fn knights(&self, side: Color) -> Bitboard {
        self.piece_bb(side, PieceType::Knight)
    }

    pub fn bishops(&self, side: Color) -> Bitboard {
        self.piece_bb(side, PieceType::Bishop)
    }

    pub fn rooks(&self, side: Color) -> Bitboard {
        self.piece_bb(side, PieceType::Rook)
    }

    pub fn queens(&self, side: Color) -> Bitboard {
        self.piece_bb(side, PieceType::Queen)
    }

    pub fn kings(&self, side: Color) -> Bitboard {
        self.piece_bb(side, PieceType::King)
    }

    /// The king square of a side, if that side has a king at all. Horde's
    /// pawn side and an exploded atomic side do not.
    pub fn king(&self, side: Color) -> Option<Square> {
        let kings = self.kings(side);
        if kings.is_empty() {
            None
        } else {
            Some(kings.first())
        }
    }

    /// Return the piece on a given square, if any
    pub fn get_at(&self, square: Square) -> Option<Piece> {
        self.piece_list[square]
    }

    /// Put a piece on a square. The square must be empty.
    pub fn add_at(&mut self, square: Square, piece: Piece) {
        let bb = Bitboard::from(square);
        self.piece_list[square] = Some(piece);
        self.occupied_squares[piece.color] |= bb;
        self.piece_bbs[piece.piece_type] |= bb;
    }

    /// Take the piece off a square, if there is one.
    pub fn remove_at(&mut self, square: Square) -> Option<Piece> {
        let piece = self.piece_list[square]?;
        let bb = Bitboard::from(square);

        self.piece_list[square] = None;
        self.occupied_squares[piece.color] &= !bb;
        self.piece_bbs[piece.piece_type] &= !bb;

        Some(piece)
    }

    /// Whether the side has anything beyond pawns and king. Gates null-move
    /// pruning, where a pawn-only side is likely in zugzwang.
    pub fn has_non_pawns(&self, side: Color) -> bool {
        self.num_non_pawns(side) > 0
    }

    /// The number of the side's pieces that are neither pawns nor the king.
    pub fn num_non_pawns(&self, side: Color) -> u32 {
        (self.occupied_by(side) & !self.pawns(side) & !self.kings(side)).count()
    }

    /// A bitboard of all squares attacked by the side's pawns.
    pub fn pawn_attacks(&self, side: Color) -> Bitboard {
        let pawns = self.pawns(side);
        let forward = pawns.forward(side.is_white());
        forward.left() | forward.right()
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Attack queries
//
////////////////////////////////////////////////////////////////////////////////

impl Board {
    /// Whether `square` is attacked by any piece of `side`, with the given
    /// blocker occupancy.
    pub fn attacked_by(&self, square: Square, side: Color, blockers: Bitboard) -> bool {
        let diag = self.bishops(side) | self.queens(side);
        let hv = self.rooks(side) | self.queens(side);

        !(pawn_attacks(square, !side) & self.pawns(side)).is_empty()
            || !(knight_attacks(square) & self.knights(side)).is_empty()
            || !(king_attacks(square) & self.kings(side)).is_empty()
            || !(bishop_attacks(square, blockers) & diag).is_empty()
            || !(rook_attacks(square, blockers) & hv).is_empty()
    }

    /// All attackers of either color bearing on `square` with the given
    /// blocker occupancy. Used by the exchange evaluator.
    pub fn attackers(&self, square: Square, blockers: Bitboard) -> Bitboard {
        use Color::*;

        pawn_attacks(square, Black) & self.pawns(White)
            | pawn_attacks(square, White) & self.pawns(Black)
            | knight_attacks(square) & self.piece_bbs[PieceType::Knight]
            | king_attacks(square) & self.piece_bbs[PieceType::King]
            | bishop_attacks(square, blockers)
                & (self.piece_bbs[PieceType::Bishop] | self.piece_bbs[PieceType::Queen])
            | rook_attacks(square, blockers)
                & (self.piece_bbs[PieceType::Rook] | self.piece_bbs[PieceType::Queen])
    }

    /// The least valuable piece of `side` attacking `square`, if any.
    pub fn cheapest_attacker(&self, square: Square, side: Color) -> Option<PieceType> {
        let blockers = self.all_occupied();

        if !(pawn_attacks(square, !side) & self.pawns(side)).is_empty() {
            return Some(PieceType::Pawn);
        }
        if !(knight_attacks(square) & self.knights(side)).is_empty() {
            return Some(PieceType::Knight);
        }
        if !(bishop_attacks(square, blockers) & self.bishops(side)).is_empty() {
            return Some(PieceType::Bishop);
        }
        if !(rook_attacks(square, blockers) & self.rooks(side)).is_empty() {
            return Some(PieceType::Rook);
        }
        if !(queen_attacks(square, blockers) & self.queens(side)).is_empty() {
            return Some(PieceType::Queen);
        }
        if !(king_attacks(square) & self.kings(side)).is_empty() {
            return Some(PieceType::King);
        }

        None
    }

    /// Whether `side`'s king is in check.
    ///
    /// A kingless side (horde's pawns, an exploded atomic king) is never in
    /// check, and adjacent kings mute all checks under atomic rules.
    pub fn is_checked(&self, side: Color) -> bool {
        let Some(king) = self.king(side) else {
            return false;
        };

        if self.variant == Variant::Atomic {
            if let Some(their_king) = self.king(!side) {
                if king_attacks(king).contains(their_king) {
                    return false;
                }
            }
        }

        self.attacked_by(king, !side, self.all_occupied())
    }

    /// Whether the player to move is in check.
    pub fn in_check(&self) -> bool {
        self.is_checked(self.current)
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Making moves
//
////////////////////////////////////////////////////////////////////////////////

impl Board {
    /// Play a pseudo-legal move and return the resulting board.
    ///
    /// The move is not checked for legality; callers confirm with
    /// [`Board::illegal_for`] on the returned board.
    pub fn play_move(&self, mv: Move) -> Board {
        let us = self.current;
        let src = mv.src();
        let tgt = mv.tgt();
        let mut board = *self;

        board.en_passant = None;

        let exploded = self.variant == Variant::Atomic && mv.is_capture();

        if mv.is_capture() {
            board.remove_at(mv.capture_square());
        }

        let mover = board.remove_at(src).expect("Move source holds a piece");

        if exploded {
            // The capturing piece does not survive, and every non-pawn
            // around the target square goes with it.
            board.remove_at(tgt);

            for sq in king_attacks(tgt) {
                if board.get_at(sq).is_some_and(|p| !p.is_pawn()) {
                    board.remove_at(sq);
                }
            }
        } else {
            let placed = match mv.promo_type() {
                Some(ptype) => Piece::new(us, ptype),
                None => mover,
            };
            board.add_at(tgt, placed);
        }

        if mv.is_castle() {
            let rank = if us.is_white() { 0 } else { 7 };
            let (rook_src, rook_tgt) = if mv.move_type() == crate::moves::MoveType::KingCastle {
                (Square::from(rank * 8 + 7), Square::from(rank * 8 + 5))
            } else {
                (Square::from(rank * 8), Square::from(rank * 8 + 3))
            };

            let rook = board.remove_at(rook_src).expect("Castle has its rook");
            board.add_at(rook_tgt, rook);
        }

        // Double pushes from the conventional pawn rank open an en-passant
        // opportunity. Horde's first-rank double pushes do not.
        if mv.is_double_push() && src.relative_rank(us.is_white()) == 1 {
            board.en_passant = src.forward(us.is_white());
        }

        board.update_castling_rights(mv, mover);

        if exploded {
            board.sanitize_castling_rights();
        }

        if mover.is_pawn() || mv.is_capture() {
            board.half_moves = 0;
        } else {
            board.half_moves += 1;
        }

        if !us.is_white() {
            board.full_moves += 1;
        }

        board.current = !us;
        board
    }

    /// Pass the turn without moving. Used by null-move pruning.
    pub fn play_null_move(&self) -> Board {
        let mut board = *self;

        board.en_passant = None;
        board.half_moves += 1;

        if !board.current.is_white() {
            board.full_moves += 1;
        }

        board.current = !board.current;
        board
    }

    /// Whether the board, after `mover` just played, is an illegal position
    /// for `mover` to have produced.
    pub fn illegal_for(&self, mover: Color) -> bool {
        match self.variant {
            // Exploding one's own king is forbidden; exploding the enemy
            // king legalises anything else on the board.
            Variant::Atomic => {
                if self.king(mover).is_none() {
                    return true;
                }
                if self.king(!mover).is_none() {
                    return false;
                }
                self.is_checked(mover)
            }

            // No move may leave either king in check.
            Variant::RacingKings => self.is_checked(mover) || self.is_checked(!mover),

            _ => self.is_checked(mover),
        }
    }

    fn update_castling_rights(&mut self, mv: Move, mover: Piece) {
        use Square::*;

        if mover.is_king() {
            self.castling_rights.clear_side(mover.color);
        }

        for sq in [mv.src(), mv.capture_square()] {
            match sq {
                A1 => self.castling_rights.remove(CastlingRights::WQ),
                H1 => self.castling_rights.remove(CastlingRights::WK),
                A8 => self.castling_rights.remove(CastlingRights::BQ),
                H8 => self.castling_rights.remove(CastlingRights::BK),
                _ => {}
            }
        }
    }

    /// Drop any castling right whose king or rook is no longer standing on
    /// its home square. Explosions can remove either without the move
    /// touching the corner itself.
    fn sanitize_castling_rights(&mut self) {
        use Square::*;

        let wk_home = self.get_at(E1) == Some(Piece::new(Color::White, PieceType::King));
        let bk_home = self.get_at(E8) == Some(Piece::new(Color::Black, PieceType::King));
        let wr = Piece::new(Color::White, PieceType::Rook);
        let br = Piece::new(Color::Black, PieceType::Rook);

        if !wk_home || self.get_at(H1) != Some(wr) {
            self.castling_rights.remove(CastlingRights::WK);
        }
        if !wk_home || self.get_at(A1) != Some(wr) {
            self.castling_rights.remove(CastlingRights::WQ);
        }
        if !bk_home || self.get_at(H8) != Some(br) {
            self.castling_rights.remove(CastlingRights::BK);
        }
        if !bk_home || self.get_at(A8) != Some(br) {
            self.castling_rights.remove(CastlingRights::BQ);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Game state: draws and variant endings
//
////////////////////////////////////////////////////////////////////////////////

impl Board {
    /// Whether neither side can possibly deliver mate.
    ///
    /// Standard and atomic: bare kings, king and minor versus king, or
    /// king and same-shade bishops versus king. Racing kings: both kings
    /// have crossed the finish line. Horde never runs out of material (its
    /// losing condition is losing every unit).
    pub fn insufficient_material(&self) -> bool {
        use PieceType::*;

        match self.variant {
            Variant::Horde => false,

            Variant::RacingKings => {
                let kings = self.piece_bbs[King];
                kings.count() == 2 && (kings & !RANKS[7]).is_empty()
            }

            _ => {
                if !self.piece_bbs[Pawn].is_empty() {
                    return false;
                }

                let occupied = self.all_occupied();
                let kings = self.piece_bbs[King];
                let knights = self.piece_bbs[Knight];
                let bishops = self.piece_bbs[Bishop];

                if occupied == kings {
                    return true;
                }

                if occupied == kings | knights && knights.count() == 1 {
                    return true;
                }

                occupied == kings | (bishops & LIGHT_SQUARES)
                    || occupied == kings | (bishops & DARK_SQUARES)
            }
        }
    }

    /// Whether the side has no units left at all (the horde losing
    /// condition).
    pub fn all_units_captured(&self, side: Color) -> bool {
        self.occupied_by(side).is_empty()
    }

    /// Whether the side's king stands on the racing-kings finish rank.
    pub fn king_on_final_rank(&self, side: Color) -> bool {
        !(self.kings(side) & RANKS[7]).is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Castling rights
//
////////////////////////////////////////////////////////////////////////////////

/// A nibble of flags for the four castles that may still be available.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const WK: Self = Self(0b0001);
    pub const WQ: Self = Self(0b0010);
    pub const BK: Self = Self(0b0100);
    pub const BQ: Self = Self(0b1000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn clear_side(&mut self, side: Color) {
        if side.is_white() {
            self.remove(Self::WK);
            self.remove(Self::WQ);
        } else {
            self.remove(Self::BK);
            self.remove(Self::BQ);
        }
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }

        if self.contains(Self::WK) {
            write!(f, "K")?;
        }
        if self.contains(Self::WQ) {
            write!(f, "Q")?;
        }
        if self.contains(Self::BK) {
            write!(f, "k")?;
        }
        if self.contains(Self::BQ) {
            write!(f, "q")?;
        }

        Ok(())
    }
}

impl FromStr for CastlingRights {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut rights = Self::NONE;

        if s == "-" {
            return Ok(rights);
        }

        for c in s.chars() {
            match c {
                'K' => rights.0 |= Self::WK.0,
                'Q' => rights.0 |= Self::WQ.0,
                'k' => rights.0 |= Self::BK.0,
                'q' => rights.0 |= Self::BQ.0,
                _ => Err(anyhow!("Not a valid castling flag: {c}"))?,
            }
        }

        Ok(rights)
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Utility traits
//
////////////////////////////////////////////////////////////////////////////////

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        Board::from_fen(value, Variant::Standard)
    }
}

impl Default for Board {
    fn default() -> Self {
        Variant::Standard
            .start_fen()
            .parse()
            .expect("The startpos FEN parses")
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use colored::Colorize;

        writeln!(f, "{}", "  a b c d e f g h".bright_blue())?;

        for rank in (0..8).rev() {
            write!(f, "{} ", (rank + 1).to_string().bright_blue())?;

            for file in 0..8 {
                match self.get_at(Square::from(8 * rank + file)) {
                    Some(piece) => write!(f, "{piece} ")?,
                    None => write!(f, "{}", ". ".bright_black())?,
                }
            }

            writeln!(f, "{}", (rank + 1).to_string().bright_blue())?;
        }

        writeln!(f, "{}", "  a b c d e f g h".bright_blue())
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
    use crate::moves::MoveType;
    use crate::square::Square::*;

    #[test]
    fn play_move_updates_state() {
        let board = Board::default();
        let after = board.play_move(Move::new(E2, E4, MoveType::DoublePush));

        assert_eq!(after.get_at(E4), Some(Piece::new(Color::White, PieceType::Pawn)));
        assert_eq!(after.get_at(E2), None);
        assert_eq!(after.en_passant, Some(E3));
        assert_eq!(after.current, Color::Black);
        assert_eq!(after.half_moves, 0);
    }

    #[test]
    fn castling_moves_the_rook() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let after = board.play_move(Move::new(E1, G1, MoveType::KingCastle));

        assert_eq!(after.get_at(G1), Some(Piece::new(Color::White, PieceType::King)));
        assert_eq!(after.get_at(F1), Some(Piece::new(Color::White, PieceType::Rook)));
        assert_eq!(after.get_at(H1), None);
        assert!(!after.castling_rights.contains(CastlingRights::WK));
        assert!(!after.castling_rights.contains(CastlingRights::WQ));
        assert!(after.castling_rights.contains(CastlingRights::BK));
    }

    #[test]
    fn en_passant_removes_the_victim() {
        let board: Board = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        let after = board.play_move(Move::new(E5, D6, MoveType::EnPassant));

        assert_eq!(after.get_at(D6), Some(Piece::new(Color::White, PieceType::Pawn)));
        assert_eq!(after.get_at(D5), None);
    }

    #[test]
    fn checks_are_detected() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        assert!(!board.in_check());

        let after = board.play_move(Move::new(A1, A8, MoveType::Quiet));
        assert!(after.is_checked(Color::Black));
        assert!(!after.is_checked(Color::White));
    }

    #[test]
    fn atomic_capture_explodes_neighbours() {
        let board =
            Board::from_fen("4k3/8/2n5/2pp4/8/8/3R4/4K3 w - - 0 1", Variant::Atomic).unwrap();

        // Rxd5 removes the d5 pawn, the rook itself, and the adjacent c6
        // knight. The adjacent c5 pawn survives the blast.
        let after = board.play_move(Move::new(D2, D5, MoveType::Capture));

        assert_eq!(after.get_at(D5), None);
        assert_eq!(after.get_at(D2), None);
        assert_eq!(after.get_at(C6), None);
        assert_eq!(after.get_at(C5), Some(Piece::new(Color::Black, PieceType::Pawn)));
        assert!(!after.illegal_for(Color::White));
    }

    #[test]
    fn atomic_adjacent_kings_mute_check() {
        let board = Board::from_fen("4k3/4K3/8/8/8/8/8/7R w - - 0 1", Variant::Atomic).unwrap();
        assert!(!board.is_checked(Color::White));

        let after = board.play_move(Move::new(H1, H8, MoveType::Quiet));
        // The rook "checks" the black king, but the adjacent white king
        // mutes it.
        assert!(!after.is_checked(Color::Black));
    }

    #[test]
    fn racing_kings_forbids_giving_check() {
        let board =
            Board::from_fen("8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1", Variant::RacingKings)
                .unwrap();

        // Nexc1 attacks the black king on a2, which racing kings forbids.
        let after = board.play_move(Move::new(E2, C1, MoveType::Capture));
        assert!(after.is_checked(Color::Black));
        assert!(after.illegal_for(Color::White));
    }

    #[test]
    fn insufficient_material_cases() {
        let kk: Board = "8/8/8/8/8/8/8/K1k5 w - - 0 1".parse().unwrap();
        assert!(kk.insufficient_material());

        let knk: Board = "8/8/8/8/8/8/8/KN1k4 w - - 0 1".parse().unwrap();
        assert!(knk.insufficient_material());

        let krk: Board = "8/8/8/8/8/8/8/KR1k4 w - - 0 1".parse().unwrap();
        assert!(!krk.insufficient_material());

        // Bishops all on the same shade
        let kbbk: Board = "8/8/8/8/8/8/2B5/KB1k4 w - - 0 1".parse().unwrap();
        assert_eq!(
            kbbk.insufficient_material(),
            ((kbbk.piece_bbs[PieceType::Bishop] & LIGHT_SQUARES).is_empty()
                || (kbbk.piece_bbs[PieceType::Bishop] & DARK_SQUARES).is_empty())
        );

        let rk = Board::from_fen("4k2K/8/8/8/8/8/8/8 w - - 0 1", Variant::RacingKings).unwrap();
        assert!(rk.insufficient_material());
    }
}
