//! FEN parsing and printing.
//!
//! Accepts positions that orthodox chess would reject, because the variants
//! need them: the horde side has no king, and racing-kings positions have no
//! castling section worth speaking of.

use crate::board::Board;
use crate::piece::Piece;
use crate::square::Square;
use crate::variant::Variant;
use anyhow::anyhow;

impl Board {
    /// Parse a FEN string into a board played under the given variant.
    ///
    /// The halfmove clock and fullmove counter are optional, defaulting to
    /// 0 and 1 (some front-ends omit them).
    pub fn from_fen(fen: &str, variant: Variant) -> anyhow::Result<Board> {
        let mut parts = fen.split_whitespace();

        let placement = parts.next().ok_or(anyhow!("Empty FEN"))?;
        let side = parts.next().ok_or(anyhow!("FEN is missing the side to move"))?;
        let castling = parts.next().ok_or(anyhow!("FEN is missing castling rights"))?;
        let en_passant = parts.next().ok_or(anyhow!("FEN is missing the ep square"))?;
        let half_moves = parts.next().unwrap_or("0");
        let full_moves = parts.next().unwrap_or("1");

        let mut board = Board::EMPTY;
        board.variant = variant;

        ////////////////////////////////////////////////////////////////////////
        //
        // Piece placement, rank 8 down to rank 1
        //
        ////////////////////////////////////////////////////////////////////////

        let ranks: Vec<_> = placement.split('/').collect();

        if ranks.len() != 8 {
            return Err(anyhow!("FEN placement must have eight ranks"));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let rank_idx = 7 - i;
            let mut file = 0;

            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    if file > 7 {
                        return Err(anyhow!("Rank {rank} overflows the board"));
                    }

                    let piece = Piece::try_from(c)?;
                    board.add_at(Square::from(8 * rank_idx + file), piece);
                    file += 1;
                }
            }

            if file != 8 {
                return Err(anyhow!("Rank {rank} does not fill eight files"));
            }
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Game state
        //
        ////////////////////////////////////////////////////////////////////////

        board.current = side.parse()?;
        board.castling_rights = castling.parse()?;

        board.en_passant = match en_passant {
            "-" => None,
            sq => Some(sq.parse::<Square>()?),
        };

        board.half_moves = half_moves.parse()?;
        board.full_moves = full_moves.parse()?;

        Ok(board)
    }

    /// Print the board as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;

            for file in 0..8 {
                match self.get_at(Square::from(8 * rank + file)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push_str(&piece.to_string());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                placement.push_str(&empty.to_string());
            }

            if rank > 0 {
                placement.push('/');
            }
        }

        let en_passant = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{placement} {} {} {en_passant} {} {}",
            self.current, self.castling_rights, self.half_moves, self.full_moves
        )
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
    use crate::board::CastlingRights;
    use crate::piece::Color;
    use crate::piece::PieceType;

    #[test]
    fn startpos_round_trips() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let board: Board = fen.parse().unwrap();

        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.pawns(Color::White).count(), 8);
        assert_eq!(board.king(Color::Black), Some(Square::E8));
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn kingless_horde_side_parses() {
        let board = Board::from_fen(Variant::Horde.start_fen(), Variant::Horde).unwrap();

        assert_eq!(board.king(Color::White), None);
        assert_eq!(board.king(Color::Black), Some(Square::E8));
        assert_eq!(board.pawns(Color::White).count(), 36);
    }

    #[test]
    fn racing_kings_start_parses() {
        let board =
            Board::from_fen(Variant::RacingKings.start_fen(), Variant::RacingKings).unwrap();

        assert_eq!(board.king(Color::White), Some(Square::H2));
        assert_eq!(board.king(Color::Black), Some(Square::A2));
        assert_eq!(board.piece_bbs[PieceType::Queen].count(), 2);
        assert_eq!(board.castling_rights, CastlingRights::NONE);
    }

    #[test]
    fn short_fens_get_default_clocks() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -", Variant::Standard).unwrap();
        assert_eq!(board.half_moves, 0);
        assert_eq!(board.full_moves, 1);
    }

    #[test]
    fn malformed_fens_are_rejected() {
        assert!(Board::from_fen("bogus", Variant::Standard).is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8 w - - 0 1", Variant::Standard).is_err());
        assert!(Board::from_fen("9/8/8/8/8/8/8/8 w - - 0 1", Variant::Standard).is_err());
    }
}
