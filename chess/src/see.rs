//! Static exchange evaluation
//!
//! Estimates, without searching, whether a move wins or loses material by
//! playing out every capture on the target square, cheapest attacker first.
//! The search uses this to push losing captures to the back of the move
//! ordering and to prune them near the leaves.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::moves::Move;
use crate::piece::Color;
use crate::piece::PieceType;
use crate::square::Square;

/// Exchange values per piece type, pawn through king.
pub const SEE_VALUES: [i32; PieceType::COUNT] = [55, 325, 341, 454, 1110, 20000];

/// The exchange value of the piece captured by `mv`, zero for non-captures.
pub fn capture_gain(board: &Board, mv: Move) -> i32 {
    if !mv.is_capture() {
        return 0;
    }

    board
        .get_at(mv.capture_square())
        .map(|piece| SEE_VALUES[piece.piece_type])
        .unwrap_or(0)
}

impl Board {
    /// Check whether a move holds up to a given exchange threshold after all
    /// the pieces bearing on the target square have traded off.
    pub fn see(&self, mv: Move, threshold: i32) -> bool {
        let src = mv.src();
        let tgt = mv.tgt();
        let mut balance = 0;

        // A castle can never be captured, so its exchange value is zero.
        if mv.is_castle() {
            return threshold <= balance;
        }

        if mv.is_promotion() {
            balance -= SEE_VALUES[PieceType::Pawn];
            balance += SEE_VALUES[mv.promo_type().unwrap()];
        }

        if mv.is_capture() {
            balance += capture_gain(self, mv);
        }

        let mut current_victim = match mv.promo_type() {
            Some(promo) => promo,
            None => self.get_at(src).expect("Move source holds a piece").piece_type,
        };

        // Even losing the moved piece outright keeps us above the threshold.
        if balance - SEE_VALUES[current_victim] >= threshold {
            return true;
        }

        // Track occupancy by hand rather than replaying moves on the board.
        let mut blockers = self.all_occupied();
        blockers ^= Bitboard::from(src);
        blockers |= Bitboard::from(tgt);

        if mv.is_en_passant() {
            blockers ^= Bitboard::from(mv.capture_square());
        }

        let diag_sliders = (self.piece_bbs[PieceType::Bishop] | self.piece_bbs[PieceType::Queen])
            & blockers;
        let hv_sliders =
            (self.piece_bbs[PieceType::Rook] | self.piece_bbs[PieceType::Queen]) & blockers;

        let mut attackers = self.attackers(tgt, blockers) & blockers;
        let mut side = self.current;

        loop {
            side = !side;
            balance = -balance;

            let Some(attacker_sq) = self.least_valuable(attackers, side) else {
                break;
            };

            let attacker = self.get_at(attacker_sq).unwrap();

            blockers ^= Bitboard::from(attacker_sq);
            attackers &= blockers;

            // Moving an attacker out of the way may uncover a slider behind
            // it.
            if attacker.is_pawn() || attacker.piece_type == PieceType::Bishop
                || attacker.piece_type == PieceType::Queen
            {
                attackers |= crate::attacks::bishop_attacks(tgt, blockers) & diag_sliders;
            }

            if attacker.piece_type == PieceType::Rook || attacker.piece_type == PieceType::Queen {
                attackers |= crate::attacks::rook_attacks(tgt, blockers) & hv_sliders;
            }

            attackers &= blockers;

            // A king can only take if nothing would recapture it.
            if attacker.is_king() && !(attackers & self.occupied_by(!side)).is_empty() {
                break;
            }

            balance += SEE_VALUES[current_victim];
            current_victim = attacker.piece_type;

            if side == self.current && balance - SEE_VALUES[current_victim] >= threshold {
                return true;
            }
        }

        // Express the final balance from the original mover's perspective.
        if side != self.current {
            balance = -balance;
        }

        threshold <= balance
    }

    /// The square of the least valuable piece of `side` among `attackers`.
    fn least_valuable(&self, attackers: Bitboard, side: Color) -> Option<Square> {
        let mut best = None;
        let mut best_value = i32::MAX;

        for sq in attackers & self.occupied_by(side) {
            let value = SEE_VALUES[self.get_at(sq).unwrap().piece_type];

            if value < best_value {
                best = Some(sq);
                best_value = value;
            }
        }

        best
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
    fn winning_and_losing_captures() {
        // kiwipete
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();

        // Qxh3 loses the queen to gxh3
        let mv = Move::new(F3, H3, MoveType::Capture);
        assert!(!board.see(mv, 0));

        // Nxg6 trades a knight for a pawn, guarded twice
        let mv = Move::new(E5, G6, MoveType::Capture);
        assert!(!board.see(mv, 0));

        // dxe6 trades pawn for pawn and holds the exchange
        let mv = Move::new(D5, E6, MoveType::Capture);
        assert!(board.see(mv, 0));
    }

    #[test]
    fn quiet_moves_into_danger() {
        let board: Board = "4k3/8/4p3/8/8/8/3R4/4K3 w - - 0 1".parse().unwrap();

        // Rd2-d5 hangs the rook to the e6 pawn
        let mv = Move::new(D2, D5, MoveType::Quiet);
        assert!(!board.see(mv, 0));

        // Rd2-d3 is safe
        let mv = Move::new(D2, D3, MoveType::Quiet);
        assert!(board.see(mv, 0));
    }

    #[test]
    fn threshold_is_respected() {
        let board: Board = "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1".parse().unwrap();

        // Rxd5 wins a queen for a rook
        let mv = Move::new(D2, D5, MoveType::Capture);
        assert!(board.see(mv, 0));
        assert!(board.see(mv, SEE_VALUES[PieceType::Queen] - SEE_VALUES[PieceType::Rook]));
        assert!(!board.see(mv, SEE_VALUES[PieceType::Queen] + 1));
    }
}
