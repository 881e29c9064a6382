//! Perft: count leaf nodes of the move-generation tree to a fixed depth.
//!
//! The one true way to validate a move generator.

use crate::board::Board;
use crate::moves::Move;

pub fn perft(board: Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;

    for mv in board.legal_moves() {
        let next = board.play_move(mv);

        if depth == 1 {
            nodes += 1;
        } else {
            nodes += perft(next, depth - 1);
        }
    }

    nodes
}

/// Perft broken down by root move, as most GUIs and debuggers expect it.
pub fn perft_divide(board: Board, depth: usize) -> Vec<(Move, u64)> {
    board
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let nodes = if depth <= 1 {
                1
            } else {
                perft(board.play_move(mv), depth - 1)
            };
            (mv, nodes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_node_counts() {
        let board = Board::default();

        assert_eq!(perft(board, 1), 20);
        assert_eq!(perft(board, 2), 400);
        assert_eq!(perft(board, 3), 8902);
    }

    #[test]
    fn kiwipete_node_counts() {
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();

        assert_eq!(perft(board, 1), 48);
        assert_eq!(perft(board, 2), 2039);
    }

    #[test]
    fn en_passant_position() {
        // Position 3 from the usual perft suite
        let board: Board = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1".parse().unwrap();

        assert_eq!(perft(board, 1), 14);
        assert_eq!(perft(board, 2), 191);
        assert_eq!(perft(board, 3), 2812);
    }
}
