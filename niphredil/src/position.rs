//! A `Position` wraps a `Board` with the state the search needs but the
//! board itself has no business knowing: the Zobrist hash and the list of
//! hashes since the last irreversible move, for repetition detection.

use crate::zobrist::ZHash;
use arrayvec::ArrayVec;
use chess::board::Board;
use chess::moves::BareMove;
use chess::moves::Move;

// Bounded by the 50-move rule in practice; the guard in `push_history`
// keeps pathological move lists from overflowing it.
const HIST_SIZE: usize = 128;

#[derive(Debug, Clone)]
pub struct Position {
    /// The board associated with the position.
    pub board: Board,

    /// The Zobrist hash of the board.
    pub hash: ZHash,

    /// Hashes of the positions since the last capture or pawn move, oldest
    /// first. The current position is not included.
    pub history: ArrayVec<ZHash, HIST_SIZE>,
}

impl Position {
    pub fn new(board: Board) -> Self {
        Self {
            hash: ZHash::from(&board),
            board,
            history: ArrayVec::new(),
        }
    }

    /// Play a move and return the resulting position.
    pub fn play_move(&self, mv: Move) -> Self {
        let board = self.board.play_move(mv);

        // Castling is also irreversible, but keeping its hashes around is
        // harmless: the rights change keeps the hashes from ever matching.
        let history = if mv.is_capture() || self.board.get_at(mv.src()).unwrap().is_pawn() {
            ArrayVec::new()
        } else {
            let mut history = self.history.clone();
            push_history(&mut history, self.hash);
            history
        };

        Self {
            hash: ZHash::from(&board),
            board,
            history,
        }
    }

    /// Pass the turn. The history resets: positions on the two sides of a
    /// null move are not comparable for repetition purposes.
    pub fn play_null_move(&self) -> Self {
        let board = self.board.play_null_move();

        Self {
            hash: ZHash::from(&board),
            board,
            history: ArrayVec::new(),
        }
    }

    /// Resolve a bare move from the wire against the legal moves and play
    /// it.
    pub fn play_bare_move(&self, bare: BareMove) -> anyhow::Result<Self> {
        let mv = self
            .board
            .legal_moves()
            .into_iter()
            .find(|mv| *mv == bare)
            .ok_or_else(|| anyhow::anyhow!("Not a legal move: {bare}"))?;

        Ok(self.play_move(mv))
    }

    /// Count how often the current position has occurred, this occurrence
    /// included. Only positions with the same side to move can match, so
    /// the scan walks the history backwards in strides of two.
    pub fn repetitions(&self) -> usize {
        1 + self
            .history
            .iter()
            .rev()
            .skip(1)
            .step_by(2)
            .filter(|&&hash| hash == self.hash)
            .count()
    }
}

fn push_history(history: &mut ArrayVec<ZHash, HIST_SIZE>, hash: ZHash) {
    if history.is_full() {
        history.remove(0);
    }

    history.push(hash);
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn play(pos: &Position, mv: &str) -> Position {
        pos.play_bare_move(mv.parse().unwrap()).unwrap()
    }

    #[test]
    fn repetition_counting() {
        let mut pos = Position::new("3k4/8/8/8/8/8/8/3K3P w - - 0 1".parse().unwrap());
        assert_eq!(pos.repetitions(), 1);

        for mv in ["d1e1", "d8e8", "e1d1", "e8d8"] {
            pos = play(&pos, mv);
        }

        assert_eq!(pos.repetitions(), 2);

        for mv in ["d1e1", "d8e8", "e1d1", "e8d8"] {
            pos = play(&pos, mv);
        }

        assert_eq!(pos.repetitions(), 3);
    }

    #[test]
    fn pawn_moves_reset_the_history() {
        let mut pos = Position::new("3k4/8/8/8/8/8/8/3K3P w - - 0 1".parse().unwrap());

        for mv in ["d1e1", "d8e8", "e1d1", "e8d8"] {
            pos = play(&pos, mv);
        }
        assert_eq!(pos.history.len(), 4);

        pos = play(&pos, "h1h2");
        assert!(pos.history.is_empty());
    }

    #[test]
    fn hashes_track_the_board() {
        let pos = Position::new(Board::default());
        let next = play(&pos, "e2e4");

        assert_eq!(next.hash, ZHash::from(&next.board));
        assert_ne!(next.hash, pos.hash);
    }

    #[test]
    fn null_moves_reset_the_history() {
        let mut pos = Position::new("3k4/8/8/8/8/8/8/3K3P w - - 0 1".parse().unwrap());
        pos = play(&pos, "d1e1");
        assert_eq!(pos.history.len(), 1);

        let nulled = pos.play_null_move();
        assert!(nulled.history.is_empty());
        assert_eq!(nulled.board.current, !pos.board.current);
    }
}
