//! Aspiration windows.
//!
//! Instead of opening every iteration with an unbounded window, the search
//! starts with a narrow window around the previous iteration's score.
//! Inside a narrow window cutoffs come fast; the price is a re-search with
//! wider bounds whenever the true score lands outside the guess. Shallow
//! iterations are too unstable to be worth guessing about and get the full
//! window straight away.

use super::params::ASPIRATION_WINDOW;
use super::Searcher;
use crate::evaluate::Score;
use crate::evaluate::ScoreExt;
use crate::position::Position;

impl Searcher<'_> {
    /// Search to `depth` with a window centered on `estimate`, widening on
    /// every miss.
    pub(super) fn aspiration(
        &mut self,
        pos: &Position,
        depth: i32,
        estimate: Score,
    ) -> Score {
        let mut delta = ASPIRATION_WINDOW;

        let (mut alpha, mut beta) = if depth < 4 {
            (-Score::INFINITY, Score::INFINITY)
        } else {
            (estimate - delta, estimate + delta)
        };

        loop {
            let score = self.search_tree(pos, 0, alpha, beta, depth);

            if self.stopped {
                return score;
            }

            if score <= alpha {
                alpha = (alpha - delta).max(-Score::INFINITY);
                delta += delta / 2;
            } else if score >= beta {
                beta = (beta + delta).min(Score::INFINITY);
                delta += delta / 2;
            } else {
                return score;
            }
        }
    }
}
