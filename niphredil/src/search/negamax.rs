//! The main fail-soft negamax function, and the terminal-position
//! detector it leans on.

use super::params::*;
use super::Searcher;
use crate::evaluate::evaluate;
use crate::evaluate::Score;
use crate::evaluate::ScoreExt;
use crate::move_picker::PickKind;
use crate::position::Position;
use crate::transpositions::Bound;
use chess::bitboard::Bitboard;
use chess::bitboard::FILES;
use chess::bitboard::RANKS;
use chess::board::Board;
use chess::moves::Move;
use chess::piece::Color;
use chess::piece::PieceType;
use chess::see::capture_gain;
use chess::see::SEE_VALUES;
use chess::variant::Variant;

impl Searcher<'_> {
    /// Fail-soft alpha-beta search to the given remaining depth.
    ///
    /// The return value may fall outside the `(alpha, beta)` window; it
    /// still carries bound information for the caller. Once the stop flag
    /// latches, the return values are garbage and every level unwinds
    /// without side effects.
    pub(super) fn search_tree(
        &mut self,
        pos: &Position,
        ply: usize,
        mut alpha: Score,
        beta: Score,
        depth: i32,
    ) -> Score {
        let us = pos.board.current;
        let is_pv = alpha + 1 < beta;

        ////////////////////////////////////////////////////////////////////////
        //
        // Bookkeeping: node count, seldepth, and the periodic deadline poll
        //
        ////////////////////////////////////////////////////////////////////////

        self.stats.nodes += 1;
        self.stats.seldepth = self.stats.seldepth.max(ply as i32);

        if self.stats.nodes >= self.next_checkpoint {
            self.next_checkpoint = self.stats.nodes + CHECKPOINT_NODES;

            if !self.tc.should_continue(self.stats.nodes) {
                self.stopped = true;
            }
        }

        if self.stopped {
            return alpha;
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Terminal positions and mate pruning
        //
        ////////////////////////////////////////////////////////////////////////

        if let Some(score) = self.end_score(pos, ply) {
            return score;
        }

        if ply >= MAX_PLY {
            return self.static_eval(pos);
        }

        // Even an immediate mate here cannot beat alpha; no point looking.
        if Score::MATE - ply as Score <= alpha {
            return Score::KNOWN_WIN;
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Transposition table probe
        //
        // A deep-enough entry can cut the node outright; a shallower one
        // still donates its best move to the move ordering.
        //
        ////////////////////////////////////////////////////////////////////////

        let mut hash_move = Move::NULL;

        if let Some(entry) = self.tt.probe(pos.hash) {
            hash_move = entry.mv;
            let score = entry.score(ply);

            if entry.depth as i32 >= depth {
                match entry.bound {
                    Bound::Exact => {
                        if alpha < score && score < beta {
                            self.pv_table.put(pos, entry.mv);
                        }
                        return score;
                    }

                    Bound::Upper if score <= alpha => return score,
                    Bound::Lower if score >= beta => return score,

                    _ => {}
                }
            }
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Leaf: drop into quiescence, and remember its verdict
        //
        ////////////////////////////////////////////////////////////////////////

        if depth <= 0 {
            let score = self.quiescence(pos, ply, alpha, beta);

            let bound = if score <= alpha {
                Bound::Upper
            } else if score >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };

            self.tt.insert(pos.hash, Move::NULL, score, 0, bound, ply);
            return score;
        }

        let in_check = pos.board.in_check();
        let score_fence = -Score::KNOWN_WIN < alpha && beta < Score::KNOWN_WIN;

        ////////////////////////////////////////////////////////////////////////
        //
        // Null-move pruning
        //
        // Hand the opponent a free move; if the reduced search still fails
        // high, the position is good enough to cut. Needs non-pawn
        // material on the board, or zugzwang makes a liar of it.
        //
        ////////////////////////////////////////////////////////////////////////

        if depth > 1 && !in_check && pos.board.has_non_pawns(us) && score_fence {
            let reduction = 2 + (pos.board.num_non_pawns(us) >= 3) as i32;
            let nulled = pos.play_null_move();

            let score = -self.search_tree(&nulled, ply + 1, -beta, -beta + 1, depth - reduction);

            if self.stopped {
                return alpha;
            }

            if score >= beta {
                return score;
            }
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Frontier futility gate
        //
        // Near the leaves of a non-PV node, moves that cannot plausibly
        // reach alpha get dropped without a search. The static eval is
        // only computed when the gate is open.
        //
        ////////////////////////////////////////////////////////////////////////

        let allow_leaf_pruning = depth <= LEAF_PRUNING_DEPTH && !in_check && !is_pv && score_fence;

        let static_score = if allow_leaf_pruning {
            self.static_eval(pos)
        } else {
            0
        };

        ////////////////////////////////////////////////////////////////////////
        //
        // The move loop
        //
        ////////////////////////////////////////////////////////////////////////

        self.move_stack.init(ply, hash_move, PickKind::All);

        let alpha0 = alpha;
        let mut best_score = -Score::INFINITY;
        let mut best_move = Move::NULL;
        let mut null_window = false;
        let mut dropped = false;
        let mut num_quiet = 0;

        while let Some(mv) = self.move_stack.next(ply, &pos.board) {
            if ply == 0 && self.ignored.contains(&mv) {
                continue;
            }

            let critical = mv == hash_move || self.move_stack.is_killer(ply, mv);

            if mv.is_quiet() {
                num_quiet += 1;
            }

            let next = pos.play_move(mv);

            // Covers ordinary self-checks, atomic self-destruction, and
            // racing kings' ban on giving check.
            if next.board.illegal_for(us) {
                continue;
            }

            let gives_check = next.board.in_check();

            // Checks delivered to an undefended square tend to be the
            // start of something; look one ply further.
            let extension = (gives_check && self.undefended_check(pos, &next, mv)) as i32;

            ////////////////////////////////////////////////////////////////////
            //
            // Late-move reductions
            //
            // Ordered this far down the list, quiet moves and losing
            // captures rarely matter; search them shallower first.
            //
            ////////////////////////////////////////////////////////////////////

            let mut lmr = 0;

            if depth > LMR_MIN_DEPTH && !in_check && !critical && !gives_check {
                if mv.is_quiet() {
                    lmr = 1 + depth.min(num_quiet) / 5;
                } else if mv.is_capture() && !pos.board.see(mv, 0) {
                    lmr = 1;
                }
            }

            ////////////////////////////////////////////////////////////////////
            //
            // Leaf pruning: history and futility
            //
            ////////////////////////////////////////////////////////////////////

            if allow_leaf_pruning && !gives_check && !critical {
                let (bad, good) = self.history.get(mv);
                let losing_capture = mv.is_capture() && !pos.board.see(mv, 0);

                if bad > HISTORY_PRUNE_RATIO * good && (mv.is_quiet() || losing_capture) {
                    dropped = true;
                    continue;
                }

                if !mv.is_promotion()
                    && !is_passed_pawn_move(&pos.board, mv)
                    && static_score + capture_gain(&pos.board, mv) + depth * FUTILITY_MARGIN
                        < alpha
                {
                    dropped = true;
                    best_score = best_score.max(static_score);
                    continue;
                }
            }

            ////////////////////////////////////////////////////////////////////
            //
            // Recurse
            //
            ////////////////////////////////////////////////////////////////////

            let score = self.try_move(&next, ply, alpha, beta, depth + extension, lmr, null_window);

            if allow_leaf_pruning && !gives_check {
                self.history.update(mv, score > alpha);
            }

            if self.stopped {
                return alpha;
            }

            if score >= beta {
                self.move_stack.save_killer(ply, mv);
                self.tt.insert(pos.hash, mv, score, depth, Bound::Lower, ply);
                return score;
            }

            if score > best_score {
                best_move = mv;
                best_score = score;
                alpha = alpha.max(score);
                null_window = true;
            }
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Conclusion
        //
        // With every move tried and none pruned away, an empty score means
        // mate or stalemate. Pruned nodes must not be mistaken for either.
        //
        ////////////////////////////////////////////////////////////////////////

        if dropped {
            if best_score == -Score::INFINITY {
                return alpha;
            }
            return best_score;
        }

        if best_score == -Score::INFINITY {
            best_move = Move::NULL;
            best_score = if in_check {
                -Score::MATE + ply as Score
            } else {
                0
            };
        }

        let bound = if best_score <= alpha0 {
            Bound::Upper
        } else {
            Bound::Exact
        };

        self.tt.insert(pos.hash, best_move, best_score, depth, bound, ply);

        if alpha0 < best_score && best_score < beta {
            self.pv_table.put(pos, best_move);
        }

        best_score
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Principal variation search
    //
    // The first move gets the full window. Every later move first has to
    // prove itself against a null window (at reduced depth, if it was
    // marked for reduction); only on a surprise fail-high does it earn a
    // full re-search.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub(super) fn try_move(
        &mut self,
        next: &Position,
        ply: usize,
        alpha: Score,
        beta: Score,
        depth: i32,
        lmr: i32,
        null_window: bool,
    ) -> Score {
        let depth = depth - 1;

        if lmr > 0 {
            let score = -self.search_tree(next, ply + 1, -alpha - 1, -alpha, depth - lmr);

            if score <= alpha {
                return score;
            }
        }

        if null_window {
            let score = -self.search_tree(next, ply + 1, -alpha - 1, -alpha, depth);

            if alpha < score && score < beta {
                return -self.search_tree(next, ply + 1, -beta, -alpha, depth);
            }

            score
        } else {
            -self.search_tree(next, ply + 1, -beta, -alpha, depth)
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Support
    //
    ////////////////////////////////////////////////////////////////////////////

    /// The static evaluation, from the side to move's point of view.
    pub(super) fn static_eval(&mut self, pos: &Position) -> Score {
        let white_pov = evaluate(&pos.board, self.eval_cache);

        let score = if pos.board.current.is_white() {
            white_pov
        } else {
            -white_pov
        };

        debug_assert!(
            -Score::KNOWN_WIN < score && score < Score::KNOWN_WIN,
            "static evaluation {score} escaped its fence"
        );

        score
    }

    /// Whether the checking move's target square lacks a defender cheap
    /// enough to make the check pointless.
    fn undefended_check(&self, pos: &Position, next: &Position, mv: Move) -> bool {
        let moved = mv
            .promo_type()
            .unwrap_or_else(|| pos.board.get_at(mv.src()).unwrap().piece_type);

        match next.board.cheapest_attacker(mv.tgt(), next.board.current) {
            None => true,
            Some(defender) => SEE_VALUES[defender] >= SEE_VALUES[moved],
        }
    }

    /// Detect positions that are over before a single move is generated:
    /// variant win conditions, vanished kings, dead draws, the fifty-move
    /// rule, and repetitions.
    pub(super) fn end_score(&self, pos: &Position, ply: usize) -> Option<Score> {
        let board = &pos.board;
        let us = board.current;
        let ply_score = ply as Score;

        match board.variant {
            // The horde loses by running out of units; its opponent loses
            // by regular checkmate, found by the search itself.
            Variant::Horde => {
                let pawn_side = if board.king(Color::White).is_none() {
                    Color::White
                } else {
                    Color::Black
                };

                if board.all_units_captured(pawn_side) {
                    return Some(if us == pawn_side {
                        -Score::MATE + ply_score
                    } else {
                        Score::MATE - ply_score
                    });
                }
            }

            // Black's arrival ends the race on the spot; White's arrival
            // leaves Black one reply to force the dead heat.
            Variant::RacingKings => {
                let white_done = board.king_on_final_rank(Color::White);
                let black_done = board.king_on_final_rank(Color::Black);

                if white_done && black_done {
                    return Some(0);
                }

                if black_done {
                    return Some(if us == Color::Black {
                        Score::MATE - ply_score
                    } else {
                        -Score::MATE + ply_score
                    });
                }

                if white_done && us == Color::White {
                    return Some(Score::MATE - ply_score);
                }
            }

            _ => {
                let white_king = board.king(Color::White).is_some();
                let black_king = board.king(Color::Black).is_some();

                if !white_king && !black_king {
                    return Some(0);
                }

                if !white_king || !black_king {
                    let loser = if white_king { Color::Black } else { Color::White };

                    return Some(if us == loser {
                        -Score::MATE + ply_score
                    } else {
                        Score::MATE - ply_score
                    });
                }
            }
        }

        if board.insufficient_material() {
            return Some(0);
        }

        if board.half_moves >= 100 {
            return Some(0);
        }

        let repetitions = pos.repetitions();

        if repetitions >= 3 || (ply > 0 && repetitions >= 2) {
            return Some(0);
        }

        None
    }
}

/// Whether the move pushes a pawn with no enemy pawns left to stop it.
fn is_passed_pawn_move(board: &Board, mv: Move) -> bool {
    let Some(piece) = board.get_at(mv.src()) else {
        return false;
    };

    if piece.piece_type != PieceType::Pawn {
        return false;
    }

    let tgt = mv.tgt();
    let white = piece.color.is_white();

    let mut span = Bitboard::EMPTY;
    for file in tgt.file().saturating_sub(1)..=(tgt.file() + 1).min(7) {
        span |= FILES[file];
    }

    let mut ahead = Bitboard::EMPTY;
    if white {
        for rank in tgt.rank() + 1..8 {
            ahead |= RANKS[rank];
        }
    } else {
        for rank in 0..tgt.rank() {
            ahead |= RANKS[rank];
        }
    }

    (span & ahead & board.pawns(!piece.color)).is_empty()
}
