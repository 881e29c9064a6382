//! The principal variation table.
//!
//! Exact-node best moves go into a small two-way hash table, and the PV is
//! recovered after an iteration by replaying moves from the root and
//! looking each successor up. Entries carry a monotonically increasing
//! birth stamp; between two candidate slots, the staler one is evicted.
//!
//! The table is deliberately separate from the transposition table: TT
//! entries get overwritten by the bulk of the search, while this table only
//! sees exact nodes and so keeps the variation alive much longer.

use crate::position::Position;
use crate::search::params::MAX_PLY;
use crate::zobrist::ZHash;
use chess::moves::Move;

const PV_SIZE: usize = 1 << 13;
const PV_MASK: u64 = (PV_SIZE - 1) as u64;

#[derive(Debug, Copy, Clone, Default)]
struct PvEntry {
    /// The full Zobrist hash; no truncation games here, a wrong PV move is
    /// worse than no PV move.
    lock: ZHash,
    mv: Move,
    birth: u32,
}

#[derive(Debug)]
pub struct PvTable {
    entries: Vec<PvEntry>,

    /// Shared birth stamp, bumped on every put.
    timer: u32,
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            entries: vec![PvEntry::default(); PV_SIZE],
            timer: 1,
        }
    }

    /// The two candidate slots for a hash.
    fn slots(hash: ZHash) -> (usize, usize) {
        ((hash.0 & PV_MASK) as usize, ((hash.0 >> 32) & PV_MASK) as usize)
    }

    /// Remember `mv` as the exact-node move for the position.
    pub fn put(&mut self, pos: &Position, mv: Move) {
        if mv == Move::NULL {
            return;
        }

        let (s0, s1) = Self::slots(pos.hash);

        // Prefer the slot that already holds this position; otherwise
        // evict the older of the two.
        let slot = if self.entries[s0].lock == pos.hash {
            s0
        } else if self.entries[s1].lock == pos.hash {
            s1
        } else if self.entries[s0].birth <= self.entries[s1].birth {
            s0
        } else {
            s1
        };

        self.entries[slot] = PvEntry {
            lock: pos.hash,
            mv,
            birth: self.timer,
        };

        self.timer += 1;
    }

    /// The stored move for the position, or the null move.
    pub fn get(&self, pos: &Position) -> Move {
        let (s0, s1) = Self::slots(pos.hash);

        if self.entries[s0].lock == pos.hash {
            self.entries[s0].mv
        } else if self.entries[s1].lock == pos.hash {
            self.entries[s1].mv
        } else {
            Move::NULL
        }
    }

    /// Walk the table from `pos`, collecting the principal variation.
    ///
    /// The walk stops at the first missing or stale move, and at the first
    /// repeated position, since a cyclic PV would never terminate. The
    /// caller's position is untouched.
    pub fn collect(&self, pos: &Position) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut seen = Vec::new();
        let mut current = pos.clone();

        while moves.len() < MAX_PLY {
            let mv = self.get(&current);

            if mv == Move::NULL || !current.board.is_pseudo_legal(mv) {
                break;
            }

            let next = current.play_move(mv);

            if next.board.illegal_for(current.board.current) {
                break;
            }

            if seen.contains(&next.hash) {
                break;
            }

            seen.push(current.hash);
            moves.push(mv);
            current = next;
        }

        moves
    }

    pub fn clear(&mut self) {
        self.entries.fill(PvEntry::default());
        self.timer = 1;
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
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
    use chess::board::Board;

    #[test]
    fn put_then_get() {
        let mut table = PvTable::new();
        let pos = Position::new(Board::default());
        let mv = pos.board.legal_moves()[0];

        assert_eq!(table.get(&pos), Move::NULL);

        table.put(&pos, mv);
        assert_eq!(table.get(&pos), mv);
    }

    #[test]
    fn null_moves_are_ignored() {
        let mut table = PvTable::new();
        let pos = Position::new(Board::default());

        table.put(&pos, Move::NULL);
        assert_eq!(table.get(&pos), Move::NULL);
        assert_eq!(table.timer, 1);
    }

    #[test]
    fn collect_walks_the_line() {
        let mut table = PvTable::new();
        let root = Position::new(Board::default());

        let e4 = root.play_bare_move("e2e4".parse().unwrap()).unwrap();
        let e5 = e4.play_bare_move("e7e5".parse().unwrap()).unwrap();

        let first = find(&root, "e2e4");
        let second = find(&e4, "e7e5");
        let third = find(&e5, "g1f3");

        table.put(&root, first);
        table.put(&e4, second);
        table.put(&e5, third);

        let root_hash = root.hash;
        let pv = table.collect(&root);

        assert_eq!(pv, vec![first, second, third]);

        // The walked position is untouched.
        assert_eq!(root.hash, root_hash);
        assert_eq!(root.board, Board::default());
    }

    #[test]
    fn collect_stops_on_cycles() {
        let mut table = PvTable::new();

        // A bare-kings shuffle that comes straight back.
        let root = Position::new("4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap());
        let a = root.play_bare_move("e1d1".parse().unwrap()).unwrap();
        let b = a.play_bare_move("e8d8".parse().unwrap()).unwrap();
        let c = b.play_bare_move("d1e1".parse().unwrap()).unwrap();

        table.put(&root, find(&root, "e1d1"));
        table.put(&a, find(&a, "e8d8"));
        table.put(&b, find(&b, "d1e1"));
        table.put(&c, find(&c, "d8e8"));

        // Following the walk returns to the root position's board; the
        // cycle guard must cut the line short.
        let pv = table.collect(&root);
        assert!(pv.len() <= 4);
    }

    fn find(pos: &Position, uci: &str) -> Move {
        pos.board
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == uci)
            .unwrap()
    }
}
