//! A coarse success record per move, shared across the whole tree.
//!
//! Each slot remembers a move and two counters: how often the move failed
//! to raise alpha (`bad`) and how often it did (`good`). The search skips
//! moves near the leaves whose record is bad enough. Slots are claimed by
//! whichever move hashes into them last, an approximate LRU by collision.

use chess::moves::Move;

const TABLE_SIZE: usize = 1 << 10;

#[derive(Debug, Copy, Clone)]
struct HistoryEntry {
    mv: Move,
    bad: u32,
    good: u32,
}

impl Default for HistoryEntry {
    fn default() -> Self {
        // Both counters start at one so the ratio is defined on first use.
        Self {
            mv: Move::NULL,
            bad: 1,
            good: 1,
        }
    }
}

#[derive(Debug)]
pub struct HistoryTable {
    entries: Vec<HistoryEntry>,
}

fn index(mv: Move) -> usize {
    let hash = (mv.raw() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    (hash >> (64 - 10)) as usize
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            entries: vec![HistoryEntry::default(); TABLE_SIZE],
        }
    }

    /// The (bad, good) counters for a move. A move that was never recorded
    /// (or was evicted) reads as (1, 1).
    pub fn get(&self, mv: Move) -> (u32, u32) {
        let entry = &self.entries[index(mv)];

        if entry.mv == mv {
            (entry.bad, entry.good)
        } else {
            (1, 1)
        }
    }

    /// Record one outcome for a move, evicting whatever else lived in its
    /// slot.
    pub fn update(&mut self, mv: Move, good: bool) {
        let entry = &mut self.entries[index(mv)];

        if entry.mv != mv {
            *entry = HistoryEntry {
                mv,
                ..Default::default()
            };
        }

        if good {
            entry.good += 1;
        } else {
            entry.bad += 1;
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(HistoryEntry::default());
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::moves::MoveType;
    use chess::square::Square::*;

    #[test]
    fn counters_start_defined() {
        let table = HistoryTable::new();
        let mv = Move::new(G1, F3, MoveType::Quiet);

        assert_eq!(table.get(mv), (1, 1));
    }

    #[test]
    fn updates_accumulate() {
        let mut table = HistoryTable::new();
        let mv = Move::new(G1, F3, MoveType::Quiet);

        table.update(mv, true);
        table.update(mv, true);
        table.update(mv, false);

        assert_eq!(table.get(mv), (2, 3));
    }

    #[test]
    fn collisions_evict() {
        let mut table = HistoryTable::new();
        let a = Move::new(G1, F3, MoveType::Quiet);

        table.update(a, false);

        // Find another move that hashes into the same slot.
        let colliding = (0..u16::MAX)
            .map(|raw| {
                Move::new(
                    chess::square::Square::from((raw & 63) as usize),
                    chess::square::Square::from(((raw >> 6) & 63) as usize),
                    MoveType::Quiet,
                )
            })
            .find(|&b| b != a && index(b) == index(a))
            .unwrap();

        table.update(colliding, true);

        assert_eq!(table.get(a), (1, 1), "the colliding move evicted `a`");
        assert_eq!(table.get(colliding), (1, 2));
    }
}
