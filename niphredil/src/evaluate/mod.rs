//! Assign a static score to a given board position.
//!
//! The evaluation sums per-side contributions and returns the difference
//! from White's point of view. Each term is a packed midgame/endgame pair;
//! the two halves are blended by remaining material on the way out, and the
//! internal scale (one pawn roughly 12,800) is rounded down to the final
//! score scale by a division by 128.
//!
//! The pawn-structure and king-shelter terms only depend on the pawns, our
//! king, and whether the enemy queen survives, so they go through a small
//! cache keyed on exactly those inputs.
//!
//! Each variant bends the evaluation its own way: atomic inflates mobility
//! and pawn worth, horde swaps pawn structure for a flat centre-weighted
//! count, and racing kings ignores almost everything except material and
//! how far the kings have run.

pub mod cache;
pub mod params;

use self::cache::EvalCache;
use chess::attacks::bishop_attacks;
use chess::attacks::king_attacks;
use chess::attacks::knight_attacks;
use chess::attacks::pawn_attacks;
use chess::attacks::queen_attacks;
use chess::attacks::rook_attacks;
use chess::bitboard::Bitboard;
use chess::bitboard::FILES;
use chess::bitboard::RANKS;
use chess::board::Board;
use chess::piece::Color;
use chess::piece::PieceType;
use chess::square::Square;
use chess::variant::Variant;
use bytemuck::Pod;
use bytemuck::Zeroable;
use self::params::*;

pub type Score = i32;

////////////////////////////////////////////////////////////////////////////////
//
// Score sentinels
//
// Four magnitudes fence the score range: evaluations stay strictly inside
// (-KNOWN_WIN, KNOWN_WIN), mate in N plies is encoded as MATE - N, and
// INFINITY bounds every search window.
//
////////////////////////////////////////////////////////////////////////////////

pub trait ScoreExt {
    const INFINITY: Self;
    const MATE: Self;
    const KNOWN_WIN: Self;

    /// Whether the score encodes a forced mate for either side.
    fn is_mate(self) -> bool;

    /// The number of plies until mate encoded in the score.
    fn mate_distance(self) -> i32;
}

impl ScoreExt for Score {
    const INFINITY: Self = 32_000_000;
    const MATE: Self = 30_000_000;
    const KNOWN_WIN: Self = 25_000_000;

    fn is_mate(self) -> bool {
        self.abs() > Self::KNOWN_WIN
    }

    fn mate_distance(self) -> i32 {
        Self::MATE - self.abs()
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Packed scores
//
////////////////////////////////////////////////////////////////////////////////

/// A packed pair of midgame and endgame scores.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct S {
    mg: i32,
    eg: i32,
}

/// Shorthand constructor, used all over the weight tables.
#[macro_export]
macro_rules! s {
    ($mg:expr, $eg:expr) => {
        $crate::evaluate::S::new($mg, $eg)
    };
}

impl S {
    pub const ZERO: S = S { mg: 0, eg: 0 };

    pub const fn new(mg: i32, eg: i32) -> Self {
        Self { mg, eg }
    }

    /// Interpolate between the midgame and endgame halves for a phase in
    /// [0, 256], where 0 is the opening and 256 a bare endgame.
    pub fn blend(self, phase: i32) -> i32 {
        let wide =
            self.mg as i64 * (256 - phase) as i64 + self.eg as i64 * phase as i64;
        (wide / 256) as i32
    }
}

impl std::ops::Add for S {
    type Output = S;

    fn add(self, rhs: Self) -> S {
        S::new(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl std::ops::AddAssign for S {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for S {
    type Output = S;

    fn sub(self, rhs: Self) -> S {
        S::new(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl std::ops::SubAssign for S {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::ops::Mul<i32> for S {
    type Output = S;

    fn mul(self, rhs: i32) -> S {
        S::new(self.mg * rhs, self.eg * rhs)
    }
}

impl std::ops::Neg for S {
    type Output = S;

    fn neg(self) -> S {
        S::new(-self.mg, -self.eg)
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Evaluation entry point
//
////////////////////////////////////////////////////////////////////////////////

/// Statically evaluate the board, from White's point of view.
pub fn evaluate(board: &Board, cache: &mut EvalCache) -> Score {
    let internal = match board.variant {
        Variant::RacingKings => racing_kings_score(board) * 128,

        _ => {
            let total = side_score(board, Color::White, cache)
                - side_score(board, Color::Black, cache);

            total.blend(phase(board))
        }
    };

    (internal + 64) / 128
}

/// The game phase as a value in [0, 256]: 0 with all pieces on the board,
/// 256 with none left.
pub fn phase(board: &Board) -> i32 {
    use PieceType::*;

    let material = board.piece_bbs[Knight].count()
        + board.piece_bbs[Bishop].count()
        + 2 * board.piece_bbs[Rook].count()
        + 4 * board.piece_bbs[Queen].count();

    let material = (material as i32).min(24);
    (24 - material) * 256 / 24
}

////////////////////////////////////////////////////////////////////////////////
//
// Per-side contributions
//
////////////////////////////////////////////////////////////////////////////////

fn side_score(board: &Board, us: Color, cache: &mut EvalCache) -> S {
    let them = !us;
    let mut score = S::ZERO;

    // The horde side swaps pawn structure and shelter for a flat
    // centre-weighted count and the balancing constant.
    let horde_side = board.variant == Variant::Horde && board.king(us).is_none();

    if horde_side {
        for sq in board.pawns(us) {
            let centre = HORDE_PAWN_FILE[sq.file()] * 128;
            score += PIECE_VALUES[PieceType::Pawn] + S::new(centre, centre);
        }

        score += HORDE_BALANCE;
    } else {
        score += pawn_and_shelter(board, us, cache);
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Material and mobility
    //
    // Mobility counts the attack set minus our own pawns and everything the
    // enemy pawns cover.
    //
    ////////////////////////////////////////////////////////////////////////////

    let blockers = board.all_occupied();
    let excluded = board.pawns(us) | board.pawn_attacks(them);

    let mobility_scale = if board.variant == Variant::Atomic {
        ATOMIC_MOBILITY_SCALE
    } else {
        1
    };

    for ptype in PieceType::ALL {
        if ptype == PieceType::Pawn && horde_side {
            continue;
        }

        for sq in board.piece_bb(us, ptype) {
            score += PIECE_VALUES[ptype];

            let attacks = match ptype {
                PieceType::Pawn => pawn_attacks(sq, us),
                PieceType::Knight => knight_attacks(sq),
                PieceType::Bishop => bishop_attacks(sq, blockers),
                PieceType::Rook => rook_attacks(sq, blockers),
                PieceType::Queen => queen_attacks(sq, blockers),
                PieceType::King => king_attacks(sq),
            };

            let reachable = (attacks & !excluded).count() as i32;
            score += MOBILITY[ptype] * (reachable * mobility_scale);
        }
    }

    if board.variant == Variant::Atomic {
        score += ATOMIC_PAWN_BONUS * board.pawns(us).count() as i32;
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Tactical bonuses
    //
    ////////////////////////////////////////////////////////////////////////////

    score += BISHOP_PAIR * (board.bishops(us).count() as i32 / 2);

    for sq in board.rooks(us) {
        let file = FILES[sq.file()];

        if (file & board.pawns(us)).is_empty() {
            if (file & board.pawns(them)).is_empty() {
                score += ROOK_OPEN_FILE;
            } else {
                score += ROOK_HALF_OPEN_FILE;
            }
        }
    }

    let threatened = board.pawn_attacks(us) & board.occupied_by(them) & !board.pawns(them);
    score += PAWN_THREAT * threatened.count() as i32;

    score
}

////////////////////////////////////////////////////////////////////////////////
//
// Pawn structure and king shelter, cached
//
////////////////////////////////////////////////////////////////////////////////

fn pawn_and_shelter(board: &Board, us: Color, cache: &mut EvalCache) -> S {
    let own_pawns = board.pawns(us);
    let their_pawns = board.pawns(!us);
    let king = board.king(us);
    let queen_present = !board.queens(!us).is_empty();

    let key = EvalCache::key(
        us as usize,
        own_pawns.0,
        their_pawns.0,
        king.map(|sq| sq as u64).unwrap_or(64),
        queen_present,
    );

    if let Some(score) = cache.probe(key) {
        return score;
    }

    let white = us.is_white();
    let mut score = S::ZERO;

    for sq in own_pawns {
        let rank = sq.rank();
        let file = sq.file();
        let rel_rank = sq.relative_rank(white);
        let neighbours = adjacent_files(file) & !FILES[file];

        score += PAWN_RANK[rel_rank] + PAWN_FILE[file];

        let front = ranks_ahead(rank, white);

        if (front & adjacent_files(file) & their_pawns).is_empty() {
            score += PASSED_PAWN[rel_rank];
        }

        if (neighbours & own_pawns).is_empty() {
            score += ISOLATED_PAWN;
        }

        if !(front & FILES[file] & own_pawns).is_empty() {
            score += DOUBLED_PAWN;
        }

        let phalanx = (Bitboard::from(sq).left() | Bitboard::from(sq).right()) & own_pawns;
        let defenders = pawn_attacks(sq, !us) & own_pawns;

        if !(phalanx | defenders).is_empty() {
            score += CONNECTED_PAWN;
        }
    }

    // Shelter only matters while the enemy queen is around to punish a bare
    // king.
    if let (Some(king), true) = (king, queen_present) {
        let zone = shelter_zone(king, white);
        let shield = (zone & own_pawns).count().min(3) as i32;
        score += PAWN_SHIELD * shield;

        for file in king_files(king.file()) {
            if (FILES[file] & own_pawns).is_empty() {
                score += KING_OPEN_FILE;
            }
        }
    }

    cache.insert(key, score);
    score
}

/// All ranks strictly ahead of `rank` from `white`'s point of view.
fn ranks_ahead(rank: usize, white: bool) -> Bitboard {
    let mut ahead = Bitboard::EMPTY;

    if white {
        for r in rank + 1..8 {
            ahead |= RANKS[r];
        }
    } else {
        for r in 0..rank {
            ahead |= RANKS[r];
        }
    }

    ahead
}

/// The file itself plus its neighbours.
fn adjacent_files(file: usize) -> Bitboard {
    let mut files = FILES[file];

    if file > 0 {
        files |= FILES[file - 1];
    }
    if file < 7 {
        files |= FILES[file + 1];
    }

    files
}

/// The two ranks directly ahead of the king, across its three files.
fn shelter_zone(king: Square, white: bool) -> Bitboard {
    let files = adjacent_files(king.file());
    let rank = king.rank();
    let mut zone = Bitboard::EMPTY;

    if white {
        for r in [rank + 1, rank + 2] {
            if r < 8 {
                zone |= RANKS[r];
            }
        }
    } else {
        for r in [rank.wrapping_sub(1), rank.wrapping_sub(2)] {
            if r < 8 {
                zone |= RANKS[r];
            }
        }
    }

    zone & files
}

fn king_files(file: usize) -> std::ops::RangeInclusive<usize> {
    file.saturating_sub(1)..=(file + 1).min(7)
}

////////////////////////////////////////////////////////////////////////////////
//
// Racing kings
//
// Material plus how far the kings (and knights) have advanced; nothing
// else matters in a footrace. The caller scales the result back into the
// internal range.
//
////////////////////////////////////////////////////////////////////////////////

fn racing_kings_score(board: &Board) -> Score {
    use PieceType::*;

    let mut total = 0;

    for (us, sign) in [(Color::White, 1), (Color::Black, -1)] {
        let mut cp = 0;

        for ptype in [Knight, Bishop, Rook, Queen] {
            cp += board.piece_bb(us, ptype).count() as i32 * RK_PIECE_VALUE[ptype];
        }

        if let Some(king) = board.king(us) {
            cp += RK_KING_ADVANCE * king.rank() as i32;
        }

        for knight in board.knights(us) {
            cp += RK_KNIGHT_ADVANCE * knight.rank() as i32;
        }

        total += sign * cp;
    }

    total
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let board = Board::default();
        let mut cache = EvalCache::new();

        assert_eq!(evaluate(&board, &mut cache), 0);
    }

    #[test]
    fn evaluation_is_idempotent_through_the_cache() {
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let mut cache = EvalCache::new();

        let cold = evaluate(&board, &mut cache);
        let warm = evaluate(&board, &mut cache);

        assert_eq!(cold, warm);
        assert!(cache.hits > 0);
    }

    #[test]
    fn evaluation_stays_in_bounds() {
        let mut cache = EvalCache::new();

        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/QQQQKQQQ w - - 0 1",
            "k7/8/8/8/8/8/8/1R6 w - - 0 1",
            "8/8/8/8/8/8/8/K1k5 w - - 0 1",
        ];

        for fen in fens {
            let board: Board = fen.parse().unwrap();
            let score = evaluate(&board, &mut cache);
            assert!(
                -Score::KNOWN_WIN < score && score < Score::KNOWN_WIN,
                "{fen} evaluates to {score}"
            );
        }
    }

    #[test]
    fn material_advantage_shows() {
        let mut cache = EvalCache::new();

        let up_a_rook: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        assert!(evaluate(&up_a_rook, &mut cache) > 300);

        let down_a_queen: Board = "q3k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(evaluate(&down_a_queen, &mut cache) < -600);
    }

    #[test]
    fn racing_kings_rewards_the_runner() {
        let behind =
            Board::from_fen("8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1", Variant::RacingKings)
                .unwrap();
        let ahead = Board::from_fen("8/8/8/7K/8/8/krbnNBR1/qrbnNBRQ w - - 0 1", Variant::RacingKings)
            .unwrap();

        let mut cache = EvalCache::new();
        assert!(evaluate(&ahead, &mut cache) > evaluate(&behind, &mut cache));
    }

    #[test]
    fn horde_balance_keeps_the_start_playable() {
        let board = Board::from_fen(Variant::Horde.start_fen(), Variant::Horde).unwrap();
        let mut cache = EvalCache::new();

        let score = evaluate(&board, &mut cache);
        assert!(score.abs() < 2000, "horde start evaluates to {score}");
    }

    #[test]
    fn mate_scores_are_recognised() {
        assert!((Score::MATE - 5).is_mate());
        assert!((-Score::MATE + 12).is_mate());
        assert!(!Score::KNOWN_WIN.is_mate());
        assert!(!(0).is_mate());
        assert_eq!((Score::MATE - 7).mate_distance(), 7);
    }
}
