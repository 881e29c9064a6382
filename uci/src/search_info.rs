//! The `info` lines the engine prints while searching.

use colored::Colorize;
use chess::moves::Move;
use std::fmt::Display;
use std::time::Duration;

/// One iteration's worth of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchInfo {
    pub depth: Option<u8>,
    pub seldepth: Option<u8>,
    pub time: Option<u64>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub hashfull: Option<u32>,
    pub score: Option<Score>,
    pub pv: Vec<Move>,
}

/// A score as reported over UCI: centipawns, or moves until mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {cp}"),
            Score::Mate(moves) => write!(f, "mate {moves}"),
        }
    }
}

impl Display for SearchInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(depth) = self.depth {
            write!(f, "depth {depth}")?;
        }

        if let Some(seldepth) = self.seldepth {
            write!(f, " seldepth {seldepth}")?;
        }

        if let Some(score) = self.score {
            write!(f, " score {score}")?;
        }

        if let Some(nodes) = self.nodes {
            write!(f, " nodes {nodes}")?;
        }

        if let Some(nps) = self.nps {
            write!(f, " nps {nps}")?;
        }

        if let Some(hashfull) = self.hashfull {
            write!(f, " hashfull {hashfull}")?;
        }

        if let Some(time) = self.time {
            write!(f, " time {time}")?;
        }

        if !self.pv.is_empty() {
            write!(f, " pv")?;
            for mv in &self.pv {
                write!(f, " {mv}")?;
            }
        }

        Ok(())
    }
}

impl SearchInfo {
    /// A human-friendly rendering for interactive sessions, one line per
    /// iteration.
    pub fn to_pretty(&self) -> String {
        let depth = match (self.depth, self.seldepth) {
            (Some(d), Some(sd)) => format!("{d:>3}/{sd:<3}"),
            (Some(d), None) => format!("{d:>3}    "),
            _ => "       ".to_string(),
        };

        let score = match self.score {
            Some(Score::Cp(cp)) => {
                let pawns = cp as f64 / 100.0;
                if cp >= 0 {
                    format!("{:>8}", format!("+{pawns:.2}")).green().to_string()
                } else {
                    format!("{:>8}", format!("{pawns:.2}")).red().to_string()
                }
            }
            Some(Score::Mate(moves)) => {
                format!("{:>8}", format!("#{moves}")).yellow().to_string()
            }
            None => format!("{:>8}", "?"),
        };

        let time = Duration::from_millis(self.time.unwrap_or_default());
        let nodes = self.nodes.unwrap_or_default();
        let nps = self.nps.unwrap_or_default();

        let pv = self
            .pv
            .iter()
            .take(12)
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "{depth} {score}  {:>8} {:>10} {:>9}  {}",
            format!("{:.2}s", time.as_secs_f64()).bright_black(),
            format!("{nodes}n").bright_black(),
            format!("{}knps", nps / 1000).bright_black(),
            pv.blue(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::moves::MoveType;
    use chess::square::Square::*;

    #[test]
    fn uci_formatting() {
        let info = SearchInfo {
            depth: Some(8),
            seldepth: Some(13),
            time: Some(42),
            nodes: Some(12345),
            nps: Some(290000),
            hashfull: Some(17),
            score: Some(Score::Cp(35)),
            pv: vec![
                Move::new(E2, E4, MoveType::DoublePush),
                Move::new(E7, E5, MoveType::DoublePush),
            ],
        };

        assert_eq!(
            info.to_string(),
            "depth 8 seldepth 13 score cp 35 nodes 12345 nps 290000 \
             hashfull 17 time 42 pv e2e4 e7e5"
        );
    }

    #[test]
    fn mate_scores() {
        assert_eq!(Score::Mate(3).to_string(), "mate 3");
        assert_eq!(Score::Mate(-2).to_string(), "mate -2");
    }
}
