//! Time controls, as requested by the client in a `go` command.

use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// The constraint placed on a single search: a depth, a node count, a fixed
/// time, a full clock to be budgeted, or nothing at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeControl {
    /// Keep going until an explicit `stop`
    Infinite,

    /// Search up to the requested depth
    Depth(usize),

    /// Search the requested number of nodes
    Nodes(u64),

    /// Search for a fixed amount of time
    FixedTime(Duration),

    /// Remaining clock time and increments; the engine budgets its own time
    Clock {
        wtime: Duration,
        btime: Duration,
        winc: Option<Duration>,
        binc: Option<Duration>,
        movestogo: Option<u32>,
    },
}

impl Display for TimeControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TimeControl::*;

        match self {
            Infinite => write!(f, "infinite"),
            Depth(n) => write!(f, "depth {n}"),
            Nodes(n) => write!(f, "nodes {n}"),
            FixedTime(t) => write!(f, "movetime {}", t.as_millis()),
            Clock {
                wtime,
                btime,
                winc,
                binc,
                movestogo,
            } => {
                write!(f, "wtime {} btime {}", wtime.as_millis(), btime.as_millis())?;

                if let Some(winc) = winc {
                    write!(f, " winc {}", winc.as_millis())?;
                }

                if let Some(binc) = binc {
                    write!(f, " binc {}", binc.as_millis())?;
                }

                if let Some(movestogo) = movestogo {
                    write!(f, " movestogo {movestogo}")?;
                }

                Ok(())
            }
        }
    }
}

impl FromStr for TimeControl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "infinite" {
            return Ok(TimeControl::Infinite);
        }

        let mut parts = s.split_whitespace();
        let mut wtime = None;
        let mut btime = None;
        let mut winc = None;
        let mut binc = None;
        let mut movestogo = None;

        while let Some(keyword) = parts.next() {
            let mut value = || {
                parts
                    .next()
                    .ok_or(anyhow!("Time control is missing a value: {s}"))
            };

            match keyword {
                "depth" => return Ok(TimeControl::Depth(value()?.parse()?)),
                "nodes" => return Ok(TimeControl::Nodes(value()?.parse()?)),
                "movetime" => {
                    return Ok(TimeControl::FixedTime(Duration::from_millis(
                        value()?.parse()?,
                    )))
                }

                "wtime" => wtime = Some(Duration::from_millis(value()?.parse()?)),
                "btime" => btime = Some(Duration::from_millis(value()?.parse()?)),
                "winc" => winc = Some(Duration::from_millis(value()?.parse()?)),
                "binc" => binc = Some(Duration::from_millis(value()?.parse()?)),
                "movestogo" => movestogo = Some(value()?.parse()?),

                _ => Err(anyhow!("Not a valid time control: {s}"))?,
            }
        }

        match (wtime, btime) {
            (Some(wtime), Some(btime)) => Ok(TimeControl::Clock {
                wtime,
                btime,
                winc,
                binc,
                movestogo,
            }),
            _ => Err(anyhow!("Clock time control needs both wtime and btime: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_controls() {
        assert_eq!("infinite".parse::<TimeControl>().unwrap(), TimeControl::Infinite);
        assert_eq!("".parse::<TimeControl>().unwrap(), TimeControl::Infinite);
        assert_eq!("depth 9".parse::<TimeControl>().unwrap(), TimeControl::Depth(9));
        assert_eq!(
            "nodes 50000".parse::<TimeControl>().unwrap(),
            TimeControl::Nodes(50000)
        );
        assert_eq!(
            "movetime 1500".parse::<TimeControl>().unwrap(),
            TimeControl::FixedTime(Duration::from_millis(1500))
        );
    }

    #[test]
    fn parse_clock_controls() {
        let tc: TimeControl = "wtime 60000 btime 55000 winc 1000 binc 1000 movestogo 38"
            .parse()
            .unwrap();

        assert_eq!(
            tc,
            TimeControl::Clock {
                wtime: Duration::from_millis(60000),
                btime: Duration::from_millis(55000),
                winc: Some(Duration::from_millis(1000)),
                binc: Some(Duration::from_millis(1000)),
                movestogo: Some(38),
            }
        );

        assert!("wtime 60000".parse::<TimeControl>().is_err());
    }

    #[test]
    fn round_trips() {
        for tc in ["depth 6", "nodes 1234", "movetime 100", "infinite"] {
            assert_eq!(tc.parse::<TimeControl>().unwrap().to_string(), tc);
        }
    }
}
