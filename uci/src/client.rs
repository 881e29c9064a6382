//! Messages sent from the client (GUI, match runner) to the engine.

use crate::time_control::TimeControl;
use anyhow::anyhow;
use chess::moves::BareMove;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum UciClientMessage {
    Uci,
    Debug(bool),
    IsReady,
    SetOption(String, String),
    UciNewGame,

    /// A position to set up: a FEN (None means the variant's start position)
    /// followed by moves to apply.
    Position(Option<String>, Vec<BareMove>),

    /// Start searching. The flag marks a ponder search.
    Go(TimeControl, bool),

    PonderHit,
    Stop,
    Quit,
}

impl Display for UciClientMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use UciClientMessage::*;

        match self {
            Uci => write!(f, "uci"),
            Debug(flag) => write!(f, "debug {}", if *flag { "on" } else { "off" }),
            IsReady => write!(f, "isready"),
            SetOption(name, value) => write!(f, "setoption name {name} value {value}"),
            UciNewGame => write!(f, "ucinewgame"),

            Position(fen, moves) => {
                match fen {
                    Some(fen) => write!(f, "position fen {fen}")?,
                    None => write!(f, "position startpos")?,
                }

                if !moves.is_empty() {
                    write!(f, " moves")?;
                    for mv in moves {
                        write!(f, " {mv}")?;
                    }
                }

                Ok(())
            }

            Go(tc, ponder) => {
                if *ponder {
                    write!(f, "go ponder {tc}")
                } else {
                    write!(f, "go {tc}")
                }
            }

            PonderHit => write!(f, "ponderhit"),
            Stop => write!(f, "stop"),
            Quit => write!(f, "quit"),
        }
    }
}

impl FromStr for UciClientMessage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        use UciClientMessage::*;

        let s = s.trim();
        let (msg, remainder) = s.split_once(' ').unwrap_or((s, ""));

        match msg {
            "uci" => Ok(Uci),
            "isready" => Ok(IsReady),
            "ucinewgame" => Ok(UciNewGame),
            "ponderhit" => Ok(PonderHit),
            "stop" => Ok(Stop),
            "quit" => Ok(Quit),

            "debug" => match remainder.split_whitespace().next() {
                Some("on") => Ok(Debug(true)),
                Some("off") => Ok(Debug(false)),
                _ => Err(anyhow!("Not a valid debug flag: {remainder}")),
            },

            "setoption" => {
                let mut parts = remainder.split_whitespace();

                if parts.next() != Some("name") {
                    return Err(anyhow!("Malformed setoption: {s}"));
                }

                let name = parts
                    .by_ref()
                    .take_while(|&word| word != "value")
                    .collect::<Vec<_>>()
                    .join(" ");

                let value = parts.collect::<Vec<_>>().join(" ");

                Ok(SetOption(name, value))
            }

            "position" => {
                let mut parts = remainder.split_whitespace();

                let fen = match parts.next() {
                    Some("startpos") => None,
                    Some("fen") => {
                        let fen = parts
                            .by_ref()
                            .take_while(|&word| word != "moves")
                            .collect::<Vec<_>>()
                            .join(" ");

                        Some(fen)
                    }
                    _ => Err(anyhow!("Malformed position command: {s}"))?,
                };

                // `take_while` above already consumed the `moves` keyword
                // for the fen case; for startpos it is still pending.
                let mut moves = Vec::new();

                for word in parts {
                    if word == "moves" {
                        continue;
                    }
                    moves.push(word.parse::<BareMove>()?);
                }

                Ok(Position(fen, moves))
            }

            "go" => {
                let (ponder, tc) = match remainder.split_once(' ') {
                    _ if remainder == "ponder" => (true, ""),
                    Some(("ponder", rest)) => (true, rest),
                    _ => (false, remainder),
                };

                Ok(Go(tc.parse()?, ponder))
            }

            _ => Err(anyhow!("Not a valid UCI message: {msg}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_position_commands() {
        let msg: UciClientMessage = "position startpos moves e2e4 e7e5".parse().unwrap();

        match msg {
            UciClientMessage::Position(None, moves) => assert_eq!(moves.len(), 2),
            other => panic!("Parsed into {other:?}"),
        }

        let msg: UciClientMessage =
            "position fen 4k3/8/8/8/8/8/8/R3K3 w - - 0 1 moves a1a8".parse().unwrap();

        match msg {
            UciClientMessage::Position(Some(fen), moves) => {
                assert_eq!(fen, "4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
                assert_eq!(moves.len(), 1);
            }
            other => panic!("Parsed into {other:?}"),
        }
    }

    #[test]
    fn parse_go_commands() {
        let msg: UciClientMessage = "go depth 6".parse().unwrap();
        assert!(matches!(
            msg,
            UciClientMessage::Go(TimeControl::Depth(6), false)
        ));

        let msg: UciClientMessage = "go ponder wtime 1000 btime 1000".parse().unwrap();
        assert!(matches!(msg, UciClientMessage::Go(TimeControl::Clock { .. }, true)));

        let msg: UciClientMessage = "go".parse().unwrap();
        assert!(matches!(
            msg,
            UciClientMessage::Go(TimeControl::Infinite, false)
        ));
    }

    #[test]
    fn parse_setoption_commands() {
        let msg: UciClientMessage = "setoption name UCI_Variant value atomic".parse().unwrap();

        match msg {
            UciClientMessage::SetOption(name, value) => {
                assert_eq!(name, "UCI_Variant");
                assert_eq!(value, "atomic");
            }
            other => panic!("Parsed into {other:?}"),
        }
    }
}
