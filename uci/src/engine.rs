//! Messages sent from the engine back to the client.

use crate::search_info::SearchInfo;
use chess::moves::Move;
use std::fmt::Display;

#[derive(Debug, Clone)]
pub enum UciEngineMessage {
    Id(IdType),
    UciOk,
    ReadyOk,
    BestMove(Move, Option<Move>),
    Info(SearchInfo),
}

#[derive(Debug, Clone)]
pub enum IdType {
    Name(String),
    Author(String),
}

impl Display for UciEngineMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use UciEngineMessage::*;

        match self {
            Id(IdType::Name(name)) => write!(f, "id name {name}"),
            Id(IdType::Author(author)) => write!(f, "id author {author}"),
            UciOk => write!(f, "uciok"),
            ReadyOk => write!(f, "readyok"),

            BestMove(mv, ponder) => {
                write!(f, "bestmove {mv}")?;

                if let Some(ponder) = ponder {
                    write!(f, " ponder {ponder}")?;
                }

                Ok(())
            }

            Info(info) => write!(f, "info {info}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::moves::MoveType;
    use chess::square::Square::*;

    #[test]
    fn best_move_formatting() {
        let best = Move::new(E2, E4, MoveType::DoublePush);
        let reply = Move::new(E7, E5, MoveType::DoublePush);

        assert_eq!(
            UciEngineMessage::BestMove(best, None).to_string(),
            "bestmove e2e4"
        );
        assert_eq!(
            UciEngineMessage::BestMove(best, Some(reply)).to_string(),
            "bestmove e2e4 ponder e7e5"
        );
    }
}
