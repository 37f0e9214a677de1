//! Discrete player commands accepted by the rules engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::{Coord, Side};

/// A command issued by a player (or the AI on its behalf).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Command {
    /// Place the next queued piece on an empty cell.
    Place {
        /// Target cell.
        at: Coord,
    },
    /// Select one of the current player's pieces.
    Select {
        /// Cell holding the piece.
        at: Coord,
    },
    /// Move the selected piece.
    Move {
        /// Destination cell.
        to: Coord,
    },
    /// Build a wall on the moved-to cell.
    Wall {
        /// The moved-to cell.
        at: Coord,
        /// Which edge to wall.
        side: Side,
    },
    /// Drop the current selection.
    Unselect,
    /// Start the match over with the same players.
    Reset,
}

/// Failure to parse the text command syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse command '{input}': {reason}")]
pub struct ParseCommandError {
    /// The offending input.
    pub input: String,
    /// What was wrong with it.
    pub reason: String,
}

impl ParseCommandError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

fn parse_coord<'a>(
    input: &str,
    parts: &mut impl Iterator<Item = &'a str>,
) -> Result<Coord, ParseCommandError> {
    let mut next_u16 = |axis: &str| -> Result<u16, ParseCommandError> {
        let raw = parts
            .next()
            .ok_or_else(|| ParseCommandError::new(input, format!("missing {axis}")))?;
        raw.parse::<u16>()
            .map_err(|e| ParseCommandError::new(input, format!("bad {axis} '{raw}': {e}")))
    };
    let x = next_u16("x")?;
    let y = next_u16("y")?;
    Ok(Coord::new(x, y))
}

/// Text syntax: `place X Y`, `select X Y`, `move X Y`, `wall X Y SIDE`, `unselect`, `reset`.
impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| ParseCommandError::new(s, "empty command"))?
            .to_ascii_lowercase();

        let command = match verb.as_str() {
            "place" | "p" => Command::Place {
                at: parse_coord(s, &mut parts)?,
            },
            "select" | "s" => Command::Select {
                at: parse_coord(s, &mut parts)?,
            },
            "move" | "m" => Command::Move {
                to: parse_coord(s, &mut parts)?,
            },
            "wall" | "w" => {
                let at = parse_coord(s, &mut parts)?;
                let side = parts
                    .next()
                    .ok_or_else(|| ParseCommandError::new(s, "missing side"))?
                    .parse::<Side>()
                    .map_err(|reason| ParseCommandError::new(s, reason))?;
                Command::Wall { at, side }
            }
            "unselect" | "u" => Command::Unselect,
            "reset" => Command::Reset,
            other => return Err(ParseCommandError::new(s, format!("unknown verb '{other}'"))),
        };

        if parts.next().is_some() {
            return Err(ParseCommandError::new(s, "trailing input"));
        }
        Ok(command)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Place { at } => write!(f, "place {} {}", at.x, at.y),
            Command::Select { at } => write!(f, "select {} {}", at.x, at.y),
            Command::Move { to } => write!(f, "move {} {}", to.x, to.y),
            Command::Wall { at, side } => write!(f, "wall {} {} {side}", at.x, at.y),
            Command::Unselect => f.write_str("unselect"),
            Command::Reset => f.write_str("reset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "place 3 4".parse::<Command>().unwrap(),
            Command::Place { at: Coord::new(3, 4) }
        );
        assert_eq!(
            "WALL 1 2 left".parse::<Command>().unwrap(),
            Command::Wall {
                at: Coord::new(1, 2),
                side: Side::Left
            }
        );
        assert_eq!("unselect".parse::<Command>().unwrap(), Command::Unselect);
        assert_eq!("m 0 6".parse::<Command>().unwrap(), Command::Move { to: Coord::new(0, 6) });
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("place 3".parse::<Command>().is_err());
        assert!("place -1 2".parse::<Command>().is_err());
        assert!("wall 1 1 sideways".parse::<Command>().is_err());
        assert!("reset now".parse::<Command>().is_err());
        assert!("jump 1 1".parse::<Command>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let cmd = Command::Wall {
            at: Coord::new(5, 0),
            side: Side::Bottom,
        };
        assert_eq!(cmd.to_string().parse::<Command>().unwrap(), cmd);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Command::Select { at: Coord::new(1, 2) }).unwrap();
        assert_eq!(json, r#"{"cmd":"select","at":{"x":1,"y":2}}"#);
    }
}
