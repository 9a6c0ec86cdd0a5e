//! Presentation of raw server lines in the terminal client.

use shared::protocol::{parse_gold_needed, parse_picked_up, FAIL, NOTHING_TO_PICK_UP, SUCCESS, WINNER};
use shared::{Tile, LOOK_RADIUS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    Winner,
    GoldNeeded(u32),
    PickedUp(u32),
    Success,
    Fail,
    NothingToPickUp,
    ViewRow(String),
    Other(String),
}

impl ServerLine {
    pub fn classify(line: &str) -> ServerLine {
        let line = line.trim_end();
        if line == WINNER {
            return ServerLine::Winner;
        }
        if let Some(remaining) = parse_gold_needed(line) {
            return ServerLine::GoldNeeded(remaining);
        }
        if let Some(total) = parse_picked_up(line) {
            return ServerLine::PickedUp(total);
        }
        match line {
            SUCCESS => ServerLine::Success,
            FAIL => ServerLine::Fail,
            NOTHING_TO_PICK_UP => ServerLine::NothingToPickUp,
            _ if is_view_row(line) => ServerLine::ViewRow(line.to_string()),
            _ => ServerLine::Other(line.to_string()),
        }
    }

    /// Text shown to the player for this line.
    pub fn describe(&self) -> String {
        match self {
            ServerLine::Winner => "You have won the game!".to_string(),
            ServerLine::GoldNeeded(0) => "You have enough gold, find the exit.".to_string(),
            ServerLine::GoldNeeded(remaining) => format!("Gold still needed: {}", remaining),
            ServerLine::PickedUp(total) => format!("Picked up gold, you now have {}", total),
            ServerLine::Success => "OK".to_string(),
            ServerLine::Fail => "Failed".to_string(),
            ServerLine::NothingToPickUp => NOTHING_TO_PICK_UP.to_string(),
            ServerLine::ViewRow(row) => format!("  {}", row),
            ServerLine::Other(line) => line.clone(),
        }
    }
}

fn is_view_row(line: &str) -> bool {
    line.chars().count() == LOOK_RADIUS && line.chars().all(|c| Tile::from_symbol(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_replies() {
        assert_eq!(ServerLine::classify("WINNER"), ServerLine::Winner);
        assert_eq!(ServerLine::classify("GOLD: 3"), ServerLine::GoldNeeded(3));
        assert_eq!(
            ServerLine::classify("SUCCESS, GOLD COINS: 2"),
            ServerLine::PickedUp(2)
        );
        assert_eq!(ServerLine::classify("SUCCESS"), ServerLine::Success);
        assert_eq!(ServerLine::classify("FAIL\r\n"), ServerLine::Fail);
        assert_eq!(
            ServerLine::classify("There is nothing to pick up..."),
            ServerLine::NothingToPickUp
        );
    }

    #[test]
    fn test_classify_view_rows() {
        assert_eq!(
            ServerLine::classify("X#.GX"),
            ServerLine::ViewRow("X#.GX".to_string())
        );
        assert!(matches!(ServerLine::classify("#.P.E"), ServerLine::ViewRow(_)));
        assert!(matches!(ServerLine::classify("hello"), ServerLine::Other(_)));
        assert!(matches!(ServerLine::classify("###"), ServerLine::Other(_)));
    }

    #[test]
    fn test_describe() {
        assert_eq!(ServerLine::GoldNeeded(0).describe(), "You have enough gold, find the exit.");
        assert_eq!(ServerLine::GoldNeeded(2).describe(), "Gold still needed: 2");
        assert_eq!(ServerLine::ViewRow("X###X".into()).describe(), "  X###X");
    }
}
