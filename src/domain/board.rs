use crate::domain::id::BoardId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Colour tag shown on a board tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardColor {
    #[default]
    Blue,
    Green,
    Red,
    Purple,
    Orange,
    Pink,
    Yellow,
    Gray,
}

impl BoardColor {
    pub const ALL: [BoardColor; 8] = [
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Purple,
        Self::Orange,
        Self::Pink,
        Self::Yellow,
        Self::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Yellow => "yellow",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for BoardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardColor {
    type Err = crate::error::BoardwalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        // "grey" is accepted as an alias
        if normalized == "grey" {
            return Ok(Self::Gray);
        }
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == normalized)
            .ok_or_else(|| {
                crate::error::BoardwalkError::Validation(format!("Unknown board color '{}'", s))
            })
    }
}

/// Fields a caller supplies when creating a board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBoard {
    pub title: String,
    pub description: String,
    pub color: BoardColor,
}

impl NewBoard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: BoardColor) -> Self {
        self.color = color;
        self
    }
}

/// Partial update for a board; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<BoardColor>,
}

/// Top-level container of lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: BoardColor,
    pub created_at: DateTime<Utc>,
    /// Absent until the first edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Board {
    pub fn new(data: NewBoard) -> Self {
        Self {
            id: BoardId::new(),
            title: data.title.trim().to_string(),
            description: data.description,
            color: data.color,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Returns a copy with the patch merged in and `updated_at` refreshed
    pub fn patched(&self, patch: &BoardPatch) -> Self {
        let mut board = self.clone();
        if let Some(title) = &patch.title {
            board.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            board.description = description.clone();
        }
        if let Some(color) = patch.color {
            board.color = color;
        }
        board.updated_at = Some(Utc::now());
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_creation() {
        let board = Board::new(NewBoard::new("  Backlog ").with_color(BoardColor::Green));
        assert_eq!(board.title, "Backlog");
        assert_eq!(board.color, BoardColor::Green);
        assert!(board.updated_at.is_none());
    }

    #[test]
    fn test_patch_keeps_created_at_and_sets_updated_at() {
        let board = Board::new(NewBoard::new("Backlog"));
        let patched = board.patched(&BoardPatch {
            description: Some("Everything not yet scheduled".to_string()),
            ..BoardPatch::default()
        });

        assert_eq!(patched.id, board.id);
        assert_eq!(patched.title, "Backlog");
        assert_eq!(patched.created_at, board.created_at);
        assert!(patched.updated_at.is_some());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(BoardColor::from_str("blue").unwrap(), BoardColor::Blue);
        assert_eq!(BoardColor::from_str("PURPLE").unwrap(), BoardColor::Purple);
        assert_eq!(BoardColor::from_str("grey").unwrap(), BoardColor::Gray);
        assert!(BoardColor::from_str("mauve").is_err());
    }

    #[test]
    fn test_board_serialization_omits_missing_update() {
        let board = Board::new(NewBoard::new("Backlog"));
        let json = serde_json::to_string(&board).unwrap();
        assert!(!json.contains("updated_at"));
        assert!(json.contains("\"color\":\"blue\""));
    }

    #[test]
    fn test_timestamps_round_trip() {
        let board = Board::new(NewBoard::new("Backlog")).patched(&BoardPatch::default());
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.created_at, board.created_at);
        assert_eq!(restored.updated_at, board.updated_at);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
            "title": "Old board",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;

        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.color, BoardColor::Blue);
        assert_eq!(board.description, "");
        assert!(board.updated_at.is_none());
    }
}
