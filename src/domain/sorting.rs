use crate::domain::board::Board;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting the board overview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: title, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!("Invalid sort order '{}'. Valid orders: asc, desc", s)),
        }
    }
}

/// Sorts boards in-place by the given field and direction.
///
/// Boards carry no position, so the overview order is always derived.
/// The sort is stable: ties keep their stored order.
///
/// # Examples
/// ```
/// use boardwalk_core::domain::board::{Board, NewBoard};
/// use boardwalk_core::domain::sorting::{sort_boards, SortField, SortOrder};
///
/// let mut boards = vec![
///     Board::new(NewBoard::new("Roadmap")),
///     Board::new(NewBoard::new("backlog")),
/// ];
///
/// sort_boards(&mut boards, SortField::Title, SortOrder::Ascending);
/// assert_eq!(boards[0].title, "backlog");
/// ```
pub fn sort_boards(boards: &mut [Board], field: SortField, order: SortOrder) {
    boards.sort_by(|a, b| {
        let cmp = match field {
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => compare_option_dates(a.updated_at, b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Never-updated boards sort after updated ones in ascending order
fn compare_option_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{BoardPatch, NewBoard};

    fn board(title: &str) -> Board {
        Board::new(NewBoard::new(title))
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let mut boards = vec![board("zebra"), board("Apple"), board("BANANA")];

        sort_boards(&mut boards, SortField::Title, SortOrder::Ascending);

        assert_eq!(boards[0].title, "Apple");
        assert_eq!(boards[1].title, "BANANA");
        assert_eq!(boards[2].title, "zebra");
    }

    #[test]
    fn test_sort_by_created_descending() {
        let first = board("First");
        let mut second = board("Second");
        second.created_at = first.created_at + chrono::Duration::seconds(5);

        let mut boards = vec![first, second];
        sort_boards(&mut boards, SortField::Created, SortOrder::Descending);

        assert_eq!(boards[0].title, "Second");
    }

    #[test]
    fn test_sort_by_updated_puts_untouched_last() {
        let untouched = board("Untouched");
        let edited = board("Edited").patched(&BoardPatch::default());

        let mut boards = vec![untouched, edited];
        sort_boards(&mut boards, SortField::Updated, SortOrder::Ascending);

        assert_eq!(boards[0].title, "Edited");
        assert_eq!(boards[1].title, "Untouched");
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!(SortField::from_str("Title").unwrap(), SortField::Title);
        assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::Descending);
        assert!(SortField::from_str("position").is_err());
        assert!(SortOrder::from_str("up").is_err());
    }
}
