//! Points leaderboard.

use serde::{Deserialize, Serialize};

/// One learner on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub id: String,
    pub name: String,
    pub university: String,
    pub points: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub medal_count: u32,
    #[serde(default)]
    pub completed_lessons: u32,
}

fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Podium {
    Gold,
    Silver,
    Bronze,
}

impl Podium {
    #[must_use]
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Podium::Gold),
            2 => Some(Podium::Silver),
            3 => Some(Podium::Bronze),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Podium::Gold => "🥇 Campeão",
            Podium::Silver => "🥈 Vice-Campeão",
            Podium::Bronze => "🥉 3º Lugar",
        }
    }
}

/// Entries sorted by points, highest first. Ties keep their input order.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    entries: Vec<RankingEntry>,
    current_user_id: String,
}

impl Leaderboard {
    #[must_use]
    pub fn new(mut entries: Vec<RankingEntry>, current_user_id: impl Into<String>) -> Self {
        entries.sort_by(|a, b| b.points.cmp(&a.points));
        Self {
            entries,
            current_user_id: current_user_id.into(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// `(rank, entry)` pairs, ranks starting at 1.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &RankingEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }

    #[must_use]
    pub fn top_three(&self) -> &[RankingEntry] {
        &self.entries[..self.entries.len().min(3)]
    }

    #[must_use]
    pub fn current_rank(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.id == self.current_user_id)
            .map(|i| i + 1)
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&RankingEntry> {
        self.entries.iter().find(|e| e.id == self.current_user_id)
    }

    /// The current user is listed below the podium.
    #[must_use]
    pub fn show_current_separately(&self) -> bool {
        self.current_rank().is_some_and(|rank| rank > 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, points: u32) -> RankingEntry {
        RankingEntry {
            id: id.into(),
            name: format!("Nome {id}"),
            university: "UEM".into(),
            points,
            level: 1,
            medal_count: 0,
            completed_lessons: 0,
        }
    }

    #[test]
    fn sorts_by_points_and_ranks_from_one() {
        let board = Leaderboard::new(
            vec![entry("a", 10), entry("b", 30), entry("c", 20)],
            "c",
        );
        let ids: Vec<_> = board.ranked().map(|(r, e)| (r, e.id.as_str())).collect();
        assert_eq!(ids, [(1, "b"), (2, "c"), (3, "a")]);
        assert_eq!(board.current_rank(), Some(2));
        assert!(!board.show_current_separately());
    }

    #[test]
    fn current_user_below_podium_is_shown_separately() {
        let board = Leaderboard::new(
            vec![
                entry("a", 500),
                entry("b", 400),
                entry("c", 300),
                entry("me", 165),
            ],
            "me",
        );
        assert_eq!(board.top_three().len(), 3);
        assert_eq!(board.current_rank(), Some(4));
        assert!(board.show_current_separately());
        assert_eq!(board.current_entry().unwrap().points, 165);
    }

    #[test]
    fn ties_keep_input_order() {
        let board = Leaderboard::new(vec![entry("x", 5), entry("y", 5)], "y");
        assert_eq!(board.current_rank(), Some(2));
    }

    #[test]
    fn unknown_user_has_no_rank() {
        let board = Leaderboard::new(vec![entry("a", 1)], "ghost");
        assert_eq!(board.current_rank(), None);
        assert!(!board.show_current_separately());
    }

    #[test]
    fn podium_labels() {
        assert_eq!(Podium::for_rank(1), Some(Podium::Gold));
        assert_eq!(Podium::for_rank(4), None);
        assert_eq!(Podium::Silver.label(), "🥈 Vice-Campeão");
    }
}
