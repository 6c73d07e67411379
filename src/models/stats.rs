//! Aggregated statistics models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PlayerUuid;

/// Which leaderboard a ranking belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardKind {
    /// Wins credited to every member of the week's winning team
    Team,
    /// One win per week for the highest individual scorer
    Solo,
}

impl std::fmt::Display for LeaderboardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardKind::Team => write!(f, "team"),
            LeaderboardKind::Solo => write!(f, "solo"),
        }
    }
}

/// Running totals for one player on a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub uuid: PlayerUuid,

    /// Team wins or solo wins, depending on the leaderboard
    pub wins: u32,

    /// Score summed over the credited weeks only
    pub total_score: u64,

    /// Kills summed over the credited weeks only
    pub total_kills: u64,
}

impl LeaderboardEntry {
    pub fn new(uuid: PlayerUuid) -> Self {
        Self {
            uuid,
            wins: 0,
            total_score: 0,
            total_kills: 0,
        }
    }

    /// Credit one win together with that week's score and kills.
    pub fn credit(&mut self, score: u64, kills: u32) {
        self.wins += 1;
        self.total_score += score;
        self.total_kills += u64::from(kills);
    }
}

/// A player's result in a single week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPerformance {
    pub week_id: i64,
    pub week_name: String,
    pub date: NaiveDate,
    pub score: u64,
    pub kills: u32,

    /// 1-based rank by individual score
    pub placement: usize,

    /// 1-based rank of the player's team; `None` when the team is missing
    pub team_placement: Option<usize>,

    /// Whether the player's team placed first
    pub won: bool,

    /// Usernames of the other players on the same team
    pub teammates: Vec<String>,
}

/// Historical report for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub uuid: PlayerUuid,

    /// Name as stored on the first matching result
    pub username: String,

    /// Most recent week first
    pub weeks: Vec<WeekPerformance>,

    pub wins: u32,
    pub total_score: u64,
    pub total_kills: u64,
}

impl PlayerReport {
    /// Number of tournaments the player took part in.
    pub fn tournaments(&self) -> usize {
        self.weeks.len()
    }
}
