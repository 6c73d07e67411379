//! Tournament week snapshot model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PlayerUuid;

/// One team's outcome within a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResult {
    /// Team number, unique within the week
    pub team_number: i32,

    /// Aggregate team score for the week
    pub team_score: u64,
}

impl TeamResult {
    pub fn new(team_number: i32, team_score: u64) -> Self {
        Self {
            team_number,
            team_score,
        }
    }
}

/// One player's outcome within a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    /// Internal user identifier in the statistics store
    pub player_id: i64,

    /// Platform identity, stable across name changes
    pub uuid: PlayerUuid,

    /// Name snapshot stored alongside this result
    pub username: String,

    /// Team the player belonged to that week
    pub team_number: i32,

    /// Individual score
    pub score: u64,

    /// Individual kill count
    pub kills: u32,
}

impl PlayerResult {
    /// Create a new result. `player_id` defaults to 0.
    pub fn new(
        uuid: impl Into<PlayerUuid>,
        username: impl Into<String>,
        team_number: i32,
        score: u64,
        kills: u32,
    ) -> Self {
        Self {
            player_id: 0,
            uuid: uuid.into(),
            username: username.into(),
            team_number,
            score,
            kills,
        }
    }

    /// Builder method to set the store's user id.
    pub fn with_player_id(mut self, player_id: i64) -> Self {
        self.player_id = player_id;
        self
    }
}

/// One completed tournament instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentWeek {
    pub id: i64,

    pub date: NaiveDate,

    /// Human readable label (e.g. "Week 12")
    pub display_name: String,

    #[serde(default)]
    pub teams: Vec<TeamResult>,

    #[serde(default)]
    pub players: Vec<PlayerResult>,
}

impl TournamentWeek {
    pub fn new(id: i64, date: NaiveDate, display_name: impl Into<String>) -> Self {
        Self {
            id,
            date,
            display_name: display_name.into(),
            teams: Vec::new(),
            players: Vec::new(),
        }
    }

    /// Builder method to add a team result.
    pub fn with_team(mut self, team_number: i32, team_score: u64) -> Self {
        self.teams.push(TeamResult::new(team_number, team_score));
        self
    }

    /// Builder method to add a player result.
    pub fn with_player(mut self, player: PlayerResult) -> Self {
        self.players.push(player);
        self
    }

    /// First result recorded for the given player.
    pub fn player(&self, uuid: &PlayerUuid) -> Option<&PlayerResult> {
        self.players.iter().find(|p| &p.uuid == uuid)
    }

    /// Players whose team number equals `team_number`, in stored order.
    pub fn team_members(&self, team_number: i32) -> impl Iterator<Item = &PlayerResult> {
        self.players
            .iter()
            .filter(move |p| p.team_number == team_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> TournamentWeek {
        TournamentWeek::new(1, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), "Week 1")
            .with_team(1, 100)
            .with_team(2, 150)
            .with_player(PlayerResult::new("a", "Alice", 1, 50, 3))
            .with_player(PlayerResult::new("b", "Bob", 2, 90, 1))
            .with_player(PlayerResult::new("c", "Carol", 2, 10, 0))
    }

    #[test]
    fn test_player_lookup() {
        let week = week();
        assert_eq!(
            week.player(&PlayerUuid::from("b")).map(|p| p.username.as_str()),
            Some("Bob")
        );
        assert!(week.player(&PlayerUuid::from("z")).is_none());
    }

    #[test]
    fn test_team_members() {
        let week = week();
        let names: Vec<&str> = week.team_members(2).map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
    }

    #[test]
    fn test_player_builder() {
        let player = PlayerResult::new("a", "Alice", 1, 5, 2).with_player_id(42);
        assert_eq!(player.player_id, 42);
        assert_eq!(player.uuid, PlayerUuid::from("a"));
    }

    #[test]
    fn test_week_deserialize_without_results() {
        let json = r#"{"id":3,"date":"2024-01-06","display_name":"Week 3"}"#;
        let week: TournamentWeek = serde_json::from_str(json).unwrap();
        assert!(week.teams.is_empty());
        assert!(week.players.is_empty());
        assert_eq!(week.display_name, "Week 3");
    }
}
