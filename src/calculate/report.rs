//! Per-player historical report.

use thiserror::Error;

use crate::models::{PlayerReport, PlayerResult, PlayerUuid, TournamentWeek, WeekPerformance};

use super::placement_of;

/// Errors produced by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("No MCF results found for player \"{username}\"")]
    PlayerNotFound { username: String },
}

/// First result across the snapshot whose stored username matches
/// `username`, ignoring case.
pub fn find_player<'a>(weeks: &'a [TournamentWeek], username: &str) -> Option<&'a PlayerResult> {
    let wanted = username.to_lowercase();
    weeks
        .iter()
        .flat_map(|week| week.players.iter())
        .find(|player| player.username.to_lowercase() == wanted)
}

/// The player's result in one week, or `None` if they did not take part.
pub fn week_performance(week: &TournamentWeek, uuid: &PlayerUuid) -> Option<WeekPerformance> {
    let player = week.player(uuid)?;
    let placement = placement_of(&week.players, |p| p.score, |p| &p.uuid == uuid)?;
    let team_placement = placement_of(
        &week.teams,
        |t| t.team_score,
        |t| t.team_number == player.team_number,
    );
    let teammates = week
        .team_members(player.team_number)
        .filter(|p| &p.uuid != uuid)
        .map(|p| p.username.clone())
        .collect();

    Some(WeekPerformance {
        week_id: week.id,
        week_name: week.display_name.clone(),
        date: week.date,
        score: player.score,
        kills: player.kills,
        placement,
        team_placement,
        won: team_placement == Some(1),
        teammates,
    })
}

/// Build the report for the player whose stored name matches `username`.
///
/// The first matching result in the snapshot fixes the target identity and
/// the canonical name; every week containing that identity is then included,
/// whatever name the player used that week.
pub fn player_report(weeks: &[TournamentWeek], username: &str) -> Result<PlayerReport, StatsError> {
    let target = find_player(weeks, username).ok_or_else(|| StatsError::PlayerNotFound {
        username: username.to_string(),
    })?;
    let uuid = target.uuid.clone();

    let mut played: Vec<WeekPerformance> = weeks
        .iter()
        .filter_map(|week| week_performance(week, &uuid))
        .collect();

    // Newest first; same-date weeks keep reverse storage order.
    played.reverse();
    played.sort_by(|a, b| b.date.cmp(&a.date));

    let wins = played.iter().filter(|w| w.won).count() as u32;
    let total_score = played.iter().map(|w| w.score).sum();
    let total_kills = played.iter().map(|w| u64::from(w.kills)).sum();

    Ok(PlayerReport {
        uuid,
        username: target.username.clone(),
        weeks: played,
        wins,
        total_score,
        total_kills,
    })
}
