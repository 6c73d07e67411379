//! Team and solo leaderboards.

use std::collections::HashMap;

use crate::models::{LeaderboardEntry, LeaderboardKind, PlayerResult, PlayerUuid, TournamentWeek};

use super::{first_max_by_key, LEADERBOARD_SIZE};

/// Compute the leaderboard of the given kind.
pub fn leaderboard(weeks: &[TournamentWeek], kind: LeaderboardKind) -> Vec<LeaderboardEntry> {
    match kind {
        LeaderboardKind::Team => team_leaderboard(weeks),
        LeaderboardKind::Solo => solo_leaderboard(weeks),
    }
}

/// Rank players by team wins, then total score.
///
/// Each week with at least one team and one player has one winning team: the
/// first team holding the highest team score. Every member of that team is
/// credited with a win plus their score and kills for the week.
pub fn team_leaderboard(weeks: &[TournamentWeek]) -> Vec<LeaderboardEntry> {
    let mut tally = Tally::default();

    for week in weeks {
        if week.players.is_empty() {
            continue;
        }
        let Some(winner) = first_max_by_key(&week.teams, |t| t.team_score) else {
            continue;
        };

        // Highest scorer first; this order settles exact ties later on.
        let mut members: Vec<&PlayerResult> = week.team_members(winner.team_number).collect();
        members.sort_by(|a, b| b.score.cmp(&a.score));

        for member in members {
            tally.credit(member);
        }
    }

    tally.into_ranking()
}

/// Rank players by solo wins, then total score.
///
/// The first player holding the highest individual score in a week gets the
/// solo win, whether or not their team won.
pub fn solo_leaderboard(weeks: &[TournamentWeek]) -> Vec<LeaderboardEntry> {
    let mut tally = Tally::default();

    for week in weeks {
        if let Some(top) = first_max_by_key(&week.players, |p| p.score) {
            tally.credit(top);
        }
    }

    tally.into_ranking()
}

/// Per-player running totals in first-encounter order.
#[derive(Default)]
struct Tally {
    entries: Vec<LeaderboardEntry>,
    index: HashMap<PlayerUuid, usize>,
}

impl Tally {
    fn credit(&mut self, player: &PlayerResult) {
        let slot = match self.index.get(&player.uuid) {
            Some(&slot) => slot,
            None => {
                self.entries.push(LeaderboardEntry::new(player.uuid.clone()));
                let slot = self.entries.len() - 1;
                self.index.insert(player.uuid.clone(), slot);
                slot
            }
        };
        self.entries[slot].credit(player.score, player.kills);
    }

    fn into_ranking(mut self) -> Vec<LeaderboardEntry> {
        self.entries.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| b.total_score.cmp(&a.total_score))
        });
        self.entries.truncate(LEADERBOARD_SIZE);
        self.entries
    }
}
