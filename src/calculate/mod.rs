//! Statistics aggregation engine.
//!
//! Pure functions over a snapshot of tournament weeks:
//! - Team ("winners") leaderboard
//! - Solo (best individual performance) leaderboard
//! - Per-player historical report
//!
//! Nothing here performs I/O. Ties are broken by input order: the snapshot
//! order coming out of the repository decides who ranks first among equals.

mod leaderboard;
mod report;

use std::cmp::Reverse;

pub use leaderboard::{leaderboard, solo_leaderboard, team_leaderboard};
pub use report::{find_player, player_report, week_performance, StatsError};

/// Maximum number of ranked entries a leaderboard returns.
pub const LEADERBOARD_SIZE: usize = 10;

/// Maximum number of weeks rendered in a player report.
pub const REPORT_ROWS: usize = 10;

/// First item carrying the maximum key. Later items with an equal key never
/// displace it.
pub fn first_max_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    items.iter().min_by_key(|item| Reverse(key(*item)))
}

/// 1-based rank of the first item matching `is_target` when `items` are
/// ordered by descending key. Equal keys keep input order.
pub fn placement_of<T, K: Ord>(
    items: &[T],
    key: impl Fn(&T) -> K,
    is_target: impl Fn(&T) -> bool,
) -> Option<usize> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by_key(|item| Reverse(key(*item)));
    ranked
        .iter()
        .position(|item| is_target(*item))
        .map(|index| index + 1)
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st, 111th.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    use crate::models::{PlayerResult, TournamentWeek};

    pub fn date(day: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(day))
            .unwrap()
    }

    /// Weeks with up to 4 teams (numbered from 1) and players on teams 1..=5,
    /// so some players reference a team that is absent.
    pub fn arb_week() -> impl Strategy<Value = TournamentWeek> {
        (
            prop::collection::vec(0u64..200, 0..5),
            prop::collection::vec((0usize..12, 1i32..6, 0u64..100, 0u32..10), 0..12),
            0u64..60,
        )
            .prop_map(|(team_scores, players, day)| {
                let mut week = TournamentWeek::new(0, date(day), format!("Week {}", day));
                for (i, score) in team_scores.into_iter().enumerate() {
                    week = week.with_team(i as i32 + 1, score);
                }
                for (idx, team, score, kills) in players {
                    week = week.with_player(PlayerResult::new(
                        format!("uuid-{}", idx),
                        format!("Player{}", idx),
                        team,
                        score,
                        kills,
                    ));
                }
                week
            })
    }

    pub fn arb_weeks() -> impl Strategy<Value = Vec<TournamentWeek>> {
        prop::collection::vec(arb_week(), 0..10).prop_map(|weeks| {
            weeks
                .into_iter()
                .enumerate()
                .map(|(i, mut week)| {
                    week.id = i as i64 + 1;
                    week
                })
                .collect()
        })
    }
}
