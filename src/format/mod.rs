//! Reply formatting.
//!
//! Turns aggregation output and resolved names into a transport-agnostic
//! [`Reply`], applying the row limits. The Discord adapter maps a `Reply`
//! onto an embed; the CLI prints it through `Display`.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::calculate::{ordinal, LEADERBOARD_SIZE, REPORT_ROWS};
use crate::config::DisplayConfig;
use crate::models::{LeaderboardEntry, LeaderboardKind, PlayerReport, PlayerUuid, WeekPerformance};
use crate::resolver::UNKNOWN_NAME;

pub const COLOUR_OK: u32 = 0x00ff00;
pub const COLOUR_NOT_FOUND: u32 = 0xff0000;

/// One titled block of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
}

impl ReplyField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

/// A structured chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub title: String,
    pub description: String,
    pub colour: u32,
    pub author: Option<ReplyAuthor>,
    pub thumbnail_url: Option<String>,
    pub fields: Vec<ReplyField>,
    /// Whether the reply should carry the time it was generated
    pub timestamp: bool,
}

impl Reply {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            colour: COLOUR_OK,
            author: None,
            thumbnail_url: None,
            fields: Vec::new(),
            timestamp: true,
        }
    }

    pub fn with_colour(mut self, colour: u32) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_author(mut self, display: &DisplayConfig) -> Self {
        self.author = Some(ReplyAuthor {
            name: display.author_name.clone(),
            icon_url: Some(display.author_icon_url.clone()),
        });
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(ReplyField::new(name, value));
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "{}", self.description)?;
        for field in &self.fields {
            writeln!(f)?;
            writeln!(f, "{}", field.name)?;
            writeln!(f, "  {}", field.value)?;
        }
        Ok(())
    }
}

/// Render a ranked leaderboard. Entries without a win are skipped; names
/// missing from `names` show as the unknown sentinel.
pub fn render_leaderboard(
    kind: LeaderboardKind,
    entries: &[LeaderboardEntry],
    names: &HashMap<PlayerUuid, String>,
    display: &DisplayConfig,
) -> Reply {
    let (title, description) = match kind {
        LeaderboardKind::Team => (
            "MCF Leaderboard",
            format!("Here is a list of the top {} mcf players", LEADERBOARD_SIZE),
        ),
        LeaderboardKind::Solo => (
            "MCF Solo Leaderboard",
            format!(
                "Here is a list of the top {} solo mcf players. Note that placing top 1 solo does \
                 not guarantee a win since its the combined team score that determines who won \
                 each week. If you instead want to see top winners use `/mcftop` instead",
                LEADERBOARD_SIZE
            ),
        ),
    };

    let mut reply = Reply::new(title, description)
        .with_author(display)
        .with_thumbnail(display.thumbnail_url.clone());

    for (index, entry) in entries.iter().enumerate().take(LEADERBOARD_SIZE) {
        if entry.wins == 0 {
            continue;
        }
        let name = names
            .get(&entry.uuid)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_NAME);

        let headline = match kind {
            LeaderboardKind::Team => format!(
                "{} has a total of {} {}",
                name,
                entry.wins,
                plural(entry.wins as usize, "win")
            ),
            LeaderboardKind::Solo => format!(
                "{} has placed top 1 solo {} {}",
                name,
                entry.wins,
                plural(entry.wins as usize, "time")
            ),
        };

        reply.add_field(
            format!("{} {}", position_emoji(index + 1), name),
            format!(
                "{}. Their total combined score is {} and has a total of {} kills",
                headline, entry.total_score, entry.total_kills
            ),
        );
    }

    if reply.fields.is_empty() {
        reply.description.push_str("\n\nNo MCF results have been recorded yet.");
    }

    reply
}

/// Render a player's report, limited to the most recent weeks.
pub fn render_player_report(report: &PlayerReport, display: &DisplayConfig) -> Reply {
    let tournaments = report.tournaments();
    let mut description = format!(
        "{} has played in {} {}",
        report.username,
        tournaments,
        plural(tournaments, "tournament")
    );
    if tournaments > 0 {
        description.push_str(&format!(
            ", has {} {} and a total of {} kills. The combined score of all their weeks is {}",
            report.wins,
            plural(report.wins as usize, "win"),
            report.total_kills,
            report.total_score
        ));
    }

    let mut reply = Reply::new(format!("{}'s MCF stats:", report.username), description)
        .with_author(display)
        .with_thumbnail(format!("{}{}", display.avatar_url_base, report.uuid.simple()));

    reply.add_field(
        "Results",
        format!(
            "Here is a list of the last tournaments they played in. Note that this is limited \
             to {} rows due to discord limitations, [Click here for full stats]({}{})",
            REPORT_ROWS, display.full_stats_url_base, report.uuid
        ),
    );

    for week in report.weeks.iter().take(REPORT_ROWS) {
        reply.add_field(week.week_name.clone(), week_summary(&report.username, week));
    }

    let hidden = report.weeks.len().saturating_sub(REPORT_ROWS);
    if hidden > 0 {
        reply.add_field(
            format!("And {} more", hidden),
            ":large_orange_diamond: additional lines hidden due to discord limitations",
        );
    }

    reply
}

/// Reply for a name that matches no stored result.
pub fn render_player_not_found(username: &str) -> Reply {
    Reply::new(
        "Player Not Found",
        format!(
            "Could not find MCF stats for player \"{}\". Make sure the username is correct and \
             they have played in at least one MCF tournament.",
            username
        ),
    )
    .with_colour(COLOUR_NOT_FOUND)
}

fn week_summary(username: &str, week: &WeekPerformance) -> String {
    let mut summary = match (week.won, week.team_placement) {
        (true, _) => ":crown: Team won".to_string(),
        (false, Some(place)) => format!(":x: Team lost at {} place", ordinal(place)),
        (false, None) => ":grey_question: Team placement unknown".to_string(),
    };

    summary.push_str(&format!(
        ". {} got {} place with {} points and {} kills",
        username,
        ordinal(week.placement),
        week.score,
        week.kills
    ));

    if !week.teammates.is_empty() {
        summary.push_str(&format!(". They played with {}", join_names(&week.teammates)));
    }

    summary
}

/// "A", "A and B", "A, B, and C".
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

/// Keycap emoji for 1 through 10, plain digits otherwise.
pub fn position_emoji(position: usize) -> String {
    const KEYCAPS: [&str; 11] = [
        "0️⃣", "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
    ];
    match position {
        1..=10 => KEYCAPS[position].to_string(),
        _ => position.to_string(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::test_support::date;
    use pretty_assertions::assert_eq;

    fn entry(uuid: &str, wins: u32, score: u64, kills: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            uuid: PlayerUuid::from(uuid),
            wins,
            total_score: score,
            total_kills: kills,
        }
    }

    fn performance(n: i64, won: bool, team_placement: Option<usize>) -> WeekPerformance {
        WeekPerformance {
            week_id: n,
            week_name: format!("Week {}", n),
            date: date(n as u64 * 7),
            score: 40,
            kills: 3,
            placement: 2,
            team_placement,
            won,
            teammates: vec!["Alex".to_string(), "Notch".to_string()],
        }
    }

    fn report(weeks: Vec<WeekPerformance>) -> PlayerReport {
        PlayerReport {
            uuid: PlayerUuid::from("069a79f4-44e9-4726-a5be-fca90e38aaf5"),
            username: "Steve".to_string(),
            wins: weeks.iter().filter(|w| w.won).count() as u32,
            total_score: weeks.iter().map(|w| w.score).sum(),
            total_kills: weeks.iter().map(|w| u64::from(w.kills)).sum(),
            weeks,
        }
    }

    #[test]
    fn test_leaderboard_rows() {
        let entries = vec![entry("a", 3, 400, 12), entry("b", 1, 90, 4)];
        let names: HashMap<PlayerUuid, String> =
            [(PlayerUuid::from("a"), "Alice".to_string())].into_iter().collect();

        let reply = render_leaderboard(
            LeaderboardKind::Team,
            &entries,
            &names,
            &DisplayConfig::default(),
        );

        assert_eq!(reply.title, "MCF Leaderboard");
        assert_eq!(reply.fields.len(), 2);
        assert_eq!(reply.fields[0].name, "1️⃣ Alice");
        assert_eq!(
            reply.fields[0].value,
            "Alice has a total of 3 wins. Their total combined score is 400 and has a total of 12 kills"
        );
        assert_eq!(reply.fields[1].name, "2️⃣ [UNKNOWN]");
        assert!(reply.fields[1].value.starts_with("[UNKNOWN] has a total of 1 win."));
    }

    #[test]
    fn test_leaderboard_skips_zero_wins_but_keeps_positions() {
        let entries = vec![entry("a", 2, 10, 0), entry("b", 0, 500, 0), entry("c", 1, 5, 0)];
        let reply = render_leaderboard(
            LeaderboardKind::Solo,
            &entries,
            &HashMap::new(),
            &DisplayConfig::default(),
        );

        assert_eq!(reply.title, "MCF Solo Leaderboard");
        let names: Vec<&str> = reply.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["1️⃣ [UNKNOWN]", "3️⃣ [UNKNOWN]"]);
        assert!(reply.fields[0].value.contains("placed top 1 solo 2 times"));
    }

    #[test]
    fn test_empty_leaderboard_explains() {
        let reply = render_leaderboard(
            LeaderboardKind::Team,
            &[],
            &HashMap::new(),
            &DisplayConfig::default(),
        );
        assert!(reply.fields.is_empty());
        assert!(reply.description.contains("No MCF results"));
    }

    #[test]
    fn test_player_report_rows() {
        let reply = render_player_report(
            &report(vec![performance(2, true, Some(1)), performance(1, false, Some(3))]),
            &DisplayConfig::default(),
        );

        assert_eq!(reply.title, "Steve's MCF stats:");
        assert_eq!(
            reply.description,
            "Steve has played in 2 tournaments, has 1 win and a total of 6 kills. \
             The combined score of all their weeks is 80"
        );
        assert_eq!(
            reply.thumbnail_url.as_deref(),
            Some("https://mc-heads.net/avatar/069a79f444e94726a5befca90e38aaf5")
        );
        assert_eq!(reply.fields[0].name, "Results");
        assert!(reply.fields[0].value.contains(
            "https://novauniverse.net/mcf_stats/?uuid=069a79f4-44e9-4726-a5be-fca90e38aaf5"
        ));
        assert_eq!(
            reply.fields[1].value,
            ":crown: Team won. Steve got 2nd place with 40 points and 3 kills. They played with Alex and Notch"
        );
        assert!(reply.fields[2]
            .value
            .starts_with(":x: Team lost at 3rd place. Steve got 2nd place"));
    }

    #[test]
    fn test_player_report_truncates_rows() {
        let weeks = (1..=13).rev().map(|n| performance(n, false, Some(2))).collect();
        let reply = render_player_report(&report(weeks), &DisplayConfig::default());

        // Results header + 10 weeks + trailer
        assert_eq!(reply.fields.len(), 12);
        assert_eq!(reply.fields[1].name, "Week 13");
        assert_eq!(reply.fields[10].name, "Week 4");
        assert_eq!(reply.fields[11].name, "And 3 more");
    }

    #[test]
    fn test_player_report_unknown_team_placement() {
        let mut week = performance(1, false, None);
        week.teammates.clear();
        let reply = render_player_report(&report(vec![week]), &DisplayConfig::default());

        assert_eq!(
            reply.fields[1].value,
            ":grey_question: Team placement unknown. Steve got 2nd place with 40 points and 3 kills"
        );
        assert!(reply.description.starts_with("Steve has played in 1 tournament,"));
    }

    #[test]
    fn test_player_not_found_reply() {
        let reply = render_player_not_found("Ghost");
        assert_eq!(reply.title, "Player Not Found");
        assert_eq!(reply.colour, COLOUR_NOT_FOUND);
        assert!(reply.description.contains("\"Ghost\""));
    }

    #[test]
    fn test_join_names() {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_names(&[]), "");
        assert_eq!(join_names(&names(&["A"])), "A");
        assert_eq!(join_names(&names(&["A", "B"])), "A and B");
        assert_eq!(join_names(&names(&["A", "B", "C"])), "A, B, and C");
    }

    #[test]
    fn test_position_emoji() {
        assert_eq!(position_emoji(1), "1️⃣");
        assert_eq!(position_emoji(10), "🔟");
        assert_eq!(position_emoji(11), "11");
    }

    #[test]
    fn test_reply_display() {
        let mut reply = Reply::new("Title", "Body");
        reply.add_field("Name", "Value");
        let text = reply.to_string();
        assert_eq!(text, "Title\n=====\nBody\n\nName\n  Value\n");
    }
}
