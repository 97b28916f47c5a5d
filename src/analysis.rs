use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::gateway::{QueryGateway, QueryOutcome};
use crate::table::{CellValue, Table};

// Fixed statements behind the Statistics and Trends screen. Each analysis is
// a straight pass-through of the gateway's tabular result; only team
// performance post-processes locally.

pub const TOP_SCORING_TEAMS_SQL: &str = "\
SELECT team, SUM(goals) AS total_goals
FROM (
    SELECT home_team AS team, home_score AS goals FROM results
    UNION ALL
    SELECT away_team AS team, away_score AS goals FROM results
)
GROUP BY team
ORDER BY total_goals DESC, team ASC
LIMIT 10";

pub const SHOOTOUT_MATCHES_SQL: &str = "\
SELECT date, home_team, away_team, winner
FROM shootouts
ORDER BY date DESC
LIMIT 25";

pub const HIGH_SCORING_MATCHES_SQL: &str = "\
SELECT date, home_team, away_team, home_score, away_score,
       home_score + away_score AS total_goals
FROM results
ORDER BY total_goals DESC, date DESC
LIMIT 10";

pub const WINNING_TEAMS_SQL: &str = "\
SELECT winner AS team, COUNT(*) AS wins
FROM (
    SELECT CASE
        WHEN home_score > away_score THEN home_team
        WHEN away_score > home_score THEN away_team
    END AS winner
    FROM results
)
WHERE winner IS NOT NULL
GROUP BY winner
ORDER BY wins DESC, team ASC
LIMIT 10";

const TEAM_RESULTS_SQL: &str = "\
SELECT date, home_team, away_team, home_score, away_score FROM results";

pub fn top_scoring_teams(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(TOP_SCORING_TEAMS_SQL)
}

pub fn shootout_matches(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(SHOOTOUT_MATCHES_SQL)
}

pub fn high_scoring_matches(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(HIGH_SCORING_MATCHES_SQL)
}

pub fn winning_teams(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(WINNING_TEAMS_SQL)
}

/// One derived (year, team) row. Recomputed from the results table on every
/// visit to the screen; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPerformanceRow {
    pub year: i32,
    pub team: String,
    pub wins: u32,
    pub matches: u32,
    pub win_pct: f64,
}

pub fn team_performance(gateway: &QueryGateway) -> (Vec<TeamPerformanceRow>, QueryOutcome) {
    match gateway.execute(TEAM_RESULTS_SQL) {
        QueryOutcome::Rows(raw) => {
            let rows = aggregate_team_performance(&raw);
            let table = performance_table(&rows);
            (rows, QueryOutcome::Rows(table))
        }
        other => (Vec::new(), other),
    }
}

/// Unions the home- and away-team perspectives of every match into
/// (year, team, won), groups by (year, team), and divides. Draws count as a
/// match but not a win; the percentage keeps full f64 precision.
pub fn aggregate_team_performance(raw: &Table) -> Vec<TeamPerformanceRow> {
    let (Some(date_idx), Some(home_idx), Some(away_idx), Some(hs_idx), Some(as_idx)) = (
        raw.column_index("date"),
        raw.column_index("home_team"),
        raw.column_index("away_team"),
        raw.column_index("home_score"),
        raw.column_index("away_score"),
    ) else {
        return Vec::new();
    };

    let mut tally: BTreeMap<(i32, String), (u32, u32)> = BTreeMap::new();
    for row in &raw.rows {
        let Some(year) = row.get(date_idx).and_then(|c| c.as_str()).and_then(parse_year) else {
            continue;
        };
        let (Some(home), Some(away)) = (
            row.get(home_idx).and_then(|c| c.as_str()),
            row.get(away_idx).and_then(|c| c.as_str()),
        ) else {
            continue;
        };
        let (Some(home_score), Some(away_score)) = (
            row.get(hs_idx).and_then(|c| c.as_i64()),
            row.get(as_idx).and_then(|c| c.as_i64()),
        ) else {
            continue;
        };

        for (team, won) in [
            (home, home_score > away_score),
            (away, away_score > home_score),
        ] {
            let entry = tally.entry((year, team.to_string())).or_insert((0, 0));
            entry.1 += 1;
            if won {
                entry.0 += 1;
            }
        }
    }

    tally
        .into_iter()
        .map(|((year, team), (wins, matches))| TeamPerformanceRow {
            year,
            team,
            wins,
            matches,
            win_pct: f64::from(wins) / f64::from(matches) * 100.0,
        })
        .collect()
}

pub fn performance_table(rows: &[TeamPerformanceRow]) -> Table {
    let mut table = Table::new(vec![
        "year".to_string(),
        "team".to_string(),
        "wins".to_string(),
        "matches".to_string(),
        "win_pct".to_string(),
    ]);
    for row in rows {
        table.push_row(vec![
            CellValue::Integer(i64::from(row.year)),
            CellValue::Text(row.team.clone()),
            CellValue::Integer(i64::from(row.wins)),
            CellValue::Integer(i64::from(row.matches)),
            CellValue::Real(row.win_pct),
        ]);
    }
    table
}

/// Per-team (year, win %) series for the line chart, limited to the teams
/// with the most recorded matches. Points are ordered by year.
pub fn team_series(rows: &[TeamPerformanceRow], limit: usize) -> Vec<(String, Vec<(f64, f64)>)> {
    let mut match_totals: BTreeMap<&str, u32> = BTreeMap::new();
    for row in rows {
        *match_totals.entry(row.team.as_str()).or_insert(0) += row.matches;
    }
    let mut ranked: Vec<(&str, u32)> = match_totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(team, _)| {
            let points = rows
                .iter()
                .filter(|row| row.team == team)
                .map(|row| (f64::from(row.year), row.win_pct))
                .collect();
            (team.to_string(), points)
        })
        .collect()
}

fn parse_year(date: &str) -> Option<i32> {
    let trimmed = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    // Some historical rows carry a bare year or a nonstandard suffix.
    trimmed.get(..4)?.parse::<i32>().ok()
}

// Browse statements behind the Data Operations screen (read-only views of the
// two base tables) and the dashboard overview.

pub const BROWSE_RESULTS_SQL: &str = "\
SELECT date, home_team, away_team, home_score, away_score
FROM results
ORDER BY date DESC
LIMIT 200";

pub const BROWSE_SHOOTOUTS_SQL: &str = "\
SELECT date, home_team, away_team, winner
FROM shootouts
ORDER BY date DESC
LIMIT 200";

pub const OVERVIEW_SQL: &str = "\
SELECT (SELECT COUNT(*) FROM results) AS matches,
       (SELECT COUNT(*) FROM shootouts) AS shootouts,
       (SELECT MIN(date) FROM results) AS first_match,
       (SELECT MAX(date) FROM results) AS last_match";

pub fn browse_results(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(BROWSE_RESULTS_SQL)
}

pub fn browse_shootouts(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(BROWSE_SHOOTOUTS_SQL)
}

pub fn overview(gateway: &QueryGateway) -> QueryOutcome {
    gateway.execute(OVERVIEW_SQL)
}
