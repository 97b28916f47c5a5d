use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

// Schema and demo data for the externally-owned database. The portal itself
// never creates tables; this module backs the `seed_demo` binary and gives
// the tests the same schema the tool ships.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS results (
    date TEXT NOT NULL,
    home_team TEXT NOT NULL,
    away_team TEXT NOT NULL,
    home_score INTEGER NOT NULL CHECK (home_score >= 0),
    away_score INTEGER NOT NULL CHECK (away_score >= 0)
);
CREATE INDEX IF NOT EXISTS idx_results_date ON results(date);

CREATE TABLE IF NOT EXISTS shootouts (
    date TEXT NOT NULL,
    home_team TEXT NOT NULL,
    away_team TEXT NOT NULL,
    winner TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_shootouts_date ON shootouts(date);
"#;

pub const DEMO_RESULTS: &[(&str, &str, &str, i64, i64)] = &[
    ("2018-06-14", "Russia", "Saudi Arabia", 5, 0),
    ("2018-07-15", "France", "Croatia", 4, 2),
    ("2019-06-07", "France", "South Korea", 4, 0),
    ("2019-07-07", "United States", "Netherlands", 2, 0),
    ("2020-10-11", "Spain", "Switzerland", 1, 0),
    ("2021-07-11", "Italy", "England", 1, 1),
    ("2021-09-05", "Brazil", "Argentina", 0, 0),
    ("2022-11-22", "Argentina", "Saudi Arabia", 1, 2),
    ("2022-12-13", "Argentina", "Croatia", 3, 0),
    ("2022-12-18", "Argentina", "France", 3, 3),
    ("2023-03-25", "Germany", "Peru", 2, 0),
    ("2023-06-18", "Spain", "Croatia", 0, 0),
];

pub const DEMO_SHOOTOUTS: &[(&str, &str, &str, &str)] = &[
    ("2021-07-11", "Italy", "England", "Italy"),
    ("2022-12-18", "Argentina", "France", "Argentina"),
    ("2023-06-18", "Spain", "Croatia", "Spain"),
];

#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    pub results: usize,
    pub shootouts: usize,
}

/// Creates the schema if needed and replaces the table contents with the
/// demo dataset, all in one transaction. Re-running is idempotent.
pub fn seed_demo_db(path: &Path) -> Result<SeedSummary> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open sqlite db {}", path.display()))?;
    conn.execute_batch(SCHEMA_SQL).context("create schema")?;

    let tx = conn.transaction().context("begin seed transaction")?;
    tx.execute("DELETE FROM results", []).context("clear results")?;
    tx.execute("DELETE FROM shootouts", [])
        .context("clear shootouts")?;
    for (date, home, away, home_score, away_score) in DEMO_RESULTS {
        tx.execute(
            "INSERT INTO results (date, home_team, away_team, home_score, away_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![date, home, away, home_score, away_score],
        )
        .context("insert result")?;
    }
    for (date, home, away, winner) in DEMO_SHOOTOUTS {
        tx.execute(
            "INSERT INTO shootouts (date, home_team, away_team, winner)
             VALUES (?1, ?2, ?3, ?4)",
            params![date, home, away, winner],
        )
        .context("insert shootout")?;
    }
    tx.commit().context("commit seed transaction")?;

    Ok(SeedSummary {
        results: DEMO_RESULTS.len(),
        shootouts: DEMO_SHOOTOUTS.len(),
    })
}
