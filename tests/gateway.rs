use std::path::Path;

use rusqlite::{params, Connection};
use tempfile::TempDir;

use footdb_terminal::config::DbConfig;
use footdb_terminal::gateway::{GatewayError, QueryGateway, QueryOutcome};

fn seeded_db(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("football.sqlite");
    create_schema(&path);
    let conn = Connection::open(&path).expect("open seeded db");
    for (date, home, away, hs, aws) in [
        ("2019-06-01", "TeamX", "TeamY", 3, 1),
        ("2019-09-01", "TeamY", "TeamX", 0, 2),
    ] {
        conn.execute(
            "INSERT INTO results (date, home_team, away_team, home_score, away_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![date, home, away, hs, aws],
        )
        .expect("seed row");
    }
    path
}

fn create_schema(path: &Path) {
    let conn = Connection::open(path).expect("create db");
    conn.execute_batch(
        "CREATE TABLE results (
             date TEXT NOT NULL,
             home_team TEXT NOT NULL,
             away_team TEXT NOT NULL,
             home_score INTEGER NOT NULL,
             away_score INTEGER NOT NULL
         );
         CREATE TABLE shootouts (
             date TEXT NOT NULL,
             home_team TEXT NOT NULL,
             away_team TEXT NOT NULL,
             winner TEXT NOT NULL
         );",
    )
    .expect("create schema");
}

#[test]
fn select_returns_projected_columns_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = QueryGateway::new(DbConfig::new(seeded_db(&dir)));

    let outcome = gateway.execute("SELECT date, home_team AS host, home_score FROM results");
    let table = outcome.table().expect("select should return a table");
    assert_eq!(table.columns, vec!["date", "host", "home_score"]);
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn non_select_commits_and_returns_no_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = seeded_db(&dir);
    let gateway = QueryGateway::new(DbConfig::new(&path));

    let outcome = gateway.execute(
        "INSERT INTO results (date, home_team, away_team, home_score, away_score)
         VALUES ('2020-01-01', 'TeamZ', 'TeamX', 1, 0)",
    );
    assert_eq!(outcome, QueryOutcome::Written { rows_affected: 1 });

    // The write must be visible to a completely separate connection, i.e.
    // committed before the gateway released its own.
    let conn = Connection::open(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn bound_parameters_are_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = QueryGateway::new(DbConfig::new(seeded_db(&dir)));

    let outcome = gateway.execute_with(
        "SELECT home_team FROM results WHERE home_score > ?1",
        &[&2i64],
    );
    let table = outcome.table().expect("parameterized select should work");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][0].as_str(), Some("TeamX"));
}

#[test]
fn unreachable_database_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = QueryGateway::new(DbConfig::new(dir.path().join("missing.sqlite")));

    let outcome = gateway.execute("SELECT 1");
    match outcome.error() {
        Some(GatewayError::Connection(_)) => {}
        other => panic!("expected connection error, got {other:?}"),
    }
    // No file may be created as a side effect of the failed open.
    assert!(!dir.path().join("missing.sqlite").exists());

    // The gateway holds no state: the next call fails the same way instead of
    // crashing or behaving differently.
    let again = gateway.execute("SELECT 1");
    assert!(matches!(
        again.error(),
        Some(GatewayError::Connection(_))
    ));
}

#[test]
fn execution_error_leaves_gateway_usable() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = QueryGateway::new(DbConfig::new(seeded_db(&dir)));

    let outcome = gateway.execute("SELECT nonsense FROM nowhere");
    match outcome.error() {
        Some(GatewayError::Execution(msg)) => {
            // Raw driver text is surfaced unsanitized.
            assert!(msg.contains("nowhere") || msg.contains("no such table"));
        }
        other => panic!("expected execution error, got {other:?}"),
    }

    let follow_up = gateway.execute("SELECT COUNT(*) AS n FROM results");
    let table = follow_up.table().expect("gateway should still work");
    assert_eq!(table.rows[0][0].as_i64(), Some(2));
}

#[test]
fn cte_read_is_committed_silently_with_no_table() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = QueryGateway::new(DbConfig::new(seeded_db(&dir)));

    // Fails the SELECT prefix check, so it goes down the write path; the
    // returned rows are discarded instead of surfacing an error.
    let outcome = gateway.execute("WITH t AS (SELECT * FROM results) SELECT * FROM t");
    assert_eq!(outcome, QueryOutcome::Written { rows_affected: 0 });
}

#[test]
fn same_select_twice_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = QueryGateway::new(DbConfig::new(seeded_db(&dir)));

    let sql = "SELECT date, home_team, away_team FROM results ORDER BY date";
    let first = gateway.execute(sql).table().unwrap();
    let second = gateway.execute(sql).table().unwrap();
    assert_eq!(first, second);
}

#[test]
fn connection_is_released_after_every_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = seeded_db(&dir);
    let gateway = QueryGateway::new(DbConfig::new(&path));

    // A mix of successes and failures; each call opens and closes its own
    // connection.
    for _ in 0..20 {
        let _ = gateway.execute("SELECT * FROM results");
        let _ = gateway.execute("SELECT broken syntax here");
        let _ = gateway.execute("UPDATE results SET home_score = home_score WHERE 0");
    }

    // If any connection were still alive an exclusive transaction would be
    // refused with SQLITE_BUSY.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("BEGIN EXCLUSIVE; COMMIT;")
        .expect("no gateway connection may remain open");
}
