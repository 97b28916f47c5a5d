use std::fmt;

use rusqlite::{Connection, OpenFlags, ToSql};

use crate::config::DbConfig;
use crate::table::{CellValue, Table};

/// The two user-visible failure kinds. The raw driver text is kept as-is and
/// surfaced inline on the current screen; nothing is sanitized and nothing
/// propagates past the screen that triggered the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    Connection(String),
    Execution(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Connection(msg) => write!(f, "Error connecting to the database: {msg}"),
            GatewayError::Execution(msg) => write!(f, "Error executing query: {msg}"),
        }
    }
}

/// Outcome of one gateway call. `Failed` is the "no result" sentinel: the
/// screen that asked simply shows no data plus the error message.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Table),
    Written { rows_affected: usize },
    Failed(GatewayError),
}

impl QueryOutcome {
    pub fn table(self) -> Option<Table> {
        match self {
            QueryOutcome::Rows(table) => Some(table),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            QueryOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Thin query-execution gateway shared by every screen. Each call opens a
/// brand-new connection, runs exactly one statement, and drops the statement
/// handle and the connection on every exit path. No pooling, no reuse, no
/// coordination between callers.
pub struct QueryGateway {
    config: DbConfig,
}

impl QueryGateway {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn execute(&self, sql: &str) -> QueryOutcome {
        self.execute_with(sql, &[])
    }

    pub fn execute_with(&self, sql: &str, params: &[&dyn ToSql]) -> QueryOutcome {
        let conn = match self.connect() {
            Ok(conn) => conn,
            Err(err) => return QueryOutcome::Failed(err),
        };
        let outcome = run_statement(&conn, sql, params);
        // conn drops here; release is unconditional even on the error path.
        match outcome {
            Ok(outcome) => outcome,
            Err(err) => QueryOutcome::Failed(GatewayError::Execution(err.to_string())),
        }
    }

    fn connect(&self) -> Result<Connection, GatewayError> {
        // READ_WRITE without CREATE: a missing or unreadable database is a
        // connection failure, not a silently created empty file.
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&self.config.path, flags)
            .map_err(|err| GatewayError::Connection(err.to_string()))
    }
}

/// Read detection is a case-insensitive textual prefix check, nothing
/// smarter: anything that does not start with SELECT goes down the write
/// path.
pub fn is_select(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("SELECT"))
}

fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> rusqlite::Result<QueryOutcome> {
    if is_select(sql) {
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut table = Table::new(columns);
        let mut rows = stmt.query(params)?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(table.columns.len());
            for idx in 0..table.columns.len() {
                cells.push(CellValue::from_sql(row.get_ref(idx)?));
            }
            table.push_row(cells);
        }
        Ok(QueryOutcome::Rows(table))
    } else {
        // Autocommit connection: the write is committed before the handle is
        // released. No tabular value comes back.
        match conn.execute(sql, params) {
            Ok(rows_affected) => Ok(QueryOutcome::Written { rows_affected }),
            // Statements that slip past the prefix check yet return rows
            // (WITH ... SELECT, PRAGMA queries) have their rows discarded;
            // they still yield the no-result outcome, not an error.
            Err(rusqlite::Error::ExecuteReturnedResults) => {
                Ok(QueryOutcome::Written { rows_affected: 0 })
            }
            Err(err) => Err(err),
        }
    }
}
