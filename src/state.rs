use std::collections::VecDeque;

use crate::analysis::TeamPerformanceRow;
use crate::table::Table;

const MAX_LOGS: usize = 50;
const MAX_HISTORY: usize = 50;

/// Outer screen selection. The menu is fixed; Dashboard is the initial state
/// and there is no terminal state short of quitting the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    DataOps,
    Trends,
    Query,
}

/// Inner selection for the Statistics and Trends screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendView {
    TopScoring,
    Shootouts,
    HighScoring,
    WinningTeams,
    TeamPerformance,
}

pub const TREND_VIEWS: [TrendView; 5] = [
    TrendView::TopScoring,
    TrendView::Shootouts,
    TrendView::HighScoring,
    TrendView::WinningTeams,
    TrendView::TeamPerformance,
];

/// Which base table the Data Operations screen is browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTable {
    Results,
    Shootouts,
}

pub struct AppState {
    pub screen: Screen,
    pub trend: TrendView,
    pub data_table: DataTable,

    // Current tabular result and the error (if any) from the last gateway
    // call. Both are ephemeral: replaced on every transition, never cached.
    pub table: Option<Table>,
    pub error: Option<String>,
    pub performance: Vec<TeamPerformanceRow>,

    pub table_scroll: usize,

    // Advanced Querying input and recall.
    pub sql_input: String,
    pub sql_history: Vec<String>,
    pub history_pos: Option<usize>,

    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Dashboard,
            trend: TrendView::TopScoring,
            data_table: DataTable::Results,
            table: None,
            error: None,
            performance: Vec::new(),
            table_scroll: 0,
            sql_input: String::new(),
            sql_history: Vec::new(),
            history_pos: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn scroll_down(&mut self) {
        let total = self.table.as_ref().map(|t| t.rows.len()).unwrap_or(0);
        if total > 0 && self.table_scroll + 1 < total {
            self.table_scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.table_scroll = self.table_scroll.saturating_sub(1);
    }

    pub fn next_trend(&mut self) {
        let idx = TREND_VIEWS.iter().position(|t| *t == self.trend).unwrap_or(0);
        self.trend = TREND_VIEWS[(idx + 1) % TREND_VIEWS.len()];
    }

    pub fn prev_trend(&mut self) {
        let idx = TREND_VIEWS.iter().position(|t| *t == self.trend).unwrap_or(0);
        self.trend = TREND_VIEWS[(idx + TREND_VIEWS.len() - 1) % TREND_VIEWS.len()];
    }

    pub fn toggle_data_table(&mut self) {
        self.data_table = match self.data_table {
            DataTable::Results => DataTable::Shootouts,
            DataTable::Shootouts => DataTable::Results,
        };
    }

    /// Records a submitted statement for Up/Down recall, newest last,
    /// deduplicating consecutive repeats.
    pub fn remember_query(&mut self, sql: &str) {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.sql_history.last().map(String::as_str) != Some(trimmed) {
            self.sql_history.push(trimmed.to_string());
        }
        while self.sql_history.len() > MAX_HISTORY {
            self.sql_history.remove(0);
        }
        self.history_pos = None;
    }

    pub fn history_prev(&mut self) {
        if self.sql_history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            None => self.sql_history.len() - 1,
            Some(0) => 0,
            Some(p) => p - 1,
        };
        self.history_pos = Some(pos);
        self.sql_input = self.sql_history[pos].clone();
    }

    pub fn history_next(&mut self) {
        let Some(pos) = self.history_pos else {
            return;
        };
        if pos + 1 < self.sql_history.len() {
            self.history_pos = Some(pos + 1);
            self.sql_input = self.sql_history[pos + 1].clone();
        } else {
            self.history_pos = None;
            self.sql_input.clear();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Dashboard => "Dashboard",
        Screen::DataOps => "Data Operations",
        Screen::Trends => "Statistics and Trends",
        Screen::Query => "Advanced Querying",
    }
}

pub fn trend_label(trend: TrendView) -> &'static str {
    match trend {
        TrendView::TopScoring => "Top Scoring Teams",
        TrendView::Shootouts => "Penalty Shootout Matches",
        TrendView::HighScoring => "High-Scoring Matches",
        TrendView::WinningTeams => "Winning Teams",
        TrendView::TeamPerformance => "Team Performance",
    }
}

pub fn data_table_label(table: DataTable) -> &'static str {
    match table {
        DataTable::Results => "results",
        DataTable::Shootouts => "shootouts",
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, Screen, TrendView, TREND_VIEWS};

    #[test]
    fn initial_screen_is_dashboard() {
        let state = AppState::new();
        assert_eq!(state.screen, Screen::Dashboard);
        assert!(state.table.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn trend_cycle_wraps() {
        let mut state = AppState::new();
        for _ in 0..TREND_VIEWS.len() {
            state.next_trend();
        }
        assert_eq!(state.trend, TrendView::TopScoring);
        state.prev_trend();
        assert_eq!(state.trend, TrendView::TeamPerformance);
    }

    #[test]
    fn history_recall_walks_backwards_and_resets() {
        let mut state = AppState::new();
        state.remember_query("SELECT 1");
        state.remember_query("SELECT 2");
        state.remember_query("SELECT 2"); // consecutive duplicate dropped
        assert_eq!(state.sql_history.len(), 2);

        state.history_prev();
        assert_eq!(state.sql_input, "SELECT 2");
        state.history_prev();
        assert_eq!(state.sql_input, "SELECT 1");
        state.history_next();
        assert_eq!(state.sql_input, "SELECT 2");
        state.history_next();
        assert!(state.sql_input.is_empty());
        assert!(state.history_pos.is_none());
    }

    #[test]
    fn log_buffer_is_bounded() {
        let mut state = AppState::new();
        for i in 0..200 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), 50);
        assert_eq!(state.logs.back().map(String::as_str), Some("line 199"));
    }
}
