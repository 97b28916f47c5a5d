use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row,
    Table as TableWidget,
};

use footdb_terminal::analysis;
use footdb_terminal::config::DbConfig;
use footdb_terminal::export;
use footdb_terminal::gateway::{QueryGateway, QueryOutcome};
use footdb_terminal::persist;
use footdb_terminal::state::{
    data_table_label, screen_label, trend_label, AppState, DataTable, Screen, TrendView,
    TREND_VIEWS,
};
use footdb_terminal::table::Table;

struct App {
    state: AppState,
    gateway: QueryGateway,
    should_quit: bool,
}

impl App {
    fn new(gateway: QueryGateway) -> Self {
        Self {
            state: AppState::new(),
            gateway,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.screen == Screen::Query {
            self.on_query_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.goto(Screen::Dashboard),
            KeyCode::Char('2') => self.goto(Screen::DataOps),
            KeyCode::Char('3') => self.goto(Screen::Trends),
            KeyCode::Char('4') => self.goto(Screen::Query),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('l') | KeyCode::Right => {
                if self.state.screen == Screen::Trends {
                    self.state.next_trend();
                    self.refresh();
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if self.state.screen == Screen::Trends {
                    self.state.prev_trend();
                    self.refresh();
                }
            }
            KeyCode::Char('t') | KeyCode::Tab => {
                if self.state.screen == Screen::DataOps {
                    self.state.toggle_data_table();
                    self.refresh();
                }
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('e') => self.export_current(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.goto(Screen::Dashboard),
            _ => {}
        }
    }

    // The Advanced Querying screen owns the keyboard: printable keys feed the
    // SQL buffer, so the global shortcuts are unavailable until Esc.
    fn on_query_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.goto(Screen::Dashboard),
            KeyCode::Enter => self.run_user_query(),
            KeyCode::Backspace => {
                self.state.sql_input.pop();
            }
            KeyCode::Up => self.state.history_prev(),
            KeyCode::Down => self.state.history_next(),
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.export_current();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.sql_input.push(c);
            }
            _ => {}
        }
    }

    fn goto(&mut self, screen: Screen) {
        self.state.screen = screen;
        self.refresh();
    }

    /// Re-renders the destination screen: runs its analysis synchronously and
    /// replaces the previous tabular result. Advanced Querying only runs on
    /// an explicit Enter.
    fn refresh(&mut self) {
        match self.state.screen {
            Screen::Dashboard => {
                let outcome = analysis::overview(&self.gateway);
                self.apply_outcome(outcome, "overview");
            }
            Screen::DataOps => {
                let outcome = match self.state.data_table {
                    DataTable::Results => analysis::browse_results(&self.gateway),
                    DataTable::Shootouts => analysis::browse_shootouts(&self.gateway),
                };
                let label = data_table_label(self.state.data_table);
                self.apply_outcome(outcome, label);
            }
            Screen::Trends => {
                let trend = self.state.trend;
                let outcome = match trend {
                    TrendView::TopScoring => analysis::top_scoring_teams(&self.gateway),
                    TrendView::Shootouts => analysis::shootout_matches(&self.gateway),
                    TrendView::HighScoring => analysis::high_scoring_matches(&self.gateway),
                    TrendView::WinningTeams => analysis::winning_teams(&self.gateway),
                    TrendView::TeamPerformance => {
                        let (rows, outcome) = analysis::team_performance(&self.gateway);
                        self.state.performance = rows;
                        outcome
                    }
                };
                self.apply_outcome(outcome, trend_label(trend));
            }
            Screen::Query => {}
        }
    }

    fn run_user_query(&mut self) {
        let sql = self.state.sql_input.trim().to_string();
        if sql.is_empty() {
            return;
        }
        self.state.remember_query(&sql);
        let outcome = self.gateway.execute(&sql);
        self.apply_outcome(outcome, "custom query");
    }

    fn apply_outcome(&mut self, outcome: QueryOutcome, label: &str) {
        self.state.table_scroll = 0;
        match outcome {
            QueryOutcome::Rows(table) => {
                self.state
                    .push_log(format!("[INFO] {label}: {} rows", table.rows.len()));
                self.state.table = Some(table);
                self.state.error = None;
            }
            QueryOutcome::Written { rows_affected } => {
                self.state
                    .push_log(format!("[INFO] {label}: {rows_affected} rows affected"));
                self.state.table = None;
                self.state.error = None;
            }
            QueryOutcome::Failed(err) => {
                self.state.push_log(format!("[WARN] {label}: {err}"));
                self.state.table = None;
                self.state.error = Some(err.to_string());
            }
        }
    }

    fn export_current(&mut self) {
        let Some(table) = self.state.table.clone() else {
            self.state.push_log("[INFO] Nothing to export");
            return;
        };
        let sheet = match self.state.screen {
            Screen::Trends => trend_label(self.state.trend).to_string(),
            Screen::DataOps => data_table_label(self.state.data_table).to_string(),
            _ => "Query Result".to_string(),
        };
        match export::export_table(&table, &sheet) {
            Ok(path) => self
                .state
                .push_log(format!("[INFO] Exported to {}", path.display())),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = DbConfig::from_env();
    let gateway = QueryGateway::new(config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(gateway);
    persist::load_into_state(&mut app.state);
    app.refresh();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    persist::save_from_state(&app.state);

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::DataOps => render_data_ops(frame, chunks[1], &app.state),
        Screen::Trends => render_trends(frame, chunks[1], &app.state),
        Screen::Query => render_query(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Trends => format!(
            "FOOTDB PORTAL | {} | {}",
            screen_label(state.screen),
            trend_label(state.trend)
        ),
        Screen::DataOps => format!(
            "FOOTDB PORTAL | {} | table: {}",
            screen_label(state.screen),
            data_table_label(state.data_table)
        ),
        _ => format!("FOOTDB PORTAL | {}", screen_label(state.screen)),
    };
    let line1 = format!("  .-.  {title}");
    let line2 = " ( o )".to_string();
    let line3 = "  `-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Query => {
            "Type SQL | Enter Run | ↑/↓ History | Ctrl+E Export | Esc Back".to_string()
        }
        Screen::Trends => {
            "1-4 Screens | h/l Analysis | j/k Scroll | e Export | r Refresh | ? Help | q Quit"
                .to_string()
        }
        Screen::DataOps => {
            "1-4 Screens | t Toggle table | j/k Scroll | e Export | r Refresh | ? Help | q Quit"
                .to_string()
        }
        Screen::Dashboard => {
            "1 Dashboard | 2 Data Operations | 3 Statistics and Trends | 4 Advanced Querying | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let welcome = Paragraph::new(
        "Welcome to the International Football Database Portal\n\
         Explore football data and trends.",
    )
    .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(welcome, sections[0]);

    let block = Block::default().title("Overview").borders(Borders::ALL);
    let inner = block.inner(sections[1]);
    frame.render_widget(block, sections[1]);

    if let Some(error) = &state.error {
        render_error(frame, inner, error);
        return;
    }

    let text = overview_text(state.table.as_ref());
    frame.render_widget(Paragraph::new(text), inner);
}

fn overview_text(table: Option<&Table>) -> String {
    let Some(table) = table else {
        return "No overview available".to_string();
    };
    let Some(row) = table.rows.first() else {
        return "No overview available".to_string();
    };
    let cell = |name: &str| -> String {
        table
            .column_index(name)
            .and_then(|idx| row.get(idx))
            .map(|c| c.display())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".to_string())
    };
    [
        format!("Matches recorded:   {}", cell("matches")),
        format!("Shootouts recorded: {}", cell("shootouts")),
        format!("First match:        {}", cell("first_match")),
        format!("Latest match:       {}", cell("last_match")),
    ]
    .join("\n")
}

fn render_data_ops(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(error) = &state.error {
        render_error(frame, area, error);
        return;
    }
    let title = format!("{} (read-only)", data_table_label(state.data_table));
    render_result_table(frame, area, state, &title);
}

fn render_trends(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(area);

    render_trend_menu(frame, columns[0], state);

    if let Some(error) = &state.error {
        render_error(frame, columns[1], error);
        return;
    }

    if state.trend == TrendView::TeamPerformance && !state.performance.is_empty() {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);
        render_performance_chart(frame, halves[0], state);
        render_result_table(frame, halves[1], state, trend_label(state.trend));
    } else {
        render_result_table(frame, columns[1], state, trend_label(state.trend));
    }
}

fn render_trend_menu(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Analyses").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for trend in TREND_VIEWS {
        let prefix = if trend == state.trend { "> " } else { "  " };
        lines.push(format!("{prefix}{}", trend_label(trend)));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn render_query(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(format!("{}\u{2588}", state.sql_input)).block(
        Block::default()
            .title("Enter your SQL query")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, sections[0]);

    if let Some(error) = &state.error {
        render_error(frame, sections[1], error);
        return;
    }
    if state.table.is_some() {
        render_result_table(frame, sections[1], state, "Result");
    } else {
        let hint = Paragraph::new("No result. SELECT statements return a table;\nother statements are executed and committed.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Result").borders(Borders::ALL));
        frame.render_widget(hint, sections[1]);
    }
}

fn render_result_table(frame: &mut Frame, area: Rect, state: &AppState, title: &str) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let Some(table) = &state.table else {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let empty = Paragraph::new("No data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    if table.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let empty =
            Paragraph::new("Query returned no rows").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let widths: Vec<Constraint> = table
        .column_widths(32)
        .into_iter()
        .map(|w| Constraint::Length(w as u16 + 1))
        .collect();

    let header = Row::new(
        table
            .columns
            .iter()
            .map(|c| Cell::from(c.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let visible = area.height.saturating_sub(3) as usize;
    let start = state.table_scroll.min(table.rows.len().saturating_sub(1));
    let rows = table.rows[start..]
        .iter()
        .take(visible.max(1))
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.display()))));

    let count = format!(" {} rows ", table.rows.len());
    let widget = TableWidget::new(rows, widths)
        .header(header)
        .block(block.title_bottom(count));
    frame.render_widget(widget, area);
}

fn render_performance_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    const SERIES_COLORS: [Color; 4] = [Color::Green, Color::Yellow, Color::Cyan, Color::Magenta];

    let series = analysis::team_series(&state.performance, SERIES_COLORS.len());
    if series.is_empty() {
        let empty = Paragraph::new("No performance data")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Win % by year").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let mut min_year = f64::MAX;
    let mut max_year = f64::MIN;
    for (_, points) in &series {
        for (year, _) in points {
            min_year = min_year.min(*year);
            max_year = max_year.max(*year);
        }
    }
    if (max_year - min_year).abs() < f64::EPSILON {
        // A single season still needs a nonzero x span to draw.
        min_year -= 1.0;
        max_year += 1.0;
    }

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(SERIES_COLORS.iter())
        .map(|((team, points), color)| {
            Dataset::default()
                .name(team.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let mid_year = (min_year + max_year) / 2.0;
    let chart = Chart::new(datasets)
        .block(Block::default().title("Win % by year").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Year")
                .bounds([min_year, max_year])
                .labels(vec![
                    format!("{min_year:.0}").into(),
                    format!("{mid_year:.0}").into(),
                    format!("{max_year:.0}").into(),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Win %")
                .bounds([0.0, 100.0])
                .labels(vec!["0".into(), "50".into(), "100".into()]),
        );
    frame.render_widget(chart, area);
}

fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let widget = Paragraph::new(error.to_string())
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Football Database Portal - Help",
        "",
        "Global:",
        "  1            Dashboard",
        "  2            Data Operations",
        "  3            Statistics and Trends",
        "  4            Advanced Querying",
        "  j/k or ↑/↓   Scroll result table",
        "  e            Export current table to xlsx",
        "  r            Refresh current screen",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Statistics and Trends:",
        "  h/l or ←/→   Switch analysis",
        "",
        "Data Operations:",
        "  t / Tab      Toggle results/shootouts",
        "",
        "Advanced Querying:",
        "  Enter        Run the statement (no restrictions!)",
        "  ↑/↓          Recall query history",
        "  Esc          Back to Dashboard",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
