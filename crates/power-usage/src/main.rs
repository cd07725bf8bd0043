use anyhow::Result;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use power_usage_calendar::prelude::*;
use power_usage_calendar::{Breakdown, CacheOutcome, DayDetail, MonthStats};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    DefaultTerminal, Frame,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

mod observability;
mod widgets;
use widgets::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Calendar,
    Day,
    Month,
    Year,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Calendar, Tab::Day, Tab::Month, Tab::Year];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Calendar => "Calendar",
            Tab::Day => "Day",
            Tab::Month => "Month",
            Tab::Year => "Year",
        }
    }

    fn next(&self) -> Tab {
        match self {
            Tab::Calendar => Tab::Day,
            Tab::Day => Tab::Month,
            Tab::Month => Tab::Year,
            Tab::Year => Tab::Calendar,
        }
    }
}

/// What the Year tab shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearView {
    AllYears,
    Total,
    Single,
}

impl YearView {
    fn next(&self) -> YearView {
        match self {
            YearView::AllYears => YearView::Total,
            YearView::Total => YearView::Single,
            YearView::Single => YearView::AllYears,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author = "Red", version, about)]
struct Args {
    /// Write logs to power-usage.log
    #[arg(short = 'v')]
    verbose: bool,

    /// Attribute JSON published by the host (daylist / monthlist / yearlist)
    #[arg(short = 'f', long = "file")]
    file: String,

    /// Engine config (JSON); defaults are used when absent
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    #[arg(short = 'y', long = "year")]
    year: Option<i32>,

    #[arg(short = 'm', long = "month")]
    month: Option<u32>,

    /// Seconds between polls of the attribute file
    #[arg(short = 'i', long = "interval", default_value_t = 5)]
    interval: u64,

    /// Print the reconciled series for the selection as JSON and exit
    #[arg(long = "json")]
    json: bool,
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn default_config_path() -> Option<PathBuf> {
    let path = expand_path("~/.config/power-usage/config.json");
    path.exists().then_some(path)
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path.map(expand_path).or_else(default_config_path) {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

pub struct AppState {
    pub dashboard: UsageDashboard,
    pub data_file: PathBuf,
    pub tab: Tab,
    pub year_view: YearView,
    pub year: i32,
    pub month: u32,
    pub selected_day: u32,
    pub last_check: DateTime<Utc>,
    pub is_loading: bool,
    pub spinner_state: usize,
    pub data_loaded: bool,
    pub error_message: Option<String>,
    pub show_detail: bool,
}

impl AppState {
    fn new(config: &EngineConfig, data_file: PathBuf, year: i32, month: u32) -> Self {
        Self {
            dashboard: UsageDashboard::new(config),
            data_file,
            tab: Tab::Calendar,
            year_view: YearView::AllYears,
            year: clamp_year(year),
            month,
            selected_day: 1,
            last_check: Utc::now(),
            is_loading: false,
            spinner_state: 0,
            data_loaded: false,
            error_message: None,
            show_detail: false,
        }
    }

    fn load_data(&mut self) -> Result<()> {
        self.is_loading = true;

        let result = self.dashboard.load_file(&self.data_file, Utc::now());

        let result = match result {
            Ok(outcome) => {
                if let CacheOutcome::Refreshed { reason, .. } = &outcome {
                    info!(?reason, file = %self.data_file.display(), "usage data refreshed");
                    self.keep_selection_valid();
                }
                self.data_loaded = true;
                self.error_message = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load usage data");
                self.error_message = Some(e.to_string());
                self.data_loaded = !self.dashboard.is_empty();
                Err(e)
            }
        };

        self.is_loading = false;
        self.last_check = Utc::now();

        result
    }

    fn reload(&mut self) -> Result<()> {
        self.dashboard.invalidate();
        self.load_data()
    }

    /// Moves the selected year onto one that has data, when any exists.
    fn keep_selection_valid(&mut self) {
        let years = self.dashboard.available_years();
        if !years.is_empty() && !years.contains(&self.year) {
            self.year = years[0];
        }
        self.clamp_day();
    }

    fn update_spinner(&mut self) {
        self.spinner_state = (self.spinner_state + 1) % 10;
    }

    pub fn get_spinner_char(&self) -> char {
        match self.spinner_state {
            0 => '⠋',
            1 => '⠙',
            2 => '⠹',
            3 => '⠸',
            4 => '⠼',
            5 => '⠴',
            6 => '⠦',
            7 => '⠧',
            8 => '⠇',
            9 => '⠏',
            _ => '⠋',
        }
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.selected_day)
    }

    pub fn get_month_stats(&self) -> MonthStats {
        self.dashboard.month_stats(self.year, self.month)
    }

    pub fn get_series(&self) -> ChartSeries {
        match self.tab {
            Tab::Calendar | Tab::Day => self.dashboard.daily_series(self.year, self.month),
            Tab::Month => self.dashboard.monthly_series(self.year),
            Tab::Year => self.dashboard.yearly_series(),
        }
    }

    pub fn get_breakdown(&self) -> Option<Breakdown> {
        match self.year_view {
            YearView::AllYears => None,
            YearView::Total => Some(self.dashboard.total_breakdown()),
            YearView::Single => self.dashboard.year_breakdown(self.year),
        }
    }

    pub fn get_day_detail(&self) -> Option<DayDetail> {
        self.selected_date()
            .and_then(|date| self.dashboard.day_detail(date))
    }

    /// Stays put when the move would leave the calendar's range.
    fn shift_month(&mut self, delta: i32) {
        let index = self.year as i64 * 12 + self.month as i64 - 1 + delta as i64;
        let year = index.div_euclid(12);
        if year < NaiveDate::MIN.year() as i64 || year > NaiveDate::MAX.year() as i64 {
            return;
        }
        self.year = year as i32;
        self.month = index.rem_euclid(12) as u32 + 1;
        self.clamp_day();
    }

    fn shift_year(&mut self, delta: i32) {
        self.year = clamp_year(self.year.saturating_add(delta));
        self.clamp_day();
    }

    fn shift_day(&mut self, delta: i32) {
        let last = days_in_month(self.year, self.month);
        let day = (self.selected_day as i32 + delta).clamp(1, last as i32);
        self.selected_day = day as u32;
    }

    fn clamp_day(&mut self) {
        self.selected_day = self.selected_day.min(days_in_month(self.year, self.month));
    }

    fn go_to_current_month(&mut self) {
        let today = self.today();
        self.year = today.year();
        self.month = today.month();
        self.selected_day = today.day();
    }
}

fn clamp_year(year: i32) -> i32 {
    year.clamp(NaiveDate::MIN.year(), NaiveDate::MAX.year())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| {
            first
                .iter_days()
                .take_while(|d| d.month() == month)
                .count() as u32
        })
        .unwrap_or(28)
}

pub struct App {
    state: Arc<Mutex<AppState>>,
    exit: bool,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            exit: false,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal, poll_secs: u64) -> Result<()> {
        let state_clone = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(poll_secs.max(1)));
            loop {
                interval.tick().await;

                if let Ok(mut state) = state_clone.lock() {
                    // The cache policy decides whether this poll changes anything.
                    let _ = state.load_data();
                }
            }
        });

        let mut tick_interval = interval(Duration::from_millis(100));

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    if let Ok(mut state) = self.state.lock() {
                        state.update_spinner();
                    }

                    terminal.draw(|frame| self.draw(frame))?;
                }

                _ = async {
                    if event::poll(Duration::from_millis(0)).unwrap_or(false) {
                        if let Ok(event) = event::read() {
                            self.handle_event(event);
                        }
                    }
                } => {}
            }

            if self.exit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        if let Ok(state) = self.state.lock() {
            HeaderWidget::render(frame, chunks[0], &state);
            StatisticsWidget::render(frame, chunks[1], &state);

            match state.tab {
                Tab::Calendar => CalendarWidget::render(frame, chunks[2], &state),
                Tab::Year if state.year_view != YearView::AllYears => {
                    BreakdownWidget::render(frame, chunks[2], &state)
                }
                _ => SeriesWidget::render(frame, chunks[2], &state),
            }

            ShortcutsWidget::render(frame, chunks[3], &state);

            if state.show_detail {
                DayDetailPopup::render(frame, area, &state);
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key_event) = event {
            if key_event.kind != KeyEventKind::Press {
                return;
            }

            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };

            match key_event.code {
                KeyCode::Char('q') => self.exit = true,
                KeyCode::Char('r') => {
                    let _ = state.reload();
                }
                KeyCode::Tab => state.tab = state.tab.next(),
                KeyCode::Char(c @ '1'..='4') => {
                    let index = c as usize - '1' as usize;
                    state.tab = Tab::ALL[index];
                }
                KeyCode::Char('v') if state.tab == Tab::Year => {
                    state.year_view = state.year_view.next();
                }
                KeyCode::Char('t') => state.go_to_current_month(),
                KeyCode::Left => state.shift_month(-1),
                KeyCode::Right => state.shift_month(1),
                KeyCode::Up => state.shift_year(1),
                KeyCode::Down => state.shift_year(-1),
                KeyCode::Char('h') => state.shift_day(-1),
                KeyCode::Char('l') => state.shift_day(1),
                KeyCode::Char('k') => state.shift_day(-7),
                KeyCode::Char('j') => state.shift_day(7),
                KeyCode::Enter | KeyCode::Char('d') => {
                    state.show_detail = !state.show_detail;
                }
                KeyCode::Esc => state.show_detail = false,
                _ => {}
            }
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    year: i32,
    month: u32,
    available_years: &'a [i32],
    stats: MonthStats,
    yearly: ChartSeries,
    monthly: ChartSeries,
    daily: ChartSeries,
    total: Breakdown,
}

fn print_json(dashboard: &UsageDashboard, year: i32, month: u32) -> Result<()> {
    let report = JsonReport {
        year,
        month,
        available_years: dashboard.available_years(),
        stats: dashboard.month_stats(year, month),
        yearly: dashboard.yearly_series(),
        monthly: dashboard.monthly_series(year),
        daily: dashboard.daily_series(year, month),
        total: dashboard.total_breakdown(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        if let Err(e) = observability::init_tracing(Path::new("power-usage.log")) {
            eprintln!("Warning: Could not start logging: {}", e);
        }
    }

    let config = load_config(args.config.as_deref())?;
    let today = Local::now().date_naive();
    let year = clamp_year(args.year.unwrap_or(today.year()));
    let month = args.month.filter(|m| (1..=12).contains(m)).unwrap_or(today.month());

    let mut app_state = AppState::new(&config, expand_path(&args.file), year, month);
    app_state.selected_day = today.day().min(days_in_month(year, month));

    // Try to load data initially
    if let Err(e) = app_state.load_data() {
        if args.json {
            return Err(e);
        }
        app_state.error_message = Some(format!("Initial load failed: {}", e));
    }

    if args.json {
        return print_json(&app_state.dashboard, app_state.year, app_state.month);
    }

    let mut terminal = ratatui::init();
    let mut app = App::new(app_state);

    let result = app.run(&mut terminal, args.interval).await;

    ratatui::restore();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(
            &EngineConfig::default(),
            PathBuf::from("/nonexistent/attributes.json"),
            2025,
            1,
        )
    }

    #[test]
    fn test_shift_month_wraps_years() {
        let mut state = state();
        state.shift_month(-1);
        assert_eq!((state.year, state.month), (2024, 12));
        state.shift_month(2);
        assert_eq!((state.year, state.month), (2025, 2));
    }

    #[test]
    fn test_navigation_stops_at_calendar_limits() {
        let mut state = AppState::new(
            &EngineConfig::default(),
            PathBuf::from("/nonexistent/attributes.json"),
            i32::MAX,
            12,
        );
        assert_eq!(state.year, NaiveDate::MAX.year());

        state.shift_month(1);
        assert_eq!((state.year, state.month), (NaiveDate::MAX.year(), 12));
        state.shift_year(i32::MAX);
        assert_eq!(state.year, NaiveDate::MAX.year());

        state.shift_year(i32::MIN);
        assert_eq!(state.year, NaiveDate::MIN.year());
        state.month = 1;
        state.shift_month(-1);
        assert_eq!((state.year, state.month), (NaiveDate::MIN.year(), 1));
    }

    #[test]
    fn test_selected_day_is_clamped() {
        let mut state = state();
        state.selected_day = 31;
        state.shift_month(1);
        assert_eq!(state.selected_day, 28);
        state.shift_day(10);
        assert_eq!(state.selected_day, 28);
        state.shift_day(-40);
        assert_eq!(state.selected_day, 1);
    }

    #[test]
    fn test_failed_load_keeps_error() {
        let mut state = state();
        assert!(state.load_data().is_err());
        assert!(state.error_message.is_some());
        assert!(!state.data_loaded);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
    }
}
