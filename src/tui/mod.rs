//! Ratatui-based dashboard over an exported summary.
//!
//! One scenario is shown at a time: its curve, the points inside an adjustable
//! input range, and summary statistics for that range.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::domain::ScenarioTable;
use crate::error::AppError;
use crate::report::fmt_value;

mod plotters_chart;

use plotters_chart::DilationChart;

/// Points handed to Plotters per frame.
const MAX_CHART_POINTS: usize = 400;

/// Number of nudges needed to cross the full input span.
const NUDGE_STEPS: f64 = 50.0;

/// Start the dashboard on `path` (combined summary or a single scenario table).
pub fn run(path: &Path) -> Result<(), AppError> {
    let tables = crate::io::export::load_tables(path)?;
    if tables.is_empty() {
        return Err(AppError::render(format!("'{}' holds no rows to browse.", path.display())));
    }
    tracing::info!(path = %path.display(), scenarios = tables.len(), "dashboard loaded");

    let mut app = App::new(path.to_path_buf(), tables);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::render(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Restores the terminal (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::render(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::render(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which end of the range filter the arrow keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

/// Closed input interval `[min, max]` applied to a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
    limits: [f64; 2],
}

impl RangeFilter {
    /// Filter spanning every input in `series`.
    pub fn covering(series: &[(f64, f64)]) -> Self {
        let (lo, hi) = series
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
        let limits = if lo.is_finite() && hi.is_finite() { [lo, hi] } else { [0.0, 0.0] };
        Self {
            min: limits[0],
            max: limits[1],
            limits,
        }
    }

    pub fn apply(&self, series: &[(f64, f64)]) -> Vec<(f64, f64)> {
        series
            .iter()
            .copied()
            .filter(|&(x, _)| x >= self.min && x <= self.max)
            .collect()
    }

    pub fn span(&self) -> f64 {
        self.limits[1] - self.limits[0]
    }

    /// Move `min` by `delta`, clamped to the data and kept at or below `max`.
    pub fn nudge_min(&mut self, delta: f64) {
        self.min = (self.min + delta).clamp(self.limits[0], self.max);
    }

    /// Move `max` by `delta`, clamped to the data and kept at or above `min`.
    pub fn nudge_max(&mut self, delta: f64) {
        self.max = (self.max + delta).clamp(self.min, self.limits[1]);
    }

    pub fn reset(&mut self) {
        self.min = self.limits[0];
        self.max = self.limits[1];
    }
}

/// Summary of the points inside a range filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeStats {
    pub points: usize,
    pub output_min: f64,
    pub output_max: f64,
    pub output_mean: f64,
}

impl RangeStats {
    pub fn of(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let (mut lo, mut hi, mut sum) = (f64::INFINITY, f64::NEG_INFINITY, 0.0);
        for &(_, y) in points {
            lo = lo.min(y);
            hi = hi.max(y);
            sum += y;
        }
        Some(Self {
            points: points.len(),
            output_min: lo,
            output_max: hi,
            output_mean: sum / points.len() as f64,
        })
    }
}

struct View {
    table: ScenarioTable,
    series: Vec<(f64, f64)>,
    filter: RangeFilter,
}

struct App {
    path: PathBuf,
    views: Vec<View>,
    current: usize,
    bound: Bound,
    status: String,
}

impl App {
    fn new(path: PathBuf, tables: Vec<ScenarioTable>) -> Self {
        let views = tables
            .into_iter()
            .map(|table| {
                let series = table.series();
                let filter = RangeFilter::covering(&series);
                View { table, series, filter }
            })
            .collect();
        Self {
            path,
            views,
            current: 0,
            bound: Bound::Min,
            status: "Ready.".to_string(),
        }
    }

    fn view(&self) -> &View {
        &self.views[self.current]
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::render(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::render(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::render(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the dashboard should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.current = (self.current + 1) % self.views.len();
                self.status = format!("scenario: {}", self.view().table.kind().display_name());
            }
            KeyCode::BackTab => {
                self.current = (self.current + self.views.len() - 1) % self.views.len();
                self.status = format!("scenario: {}", self.view().table.kind().display_name());
            }
            KeyCode::Up => self.bound = Bound::Min,
            KeyCode::Down => self.bound = Bound::Max,
            KeyCode::Left => self.nudge(-1.0),
            KeyCode::Right => self.nudge(1.0),
            KeyCode::Char('r') => {
                self.views[self.current].filter.reset();
                self.status = "Range reset.".to_string();
            }
            _ => {}
        }
        false
    }

    fn nudge(&mut self, direction: f64) {
        let bound = self.bound;
        let filter = &mut self.views[self.current].filter;
        let delta = direction * filter.span() / NUDGE_STEPS;
        match bound {
            Bound::Min => filter.nudge_min(delta),
            Bound::Max => filter.nudge_max(delta),
        }
        self.status = format!("range: [{}, {}]", fmt_value(filter.min), fmt_value(filter.max));
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs: Vec<Span> = self
            .views
            .iter()
            .enumerate()
            .flat_map(|(i, v)| {
                let style = if i == self.current {
                    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                [Span::styled(format!(" {} ", v.table.kind().display_name()), style), Span::raw(" ")]
            })
            .collect();

        let lines = vec![
            Line::from(vec![
                Span::styled("tdil", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" dashboard: {}", self.path.display())),
            ]),
            Line::from(tabs),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        let selected = self.view().filter.apply(&self.view().series);
        self.draw_chart(frame, chunks[0], &selected);
        self.draw_stats(frame, chunks[1], &selected);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, selected: &[(f64, f64)]) {
        let view = self.view();
        let kind = view.table.kind();
        let block = Block::default().title(kind.display_name()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let curve = crate::plot::downsample(&view.series, MAX_CHART_POINTS);
        let highlighted = crate::plot::downsample(selected, MAX_CHART_POINTS);
        let (x_bounds, y_bounds) = chart_bounds(&curve);

        let widget = DilationChart {
            curve: &curve,
            selected: &highlighted,
            x_bounds,
            y_bounds,
            x_label: kind.input_column(),
            y_label: kind.output_column(),
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_stats(&self, frame: &mut ratatui::Frame<'_>, area: Rect, selected: &[(f64, f64)]) {
        let view = self.view();
        let marker = |b: Bound| if self.bound == b { "» " } else { "  " };

        let mut items = vec![
            ListItem::new(format!("{}min: {}", marker(Bound::Min), fmt_value(view.filter.min))),
            ListItem::new(format!("{}max: {}", marker(Bound::Max), fmt_value(view.filter.max))),
            ListItem::new(format!("  rows: {} / {}", selected.len(), view.table.len())),
        ];
        match RangeStats::of(selected) {
            Some(s) => {
                let out = view.table.kind().output_column();
                items.push(ListItem::new(format!("  {out} min: {}", fmt_value(s.output_min))));
                items.push(ListItem::new(format!("  {out} max: {}", fmt_value(s.output_max))));
                items.push(ListItem::new(format!("  mean: {}", fmt_value(s.output_mean))));
            }
            None => items.push(ListItem::new("  (no rows in range)")),
        }

        let mut state = ListState::default();
        state.select(Some(match self.bound {
            Bound::Min => 0,
            Bound::Max => 1,
        }));
        let list = List::new(items)
            .block(Block::default().title("Range").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab scenario  ↑/↓ bound  ←/→ adjust  r reset  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart bounds for `series`, with 5% vertical padding.
///
/// A flat axis (one point, or a constant column) is widened around its value
/// so the data stays on screen; an empty series falls back to `[0, 1]`.
fn chart_bounds(series: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (x0, x1) = axis_bounds(series.iter().map(|p| p.0));
    let (y0, y1) = axis_bounds(series.iter().map(|p| p.1));
    let pad = ((y1 - y0) * 0.05).max(1e-12);
    ([x0, x1], [y0 - pad, y1 + pad])
}

fn axis_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if hi > lo {
        return (lo, hi);
    }
    let pad = (lo.abs() * 0.5).max(0.5);
    (lo - pad, hi + pad)
}

fn fmt_axis(v: f64) -> String {
    if v.abs() >= 1e4 || (v != 0.0 && v.abs() < 1e-2) {
        format!("{v:.1e}")
    } else {
        format!("{v:.2}")
    }
}
