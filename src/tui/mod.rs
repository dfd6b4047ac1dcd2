//! Ratatui-based dashboard.
//!
//! Header with the year selector, then either the five overview panels or
//! the two share panels. Every selector change goes through
//! `Dashboard::select`, which recomputes all panels for the new year.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};
use tracing::debug;

use crate::aggregate::PanelOutput;
use crate::domain::{DatePoint, GroupSum, ScatterPoint, Share, SummaryTable, View, YearFilter};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::filter::Dashboard;
use crate::io::Dataset;

mod plotters_chart;

use plotters_chart::{ChartSeries, Mark, PanelChart, padded_bounds};

/// High-contrast palette shared by bars, share bars and scatter dots.
const PALETTE: [(u8, u8, u8); 8] = [
    (0, 255, 255),
    (255, 0, 255),
    (255, 255, 0),
    (0, 255, 0),
    (255, 128, 0),
    (128, 160, 255),
    (255, 80, 80),
    (200, 200, 200),
];

/// Start the dashboard on `view` with `year` selected.
pub fn run(dataset: &Dataset, view: View, year: YearFilter) -> Result<(), AppError> {
    // Validate the starting year before touching the terminal.
    let mut dashboard = Dashboard::new(dataset, view);
    dashboard.select(year)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dashboard);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
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

struct App<'a> {
    dashboard: Dashboard<'a>,
    status: String,
}

impl<'a> App<'a> {
    fn new(dashboard: Dashboard<'a>) -> Self {
        Self {
            dashboard,
            status: "←/→ year  v view  a all years  q quit".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    /// Apply one key press. Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Left => self.dashboard.select_prev()?,
            KeyCode::Right => self.dashboard.select_next()?,
            KeyCode::Char('a') => self.dashboard.select(YearFilter::All)?,
            KeyCode::Char('v') => {
                let view = self.dashboard.view().toggle();
                self.dashboard.set_view(view);
            }
            _ => return Ok(false),
        }
        debug!(year = %self.dashboard.filter(), view = ?self.dashboard.view(), "dashboard updated");
        self.status = format!(
            "Showing {} for {}",
            self.dashboard.view().display_name(),
            self.dashboard.filter().label()
        );
        Ok(false)
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.dashboard.view() {
            View::Overview => self.draw_overview(frame, chunks[1]),
            View::Shares => self.draw_shares(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(Span::styled(
            self.dashboard.view().display_name(),
            Style::default().add_modifier(Modifier::BOLD),
        ));

        let current = self.dashboard.filter();
        let mut selector = vec![Span::raw("Select Year: ")];
        for &option in self.dashboard.state().options() {
            let label = option.label();
            if option == current {
                selector.push(Span::styled(
                    format!("[{label}]"),
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                ));
            } else {
                selector.push(Span::raw(format!(" {label} ")));
            }
            selector.push(Span::raw(" "));
        }

        let p = Paragraph::new(Text::from(vec![title, Line::from(selector)]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(area);
        let halves = |r: Rect| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(r)
        };
        let top = halves(rows[0]);
        let mid = halves(rows[1]);

        // Sales trend, category bars, price/demand, stock, revenue.
        let areas = [top[0], top[1], mid[0], mid[1], rows[2]];
        for (panel, area) in self.dashboard.panels().iter().zip(areas) {
            self.draw_panel(frame, area, panel);
        }
    }

    fn draw_shares(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        for (panel, area) in self.dashboard.panels().iter().zip(cols.iter().copied()) {
            self.draw_panel(frame, area, panel);
        }
    }

    /// Draw one panel inside its own block; nothing here touches other panels.
    fn draw_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect, panel: &PanelOutput) {
        let block = Block::default().title(panel.title.as_str()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if panel.table.is_empty() {
            let msg = Paragraph::new("No data for the selected year.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let value_label = panel.panel.value_label();
        match &panel.table {
            SummaryTable::Series(points) => draw_date_series(frame, inner, points, value_label),
            SummaryTable::Groups(groups) => draw_group_bars(frame, inner, groups),
            SummaryTable::Shares(shares) => draw_share_bars(frame, inner, shares),
            SummaryTable::Scatter(points) => {
                draw_scatter(frame, inner, points, self.dashboard.dataset().categories(), value_label)
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = Paragraph::new(Line::from(self.status.as_str())).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_date_series(frame: &mut ratatui::Frame<'_>, area: Rect, points: &[DatePoint], value_label: &str) {
    let series = [ChartSeries {
        points: points.iter().map(|p| (date_to_x(p.date), p.value)).collect(),
        color: palette_rgb(0),
        mark: Mark::Line,
    }];
    let (Some(x_bounds), Some(y_bounds)) = (
        padded_bounds(series[0].points.iter().map(|p| p.0)),
        padded_bounds(series[0].points.iter().map(|p| p.1)),
    ) else {
        return;
    };

    frame.render_widget(
        PanelChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "date",
            y_label: value_label,
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_value,
        },
        area,
    );
}

fn draw_scatter(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    points: &[ScatterPoint],
    categories: &[String],
    value_label: &str,
) {
    let mut by_category: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for p in points {
        by_category.entry(p.category.as_str()).or_default().push((p.price, p.units_sold));
    }

    // Colors follow the dataset's category order so they stay put across years.
    let color_index = |cat: &str| categories.iter().position(|c| c == cat).unwrap_or(0);
    let series: Vec<ChartSeries> = by_category
        .iter()
        .map(|(cat, pts)| ChartSeries {
            points: pts.clone(),
            color: palette_rgb(color_index(cat)),
            mark: Mark::Dots,
        })
        .collect();

    let (Some(x_bounds), Some(y_bounds)) = (
        padded_bounds(points.iter().map(|p| p.price)),
        padded_bounds(points.iter().map(|p| p.units_sold)),
    ) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        PanelChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "price",
            y_label: value_label,
            fmt_x: fmt_axis_value,
            fmt_y: fmt_axis_value,
        },
        chunks[0],
    );

    let legend: Vec<Span> = by_category
        .keys()
        .map(|cat| Span::styled(format!("● {cat}  "), Style::default().fg(palette_color(color_index(cat)))))
        .collect();
    frame.render_widget(Paragraph::new(Line::from(legend)), chunks[1]);
}

fn draw_group_bars(frame: &mut ratatui::Frame<'_>, area: Rect, groups: &[GroupSum]) {
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::default()
                .value(g.value.max(0.0).round() as u64)
                .text_value(fmt_axis_value(g.value))
                .label(Line::from(g.key.as_str()))
                .style(Style::default().fg(palette_color(i)))
        })
        .collect();

    let n = groups.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(n) / n).clamp(1, 12);

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).bg(Color::White));
    frame.render_widget(chart, area);
}

/// Horizontal "pie" rendering: one proportional bar per slice.
fn draw_share_bars(frame: &mut ratatui::Frame<'_>, area: Rect, shares: &[Share]) {
    let key_width = shares.iter().map(|s| s.key.chars().count()).max().unwrap_or(0).min(18);
    let bar_room = usize::from(area.width).saturating_sub(key_width + 10);

    let lines: Vec<Line> = shares
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let filled = (s.fraction * bar_room as f64).round() as usize;
            let key: String = s.key.chars().take(key_width).collect();
            Line::from(vec![
                Span::raw(format!("{key:<key_width$} ")),
                Span::styled("█".repeat(filled), Style::default().fg(palette_color(i))),
                Span::raw(format!(" {:>5.1}%", s.fraction * 100.0)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn palette_rgb(i: usize) -> RGBColor {
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    RGBColor(r, g, b)
}

fn palette_color(i: usize) -> Color {
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    Color::Rgb(r, g, b)
}

fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format!("{v:.0}")
    }
}
