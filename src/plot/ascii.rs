//! ASCII plotting of a forecast for terminal output.
//!
//! Fixed-size character grid with deterministic output:
//! - predicted units (`yhat`): `-` line
//! - observed daily units: `o`
//! - first forecast day: `|` column

use chrono::NaiveDate;

use crate::domain::ForecastSeries;

/// Render `series` as a titled character plot.
pub fn render_forecast_plot(series: &ForecastSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let origin = series.points.first().map(|p| p.date).unwrap_or(series.first_observed);
    let x_of = |d: NaiveDate| (d - origin).num_days() as f64;

    let line: Vec<(f64, f64)> = series.points.iter().map(|p| (x_of(p.date), p.yhat)).collect();
    let observed: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter_map(|p| p.observed.map(|y| (x_of(p.date), y)))
        .collect();
    let forecast_start = series.future().next().map(|p| x_of(p.date));

    let (x_min, x_max) = x_range(&line).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(line.iter().chain(&observed)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    draw_curve(&mut grid, &line, x_min, x_max, y_min, y_max);

    for &(x, y) in &observed {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    if let Some(x) = forecast_start {
        let col = map_x(x, x_min, x_max, width);
        for row in grid.iter_mut() {
            if row[col] == ' ' {
                row[col] = '|';
            }
        }
    }

    let last = series.points.last().map(|p| p.date).unwrap_or(series.last_observed);

    let mut out = String::new();
    out.push_str(&format!(
        "Forecasted Sales for {} (Next {} Days)\n",
        series.category, series.horizon_days
    ));
    out.push_str(&format!(
        "Plot: dates=[{origin}, {last}] | units=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    (min.is_finite() && max.is_finite() && max > min).then_some((min, max))
}

fn y_range<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: give it a unit band so it lands mid-grid.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (max).
    (height as f64 - 1.0 - u * (height as f64 - 1.0)).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    if width == 0 {
        return;
    }

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x0, mut y0) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
