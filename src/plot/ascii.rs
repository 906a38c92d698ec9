//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - historical inflation: `o` points
//! - forecast inflation: `-` line
//! - projected COGS: `-` line, gross income: `+` line

use crate::analysis::CogsPoint;
use crate::domain::{Category, MergedRecord, SeriesSource};

/// One series on a plot: `(x, y)` points drawn with `mark`.
struct PlotSeries {
    points: Vec<(f64, f64)>,
    mark: char,
    connect: bool,
}

/// Plot one category's merged series against its month position.
pub fn render_merged_plot(merged: &[MergedRecord], category: Category, width: usize, height: usize) -> String {
    let rows: Vec<&MergedRecord> = merged.iter().filter(|r| r.category == category).collect();
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return format!("Plot: {} | (no data)\n", category.display_name());
    };

    let points_for = |source: SeriesSource| -> Vec<(f64, f64)> {
        rows.iter()
            .enumerate()
            .filter(|(_, r)| r.source == source)
            .filter_map(|(i, r)| r.inflation_rate.map(|y| (i as f64, y)))
            .collect()
    };
    let series = [
        PlotSeries {
            points: points_for(SeriesSource::Forecast),
            mark: '-',
            connect: true,
        },
        PlotSeries {
            points: points_for(SeriesSource::Historical),
            mark: 'o',
            connect: false,
        },
    ];

    let header = format!(
        "Plot: {} | {} .. {}",
        category.display_name(),
        first.period_label,
        last.period_label
    );
    render_plot(&header, "%", &series, (0.0, (rows.len() - 1) as f64), width, height)
}

/// Plot a projected COGS path and the implied gross income.
pub fn render_cogs_plot(points: &[CogsPoint], width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return "Plot: COGS | (no data)\n".to_string();
    };
    let series = [
        PlotSeries {
            points: points.iter().enumerate().map(|(i, p)| (i as f64, p.gross_income)).collect(),
            mark: '+',
            connect: true,
        },
        PlotSeries {
            points: points.iter().enumerate().map(|(i, p)| (i as f64, p.cogs)).collect(),
            mark: '-',
            connect: true,
        },
    ];
    let header = format!("Plot: COGS (-) / gross income (+) | {} .. {}", first.period.label(), last.period.label());
    render_plot(&header, "", &series, (0.0, (points.len() - 1) as f64), width, height)
}

fn render_plot(
    header: &str,
    y_unit: &str,
    series: &[PlotSeries],
    (x_min, x_max): (f64, f64),
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so that points overlay them.
    for s in series.iter().filter(|s| s.connect) {
        draw_curve(&mut grid, &s.points, s.mark, (x_min, x_max), (y_min, y_max));
    }
    for s in series.iter().filter(|s| !s.connect) {
        for &(x, y) in &s.points {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = s.mark;
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{header} | y=[{y_min:.2}, {y_max:.2}]{y_unit}\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(series: &[PlotSeries]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in series.iter().flat_map(|s| s.points.iter()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && max_y.is_finite() {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    mark: char,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) {
    let height = grid.len();
    let Some(width) = grid.first().map(Vec::len) else {
        return;
    };

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, mark);
        } else {
            grid[row][col] = mark;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
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
