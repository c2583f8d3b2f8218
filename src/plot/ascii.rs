//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid keeps the output deterministic, which is what
//! both the golden tests and the no-PNG terminal path want. Curves are
//! rasterized column by column as `-`, observed points land on top with one
//! glyph per series (rotating through `o x + * #`), and a legend block
//! follows the grid.

use crate::plot::ChartSeries;

const POINT_GLYPHS: [char; 5] = ['o', 'x', '+', '*', '#'];

/// Point glyph for the series at `index` (rotates through a fixed set).
pub fn point_glyph(index: usize) -> char {
    POINT_GLYPHS[index % POINT_GLYPHS.len()]
}

/// Render all series into a fixed-size character grid.
pub fn render_ascii_chart(
    series: &[ChartSeries],
    width: usize,
    height: usize,
    x_label: &str,
    y_label: &str,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(series).unwrap_or((1.0, 2.0));
    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Points overwrite curve cells, so curves go down first.
    for s in series {
        if let Some(curve) = &s.curve {
            draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
        }
    }
    for (i, s) in series.iter().enumerate() {
        let ch = point_glyph(i);
        for &(x, y) in &s.points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            let col = col_of(x, x_min, x_max, width);
            let row = row_of(y, y_min, y_max, height);
            grid[row][col] = ch;
        }
    }

    // Header with ranges, then the grid, then the legend block.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.3}, {x_max:.3}] | {y_label}=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (i, s) in series.iter().enumerate() {
        out.push_str(&format!("  {} {}\n", point_glyph(i), s.legend));
    }

    out
}

fn x_range(series: &[ChartSeries]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for (x, _) in all_points(series) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(series: &[ChartSeries]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (_, y) in all_points(series) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn all_points(series: &[ChartSeries]) -> impl Iterator<Item = (f64, f64)> + '_ {
    series.iter().flat_map(|s| {
        s.points
            .iter()
            .chain(s.curve.iter().flatten())
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    })
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let mut pad = (max - min) * frac;
    if !(pad > 0.0) {
        pad = 1e-12;
    }
    (min - pad, max + pad)
}

/// Column whose bucket contains `x` (the span splits evenly into `width` cells).
fn col_of(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let span = x_max - x_min;
    if !(span > 0.0) {
        return 0;
    }
    let cell = ((x - x_min) / span * width as f64).floor() as isize;
    cell.clamp(0, width as isize - 1) as usize
}

/// Row whose bucket contains `y`. Row 0 is the top of the chart.
fn row_of(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let span = y_max - y_min;
    if !(span > 0.0) {
        return 0;
    }
    let cell = ((y_max - y) / span * height as f64).floor() as isize;
    cell.clamp(0, height as isize - 1) as usize
}

/// Column-wise curve rasterization.
///
/// The curve is densely sampled and is a function of x, so each column gets
/// the interpolated y at its bucket center; steep sections stay connected by
/// filling the vertical run between neighboring columns' rows.
fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();
    let span = x_max - x_min;
    if !(span > 0.0) {
        return;
    }

    let mut prev_row: Option<usize> = None;
    for col in 0..width {
        let x = x_min + (col as f64 + 0.5) * span / width as f64;
        let Some(y) = curve_y_at(curve, x) else {
            prev_row = None;
            continue;
        };
        let row = row_of(y, y_min, y_max, height);

        let (top, bottom) = match prev_row {
            Some(p) => (p.min(row), p.max(row)),
            None => (row, row),
        };
        for r in top..=bottom {
            if grid[r][col] == ' ' {
                grid[r][col] = '-';
            }
        }
        prev_row = Some(row);
    }
}

/// Linearly interpolate the curve's y at `x`.
///
/// `None` outside the sampled span or across non-finite samples; the caller
/// leaves those columns blank.
fn curve_y_at(curve: &[(f64, f64)], x: f64) -> Option<f64> {
    let (x_first, _) = *curve.first()?;
    let (x_last, _) = *curve.last()?;
    if x < x_first || x > x_last {
        return None;
    }

    for pair in curve.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x > x1 {
            continue;
        }
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return None;
        }
        if x1 <= x0 {
            return Some(y1);
        }
        let t = (x - x0) / (x1 - x0);
        return Some(y0 + t * (y1 - y0));
    }
    None
}
