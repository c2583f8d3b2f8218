//! PNG chart rendering via Plotters.
//!
//! The raster output mirrors the ASCII chart: scatter points per series plus
//! each fitted curve, with a legend naming the series and its coefficients.
//! Colors rotate through a fixed palette indexed by series position.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::ChartSeries;

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),  // blue
    RGBColor(255, 127, 14),  // orange
    RGBColor(44, 160, 44),   // green
    RGBColor(214, 39, 40),   // red
    RGBColor(148, 103, 189), // purple
    RGBColor(140, 86, 75),   // brown
];

/// Render all series into a PNG file at `path`.
pub fn render_png(
    path: &Path,
    series: &[ChartSeries],
    x_label: &str,
    y_label: &str,
    size: (u32, u32),
) -> Result<(), AppError> {
    let ((x0, x1), (y0, y1)) = bounds(series)
        .ok_or_else(|| AppError::validation("Nothing to plot: no finite data points."))?;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| plot_err(path, e))?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| plot_err(path, e))?;

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];

        // The legend marker mirrors what the series actually shows: a line
        // segment when a curve is drawn, a dot for scatter-only series.
        if let Some(curve) = &s.curve {
            chart
                .draw_series(LineSeries::new(curve.iter().copied(), &color))
                .map_err(|e| plot_err(path, e))?
                .label(s.legend.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
            chart
                .draw_series(
                    s.points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )
                .map_err(|e| plot_err(path, e))?;
        } else {
            chart
                .draw_series(
                    s.points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )
                .map_err(|e| plot_err(path, e))?
                .label(s.legend.clone())
                .legend(move |(x, y)| Circle::new((x + 9, y), 3, color.filled()));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(|e| plot_err(path, e))?;

    root.present().map_err(|e| plot_err(path, e))?;
    Ok(())
}

fn plot_err<E: std::fmt::Display>(path: &Path, e: E) -> AppError {
    AppError::input(format!("Failed to render plot '{}': {e}", path.display()))
}

/// Axis bounds covering every finite point and curve sample, with padding.
fn bounds(series: &[ChartSeries]) -> Option<((f64, f64), (f64, f64))> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for s in series {
        for &(x, y) in s.points.iter().chain(s.curve.iter().flatten()) {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !(x_min.is_finite() && y_min.is_finite()) {
        return None;
    }
    Some((widen(x_min, x_max, 0.02), widen(y_min, y_max, 0.05)))
}

fn widen(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 { span * frac } else { 0.5 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_widen_and_survive_degenerate_spans() {
        let series = vec![ChartSeries {
            legend: "one point".to_string(),
            points: vec![(4.0, -1.5)],
            curve: None,
        }];
        let ((x0, x1), (y0, y1)) = bounds(&series).unwrap();
        assert!(x0 < 4.0 && x1 > 4.0);
        assert!(y0 < -1.5 && y1 > -1.5);

        assert!(bounds(&[]).is_none());
    }
}
