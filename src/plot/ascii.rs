//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - mean-temperature curve: `-` line joining points in dataset order
//! - observations: `o`
//! - critical composition: `|` vertical marker, `*` at the peak

use crate::domain::PlotSeries;

/// Render the CST curve. Returns `None` when there is nothing to plot.
pub fn render_ascii_plot(series: &PlotSeries, width: usize, height: usize) -> Option<String> {
    if series.points.is_empty() {
        return None;
    }

    let width = width.max(10);
    let height = height.max(5);
    let points = series.as_pairs();

    let (x_min, x_max) = axis_range(points.iter().map(|&(x, _)| x));
    let (y_min, y_max) = axis_range(points.iter().map(|&(_, y)| y));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so the markers overlay it.
    draw_curve(&mut grid, &points, x_min, x_max, y_min, y_max);

    if let Some(cp) = series.critical {
        let x = map_x(cp.composition, x_min, x_max, width);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
    }

    for &(px, py) in &points {
        let x = map_x(px, x_min, x_max, width);
        let y = map_y(py, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    if let Some(cp) = series.critical {
        let x = map_x(cp.composition, x_min, x_max, width);
        let y = map_y(cp.temperature, y_min, y_max, height);
        grid[y][x] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: phenol=[{x_min:.1}, {x_max:.1}]% | T=[{y_min:.2}, {y_max:.2}]°C\n"
    ));
    if let Some(cp) = series.critical {
        out.push_str(&format!(
            "CST = {:.2}°C @ {:.1}%\n",
            cp.temperature, cp.composition
        ));
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    Some(out)
}

/// Min/max of the values; a degenerate span is widened by 1 on each side.
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if max > min {
        (min, max)
    } else {
        (min - 1.0, max + 1.0)
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

fn draw_curve(grid: &mut [Vec<char>], points: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(px, py) in points {
        let x = map_x(px, x_min, x_max, width);
        let y = map_y(py, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, '-');
        }
        prev = Some((x, y));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CriticalPoint, SeriesPoint};

    fn series(points: &[(f64, f64)], critical: Option<(f64, f64, usize)>) -> PlotSeries {
        PlotSeries {
            points: points
                .iter()
                .map(|&(phenol_percent, mean_temp)| SeriesPoint { phenol_percent, mean_temp })
                .collect(),
            critical: critical.map(|(composition, temperature, row)| CriticalPoint {
                temperature,
                composition,
                row,
            }),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let s = series(&[(10.0, 20.0), (40.0, 30.0)], Some((40.0, 30.0, 2)));
        let txt = render_ascii_plot(&s, 10, 5).unwrap();
        let expected = concat!(
            "Plot: phenol=[10.0, 40.0]% | T=[19.50, 30.50]°C\n",
            "CST = 30.00°C @ 40.0%\n",
            "        -*\n",
            "      -- |\n",
            "    --   |\n",
            "  --     |\n",
            "o-       |\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_has_no_plot() {
        assert!(render_ascii_plot(&PlotSeries::default(), 40, 10).is_none());
    }

    #[test]
    fn single_point_does_not_panic() {
        let s = series(&[(35.7, 66.5)], Some((35.7, 66.5, 1)));
        let txt = render_ascii_plot(&s, 20, 8).unwrap();
        assert!(txt.contains('*'));
        assert!(txt.contains("CST = 66.50°C @ 35.7%"));
    }

    #[test]
    fn peak_marker_column_runs_full_height() {
        let s = series(
            &[(62.5, 40.0), (50.0, 55.0), (41.7, 62.0), (35.7, 66.0), (31.3, 64.0), (25.0, 52.0)],
            Some((35.7, 66.0, 4)),
        );
        let txt = render_ascii_plot(&s, 40, 12).unwrap();
        let rows: Vec<&str> = txt.lines().skip(2).collect();
        assert_eq!(rows.len(), 12);
        let star_col = rows
            .iter()
            .find_map(|row| row.chars().position(|c| c == '*'))
            .expect("peak marker");
        for row in &rows {
            let ch = row.chars().nth(star_col).unwrap();
            assert_ne!(ch, ' ', "marker column has a gap: {row:?}");
        }
        let circles: usize = rows.iter().map(|row| row.matches('o').count()).sum();
        assert_eq!(circles, 5);
    }
}
