//! Fixed-grid ASCII line plots for `tdil generate --plot` and `tdil plot`.
//!
//! Output is deterministic for a given series and grid size, so it can be
//! compared against golden strings. Consecutive points are joined with `*`.

use crate::domain::ScenarioTable;
use crate::report::fmt_value;

/// Render one scenario table (input on x, derived output on y).
pub fn render_table_plot(table: &ScenarioTable, width: usize, height: usize) -> String {
    let kind = table.kind();
    let series = downsample(&table.series(), width.max(2) * 4);
    render_ascii_plot(&series, kind.input_column(), kind.output_column(), width, height)
}

/// Render an `(x, y)` series as a line plot.
pub fn render_ascii_plot(series: &[(f64, f64)], x_label: &str, y_label: &str, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = range(series.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(series.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_series(&mut grid, series, x_min, x_max, y_min, y_max);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{}, {}] | {y_label}=[{}, {}]\n",
        fmt_value(x_min),
        fmt_value(x_max),
        fmt_value(y_min),
        fmt_value(y_max)
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

/// Keep at most `max_points` points, evenly spaced by index, always keeping
/// the first and last.
pub fn downsample(series: &[(f64, f64)], max_points: usize) -> Vec<(f64, f64)> {
    let max_points = max_points.max(2);
    if series.len() <= max_points {
        return series.to_vec();
    }
    let last = series.len() - 1;
    (0..max_points)
        .map(|i| series[(i * last) / (max_points - 1)])
        .collect()
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && max.is_finite() {
        // Single value: widen so it lands mid-grid.
        let pad = (min.abs() * 0.5).max(0.5);
        Some((min - pad, max + pad))
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

fn draw_series(grid: &mut [Vec<char>], series: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in series {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, (x0, y0), (cx, cy), '*');
        } else {
            grid[cy][cx] = '*';
        }
        prev = Some((cx, cy));
    }
}

/// Join two cells with an integer Bresenham line, skipping cells off the grid.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (rows, cols) = (grid.len() as isize, grid.first().map_or(0, Vec::len) as isize);
    let (mut cx, mut cy) = (from.0 as isize, from.1 as isize);
    let (tx, ty) = (to.0 as isize, to.1 as isize);

    let dx = (tx - cx).abs();
    let dy = -(ty - cy).abs();
    let step_x = (tx - cx).signum();
    let step_y = (ty - cy).signum();
    let mut err = dx + dy;

    loop {
        if (0..cols).contains(&cx) && (0..rows).contains(&cy) {
            grid[cy as usize][cx as usize] = ch;
        }
        if (cx, cy) == (tx, ty) {
            return;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += step_x;
        }
        if e2 <= dx {
            err += dx;
            cy += step_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::Sweep;
    use crate::table::velocity_table;

    #[test]
    fn plot_golden_snapshot_small() {
        let series = [(0.0, 0.0), (1.0, 1.0)];
        let txt = render_ascii_plot(&series, "x", "y", 10, 5);
        let expected = concat!(
            "Plot: x=[0.0000, 1.0000] | y=[-0.0500, 1.0500]\n",
            "        **\n",
            "      **\n",
            "    **\n",
            "  **\n",
            "**\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn rising_curve_ends_top_right() {
        let table = crate::domain::ScenarioTable::Velocity(
            velocity_table(&Sweep::inclusive(0.1, 0.99, 200).unwrap()).unwrap(),
        );
        let txt = render_table_plot(&table, 40, 10);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("Plot: velocity_fraction=[0.1000, 0.9900] | dilated_time_ratio="));
        // Max y is on the first grid row, at the last column.
        assert_eq!(lines[1].chars().count(), 40);
        assert!(lines[1].ends_with('*'));
        // Min y on the last row, first column.
        assert!(lines[10].starts_with('*'));
    }

    #[test]
    fn downsample_keeps_endpoints() {
        let series: Vec<(f64, f64)> = (0..1000).map(|i| (i as f64, i as f64)).collect();
        let d = downsample(&series, 10);
        assert_eq!(d.len(), 10);
        assert_eq!(d[0], (0.0, 0.0));
        assert_eq!(d[9], (999.0, 999.0));
        assert_eq!(downsample(&series[..5], 10).len(), 5);
    }
}
