//! SVG line charts via Plotters.

use std::fs;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::ScenarioTable;
use crate::error::AppError;

/// Pixel size of a chart given in terminal cells, `scale` pixels per cell.
pub fn pixel_size(cols: usize, rows: usize, scale: u32) -> Result<(u32, u32), AppError> {
    let px = |cells: usize| u32::try_from(cells).ok().and_then(|c| c.checked_mul(scale));
    match (px(cols), px(rows)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(AppError::render(format!(
            "Chart size {cols}x{rows} cells does not fit in pixels at {scale} px per cell."
        ))),
    }
}

/// Draw one chart per table, stacked vertically, into a single SVG file.
pub fn write_svg_chart(path: &Path, tables: &[ScenarioTable], size: (u32, u32)) -> Result<(), AppError> {
    if tables.is_empty() {
        return Err(AppError::render("Nothing to plot: no tables given."));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }

    let (w, h) = size;
    let total_h = u32::try_from(tables.len())
        .ok()
        .and_then(|n| h.checked_mul(n))
        .ok_or_else(|| AppError::render(format!("Chart too tall: {} panels of {h} px.", tables.len())))?;
    let root = SVGBackend::new(path, (w, total_h)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let panels = root.split_evenly((tables.len(), 1));
    for (panel, table) in panels.iter().zip(tables) {
        draw_panel(panel, table)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, plotters::coord::Shift>, table: &ScenarioTable) -> Result<(), AppError> {
    let kind = table.kind();
    let series = table.series();
    let (x0, x1) = bounds(series.iter().map(|p| p.0));
    let (y0, y1) = bounds(series.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(kind.display_name(), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(kind.input_column())
        .y_desc(kind.output_column())
        .y_label_formatter(&|v| crate::report::fmt_value(*v))
        .draw()
        .map_err(render_err)?;

    let color = match kind {
        crate::domain::ScenarioKind::Velocity => BLUE,
        crate::domain::ScenarioKind::Gravitational => RED,
        crate::domain::ScenarioKind::Decay => GREEN,
    };
    chart
        .draw_series(LineSeries::new(series, &color))
        .map_err(render_err)?;

    Ok(())
}

/// Axis bounds with a small margin; degenerate ranges are widened.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.02 } else { lo.abs().max(1.0) * 0.5 };
    (lo - pad, hi + pad)
}

fn render_err(e: impl std::fmt::Display) -> AppError {
    AppError::render(format!("Chart rendering failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::Sweep;
    use crate::table::{gravitational_table, velocity_table};

    #[test]
    fn writes_an_svg_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("dilation.svg");
        let tables = vec![
            ScenarioTable::Velocity(velocity_table(&Sweep::inclusive(0.1, 0.99, 20).unwrap()).unwrap()),
            ScenarioTable::Gravitational(gravitational_table(&Sweep::inclusive(1.01, 10.0, 20).unwrap()).unwrap()),
        ];
        write_svg_chart(&path, &tables, (640, 320)).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn empty_input_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_svg_chart(&dir.path().join("x.svg"), &[], (100, 100)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Render);
    }

    #[test]
    fn oversized_charts_are_render_errors() {
        assert_eq!(pixel_size(80, 20, 10).unwrap(), (800, 200));
        for (cols, rows) in [(usize::MAX, 20), (80, 500_000_000), (u32::MAX as usize, 1)] {
            let err = pixel_size(cols, rows, 10).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Render);
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tall.svg");
        let table = ScenarioTable::Velocity(velocity_table(&Sweep::inclusive(0.1, 0.9, 3).unwrap()).unwrap());
        let err = write_svg_chart(&path, &[table.clone(), table], (100, u32::MAX)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Render);
        assert!(!path.exists());
    }

    #[test]
    fn bounds_widen_degenerate_ranges() {
        assert_eq!(bounds(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = bounds([2.0].into_iter());
        assert!(lo < 2.0 && hi > 2.0);
    }
}
