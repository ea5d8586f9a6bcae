//! Plotters-powered dilation curve widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`. Plotters is used over Ratatui's own `Chart`
//! because it lays out axis ticks and labels itself, and the same drawing
//! code shape serves the SVG export in `plot::svg`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description. Series and bounds are computed by the caller.
pub struct DilationChart<'a> {
    /// Full curve in sweep order.
    pub curve: &'a [(f64, f64)],
    /// Points inside the active range filter, drawn over the curve.
    pub selected: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DilationChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a mesh in a handful of cells.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // `widget_fn` hides the backend's canvas types; only the drawing
        // closure depends on Plotters.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Terminal cells are coarse: keep margins and label areas small.
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines turn into noise at cell resolution; axes and ticks remain.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // The full curve is dimmed so the filtered range stands out.
            let curve_color = RGBColor(90, 90, 90);
            let selected_color = RGBColor(0, 255, 255);

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;
            chart.draw_series(LineSeries::new(self.selected.iter().copied(), &selected_color))?;
            // Circles are mis-scaled by the terminal backend; plain pixels read as dots.
            chart.draw_series(
                self.selected
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), selected_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(v: f64) -> String {
        format!("{v:.1}")
    }

    #[test]
    fn tiny_area_renders_hint() {
        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        let curve = [(0.0, 1.0), (1.0, 2.0)];
        DilationChart {
            curve: &curve,
            selected: &curve,
            x_bounds: [0.0, 1.0],
            y_bounds: [1.0, 2.0],
            x_label: "x",
            y_label: "y",
            fmt_x: fmt,
            fmt_y: fmt,
        }
        .render(area, &mut buf);

        let first_row: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(first_row.starts_with("Chart area too small"));
    }

    #[test]
    fn degenerate_bounds_draw_nothing() {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        DilationChart {
            curve: &[],
            selected: &[],
            x_bounds: [1.0, 1.0],
            y_bounds: [0.0, f64::NAN],
            x_label: "x",
            y_label: "y",
            fmt_x: fmt,
            fmt_y: fmt,
        }
        .render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }
}
