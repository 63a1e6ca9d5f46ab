//! Plotters-powered CST curve widget for Ratatui.
//!
//! Draws the mean-temperature curve in dataset order, each reading as a dot,
//! and the critical point as a red vertical marker with a text annotation.
//! Rendering goes into the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Render-only chart description. Bounds are computed by the caller.
pub struct CstPlottersChart<'a> {
    /// (phenol %, mean °C) in dataset order.
    pub points: &'a [(f64, f64)],
    /// Critical point (composition, temperature).
    pub peak: Option<(f64, f64)>,
    pub annotation: Option<String>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for CstPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
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

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

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

            let curve_color = RGBColor(0, 255, 0);
            let marker_color = RGBColor(255, 0, 0);

            chart.draw_series(LineSeries::new(self.points.iter().copied(), &curve_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; use pixels.
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            if let Some((px, py)) = self.peak {
                chart.draw_series(LineSeries::new([(px, y0), (px, y1)], &marker_color))?;
                chart.draw_series(std::iter::once(Pixel::new((px, py), marker_color)))?;

                if let Some(text) = &self.annotation {
                    let span = x1 - x0;
                    let ax = if px > x0 + span / 2.0 { px - 0.4 * span } else { px + 0.02 * span };
                    let ay = y1 - 0.02 * (y1 - y0);
                    chart.draw_series(std::iter::once(Text::new(
                        text.clone(),
                        (ax, ay),
                        ("sans-serif", 10).into_font().color(&marker_color),
                    )))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
