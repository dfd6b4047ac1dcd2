//! Plotters-powered chart widget for Ratatui.
//!
//! Used for the date-series panels (lines) and the price/demand scatter
//! (one dot series per category). Plotters output is drawn into the Ratatui
//! buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Line,
    Dots,
}

/// One series to draw, with its own color.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub mark: Mark,
}

/// A render-only chart description; all bounds are computed by the caller.
pub struct PanelChart<'a> {
    pub series: &'a [ChartSeries],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PanelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out axes in very small areas.
        if area.width < 20 || area.height < 6 {
            buf.set_string(area.x, area.y, "Panel too small (resize terminal).", Style::default().fg(Color::Yellow));
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
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(4)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for s in self.series {
                match s.mark {
                    Mark::Line if s.points.len() > 1 => {
                        chart.draw_series(LineSeries::new(s.points.iter().copied(), &s.color))?;
                    }
                    // `Circle` radii come out wrong through this backend; pixels render as clean dots.
                    Mark::Line | Mark::Dots => {
                        chart.draw_series(s.points.iter().map(|&(x, y)| Pixel::new((x, y), s.color)))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Min/max of one coordinate, widened when degenerate and padded by 5%.
pub fn padded_bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        let pad = (max - min) * 0.05;
        Some([min - pad, max + pad])
    } else {
        let pad = (min.abs() * 0.05).max(1.0);
        Some([min - pad, max + pad])
    }
}
