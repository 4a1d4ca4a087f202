use std::fmt;
use std::path::Path;

use image::RgbImage;
use plotters::prelude::*;

use super::PlotError;

const UNIT_CIRCLE: RGBColor = RGBColor(110, 110, 140);

// ---------------------------------------------------------------------------
// Bounds – data-space extent of the chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Bounds {
    pub const UNIT_SQUARE: Bounds = Bounds {
        x: (-1.0, 1.0),
        y: (-1.0, 1.0),
    };

    /// Smallest bounds holding every finite point, with `pad` of the y span
    /// added above and below. Degenerate spans are opened up.
    pub fn around(points: impl IntoIterator<Item = (f64, f64)>, pad: f64) -> Option<Self> {
        let mut iter = points.into_iter().filter(|(x, y)| x.is_finite() && y.is_finite());
        let (x0, y0) = iter.next()?;
        let (mut x, mut y) = ((x0, x0), (y0, y0));
        for (px, py) in iter {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        Some(Bounds {
            x: widen(x, 0.0),
            y: widen(y, pad),
        })
    }
}

fn widen((lo, hi): (f64, f64), pad: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        let half = (lo.abs() * 0.05).max(0.5);
        (lo - half, hi + half)
    } else {
        (lo - span * pad, hi + span * pad)
    }
}

// ---------------------------------------------------------------------------
// Figure – one chart, drawn then saved
// ---------------------------------------------------------------------------

/// Axis ranges and titles for one chart.
pub struct Axes {
    pub bounds: Bounds,
    pub x_desc: String,
    pub y_desc: String,
    /// Draw the |Γ| = 1 circle and the real axis (Smith charts).
    pub unit_circle: bool,
}

/// One legend entry; `None` points split the line.
pub struct Trace {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<Option<(f64, f64)>>,
}

/// An RGB figure created per render call, drawn with plotters and consumed
/// by [`Figure::save`].
pub struct Figure {
    pixels: Vec<u8>,
    size: (u32, u32),
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![255; width as usize * height as usize * 3],
            size: (width, height),
        }
    }

    pub fn plot(&mut self, axes: &Axes, traces: &[Trace]) -> Result<(), PlotError> {
        let short = self.size.0.min(self.size.1);
        let font = (short / 40).max(8);
        let stroke = (short / 600).max(1);

        let root = BitMapBackend::with_buffer(&mut self.pixels, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let Bounds { x, y } = axes.bounds;
        let mut chart = ChartBuilder::on(&root)
            .margin(short / 40)
            .x_label_area_size(short / 8)
            .y_label_area_size(short / 8)
            .build_cartesian_2d(x.0..x.1, y.0..y.1)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .x_desc(axes.x_desc.as_str())
            .y_desc(axes.y_desc.as_str())
            .label_style(("sans-serif", font))
            .axis_desc_style(("sans-serif", font * 5 / 4))
            .draw()
            .map_err(draw_error)?;

        if axes.unit_circle {
            let centre = chart.backend_coord(&(0.0, 0.0));
            let edge = chart.backend_coord(&(1.0, 0.0));
            let radius = (edge.0 - centre.0).unsigned_abs();
            chart
                .draw_series(std::iter::once(Circle::new(
                    (0.0, 0.0),
                    radius,
                    UNIT_CIRCLE.stroke_width(stroke),
                )))
                .map_err(draw_error)?;
            chart
                .draw_series(LineSeries::new(
                    [(-1.0, 0.0), (1.0, 0.0)],
                    UNIT_CIRCLE.stroke_width(stroke),
                ))
                .map_err(draw_error)?;
        }

        for trace in traces {
            let color = trace.color;
            let style = color.stroke_width(stroke * 2);

            // Legend entry first, so a trace with no defined values still shows.
            chart
                .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), style))
                .map_err(draw_error)?
                .label(trace.label.as_str())
                .legend(move |(lx, ly)| {
                    PathElement::new(vec![(lx, ly), (lx + 20, ly)], color.stroke_width(stroke * 2))
                });

            for segment in trace.points.split(Option::is_none).filter(|s| !s.is_empty()) {
                chart
                    .draw_series(LineSeries::new(segment.iter().flatten().copied(), style))
                    .map_err(draw_error)?;
            }
        }

        if !traces.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .label_font(("sans-serif", font))
                .draw()
                .map_err(draw_error)?;
        }

        root.present().map_err(draw_error)?;
        Ok(())
    }

    /// Encode as PNG.
    pub fn save(self, path: &Path) -> Result<(), PlotError> {
        let (width, height) = self.size;
        let image = RgbImage::from_raw(width, height, self.pixels)
            .ok_or_else(|| PlotError::Draw("pixel buffer does not match figure size".into()))?;
        image.save(path).map_err(|source| PlotError::Save {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(test)]
    fn count(&self, color: RGBColor) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|px| **px == [color.0, color.1, color.2])
            .count()
    }
}

fn draw_error(e: impl fmt::Display) -> PlotError {
    PlotError::Draw(e.to_string())
}
