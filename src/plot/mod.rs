//! PNG rendering of a [`Dataset`]: Smith chart or frequency sweeps.

pub mod figure;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::trace_color;
use crate::data::filter::{filter_range, FrequencyRange};
use crate::data::model::{CanonicalRow, Dataset, PortPair, SParam};

use figure::{Axes, Bounds, Figure, Trace};

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("{pair} does not exist on a {ports}-port network")]
    UnknownPair { pair: PortPair, ports: usize },

    #[error("no port pairs selected")]
    NoPairs,

    #[error("unknown metric '{0}' (expected smith, db, modulus or vswr)")]
    UnknownMetric(String),

    #[error("drawing figure: {0}")]
    Draw(String),

    #[error("saving {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    /// Reflection coefficient on the unit disk.
    Smith,
    Db,
    Modulus,
    Vswr,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Smith, Metric::Db, Metric::Modulus, Metric::Vswr];

    /// Value plotted against frequency. `None` for Smith, which plots re/im.
    pub fn value(self, param: &SParam) -> Option<f64> {
        match self {
            Metric::Smith => None,
            Metric::Db => param.db,
            Metric::Modulus => Some(param.modulus),
            Metric::Vswr => param.vswr,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Smith => "SMITH",
            Metric::Db => "DB",
            Metric::Modulus => "MODULUS",
            Metric::Vswr => "VSWR",
        }
    }

    /// Pixel size: 8×8 in at 300 dpi for Smith charts, 12×5 in otherwise.
    pub fn figure_size(self) -> (u32, u32) {
        match self {
            Metric::Smith => (2400, 2400),
            _ => (3600, 1500),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlotError::UnknownMetric(s.to_string()))
    }
}

impl TryFrom<String> for Metric {
    type Error = PlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.name().to_ascii_lowercase()
    }
}

// ---------------------------------------------------------------------------
// PlotRequest
// ---------------------------------------------------------------------------

/// What to draw: one metric, some pairs, a frequency window.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub metric: Metric,
    pub pairs: Vec<PortPair>,
    pub range: FrequencyRange,
}

impl Default for PlotRequest {
    fn default() -> Self {
        Self {
            metric: Metric::Db,
            pairs: vec![PortPair::new(1, 1)],
            range: FrequencyRange::default(),
        }
    }
}

impl PlotRequest {
    pub fn validate(&self, dataset: &Dataset) -> Result<(), PlotError> {
        if self.pairs.is_empty() {
            return Err(PlotError::NoPairs);
        }
        if let Some(&pair) = self.pairs.iter().find(|p| !p.fits(dataset.ports())) {
            return Err(PlotError::UnknownPair {
                pair,
                ports: dataset.ports(),
            });
        }
        Ok(())
    }

    /// `{filename}_{METRIC}_{S11-S22}_{min}-{max}MHz.png`
    pub fn file_name(&self, source: &str) -> String {
        let pairs: Vec<String> = self.pairs.iter().map(|p| p.to_string()).collect();
        format!(
            "{source}_{}_{}_{}.png",
            self.metric,
            pairs.join("-"),
            self.range
        )
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Points for one trace over `rows`; `None` where the metric is undefined.
pub fn trace_points(rows: &[CanonicalRow], pair: PortPair, metric: Metric) -> Vec<Option<(f64, f64)>> {
    rows.iter()
        .map(|row| {
            let param = row.get(pair)?;
            match metric {
                Metric::Smith => Some((param.re, param.im)),
                _ => metric.value(param).map(|v| (row.frequency_mhz, v)),
            }
        })
        .collect()
}

/// Render into `out_dir` at the metric's default figure size.
pub fn render(dataset: &Dataset, request: &PlotRequest, out_dir: &Path) -> Result<PathBuf, PlotError> {
    render_sized(dataset, request, out_dir, request.metric.figure_size())
}

pub fn render_sized(
    dataset: &Dataset,
    request: &PlotRequest,
    out_dir: &Path,
    (width, height): (u32, u32),
) -> Result<PathBuf, PlotError> {
    request.validate(dataset)?;

    if request.metric == Metric::Vswr {
        for pair in request.pairs.iter().filter(|p| !p.is_reflection()) {
            log::warn!("VSWR of transmission parameter {pair} is rarely meaningful");
        }
    }

    // Work on a copy; the dataset is never touched.
    let rows = filter_range(dataset, request.range);
    let traces: Vec<(PortPair, Vec<Option<(f64, f64)>>)> = request
        .pairs
        .iter()
        .map(|&pair| (pair, trace_points(&rows, pair, request.metric)))
        .collect();

    for (pair, points) in &traces {
        let undefined = points.iter().filter(|p| p.is_none()).count();
        if undefined > 0 {
            log::warn!("{pair}: {undefined} undefined {} values skipped", request.metric);
        }
    }

    let axes = chart_axes(request, &traces);

    let n = traces.len();
    let traces: Vec<Trace> = traces
        .into_iter()
        .enumerate()
        .map(|(i, (pair, points))| {
            let [r, g, b] = trace_color(i, n);
            Trace {
                label: pair.to_string(),
                color: RGBColor(r, g, b),
                points,
            }
        })
        .collect();

    let mut figure = Figure::new(width, height);
    figure.plot(&axes, &traces)?;

    let path = out_dir.join(request.file_name(dataset.source()));
    figure.save(&path)?;
    log::info!(
        "Wrote {} ({} rows, {} traces)",
        path.display(),
        rows.len(),
        traces.len()
    );
    Ok(path)
}

/// Axis ranges and titles: the fixed unit square for Smith charts, otherwise
/// the extent of the defined values (or the requested window when there are
/// none).
fn chart_axes(request: &PlotRequest, traces: &[(PortPair, Vec<Option<(f64, f64)>>)]) -> Axes {
    match request.metric {
        Metric::Smith => Axes {
            bounds: Bounds::UNIT_SQUARE,
            x_desc: "re".into(),
            y_desc: "im".into(),
            unit_circle: true,
        },
        metric => {
            let finite = traces.iter().flat_map(|(_, pts)| pts.iter().flatten().copied());
            let (lo, hi) = (request.range.min_mhz, request.range.max_mhz);
            Axes {
                bounds: Bounds::around(finite, 0.05)
                    .or_else(|| Bounds::around([(lo, 0.0), (hi, 1.0)], 0.0))
                    .unwrap_or(Bounds::UNIT_SQUARE),
                x_desc: "freq[MHz]".into(),
                y_desc: metric.name().into(),
                unit_circle: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn dataset() -> Dataset {
        let rows = [(800.0, 0.1), (900.0, 0.0), (1000.0, 1.0)]
            .iter()
            .map(|&(f, m)| CanonicalRow {
                frequency_mhz: f,
                params: PortPair::enumerate(2)
                    .into_iter()
                    .map(|p| (p, SParam::from_re_im(m, 0.0)))
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect();
        Dataset::new("BSL1.s2p", 2, rows)
    }

    #[test]
    fn metric_parses_case_insensitively() {
        assert_eq!("smith".parse::<Metric>().unwrap(), Metric::Smith);
        assert_eq!("Db".parse::<Metric>().unwrap(), Metric::Db);
        assert_eq!("VSWR".parse::<Metric>().unwrap(), Metric::Vswr);
        assert!(matches!(
            "phase".parse::<Metric>(),
            Err(PlotError::UnknownMetric(_))
        ));
    }

    #[test]
    fn metric_round_trips_through_serde() {
        let m: Metric = serde_json::from_str("\"MODULUS\"").unwrap();
        assert_eq!(m, Metric::Modulus);
        assert_eq!(serde_json::to_string(&Metric::Smith).unwrap(), "\"smith\"");
    }

    #[test]
    fn file_name_encodes_request() {
        let request = PlotRequest {
            metric: Metric::Db,
            pairs: vec![PortPair::new(1, 1), PortPair::new(2, 2)],
            range: FrequencyRange::new(800.0, 1000.0),
        };
        assert_eq!(request.file_name("BSL1.s2p"), "BSL1.s2p_DB_S11-S22_800-1000MHz.png");
    }

    #[test]
    fn unknown_pairs_are_rejected() {
        let request = PlotRequest {
            pairs: vec![PortPair::new(3, 1)],
            ..PlotRequest::default()
        };
        assert!(matches!(
            request.validate(&dataset()),
            Err(PlotError::UnknownPair { ports: 2, .. })
        ));

        let empty = PlotRequest {
            pairs: vec![],
            ..PlotRequest::default()
        };
        assert!(matches!(empty.validate(&dataset()), Err(PlotError::NoPairs)));
    }

    #[test]
    fn undefined_values_become_gaps() {
        let ds = dataset();
        let db = trace_points(ds.rows(), PortPair::new(1, 1), Metric::Db);
        assert!(db[0].is_some());
        assert_eq!(db[1], None);
        assert_eq!(db[2], Some((1000.0, 0.0)));

        let vswr = trace_points(ds.rows(), PortPair::new(1, 1), Metric::Vswr);
        assert_eq!(vswr[1], Some((900.0, 1.0)));
        assert_eq!(vswr[2], None);
    }

    #[test]
    fn smith_traces_plot_re_im() {
        let ds = dataset();
        let points = trace_points(ds.rows(), PortPair::new(2, 1), Metric::Smith);
        assert_eq!(points, vec![Some((0.1, 0.0)), Some((0.0, 0.0)), Some((1.0, 0.0))]);
    }

    #[test]
    fn smith_axes_are_the_fixed_unit_square() {
        let request = PlotRequest {
            metric: Metric::Smith,
            ..PlotRequest::default()
        };
        let traces = vec![(PortPair::new(1, 1), vec![Some((3.0, -2.0))])];
        let axes = chart_axes(&request, &traces);
        assert_eq!(axes.bounds, Bounds::UNIT_SQUARE);
        assert_eq!((axes.x_desc.as_str(), axes.y_desc.as_str()), ("re", "im"));
        assert!(axes.unit_circle);
    }

    #[test]
    fn sweep_axes_follow_defined_values() {
        let request = PlotRequest {
            metric: Metric::Vswr,
            ..PlotRequest::default()
        };
        let traces = vec![(
            PortPair::new(1, 1),
            vec![Some((800.0, 1.0)), None, Some((1000.0, 3.0))],
        )];
        let axes = chart_axes(&request, &traces);
        assert_eq!(axes.bounds.x, (800.0, 1000.0));
        assert_relative_eq!(axes.bounds.y.0, 0.9);
        assert_relative_eq!(axes.bounds.y.1, 3.1);
        assert_eq!((axes.x_desc.as_str(), axes.y_desc.as_str()), ("freq[MHz]", "VSWR"));
        assert!(!axes.unit_circle);
    }

    #[test]
    fn empty_sweep_falls_back_to_requested_window() {
        let request = PlotRequest {
            range: FrequencyRange::new(5000.0, 6000.0),
            ..PlotRequest::default()
        };
        let axes = chart_axes(&request, &[(PortPair::new(1, 1), vec![])]);
        assert_eq!(axes.bounds.x, (5000.0, 6000.0));
        assert_eq!(axes.bounds.y, (0.0, 1.0));
    }

    #[test]
    fn renders_png_named_after_request() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset();
        for metric in Metric::ALL {
            let request = PlotRequest {
                metric,
                pairs: vec![PortPair::new(1, 1), PortPair::new(2, 1)],
                range: FrequencyRange::new(850.0, 100_000.0),
            };
            let path = render_sized(&ds, &request, dir.path(), (480, 320)).unwrap();
            assert_eq!(path, dir.path().join(request.file_name("BSL1.s2p")));
            assert!(path.exists());
        }
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn empty_window_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let request = PlotRequest {
            range: FrequencyRange::new(5000.0, 6000.0),
            ..PlotRequest::default()
        };
        let path = render_sized(&dataset(), &request, dir.path(), (360, 150)).unwrap();
        assert!(path.exists());
    }
}
