use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::FrequencyRange;
use crate::data::model::PortPair;
use crate::data::variant::FormatVariant;
use crate::plot::{Metric, PlotRequest};

/// A file plus the plots to render from it, read from JSON:
///
/// ```json
/// {
///   "file": "BSL1.s2p",
///   "plots": [
///     { "metric": "smith", "pairs": ["S11"] },
///     { "metric": "db", "pairs": ["S11", "S12", "S22"], "range_mhz": [800, 1000] }
///   ]
/// }
/// ```
///
/// Without `variant`/`ports` the `.sNp` filename convention applies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlotJob {
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<FormatVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub plots: Vec<PlotSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlotSpec {
    pub metric: Metric,
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_mhz: Option<[f64; 2]>,
}

fn default_pairs() -> Vec<String> {
    vec!["S11".to_string()]
}

impl PlotJob {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading plot job {}", path_ref.display()))?;
        let mut job: PlotJob = serde_json::from_str(&contents)
            .with_context(|| format!("parsing plot job {}", path_ref.display()))?;

        // Relative paths are relative to the job file.
        if let Some(base) = path_ref.parent() {
            if job.file.is_relative() {
                job.file = base.join(&job.file);
            }
            if let Some(dir) = job.output_dir.as_mut().filter(|d| d.is_relative()) {
                *dir = base.join(&*dir);
            }
        }
        Ok(job)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn requests(&self) -> Result<Vec<PlotRequest>> {
        self.plots
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.to_request().with_context(|| format!("plot #{}", i + 1)))
            .collect()
    }
}

impl PlotSpec {
    pub fn to_request(&self) -> Result<PlotRequest> {
        let pairs = self
            .pairs
            .iter()
            .map(|p| p.parse::<PortPair>())
            .collect::<Result<Vec<_>, _>>()?;
        let range = self
            .range_mhz
            .map(|[lo, hi]| FrequencyRange::new(lo, hi))
            .unwrap_or_default();
        Ok(PlotRequest {
            metric: self.metric,
            pairs,
            range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn job_load_reads_json() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"{
                "file": "BSL1.s2p",
                "plots": [
                    { "metric": "smith" },
                    { "metric": "DB", "pairs": ["S11", "S22"], "range_mhz": [800, 1000] }
                ]
            }"#,
        )
        .unwrap();
        let path = temp.into_temp_path();
        let job = PlotJob::load(&path).unwrap();

        assert_eq!(job.file, path.parent().unwrap().join("BSL1.s2p"));
        assert_eq!(job.variant, None);
        assert_eq!(job.output_dir(), PathBuf::from("."));

        let requests = job.requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].metric, Metric::Smith);
        assert_eq!(requests[0].pairs, vec![PortPair::new(1, 1)]);
        assert_eq!(requests[0].range, FrequencyRange::default());
        assert_eq!(requests[1].pairs, vec![PortPair::new(1, 1), PortPair::new(2, 2)]);
        assert_eq!(requests[1].range, FrequencyRange::new(800.0, 1000.0));
    }

    #[test]
    fn job_with_explicit_variant() {
        let job: PlotJob = serde_json::from_str(
            r#"{ "file": "/data/coupler.txt", "variant": "db-angle-revised", "ports": 3,
                 "output_dir": "/tmp/plots", "plots": [] }"#,
        )
        .unwrap();
        assert_eq!(job.variant, Some(FormatVariant::DbAngleRevised));
        assert_eq!(job.ports, Some(3));
        assert_eq!(job.output_dir(), PathBuf::from("/tmp/plots"));
    }

    #[test]
    fn bad_pair_names_the_plot() {
        let job: PlotJob = serde_json::from_str(
            r#"{ "file": "a.s2p", "plots": [ { "metric": "db", "pairs": ["X11"] } ] }"#,
        )
        .unwrap();
        let err = job.requests().unwrap_err();
        assert!(format!("{err:#}").contains("plot #1"));
    }

    #[test]
    fn unknown_metric_fails_to_parse() {
        let result: Result<PlotJob, _> =
            serde_json::from_str(r#"{ "file": "a.s2p", "plots": [ { "metric": "phase" } ] }"#);
        assert!(result.is_err());
    }
}
