use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::variant::{AngleUnit, FrequencyUnit};

/// Largest port count whose pair labels stay single-digit (`S99`).
pub const MAX_PORTS: usize = 9;

// ---------------------------------------------------------------------------
// PortPair – `S{i}{j}`
// ---------------------------------------------------------------------------

/// Response measured at port `receive` for a stimulus at port `source`.
///
/// Ordering is `(receive, source)`, so a `BTreeMap<PortPair, _>` iterates
/// `S11, S12, …, S1n, S21, …, Snn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortPair {
    pub receive: u8,
    pub source: u8,
}

impl PortPair {
    pub const fn new(receive: u8, source: u8) -> Self {
        Self { receive, source }
    }

    /// Every pair of an `n`-port network, receive port outermost.
    pub fn enumerate(ports: usize) -> Vec<PortPair> {
        let n = ports.min(MAX_PORTS) as u8;
        (1..=n)
            .flat_map(|i| (1..=n).map(move |j| PortPair::new(i, j)))
            .collect()
    }

    /// Whether both ports exist on an `n`-port network.
    pub fn fits(self, ports: usize) -> bool {
        let n = ports as u8;
        (1..=n).contains(&self.receive) && (1..=n).contains(&self.source)
    }

    /// Reflection parameters (`Sii`) are the ones VSWR is meaningful for.
    pub fn is_reflection(self) -> bool {
        self.receive == self.source
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}{}", self.receive, self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePortPairError(pub String);

impl fmt::Display for ParsePortPairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a port pair (expected e.g. S21)", self.0)
    }
}

impl std::error::Error for ParsePortPairError {}

impl FromStr for PortPair {
    type Err = ParsePortPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePortPairError(s.to_string());
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('S')
            .or_else(|| trimmed.strip_prefix('s'))
            .ok_or_else(err)?;

        let mut chars = digits.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(i), Some(j), None) => {
                let i = i.to_digit(10).filter(|d| *d > 0).ok_or_else(err)?;
                let j = j.to_digit(10).filter(|d| *d > 0).ok_or_else(err)?;
                Ok(PortPair::new(i as u8, j as u8))
            }
            _ => Err(err()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one frequency point as read from disk
// ---------------------------------------------------------------------------

/// One pair's value in its native on-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    RealImag { re: f64, im: f64 },
    DbAngle { db: f64, angle: f64, unit: AngleUnit },
}

/// A frequency point before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// In `unit`, exactly as read.
    pub frequency: f64,
    pub unit: FrequencyUnit,
    pub values: BTreeMap<PortPair, RawValue>,
}

impl RawRecord {
    pub fn frequency_mhz(&self) -> f64 {
        self.unit.to_mhz(self.frequency)
    }
}

// ---------------------------------------------------------------------------
// SParam – derived metrics for one pair at one frequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SParam {
    pub re: f64,
    pub im: f64,
    /// `|S|`, never negative.
    pub modulus: f64,
    /// `20·log10(|S|)`; `None` when the modulus is zero.
    pub db: Option<f64>,
    /// `(1 + |S|) / (1 − |S|)`; `None` when the modulus is 1 or more.
    pub vswr: Option<f64>,
}

impl SParam {
    pub fn from_re_im(re: f64, im: f64) -> Self {
        let modulus = re.hypot(im);
        let db = (modulus > 0.0).then(|| 20.0 * modulus.log10());
        let vswr = (modulus < 1.0).then(|| (1.0 + modulus) / (1.0 - modulus));
        Self {
            re,
            im,
            modulus,
            db,
            vswr,
        }
    }

    /// From a dB magnitude and an angle in radians.
    pub fn from_db_angle(db: f64, angle_rad: f64) -> Self {
        let magnitude = 10f64.powf(db / 20.0);
        Self::from_re_im(magnitude * angle_rad.cos(), magnitude * angle_rad.sin())
    }
}

// ---------------------------------------------------------------------------
// CanonicalRow / Dataset
// ---------------------------------------------------------------------------

/// One normalized frequency point.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub frequency_mhz: f64,
    pub params: BTreeMap<PortPair, SParam>,
}

impl CanonicalRow {
    pub fn get(&self, pair: PortPair) -> Option<&SParam> {
        self.params.get(&pair)
    }
}

/// The normalized contents of one file. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: String,
    ports: usize,
    rows: Vec<CanonicalRow>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, ports: usize, rows: Vec<CanonicalRow>) -> Self {
        Self {
            source: source.into(),
            ports,
            rows,
        }
    }

    /// Base filename the rows were read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ports(&self) -> usize {
        self.ports
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn pairs(&self) -> Vec<PortPair> {
        PortPair::enumerate(self.ports)
    }

    /// `(min, max)` frequency in MHz, `None` when empty.
    pub fn frequency_span(&self) -> Option<(f64, f64)> {
        self.rows.iter().map(|r| r.frequency_mhz).fold(None, |acc, f| {
            Some(match acc {
                None => (f, f),
                Some((lo, hi)) => (lo.min(f), hi.max(f)),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
