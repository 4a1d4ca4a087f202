/// Data layer: file variants, reading, normalization, filtering.
///
/// Architecture:
/// ```text
///  .s2p / .s3p / .sNp   (+ variant, port count)
///        │
///        ▼
///   ┌──────────┐
///   │  reader   │  locate header, group n-line records → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  dB/angle → re/im, derive |S|, dB, VSWR → Dataset
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  copy rows inside a MHz window
///   └──────────┘
/// ```
///
/// `loader` ties the first two to a path; `filename` supplies the port count
/// for the `.sNp` convention.

pub mod error;
pub mod export;
pub mod filename;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod reader;
pub mod variant;

pub use error::{FilenameError, FormatError, LoadError, NormalizationError};
pub use filter::{filter_by_frequency, FrequencyRange};
pub use loader::{load, load_file, load_snp};
pub use model::{CanonicalRow, Dataset, PortPair, RawRecord, RawValue, SParam};
pub use variant::{Encoding, FormatVariant};
