//! Writes one sample file per supported layout into a directory
//! (default `samples/`), for trying out the CLI and the viewer:
//!
//! ```text
//! cargo run --bin generate_sample -- samples
//! cargo run -- plot samples/bandpass.s2p --metric smith
//! ```

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusty_smith::data::variant::FormatVariant;

type Complex = (f64, f64);

/// File name, layout and port count of each generated sample.
const SAMPLES: [(&str, FormatVariant, usize); 4] = [
    ("bandpass.s2p", FormatVariant::RealImag, 2),
    ("divider.s4p", FormatVariant::RealImagNPort, 4),
    ("coupler_legacy.s3p", FormatVariant::DbAngleLegacy, 3),
    ("coupler_revised.s3p", FormatVariant::DbAngleRevised, 3),
];

const CENTER_MHZ: f64 = 900.0;
const NOISE: f64 = 2e-3;

/// Passive measurements never reach |S| = 1; noise is clipped below it.
const MAX_MODULUS: f64 = 0.999;

// ---------------------------------------------------------------------------
// Measurement noise
// ---------------------------------------------------------------------------

/// Seeded complex Gaussian noise (SplitMix64 + Box-Muller), so every run
/// writes identical files.
struct Noise {
    state: u64,
    sigma: f64,
}

impl Noise {
    fn new(seed: u64, sigma: f64) -> Self {
        Noise { state: seed, sigma }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in (0, 1].
    fn uniform(&mut self) -> f64 {
        ((self.next_u64() >> 11) + 1) as f64 / (1u64 << 53) as f64
    }

    /// Both Box-Muller outputs, one per component.
    fn sample(&mut self) -> Complex {
        let r = self.sigma * (-2.0 * self.uniform().ln()).sqrt();
        let (s, c) = (2.0 * PI * self.uniform()).sin_cos();
        (r * c, r * s)
    }
}

// ---------------------------------------------------------------------------
// Network model: one resonator per port, coupled through a short line
// ---------------------------------------------------------------------------

/// `Sij` at `f_mhz` of a `ports`-port resonator network, plus noise.
fn s_param(f_mhz: f64, i: usize, j: usize, ports: usize, noise: &mut Noise) -> Complex {
    let q = 12.0 + 3.0 * i as f64;
    let x = q * (f_mhz / CENTER_MHZ - CENTER_MHZ / f_mhz);
    let d = 1.0 + x * x;

    let (re, im) = if i == j {
        (x * x / d, x / d)
    } else {
        let share = 1.0 / ((ports - 1).max(1) as f64).sqrt();
        (share / d, -share * x / d)
    };

    // A few centimetres of line between the reference planes.
    let (s, c) = (-2.0 * PI * f_mhz * 1e-4 * (i + j) as f64).sin_cos();
    let (dn_re, dn_im) = noise.sample();
    let re_n = re * c - im * s + dn_re;
    let im_n = re * s + im * c + dn_im;

    let modulus = re_n.hypot(im_n);
    if modulus > MAX_MODULUS {
        let k = MAX_MODULUS / modulus;
        (re_n * k, im_n * k)
    } else {
        (re_n, im_n)
    }
}

fn to_db_angle((re, im): Complex) -> (f64, f64) {
    (20.0 * re.hypot(im).log10(), im.atan2(re))
}

fn sweep(start_mhz: f64, stop_mhz: f64, points: usize) -> Vec<f64> {
    let step = (stop_mhz - start_mhz) / (points - 1) as f64;
    (0..points).map(|k| start_mhz + step * k as f64).collect()
}

fn pairs(ports: usize) -> impl Iterator<Item = (usize, usize)> {
    (1..=ports).flat_map(move |i| (1..=ports).map(move |j| (i, j)))
}

// ---------------------------------------------------------------------------
// Writers, one per layout
// ---------------------------------------------------------------------------

/// One line per record, `re:`/`im:` columns, header on line 5. The
/// `RealImag` sample states MHz in its column name, the n-port one uses Hz.
fn real_imag(ports: usize, freqs: &[f64], noise: &mut Noise, in_hz: bool) -> String {
    let (unit, scale) = if in_hz { ("Hz", 1e6) } else { ("MHz", 1.0) };
    let mut out = format!(
        "! Sample {ports}-port network\n! generated by generate_sample\n# {unit} S RI R 50\n!\n"
    );
    let _ = write!(out, "!freq[{unit}]");
    for (i, j) in pairs(ports) {
        let _ = write!(out, " re:S{i}{j} im:S{i}{j}");
    }
    out.push('\n');

    for &f in freqs {
        let _ = write!(out, "{}", (f * scale).round());
        for (i, j) in pairs(ports) {
            let (re, im) = s_param(f, i, j, ports, noise);
            let _ = write!(out, " {re:.6} {im:.6}");
        }
        out.push('\n');
    }
    out
}

/// One header line and one data line per receive port. Legacy files use GHz,
/// radians and `DB Sij` names; revised ones Hz, degrees, `db:Sij` and a
/// blank line before the data.
fn db_angle(ports: usize, freqs: &[f64], noise: &mut Noise, legacy: bool) -> String {
    let mut out = String::from("! Sample coupler\n! generated by generate_sample\n");
    let (first, db, ang) = if legacy {
        out.push_str("# GHz S DB R 50\n!\n! columns follow\n");
        ("!Freq", "DB ", "Ang ")
    } else {
        out.push_str("# Hz S DB R 50\n! columns follow\n");
        ("!freq[Hz]", "db:", "ang:")
    };

    for i in 1..=ports {
        let mut line = String::from(if i == 1 { first } else { "!" });
        let names: Vec<String> = (1..=ports)
            .map(|j| format!("{db}S{i}{j} {ang}S{i}{j}"))
            .collect();
        if i == 1 {
            line.push(' ');
        }
        line.push_str(&names.join(" "));
        out.push_str(&line);
        out.push('\n');
    }
    if !legacy {
        out.push('\n');
    }

    for &f in freqs {
        let mut lines = Vec::with_capacity(ports);
        for i in 1..=ports {
            let values: Vec<String> = (1..=ports)
                .map(|j| {
                    let (mag, angle) = to_db_angle(s_param(f, i, j, ports, noise));
                    let angle = if legacy { angle } else { angle.to_degrees() };
                    format!("{mag:.4} {angle:.6}")
                })
                .collect();
            lines.push(values.join(" "));
        }
        let freq = if legacy {
            format!("{}", f / 1e3)
        } else {
            format!("{}", (f * 1e6).round())
        };
        let _ = writeln!(out, "{freq} {}", lines.join("\n"));
    }
    out
}

fn sample_text(variant: FormatVariant, ports: usize, freqs: &[f64], noise: &mut Noise) -> String {
    match variant {
        FormatVariant::RealImag => real_imag(ports, freqs, noise, false),
        FormatVariant::RealImagNPort => real_imag(ports, freqs, noise, true),
        FormatVariant::DbAngleLegacy => db_angle(ports, freqs, noise, true),
        FormatVariant::DbAngleRevised => db_angle(ports, freqs, noise, false),
    }
}

fn write_samples(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut noise = Noise::new(42, NOISE);
    let freqs = sweep(500.0, 1300.0, 201);

    SAMPLES
        .iter()
        .map(|&(name, variant, ports)| {
            let path = dir.join(name);
            fs::write(&path, sample_text(variant, ports, &freqs, &mut noise))
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

fn main() -> Result<()> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "samples".to_string());
    for path in write_samples(Path::new(&dir))? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rusty_smith::data::load_file;

    #[test]
    fn every_sample_loads_with_its_variant() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_samples(dir.path()).unwrap();
        assert_eq!(paths.len(), SAMPLES.len());

        for (path, &(name, variant, ports)) in paths.iter().zip(SAMPLES.iter()) {
            let ds = load_file(path, variant, ports).unwrap();
            assert_eq!(ds.source(), name);
            assert_eq!(ds.ports(), ports);
            assert_eq!(ds.len(), 201);

            let (lo, hi) = ds.frequency_span().unwrap();
            assert_relative_eq!(lo, 500.0, max_relative = 1e-9);
            assert_relative_eq!(hi, 1300.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn sample_moduli_stay_below_one() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_samples(dir.path()).unwrap();

        for (path, &(_, variant, ports)) in paths.iter().zip(SAMPLES.iter()) {
            let ds = load_file(path, variant, ports).unwrap();
            for row in ds.rows() {
                for (pair, param) in &row.params {
                    assert!(param.modulus < 1.0, "{pair} = {}", param.modulus);
                    assert!(param.vswr.is_some());
                }
            }
        }
    }

    #[test]
    fn noise_is_reproducible() {
        let mut a = Noise::new(7, 1.0);
        let mut b = Noise::new(7, 1.0);
        for _ in 0..100 {
            assert_eq!(a.sample(), b.sample());
        }
        assert!(a.uniform() > 0.0);
    }
}
