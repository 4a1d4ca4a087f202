use std::collections::BTreeMap;

use super::error::NormalizationError;
use super::model::{CanonicalRow, Dataset, PortPair, RawRecord, RawValue, SParam, MAX_PORTS};
use super::variant::Encoding;

/// Turn raw records into the canonical table.
///
/// dB/angle pairs are converted to real/imaginary first (angles in degrees
/// are converted to radians); real/imaginary pairs pass through. Modulus, dB
/// and VSWR are then derived for every pair. Frequencies are converted to MHz
/// from the unit the reader attached to each record.
pub fn normalize(
    records: &[RawRecord],
    encoding: Encoding,
    ports: usize,
    source: &str,
) -> Result<Dataset, NormalizationError> {
    if !(1..=MAX_PORTS).contains(&ports) {
        return Err(NormalizationError::UnsupportedPortCount(ports));
    }
    let pairs = PortPair::enumerate(ports);

    let rows = records
        .iter()
        .enumerate()
        .map(|(record, raw)| -> Result<CanonicalRow, NormalizationError> {
            let params = pairs
                .iter()
                .map(|&pair| -> Result<(PortPair, SParam), NormalizationError> {
                    let value = raw
                        .values
                        .get(&pair)
                        .ok_or(NormalizationError::MissingField { record, pair })?;
                    Ok((pair, to_sparam(*value, encoding, record, pair)?))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?;

            Ok(CanonicalRow {
                frequency_mhz: raw.frequency_mhz(),
                params,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let undefined_vswr = rows
        .iter()
        .flat_map(|r| r.params.values())
        .filter(|p| p.vswr.is_none())
        .count();
    if undefined_vswr > 0 {
        log::warn!("{source}: {undefined_vswr} values with |S| >= 1 have no VSWR");
    }

    Ok(Dataset::new(source, ports, rows))
}

fn to_sparam(
    value: RawValue,
    encoding: Encoding,
    record: usize,
    pair: PortPair,
) -> Result<SParam, NormalizationError> {
    match (encoding, value) {
        (Encoding::RealImag, RawValue::RealImag { re, im }) => Ok(SParam::from_re_im(re, im)),
        (Encoding::DbAngle, RawValue::DbAngle { db, angle, unit }) => {
            Ok(SParam::from_db_angle(db, unit.to_radians(angle)))
        }
        (expected, _) => Err(NormalizationError::EncodingMismatch {
            record,
            pair,
            expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reader::read;
    use crate::data::variant::{AngleUnit, FormatVariant, FrequencyUnit};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn real_imag_record(frequency: f64, values: &[(f64, f64)], ports: usize) -> RawRecord {
        RawRecord {
            frequency,
            unit: FrequencyUnit::Hz,
            values: PortPair::enumerate(ports)
                .into_iter()
                .zip(values.iter())
                .map(|(p, &(re, im))| (p, RawValue::RealImag { re, im }))
                .collect(),
        }
    }

    #[test]
    fn two_port_real_imag_scenario() {
        let text = "\
!
!
!
!
!freq[Hz] re:S11 im:S11 re:S12 im:S12 re:S21 im:S21 re:S22 im:S22
1000000 0.1 0.2 0.01 0.02 0.01 0.02 0.3 0.1
";
        let lines: Vec<&str> = text.lines().collect();
        let records = read(&lines, FormatVariant::RealImag, 2).unwrap();
        let ds = normalize(&records, Encoding::RealImag, 2, "scenario.s2p").unwrap();

        assert_eq!(ds.len(), 1);
        let row = &ds.rows()[0];
        assert_eq!(row.frequency_mhz, 1.0);

        let s11 = row.get(PortPair::new(1, 1)).unwrap();
        assert_eq!((s11.re, s11.im), (0.1, 0.2));
        assert_relative_eq!(s11.modulus, 0.2236, epsilon = 1e-4);
        assert_relative_eq!(s11.db.unwrap(), -13.01, epsilon = 1e-2);

        let s22 = row.get(PortPair::new(2, 2)).unwrap();
        assert_relative_eq!(s22.modulus, (0.1f64).hypot(0.3), max_relative = 1e-12);
    }

    #[test]
    fn revised_degrees_become_radians() {
        let mut values = BTreeMap::new();
        for pair in PortPair::enumerate(3) {
            values.insert(
                pair,
                RawValue::DbAngle {
                    db: -20.0,
                    angle: 0.0,
                    unit: AngleUnit::Degrees,
                },
            );
        }
        values.insert(
            PortPair::new(1, 1),
            RawValue::DbAngle {
                db: -10.0,
                angle: 90.0,
                unit: AngleUnit::Degrees,
            },
        );
        let record = RawRecord {
            frequency: 2.0,
            unit: FrequencyUnit::GHz,
            values,
        };

        let ds = normalize(&[record], Encoding::DbAngle, 3, "three.s3p").unwrap();
        let row = &ds.rows()[0];
        assert_eq!(row.frequency_mhz, 2000.0);

        let s11 = row.get(PortPair::new(1, 1)).unwrap();
        assert_abs_diff_eq!(s11.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(s11.im, 0.3162, epsilon = 1e-4);

        let s21 = row.get(PortPair::new(2, 1)).unwrap();
        assert_relative_eq!(s21.re, 0.1, max_relative = 1e-12);
        assert_abs_diff_eq!(s21.im, 0.0);
    }

    #[test]
    fn legacy_radians_are_used_as_is() {
        let record = RawRecord {
            frequency: 1.0,
            unit: FrequencyUnit::GHz,
            values: [(
                PortPair::new(1, 1),
                RawValue::DbAngle {
                    db: -10.0,
                    angle: std::f64::consts::FRAC_PI_2,
                    unit: AngleUnit::Radians,
                },
            )]
            .into_iter()
            .collect(),
        };
        let ds = normalize(&[record], Encoding::DbAngle, 1, "one.s1p").unwrap();
        let s11 = ds.rows()[0].get(PortPair::new(1, 1)).unwrap();
        assert_abs_diff_eq!(s11.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(s11.im, 0.3162, epsilon = 1e-4);
    }

    #[test]
    fn derived_db_matches_source_db() {
        let sources = [-0.5, -3.0, -12.25, -40.0, 1.5];
        let records: Vec<RawRecord> = sources
            .iter()
            .enumerate()
            .map(|(i, &db)| RawRecord {
                frequency: i as f64,
                unit: FrequencyUnit::MHz,
                values: [(
                    PortPair::new(1, 1),
                    RawValue::DbAngle {
                        db,
                        angle: 37.0 * i as f64,
                        unit: AngleUnit::Degrees,
                    },
                )]
                .into_iter()
                .collect(),
            })
            .collect();

        let ds = normalize(&records, Encoding::DbAngle, 1, "sweep.s1p").unwrap();
        for (row, &db) in ds.rows().iter().zip(sources.iter()) {
            let s = row.get(PortPair::new(1, 1)).unwrap();
            assert_relative_eq!(s.modulus, s.re.hypot(s.im));
            assert_relative_eq!(s.db.unwrap(), db, max_relative = 1e-9);
        }
    }

    #[test]
    fn rows_keep_source_order() {
        let records: Vec<RawRecord> = [3e6, 1e6, 2e6]
            .iter()
            .map(|&f| real_imag_record(f, &[(0.5, 0.0)], 1))
            .collect();
        let ds = normalize(&records, Encoding::RealImag, 1, "order.s1p").unwrap();
        let freqs: Vec<f64> = ds.rows().iter().map(|r| r.frequency_mhz).collect();
        assert_eq!(freqs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_pair_is_a_normalization_error() {
        let record = real_imag_record(1e6, &[(0.1, 0.1), (0.2, 0.2), (0.3, 0.3)], 2);
        let err = normalize(&[record], Encoding::RealImag, 2, "short.s2p").unwrap_err();
        assert_eq!(
            err,
            NormalizationError::MissingField {
                record: 0,
                pair: PortPair::new(2, 2)
            }
        );
    }

    #[test]
    fn wrong_encoding_is_a_normalization_error() {
        let record = real_imag_record(1e6, &[(0.1, 0.1)], 1);
        let err = normalize(&[record], Encoding::DbAngle, 1, "mixed.s1p").unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::EncodingMismatch {
                expected: Encoding::DbAngle,
                ..
            }
        ));
    }

    #[test]
    fn port_counts_beyond_nine_are_rejected() {
        let err = normalize(&[], Encoding::RealImag, 12, "big.s12p").unwrap_err();
        assert_eq!(err, NormalizationError::UnsupportedPortCount(12));
        let err = normalize(&[], Encoding::RealImag, 0, "none.s0p").unwrap_err();
        assert_eq!(err, NormalizationError::UnsupportedPortCount(0));
    }

    #[test]
    fn edge_moduli_are_flagged_not_coerced() {
        let mut record = real_imag_record(1e6, &[(0.0, 0.0), (1.0, 0.0)], 2);
        record.values.insert(PortPair::new(2, 1), RawValue::RealImag { re: 0.5, im: 0.0 });
        record.values.insert(PortPair::new(2, 2), RawValue::RealImag { re: 0.0, im: 0.5 });

        let ds = normalize(&[record], Encoding::RealImag, 2, "edges.s2p").unwrap();
        let row = &ds.rows()[0];

        let matched = row.get(PortPair::new(1, 1)).unwrap();
        assert_eq!(matched.vswr, Some(1.0));
        assert_eq!(matched.db, None);

        let total = row.get(PortPair::new(1, 2)).unwrap();
        assert_eq!(total.vswr, None);
        assert_eq!(total.db, Some(0.0));

        assert_relative_eq!(row.get(PortPair::new(2, 2)).unwrap().vswr.unwrap(), 3.0);
    }
}
