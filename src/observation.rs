//! Observation record encoding
use crate::{
    dataset::{Dataset, EpochRow},
    epoch,
    error::FormattingError,
    resolver::SystemObservables,
    systems, value,
};

use gnss::prelude::{Constellation, SV};

use std::collections::HashSet;
use std::io::{BufWriter, Write};

use log::debug;

/// Blanked observation field: missing values never render as zero
const BLANKING: &str = "              ";

/// Formats the complete observation record for this [Dataset] into the
/// [Write]able interface, one epoch descriptor followed by one line per
/// surviving satellite, in standard constellation order.
///
/// Only output interface errors propagate: per satellite data anomalies
/// (missing field, out of range index, non numeric value) degrade to
/// [BLANKING] fields instead.
pub fn format<W: Write>(
    dataset: &Dataset,
    observables: &SystemObservables,
    w: &mut BufWriter<W>,
) -> Result<(), FormattingError> {
    for (ts, row) in dataset.epochs.iter() {
        let mut kept = Vec::with_capacity(systems::EMISSION_ORDER.len());
        let mut total = 0;

        for constellation in systems::EMISSION_ORDER {
            let prns = indicator_prns(row, constellation);
            let indexes = kept_indexes(row, &prns);
            total += indexes.len();
            kept.push((constellation, prns, indexes));
        }

        debug!("{}: {} vehicles", ts, total);
        writeln!(w, "{}", epoch_descriptor(ts, total))?;

        for (constellation, prns, indexes) in kept {
            let codes = observables.get(constellation).unwrap_or(&[]);
            for j in indexes {
                let sv = SV::new(constellation, prns[j] as u8);
                write!(w, "{:x}", sv)?;
                for code in codes {
                    let key = code.field_key(systems::data_letter(constellation));
                    let observation = row
                        .get(&key)
                        .and_then(value::as_slice)
                        .and_then(|column| column.get(j))
                        .and_then(value::as_f64);
                    match observation {
                        Some(observed) => {
                            write!(w, "{:>14.prec$}", observed, prec = code.measurement.precision())?;
                        },
                        None => {
                            write!(w, "{}", BLANKING)?;
                        },
                    }
                }
                writeln!(w)?;
            }
        }
    }
    Ok(())
}

/*
 * Epoch descriptor: calendar fields, epoch flag, then the total number
 * of satellite lines that follow. Timestamps that do not parse are
 * echoed verbatim.
 */
fn epoch_descriptor(ts: &str, total: usize) -> String {
    match epoch::parse_utc(ts) {
        Ok(parsed) => format!("> {}  0 {}", epoch::format(parsed), total),
        Err(_) => format!("{} {}", ts, total),
    }
}

/*
 * PRN indicators for this constellation: one entry per satellite slot,
 * zero (invalid) when the slot does not coerce to an integer.
 */
fn indicator_prns(row: &EpochRow, constellation: Constellation) -> Vec<i64> {
    row.get(&systems::validity_key(constellation))
        .and_then(value::as_slice)
        .map(|slots| {
            slots
                .iter()
                .map(|slot| value::as_i64(slot).unwrap_or(0))
                .collect()
        })
        .unwrap_or_default()
}

/*
 * Kept slot indexes: PRN must be a positive (u8 representable) integer,
 * the first index wins among duplicate PRNs, and slots for which every
 * constellation's validity indicator is zero are fully suppressed.
 * Surviving indexes keep their original order: re-ordering would break
 * the alignment with the measurement columns.
 */
fn kept_indexes(row: &EpochRow, prns: &[i64]) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(prns.len());
    let mut kept = Vec::with_capacity(prns.len());
    for (j, prn) in prns.iter().enumerate() {
        if *prn <= 0 || *prn > u8::MAX as i64 {
            continue;
        }
        if !seen.insert(*prn) {
            // duplicate found later in the array: skip this index
            continue;
        }
        kept.push(j);
    }
    kept.retain(|&j| !all_validity_zero(row, j));
    kept
}

fn validity_at(row: &EpochRow, key: &str, j: usize) -> f64 {
    row.get(key)
        .and_then(value::as_slice)
        .and_then(|slots| slots.get(j))
        .and_then(value::as_f64)
        .unwrap_or(0.0)
}

fn all_validity_zero(row: &EpochRow, j: usize) -> bool {
    systems::validity_keys().all(|key| validity_at(row, &key, j) == 0.0)
}

#[cfg(test)]
mod test {
    use super::{epoch_descriptor, format, kept_indexes};
    use crate::dataset::Dataset;
    use crate::resolver::TypeStrategy;
    use crate::tests::formatting::Utf8Buffer;

    use serde_json::json;
    use std::io::BufWriter;

    fn render(dataset: &Dataset) -> String {
        let observables = TypeStrategy::Catalog.resolve(dataset).unwrap();
        let mut buf = BufWriter::new(Utf8Buffer::new(4096));
        format(dataset, &observables, &mut buf).unwrap();
        buf.into_inner().unwrap().to_ascii_utf8()
    }

    #[test]
    fn epoch_descriptor_formatting() {
        assert_eq!(
            epoch_descriptor("2025-10-21 15:42:07", 12),
            "> 2025 10 21 15 42 07.0000000  0 12",
        );
        // unparseable timestamps are echoed verbatim, whether
        // mis-shaped or calendar invalid
        assert_eq!(epoch_descriptor("garbage", 0), "garbage 0");
        assert_eq!(
            epoch_descriptor("2025-10-21 99:00:00", 1),
            "2025-10-21 99:00:00 1"
        );
    }

    #[test]
    fn duplicate_prns_keep_first_index() {
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07"],
            "VSG": [[5, 5]],
            "prMes_G1": [[20000000.0, 21000000.0]],
        }))
        .unwrap();

        let content = render(&dataset);
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "> 2025 10 21 15 42 07.0000000  0 1");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("G05"));
        // first index wins: the later duplicate is dropped, not renumbered
        assert_eq!(&lines[1][3..17], "  20000000.000");
    }

    #[test]
    fn null_measurements_are_blanked() {
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07"],
            "VSG": [[7]],
            "prMes_G1": [[null]],
            "cpMes_G1": [[10482104.12345]],
        }))
        .unwrap();

        let content = render(&dataset);
        let line = content.lines().nth(1).unwrap();

        assert!(line.starts_with("G07"));
        // C1C null: 14 blanks, never a zero
        assert_eq!(&line[3..17], "              ");
        // L1C observed, 5 decimals
        assert_eq!(&line[17..31], "10482104.12345");
    }

    #[test]
    fn all_zero_slots_are_suppressed() {
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07"],
            // slot 1 carries PRN 9 for G, but every indicator is zero
            // at slot 1 across all systems: fully suppressed
            "VSG": [[5, 0]],
            "VSR": [[0, 0]],
            "VSE": [[0, 0]],
            "VSB": [[0, 0]],
            "VSQ": [[0, 0]],
        }))
        .unwrap();

        let row = &dataset.epochs["2025-10-21 15:42:07"];
        assert_eq!(kept_indexes(row, &[5, 9]), vec![0]);

        let content = render(&dataset);
        assert!(content.starts_with("> 2025 10 21 15 42 07.0000000  0 1\n"));
    }

    #[test]
    fn negative_and_zero_prns_are_dropped() {
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07"],
            "VSG": [[0, -3, 12]],
        }))
        .unwrap();

        let content = render(&dataset);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "> 2025 10 21 15 42 07.0000000  0 1");
        assert!(lines[1].starts_with("G12"));
    }

    #[test]
    fn field_widths_and_alignment() {
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07"],
            "VSG": [[3]],
            "prMes_G1": [[21000000.123]],
            "cpMes_G1": [[11035161.12345]],
            "doMes_G1": [[-1234.567]],
            "cn0_G1": [[45.0]],
        }))
        .unwrap();

        let content = render(&dataset);
        let line = content.lines().nth(1).unwrap();

        // satellite id + 8 catalog codes, 14 characters each
        assert_eq!(line.len(), 3 + 8 * 14);
        assert_eq!(&line[3..17], "  21000000.123");
        assert_eq!(&line[17..31], "11035161.12345");
        assert_eq!(&line[31..45], "     -1234.567");
        assert_eq!(&line[45..59], "        45.000");
        // band 2 never observed: blanked
        assert_eq!(&line[59..], " ".repeat(4 * 14));
    }

    #[test]
    fn constellation_remap_sources_data_letters() {
        // BeiDou rows are displayed as C but sourced from B fields,
        // QZSS displayed as J, sourced from Q fields
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07"],
            "VSB": [[14]],
            "VSQ": [[2]],
            "prMes_B2": [[22000000.5]],
            "prMes_Q1": [[23000000.5]],
        }))
        .unwrap();

        let content = render(&dataset);
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "> 2025 10 21 15 42 07.0000000  0 2");
        assert!(lines[1].starts_with("C14"));
        assert_eq!(&lines[1][3..17], "  22000000.500");
        assert!(lines[2].starts_with("J02"));
        assert_eq!(&lines[2][3..17], "  23000000.500");
    }

    #[test]
    fn declared_count_matches_emitted_lines() {
        let dataset = Dataset::from_value(&json!({
            "recordTime": ["2025-10-21 15:42:07", "2025-10-21 15:42:08"],
            "VSG": [[5, 7], [5]],
            "VSR": [[0, 0], [9]],
        }))
        .unwrap();

        let content = render(&dataset);
        let lines: Vec<&str> = content.lines().collect();

        let mut line = 0;
        while line < lines.len() {
            assert!(lines[line].starts_with("> "));
            let declared = lines[line]
                .rsplit(' ')
                .next()
                .unwrap()
                .parse::<usize>()
                .unwrap();
            for k in 0..declared {
                assert!(!lines[line + 1 + k].starts_with("> "));
            }
            line += declared + 1;
        }
    }
}
