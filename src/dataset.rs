//! Columnar observation dataset and epoch transposition
use crate::{epoch, error::InputError};

use serde_json::Value;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, info};

/// Distinguished timestamp field: defines the epoch structure,
/// every other array field is index aligned to it.
const RECORD_TIME: &str = "recordTime";

/// One transposed record: field name to this field's value
/// at one specific epoch.
pub type EpochRow = HashMap<String, Value>;

/// [Dataset] is a complete columnar observation file, transposed
/// into per epoch rows. Built once per file, immutable afterwards,
/// consumed by both the header formatter and the record encoder.
///
/// Timestamps follow `yyyy-mm-dd hh:mm:ss`, which sorts
/// lexicographically into chronological order: iterating the inner
/// map always yields epochs in chronological order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Timestamp to [EpochRow] mapping, in chronological order.
    pub epochs: BTreeMap<String, EpochRow>,
}

impl Dataset {
    /// Loads and transposes one columnar observation file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path)?;
        let value = serde_json::from_str(&content)?;
        Self::from_value(&value)
    }

    /// Transposes one parsed columnar object: the epoch count is taken
    /// from the `recordTime` array, every other array field is sliced
    /// at the same index. Fields that are not array shaped carry no per
    /// epoch meaning and are dropped; arrays shorter than the epoch
    /// count resolve to an empty container for the missing epochs.
    pub fn from_value(value: &Value) -> Result<Self, InputError> {
        let content = value.as_object().ok_or(InputError::NotAnObject)?;

        let record_times = content
            .get(RECORD_TIME)
            .ok_or(InputError::MissingRecordTime)?
            .as_array()
            .ok_or(InputError::MalformedRecordTime)?
            .iter()
            .map(|v| v.as_str().ok_or(InputError::MalformedRecordTime))
            .collect::<Result<Vec<_>, _>>()?;

        let mut epochs = BTreeMap::new();

        for (i, ts) in record_times.iter().enumerate() {
            let mut row = EpochRow::new();

            for (key, val) in content.iter() {
                if key == RECORD_TIME {
                    continue;
                }
                let column = match val.as_array() {
                    Some(column) => column,
                    None => {
                        // constant field: no per-epoch meaning
                        continue;
                    },
                };

                if let Some(cell) = column.get(i) {
                    row.insert(key.clone(), cell.clone());
                } else {
                    // short column: mirror the structure with an empty cell
                    row.insert(key.clone(), Value::Array(Vec::new()));
                }
            }

            debug!("epoch {}: {} fields", ts, row.len());
            epochs.insert(ts.to_string(), row);
        }

        info!("loaded {} epochs", epochs.len());
        Ok(Self { epochs })
    }

    /// True if this [Dataset] carries no [EpochRow] at all.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// A representative [EpochRow], on nonempty [Dataset]s.
    pub(crate) fn representative_row(&self) -> Option<&EpochRow> {
        self.epochs.values().next()
    }

    /// Sampling interval, in seconds: the wall clock delta between
    /// the first two chronological epochs. Defaults to 1.0 on
    /// single epoch datasets, unparseable timestamps or
    /// non increasing pairs.
    pub fn sampling_interval_secs(&self) -> f64 {
        let mut keys = self.epochs.keys();
        let (t0, t1) = match (keys.next(), keys.next()) {
            (Some(t0), Some(t1)) => (t0, t1),
            _ => return 1.0,
        };
        match (epoch::parse_utc(t0), epoch::parse_utc(t1)) {
            (Ok(e0), Ok(e1)) => {
                let dt = (e1 - e0).to_seconds();
                if dt > 0.0 {
                    dt
                } else {
                    1.0
                }
            },
            _ => 1.0,
        }
    }
}
