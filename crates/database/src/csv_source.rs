use crate::error::DbError;
use crate::snapshot::{DropReason, Snapshot, build, parse_value};
use crate::timestamp::parse_timestamp;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ENTITY_HEADERS: [&str; 2] = ["playername", "entity_id"];
const GROUP_HEADERS: [&str; 2] = ["team", "group_key"];
const METRIC_HEADERS: [&str; 2] = ["metric", "metric_name"];
const VALUE_HEADERS: [&str; 1] = ["value"];
const TIMESTAMP_HEADERS: [&str; 1] = ["timestamp"];

struct Columns {
    entity: usize,
    group: usize,
    metric: usize,
    value: usize,
    timestamp: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DbError> {
        let find = |aliases: &[&str], name: &'static str| {
            headers
                .iter()
                .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
                .ok_or(DbError::MissingColumn(name))
        };
        Ok(Self {
            entity: find(&ENTITY_HEADERS, "playername")?,
            group: find(&GROUP_HEADERS, "team")?,
            metric: find(&METRIC_HEADERS, "metric")?,
            value: find(&VALUE_HEADERS, "value")?,
            timestamp: find(&TIMESTAMP_HEADERS, "timestamp")?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<core_types::Measurement, DropReason> {
        let cell = |index: usize| record.get(index).unwrap_or("");
        let value = parse_value(cell(self.value))?;
        build(
            cell(self.entity),
            cell(self.group),
            cell(self.metric),
            value,
            parse_timestamp(cell(self.timestamp)),
        )
    }
}

/// Reads a long-format snapshot from any CSV reader.
///
/// Rows that cannot become a measurement are dropped and counted in the
/// summary by reason; only a missing column or an I/O failure is an error.
pub fn read_csv<R: Read>(reader: R) -> Result<Snapshot, DbError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(rdr.headers()?)?;
    let mut snapshot = Snapshot::default();
    for result in rdr.records() {
        match result {
            Ok(record) => snapshot.push(columns.parse(&record)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => snapshot.push(Err(DropReason::Malformed)),
        }
    }
    Ok(snapshot)
}

/// Loads a snapshot file from disk.
pub fn load_csv(path: &Path) -> Result<Snapshot, DbError> {
    let file = File::open(path)?;
    let snapshot = read_csv(file)?;
    snapshot.summary.log(&path.display().to_string());
    Ok(snapshot)
}
