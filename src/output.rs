//! Output formatting and export for classifications.
//!
//! Durations are rendered as `HH:MM:SS[.mmm]` in JSON and CSV alike.

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use csv::WriterBuilder;
use serde::{Serialize, Serializer};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::ids::{RaceId, RiderId};
use crate::ranking::{Classification, RaceAggregate};

/// Formats a duration as `HH:MM:SS`, with a `.mmm` suffix when it carries
/// milliseconds.
pub fn format_delta(delta: TimeDelta) -> String {
    let total_ms = delta.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let ms = total_ms.abs();
    let (h, m, s, frac) = (
        ms / 3_600_000,
        ms / 60_000 % 60,
        ms / 1_000 % 60,
        ms % 1_000,
    );
    if frac == 0 {
        format!("{sign}{h:02}:{m:02}:{s:02}")
    } else {
        format!("{sign}{h:02}:{m:02}:{s:02}.{frac:03}")
    }
}

pub(crate) fn serialize_delta<S: Serializer>(
    delta: &TimeDelta,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_delta(*delta))
}

pub(crate) fn serialize_opt_delta<S: Serializer>(
    delta: &Option<TimeDelta>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match delta {
        Some(d) => serializer.serialize_some(&format_delta(*d)),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn serialize_delta_classification<S: Serializer>(
    classification: &Classification<TimeDelta>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    Classification {
        riders: classification.riders.clone(),
        values: classification.values.iter().copied().map(format_delta).collect::<Vec<_>>(),
    }
    .serialize(serializer)
}

/// One row of the classification CSV export.
#[derive(Debug, Serialize)]
pub struct ClassificationRow {
    pub generated_at: DateTime<Utc>,
    pub race_id: RaceId,
    pub classification: &'static str,
    pub position: usize,
    pub rider_id: RiderId,
    pub value: String,
}

/// Flattens a race aggregate into CSV rows, one per rider and
/// classification, positions starting at 1.
pub fn classification_rows(aggregate: &RaceAggregate) -> Vec<ClassificationRow> {
    let row = |classification: &'static str,
               position: usize,
               rider_id: RiderId,
               value: String| ClassificationRow {
        generated_at: aggregate.generated_at,
        race_id: aggregate.race_id,
        classification,
        position: position + 1,
        rider_id,
        value,
    };

    let general = aggregate
        .general
        .iter()
        .enumerate()
        .map(|(i, (rider, total))| row("general", i, rider, format_delta(*total)));
    let points = aggregate
        .points
        .iter()
        .enumerate()
        .map(|(i, (rider, total))| row("points", i, rider, total.to_string()));
    let mountain = aggregate
        .mountain
        .iter()
        .enumerate()
        .map(|(i, (rider, total))| row("mountain", i, rider, total.to_string()));

    general.chain(points).chain(mountain).collect()
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::aggregate::{StageSummary, aggregate_race};
    use crate::ranking::StageStanding;
    use std::fs;

    fn sample_aggregate() -> RaceAggregate {
        let standings = vec![
            StageStanding {
                rider: RiderId(0),
                elapsed: TimeDelta::seconds(3600),
                adjusted: Some(TimeDelta::seconds(3600)),
                points: 50,
            },
            StageStanding {
                rider: RiderId(1),
                elapsed: TimeDelta::milliseconds(3_600_400),
                adjusted: Some(TimeDelta::seconds(3600)),
                points: 30,
            },
        ];
        let summary = StageSummary {
            standings,
            mountain_points: [(RiderId(1), 10)].into_iter().collect(),
        };
        aggregate_race(RaceId(0), &[summary])
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(TimeDelta::seconds(0)), "00:00:00");
        assert_eq!(format_delta(TimeDelta::seconds(3 * 3600 + 62)), "03:01:02");
        assert_eq!(format_delta(TimeDelta::milliseconds(700)), "00:00:00.700");
        assert_eq!(format_delta(TimeDelta::seconds(-5)), "-00:00:05");
        assert_eq!(format_delta(TimeDelta::seconds(30 * 3600)), "30:00:00");
    }

    #[test]
    fn test_classification_rows_cover_every_classification() {
        let rows = classification_rows(&sample_aggregate());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].classification, "general");
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].value, "01:00:00");
        assert_eq!(rows[2].classification, "points");
        assert_eq!(rows[2].value, "50");
        assert_eq!(rows[4].classification, "mountain");
        assert_eq!(rows[4].rider_id, RiderId(1));
        assert_eq!(rows[4].value, "10");
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_aggregate()).unwrap();
    }

    #[test]
    fn test_aggregate_json_uses_formatted_times() {
        let json = serde_json::to_value(sample_aggregate()).unwrap();
        assert_eq!(json["general"]["values"][0], "01:00:00");
        assert_eq!(json["points"]["values"][0], 50);
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classification.csv");
        let path = path.to_str().unwrap();

        let rows = classification_rows(&sample_aggregate());
        append_records(path, &rows).unwrap();
        append_records(path, &rows).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("generated_at"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 1 + 2 * rows.len());
    }
}
