use crate::SummaryStatistics;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use vrt_core::{ExperimentError, TrialSample};

pub const RESULT_HEADER: [&str; 4] = ["pid", "trial#", "direction", "reactionTime (ms)"];
pub const DEFAULT_FILE_PREFIX: &str = "VisualReactionTestResults-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub pid: u32,
    #[serde(rename = "trial#")]
    pub trial: usize,
    pub direction: &'static str,
    #[serde(rename = "reactionTime (ms)")]
    pub reaction_time_ms: u64,
}

/// Row-oriented dataset handed to a [`ResultSink`]. All rows share one participant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub pid: u32,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn from_samples(pid: u32, samples: &[TrialSample]) -> Self {
        let rows = samples
            .iter()
            .map(|s| ResultRow {
                pid,
                trial: s.trial_index,
                direction: s.condition.label(),
                reaction_time_ms: s.reaction_latency_ms,
            })
            .collect();
        Self { pid, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv_string(&self) -> Result<String, ExperimentError> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(RESULT_HEADER).map_err(export_err)?;
        for row in &self.rows {
            writer.serialize(row).map_err(export_err)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExperimentError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(export_err)
    }
}

/// What a download trigger produces once the run has ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    pub table: ResultTable,
    pub statistics: SummaryStatistics,
}

/// Consumer of the finished dataset. File mechanics live entirely behind this trait.
pub trait ResultSink {
    type Receipt;

    fn accept(&mut self, table: &ResultTable) -> Result<Self::Receipt, ExperimentError>;
}

/// Keeps exported tables in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: Vec<ResultTable>,
}

impl ResultSink for MemorySink {
    type Receipt = usize;

    fn accept(&mut self, table: &ResultTable) -> Result<usize, ExperimentError> {
        self.tables.push(table.clone());
        Ok(self.tables.len())
    }
}

/// Writes `<output_dir>/<prefix><YYYYMMDDTHHMMSS>.csv` (ISO-8601 basic format, UTC),
/// which is a valid file name on every platform.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl CsvFileSink {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!("{}{}.csv", self.file_prefix, at.format("%Y%m%dT%H%M%S"))
    }

    pub fn write_at(
        &self,
        table: &ResultTable,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, ExperimentError> {
        fs::create_dir_all(&self.output_dir).map_err(export_err)?;
        let path = self.output_dir.join(self.file_name(at));
        fs::write(&path, table.to_csv_string()?).map_err(export_err)?;
        info!(path = %path.display(), rows = table.len(), pid = table.pid, "Results exported");
        Ok(path)
    }
}

impl Default for CsvFileSink {
    fn default() -> Self {
        Self::new(".", DEFAULT_FILE_PREFIX)
    }
}

impl ResultSink for CsvFileSink {
    type Receipt = PathBuf;

    fn accept(&mut self, table: &ResultTable) -> Result<PathBuf, ExperimentError> {
        self.write_at(table, Utc::now())
    }
}

fn export_err(err: impl std::fmt::Display) -> ExperimentError {
    ExperimentError::Export(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vrt_core::Condition;

    fn table() -> ResultTable {
        let samples = [
            TrialSample {
                trial_index: 1,
                condition: Condition::Right,
                reaction_latency_ms: 312,
            },
            TrialSample {
                trial_index: 2,
                condition: Condition::Left,
                reaction_latency_ms: 287,
            },
        ];
        ResultTable::from_samples(482_113, &samples)
    }

    #[test]
    fn csv_has_fixed_header_and_shared_pid() {
        let csv = table().to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "pid,trial#,direction,reactionTime (ms)",
                "482113,1,right,312",
                "482113,2,left,287",
            ]
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let empty = ResultTable::from_samples(100_000, &[]);
        assert!(empty.is_empty());
        assert!(!table().is_empty());
        let csv = empty.to_csv_string().unwrap();
        assert_eq!(csv.trim_end(), "pid,trial#,direction,reactionTime (ms)");
    }

    #[test]
    fn file_name_is_prefix_plus_second_precision_timestamp() {
        let sink = CsvFileSink::default();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            sink.file_name(at),
            "VisualReactionTestResults-20240309T140507.csv"
        );
    }

    #[test]
    fn file_name_has_no_reserved_characters() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = CsvFileSink::default().file_name(at);
        assert!(
            !name.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']),
            "non-portable file name: {name}"
        );
    }

    #[test]
    fn csv_sink_writes_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvFileSink::new(dir.path().join("results"), "run-");
        let path = sink.accept(&table()).unwrap();
        assert!(path.starts_with(dir.path().join("results")));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("pid,trial#,direction,reactionTime (ms)\n"));
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn memory_sink_keeps_tables() {
        let mut sink = MemorySink::default();
        assert_eq!(sink.accept(&table()).unwrap(), 1);
        assert_eq!(sink.tables[0].len(), 2);
    }
}
