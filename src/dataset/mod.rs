//! Loading example collections and persisting batch results

use crate::batch::{ExampleRecord, SummarizationResult};
use crate::error::{Result, SummarizerError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serialization format for result files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = SummarizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            other => Err(SummarizerError::Configuration(format!(
                "Unknown output format '{}' (expected json or jsonl)",
                other
            ))),
        }
    }
}

/// Parse a JSON array of records
pub fn parse_json(content: &str) -> Result<Vec<ExampleRecord>> {
    serde_json::from_str(content)
        .map_err(|e| SummarizerError::InputFormat(format!("Invalid JSON array: {}", e)))
}

/// Parse newline-delimited records; blank lines are ignored
pub fn parse_jsonl(content: &str) -> Result<Vec<ExampleRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                SummarizerError::InputFormat(format!("Invalid JSON on line {}: {}", i + 1, e))
            })
        })
        .collect()
}

/// Load records from a `.jsonl` file, or a JSON array for any other extension
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<ExampleRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        SummarizerError::InputFormat(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
        .unwrap_or(false);

    let records = if is_jsonl {
        parse_jsonl(&content)?
    } else {
        parse_json(&content)?
    };

    let eligible = records.iter().filter(|r| r.input.is_some()).count();
    info!("Loaded {} records ({} with 'input') from {}", records.len(), eligible, path.display());

    Ok(records)
}

/// File name for a result set written at `timestamp`
pub fn output_filename(format: OutputFormat, timestamp: DateTime<Local>) -> String {
    format!(
        "summarized_output_{}.{}",
        timestamp.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Serialize results to a writer; non-ASCII text is written as-is
pub fn write_results_to<W: Write>(
    writer: W,
    results: &[SummarizationResult],
    format: OutputFormat,
) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, results)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for result in results {
                serde_json::to_writer(&mut writer, result)?;
                writeln!(writer)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write results into `dir` under a timestamped name and return the path
pub fn write_results<P: AsRef<Path>>(
    dir: P,
    results: &[SummarizationResult],
    format: OutputFormat,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(output_filename(format, Local::now()));
    debug!("Writing {} results to {}", results.len(), path.display());

    let file = fs::File::create(&path)?;
    write_results_to(file, results, format)?;

    info!("Wrote {} results to {}", results.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RecordStatus;
    use chrono::TimeZone;

    fn sample_result() -> SummarizationResult {
        SummarizationResult {
            input: "Le café est très chaud.".to_string(),
            output: "Café chaud.".to_string(),
            original_tokens: 8,
            target_tokens: 4,
            summary_tokens: 3,
            prompt_tokens: 40,
            reduction_pct: 62.5,
            estimated_cost: 0.0001,
            status: RecordStatus::Summarized,
            reference_output: None,
            error: None,
        }
    }

    #[test]
    fn test_parse_json_array() {
        let records = parse_json(r#"[{"input": "a", "output": "b"}, {"other": 1}]"#).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].input.as_deref(), Some("a"));
        assert!(records[1].input.is_none());
    }

    #[test]
    fn test_parse_json_rejects_object() {
        let err = parse_json(r#"{"input": "a"}"#).unwrap_err();
        assert!(matches!(err, SummarizerError::InputFormat(_)));
    }

    #[test]
    fn test_parse_jsonl_skips_blank_lines() {
        let records = parse_jsonl("{\"input\": \"a\"}\n\n{\"input\": \"b\"}\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_jsonl_reports_line() {
        let err = parse_jsonl("{\"input\": \"a\"}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let jsonl = dir.path().join("data.jsonl");
        let json = dir.path().join("data.json");
        fs::write(&jsonl, "{\"input\": \"x\"}\n{\"input\": \"y\"}\n").unwrap();
        fs::write(&json, "[{\"input\": \"z\"}]").unwrap();

        assert_eq!(load_records(&jsonl).unwrap().len(), 2);
        assert_eq!(load_records(&json).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_input_format_error() {
        let err = load_records("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SummarizerError::InputFormat(_)));
    }

    #[test]
    fn test_output_filename_embeds_timestamp() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        assert_eq!(
            output_filename(OutputFormat::Jsonl, timestamp),
            "summarized_output_20240309-140507.jsonl"
        );
    }

    #[test]
    fn test_non_ascii_written_unescaped() {
        let mut buffer = Vec::new();
        write_results_to(&mut buffer, &[sample_result()], OutputFormat::Json).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Le café est très chaud."));
        assert!(text.trim_start().starts_with('['));
    }

    #[test]
    fn test_write_jsonl_one_line_per_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_results(dir.path(), &[sample_result(), sample_result()], OutputFormat::Jsonl).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert_eq!(text.lines().count(), 2);
        assert!(path.extension().unwrap() == "jsonl");
        assert!(path.starts_with(dir.path()));
    }

    #[test]
    fn test_write_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("runs").join("today");
        let path = write_results(&nested, &[sample_result()], OutputFormat::Json).unwrap();

        assert!(path.exists());
        assert_eq!(load_records(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSONL".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
