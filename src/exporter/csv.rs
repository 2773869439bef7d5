// file: src/exporter/csv.rs
// description: csv export of question/answer pairs
// reference: https://docs.rs/csv

use crate::error::{FillerError, Result};
use crate::models::AnswerMap;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Two columns per row (question, answer), no header, every field quoted
/// with embedded quotes doubled.
pub struct CsvExporter;

impl CsvExporter {
    pub fn write(path: &Path, answers: &AnswerMap) -> Result<()> {
        let to_write_error = |source: csv::Error| FillerError::Write {
            path: path.to_path_buf(),
            source,
        };

        let writer = Self::builder().from_path(path).map_err(to_write_error)?;
        Self::write_rows(writer, answers).map_err(to_write_error)?;

        debug!("Wrote {} rows to {}", answers.len(), path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(sink: W, answers: &AnswerMap) -> std::result::Result<(), csv::Error> {
        Self::write_rows(Self::builder().from_writer(sink), answers)
    }

    fn builder() -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder.has_headers(false).quote_style(QuoteStyle::Always);
        builder
    }

    fn write_rows<W: Write>(
        mut writer: Writer<W>,
        answers: &AnswerMap,
    ) -> std::result::Result<(), csv::Error> {
        for (question, answer) in answers.iter() {
            writer.write_record([question, answer])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn answers(rows: &[(&str, &str)]) -> AnswerMap {
        let mut map = AnswerMap::new();
        for (question, answer) in rows {
            map.insert(&Question::parse(question).unwrap(), *answer);
        }
        map
    }

    #[test]
    fn test_every_field_quoted() {
        let mut out = Vec::new();
        CsvExporter::write_to(&mut out, &answers(&[("Q1", "A1")])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"Q1\",\"A1\"\n");
    }

    #[test]
    fn test_special_characters_round_trip() {
        let rows = [
            ("Backups, restores?", "Yes, \"nightly\"."),
            ("Say \"hi\"", "line one\nline two"),
        ];
        let mut out = Vec::new();
        CsvExporter::write_to(&mut out, &answers(&rows)).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("\"Yes, \"\"nightly\"\".\""));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(out.as_slice());
        let parsed: Vec<(String, String)> = reader
            .records()
            .map(|r| {
                let record = r.unwrap();
                (record[0].to_string(), record[1].to_string())
            })
            .collect();

        let expected: Vec<(String, String)> = rows
            .iter()
            .map(|(q, a)| (q.to_string(), a.to_string()))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_write_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("answers.csv");

        CsvExporter::write(&path, &answers(&[("Q", "A")])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"Q\",\"A\"\n");
    }

    #[test]
    fn test_empty_map_creates_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("answers.csv");

        CsvExporter::write(&path, &AnswerMap::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_unwritable_path_is_write_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("answers.csv");

        let err = CsvExporter::write(&path, &answers(&[("Q", "A")])).unwrap_err();
        assert!(matches!(err, FillerError::Write { .. }));
    }
}
