//! Tabular prospect sources.
//!
//! Records arrive as a spreadsheet-style range: the first row is the header,
//! every later row is one prospect. [`ColumnMapping`] names the three
//! columns the pipeline needs.

use std::path::Path;

use async_trait::async_trait;
use outreach_core::ProspectRecord;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Header row plus data rows, as returned by a spreadsheet values range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Header names for the email, company and website columns. Matched
/// case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub email: String,
    pub company: String,
    pub website: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            email: "email".to_owned(),
            company: "company".to_owned(),
            website: "website".to_owned(),
        }
    }
}

impl SheetValues {
    /// Maps rows to records. Rows lacking any of the three values are
    /// skipped.
    ///
    /// # Errors
    ///
    /// - [`SourceError::MissingHeader`] if there are no rows at all.
    /// - [`SourceError::MissingColumn`] if a mapped column is absent.
    pub fn to_records(&self, mapping: &ColumnMapping) -> Result<Vec<ProspectRecord>, SourceError> {
        let Some((header, rows)) = self.values.split_first() else {
            return Err(SourceError::MissingHeader);
        };
        let email = column_index(header, &mapping.email)?;
        let company = column_index(header, &mapping.company)?;
        let website = column_index(header, &mapping.website)?;

        let mut records = Vec::with_capacity(rows.len());
        for (row_number, row) in rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).map(|v| v.trim()).filter(|v| !v.is_empty());
            match (cell(email), cell(company), cell(website)) {
                (Some(e), Some(c), Some(w)) => records.push(ProspectRecord::new(e, c, w)),
                _ => tracing::debug!(row = row_number + 2, "skipping incomplete row"),
            }
        }
        Ok(records)
    }
}

fn column_index(header: &[String], wanted: &str) -> Result<usize, SourceError> {
    let wanted = wanted.trim().to_lowercase();
    header
        .iter()
        .position(|h| h.trim().to_lowercase() == wanted)
        .ok_or_else(|| SourceError::MissingColumn {
            column: wanted,
            available: header.to_vec(),
        })
}

/// Retrieves prospect records before a run starts.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// `source_ref` identifies the range to read (a path, a sheet id, ...).
    async fn load_records(
        &self,
        source_ref: &str,
        mapping: &ColumnMapping,
    ) -> Result<Vec<ProspectRecord>, SourceError>;
}

/// Reads a [`SheetValues`] document from a JSON or YAML file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRecordSource;

#[async_trait]
impl RecordSource for FileRecordSource {
    async fn load_records(
        &self,
        source_ref: &str,
        mapping: &ColumnMapping,
    ) -> Result<Vec<ProspectRecord>, SourceError> {
        let path = Path::new(source_ref);
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        // JSON documents are valid YAML, so one parser covers both.
        let sheet: SheetValues =
            serde_yaml::from_str(&content).map_err(|e| SourceError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;
        let records = sheet.to_records(mapping)?;
        tracing::info!(path = %path.display(), records = records.len(), "loaded prospect records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> SheetValues {
        SheetValues {
            values: rows
                .iter()
                .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
                .collect(),
        }
    }

    #[test]
    fn maps_columns_case_insensitively() {
        let values = sheet(&[
            &["Website", " EMAIL ", "Company", "Notes"],
            &["acme.com", "jane@acme.com", "Acme", "met at expo"],
        ]);
        let records = values.to_records(&ColumnMapping::default()).unwrap();
        assert_eq!(
            records,
            vec![ProspectRecord::new("jane@acme.com", "Acme", "acme.com")]
        );
    }

    #[test]
    fn skips_rows_missing_a_value() {
        let values = sheet(&[
            &["email", "company", "website"],
            &["a@acme.com", "Acme", "acme.com"],
            &["b@beta.io", "", "beta.io"],
            &["c@gamma.dev", "Gamma"],
            &["d@delta.co", "Delta", "delta.co"],
        ]);
        let records = values.to_records(&ColumnMapping::default()).unwrap();
        let emails: Vec<&str> = records.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@acme.com", "d@delta.co"]);
    }

    #[test]
    fn missing_column_lists_available_headers() {
        let values = sheet(&[&["Email", "Company", "URL"]]);
        let err = values.to_records(&ColumnMapping::default()).unwrap_err();
        match err {
            SourceError::MissingColumn { column, available } => {
                assert_eq!(column, "website");
                assert_eq!(available, vec!["Email", "Company", "URL"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_mapping_is_honoured() {
        let values = sheet(&[
            &["Contact", "Organisation", "URL"],
            &["jane@acme.com", "Acme", "https://acme.com"],
        ]);
        let mapping = ColumnMapping {
            email: "contact".into(),
            company: "organisation".into(),
            website: "url".into(),
        };
        assert_eq!(values.to_records(&mapping).unwrap().len(), 1);
    }

    #[test]
    fn empty_sheet_has_no_header() {
        let err = SheetValues::default()
            .to_records(&ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingHeader));
    }

    #[tokio::test]
    async fn file_source_reads_json_and_yaml() {
        let dir = std::env::temp_dir().join(format!("outreach-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let json = dir.join("records.json");
        std::fs::write(
            &json,
            r#"{"values":[["email","company","website"],["jane@acme.com","Acme","acme.com"]]}"#,
        )
        .unwrap();
        let yaml = dir.join("records.yaml");
        std::fs::write(
            &yaml,
            "values:\n  - [email, company, website]\n  - [bob@beta.io, Beta, beta.io]\n  - [eve@gamma.dev, Gamma, gamma.dev]\n",
        )
        .unwrap();

        let source = FileRecordSource;
        let mapping = ColumnMapping::default();
        let from_json = source
            .load_records(json.to_str().unwrap(), &mapping)
            .await
            .unwrap();
        let from_yaml = source
            .load_records(yaml.to_str().unwrap(), &mapping)
            .await
            .unwrap();
        assert_eq!(from_json.len(), 1);
        assert_eq!(from_yaml.len(), 2);
        assert_eq!(from_yaml[1].company_name, "Gamma");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn file_source_reports_missing_file() {
        let err = FileRecordSource
            .load_records("/nonexistent/outreach/records.yaml", &ColumnMapping::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
