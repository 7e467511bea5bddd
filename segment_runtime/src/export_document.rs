//! File format used to export the installed segments and to import them
//! back into the database.

use std::collections::HashSet;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{format_wire_date, parse_wire_date, Position, SegmentToM1Positions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ExportDocument {
    /// Reference date of the export, `yyyy-MM-dd`.
    pub date: String,
    pub segments: Vec<ExportedSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ExportedSegment {
    /// Prime sector position, `A1` to `F82`.
    pub position: String,
    /// Segment installed at the position; absent when the position is empty.
    #[serde(rename = "segmentId", default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
}

/// Export document after validation, with typed dates and positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedExport {
    pub date: NaiveDate,
    pub segments: Vec<(Position, Option<String>)>,
}

impl ValidatedExport {
    /// Shape expected by the backend's `setPositions` endpoint.
    pub fn into_positions(self) -> SegmentToM1Positions {
        SegmentToM1Positions {
            date: self.date,
            positions: self
                .segments
                .into_iter()
                .map(|(position, segment_id)| (segment_id, position))
                .collect(),
        }
    }
}

impl ExportDocument {
    pub fn new(
        date: NaiveDate,
        segments: impl IntoIterator<Item = (Position, Option<String>)>,
    ) -> Self {
        Self {
            date: format_wire_date(date),
            segments: segments
                .into_iter()
                .map(|(position, segment_id)| ExportedSegment {
                    position: position.to_string(),
                    segment_id,
                })
                .collect(),
        }
    }

    pub fn parse_str(contents: &str) -> Result<ValidatedExport, ExportValidationError> {
        let document: ExportDocument = serde_json::from_str(contents)
            .map_err(|err| ExportValidationError::Malformed(err.to_string()))?;
        document.validate()
    }

    pub fn validate(&self) -> Result<ValidatedExport, ExportValidationError> {
        let mut errors = Vec::new();

        let date = match parse_wire_date(&self.date) {
            Ok(date) => Some(date),
            Err(err) => {
                errors.push(format!("invalid date '{}': {err}", self.date));
                None
            }
        };

        let mut seen = HashSet::new();
        let mut segments = Vec::with_capacity(self.segments.len());
        for entry in &self.segments {
            let position = match entry.position.parse::<Position>() {
                Ok(position) => position,
                Err(err) => {
                    errors.push(format!("invalid position '{}': {err}", entry.position));
                    continue;
                }
            };
            if position.is_spare() {
                errors.push(format!("spare position '{position}' cannot be imported"));
                continue;
            }
            if !seen.insert(position) {
                errors.push(format!("duplicate position '{position}'"));
                continue;
            }
            let segment_id = entry
                .segment_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            segments.push((position, segment_id));
        }

        match date {
            Some(date) if errors.is_empty() => Ok(ValidatedExport { date, segments }),
            _ => Err(ExportValidationError::Invalid(errors)),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Why an export document cannot be imported.
#[derive(Debug, Clone, Error)]
pub enum ExportValidationError {
    #[error("failed to parse export JSON: {0}")]
    Malformed(String),
    /// Every problem found, in document order.
    #[error("{}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ExportValidationError {
    pub fn errors(&self) -> &[String] {
        match self {
            ExportValidationError::Malformed(message) => std::slice::from_ref(message),
            ExportValidationError::Invalid(errors) => errors,
        }
    }
}

pub fn export_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ExportDocument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_without_empty_ids() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let doc = ExportDocument::new(
            date,
            vec![
                ("A1".parse().unwrap(), Some("SN001".to_string())),
                ("A2".parse().unwrap(), None),
            ],
        );
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"date":"2023-06-01","segments":"#,
                r#"[{"position":"A1","segmentId":"SN001"},{"position":"A2"}]}"#
            )
        );
    }

    #[test]
    fn validation_collects_every_problem() {
        let json = r#"{
            "date": "June 1st",
            "segments": [
                {"position": "A1", "segmentId": "SN001"},
                {"position": "A1"},
                {"position": "G3", "segmentId": "SN400"},
                {"position": "Q7"}
            ]
        }"#;
        let err = ExportDocument::parse_str(json).expect_err("expected validation failure");
        assert_eq!(err.errors().len(), 4);
        assert!(err.to_string().contains("duplicate position 'A1'"));
        assert!(err.to_string().contains("spare position 'G3'"));
    }

    #[test]
    fn valid_document_converts_to_bulk_positions() {
        let json = concat!(
            r#"{"date":"2023-06-01","segments":"#,
            r#"[{"position":"B7","segmentId":" SN010 "},{"position":"C2","segmentId":""}]}"#
        );
        let validated = ExportDocument::parse_str(json).expect("document should be valid");
        let bulk = validated.into_positions();
        assert_eq!(bulk.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(
            bulk.positions,
            vec![
                (Some("SN010".to_string()), "B7".parse().unwrap()),
                (None, "C2".parse().unwrap()),
            ]
        );
    }

    #[test]
    fn schema_names_required_fields() {
        let schema = serde_json::to_value(export_schema()).unwrap();
        let required = schema["required"].as_array().expect("required list");
        assert!(required.iter().any(|field| field == "date"));
        assert!(required.iter().any(|field| field == "segments"));
    }

    #[test]
    fn malformed_json_is_a_single_error() {
        let err = ExportDocument::parse_str("{\"date\": ").expect_err("truncated JSON");
        assert!(matches!(err, ExportValidationError::Malformed(_)));
        assert_eq!(err.errors().len(), 1);
        assert!(err.to_string().starts_with("failed to parse export JSON"));
    }
}
