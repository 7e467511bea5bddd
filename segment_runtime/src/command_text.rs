use chrono::NaiveDate;
use thiserror::Error;

use crate::{parse_wire_date, Position, PositionParseError};

/// Commands accepted on the inspector's command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorCommand {
    SetDate(NaiveDate),
    Today,
    NextChange,
    PrevChange,
    /// View mode key as shown in the menu (`installed`, `riskOfLoss`, ...).
    View(String),
    /// `None` toggles the current value.
    ShowSegmentIds(Option<bool>),
    ShowSpares(Option<bool>),
    Select(Position),
    SetPosition {
        position: Position,
        segment_id: Option<String>,
        date: Option<NaiveDate>,
    },
    Export {
        scope: ExportScope,
        path: String,
    },
    Import {
        path: String,
    },
    Sync,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    All,
    Recent,
}

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid date '{value}' for {context}: {source}")]
    InvalidDate {
        value: String,
        context: &'static str,
        source: chrono::ParseError,
    },
    #[error("invalid position '{value}': {source}")]
    InvalidPosition {
        value: String,
        source: PositionParseError,
    },
    #[error("expected on/off, got '{0}'")]
    InvalidToggle(String),
    #[error("invalid export scope '{0}'")]
    InvalidExportScope(String),
    #[error("unexpected trailing argument '{0}'")]
    TrailingArgument(String),
}

const EMPTY_SEGMENT: &str = "empty";

pub fn parse_command_line(input: &str) -> Result<InspectorCommand, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::Empty)?;

    let command = match verb.as_str() {
        "date" => {
            let date_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("date"))?;
            InspectorCommand::SetDate(parse_date(date_str, "reference date")?)
        }
        "today" => InspectorCommand::Today,
        "next" => InspectorCommand::NextChange,
        "prev" | "previous" => InspectorCommand::PrevChange,
        "view" => {
            let key = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("view mode"))?;
            InspectorCommand::View(key.to_string())
        }
        "ids" => InspectorCommand::ShowSegmentIds(parse_toggle(parts.next())?),
        "spares" => InspectorCommand::ShowSpares(parse_toggle(parts.next())?),
        "select" | "pos" => {
            let pos_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("position"))?;
            InspectorCommand::Select(parse_position(pos_str)?)
        }
        "set" => {
            let pos_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("position"))?;
            let id_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("segment id"))?;
            let position = parse_position(pos_str)?;
            let segment_id = if id_str.eq_ignore_ascii_case(EMPTY_SEGMENT) {
                None
            } else {
                Some(id_str.to_string())
            };
            let date = parts
                .next()
                .map(|value| parse_date(value, "installation date"))
                .transpose()?;
            InspectorCommand::SetPosition {
                position,
                segment_id,
                date,
            }
        }
        "export" => {
            let first = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("export path"))?;
            let (scope, path) = match first.to_ascii_lowercase().as_str() {
                "all" => (ExportScope::All, parts.next()),
                "recent" => (ExportScope::Recent, parts.next()),
                _ if first.contains('.') || first.contains('/') => (ExportScope::All, Some(first)),
                other => return Err(CommandParseError::InvalidExportScope(other.to_string())),
            };
            let path = path.ok_or(CommandParseError::MissingArgument("export path"))?;
            InspectorCommand::Export {
                scope,
                path: path.to_string(),
            }
        }
        "import" => {
            let path = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("import path"))?;
            InspectorCommand::Import {
                path: path.to_string(),
            }
        }
        "sync" => InspectorCommand::Sync,
        "refresh" => InspectorCommand::Refresh,
        other => return Err(CommandParseError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = parts.next() {
        return Err(CommandParseError::TrailingArgument(extra.to_string()));
    }
    Ok(command)
}

fn parse_date(value: &str, context: &'static str) -> Result<NaiveDate, CommandParseError> {
    parse_wire_date(value).map_err(|source| CommandParseError::InvalidDate {
        value: value.to_string(),
        context,
        source,
    })
}

fn parse_position(value: &str) -> Result<Position, CommandParseError> {
    value
        .parse::<Position>()
        .map_err(|source| CommandParseError::InvalidPosition {
            value: value.to_string(),
            source,
        })
}

fn parse_toggle(value: Option<&str>) -> Result<Option<bool>, CommandParseError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("toggle") => Ok(None),
        Some("on") | Some("true") | Some("yes") => Ok(Some(true)),
        Some("off") | Some("false") | Some("no") => Ok(Some(false)),
        Some(other) => Err(CommandParseError::InvalidToggle(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(text: &str) -> Position {
        text.parse().unwrap()
    }

    #[test]
    fn parses_navigation_commands() {
        assert_eq!(
            parse_command_line("date 2023-05-01").unwrap(),
            InspectorCommand::SetDate(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap())
        );
        assert_eq!(parse_command_line("  NEXT ").unwrap(), InspectorCommand::NextChange);
        assert_eq!(parse_command_line("prev").unwrap(), InspectorCommand::PrevChange);
        assert_eq!(
            parse_command_line("view riskOfLoss").unwrap(),
            InspectorCommand::View("riskOfLoss".to_string())
        );
    }

    #[test]
    fn parses_toggles() {
        assert_eq!(
            parse_command_line("ids").unwrap(),
            InspectorCommand::ShowSegmentIds(None)
        );
        assert_eq!(
            parse_command_line("spares on").unwrap(),
            InspectorCommand::ShowSpares(Some(true))
        );
        assert!(matches!(
            parse_command_line("ids maybe"),
            Err(CommandParseError::InvalidToggle(_))
        ));
    }

    #[test]
    fn parses_set_position_with_empty_marker() {
        assert_eq!(
            parse_command_line("set A1 SN001 2023-05-01").unwrap(),
            InspectorCommand::SetPosition {
                position: pos("A1"),
                segment_id: Some("SN001".to_string()),
                date: NaiveDate::from_ymd_opt(2023, 5, 1),
            }
        );
        assert_eq!(
            parse_command_line("set F82 empty").unwrap(),
            InspectorCommand::SetPosition {
                position: pos("F82"),
                segment_id: None,
                date: None,
            }
        );
    }

    #[test]
    fn parses_export_scope_and_path() {
        assert_eq!(
            parse_command_line("export recent out.json").unwrap(),
            InspectorCommand::Export {
                scope: ExportScope::Recent,
                path: "out.json".to_string(),
            }
        );
        assert_eq!(
            parse_command_line("export segments.json").unwrap(),
            InspectorCommand::Export {
                scope: ExportScope::All,
                path: "segments.json".to_string(),
            }
        );
        assert!(matches!(
            parse_command_line("export weekly"),
            Err(CommandParseError::InvalidExportScope(_))
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_command_line("   "), Err(CommandParseError::Empty)));
        assert!(matches!(
            parse_command_line("launch"),
            Err(CommandParseError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_command_line("select Z9"),
            Err(CommandParseError::InvalidPosition { .. })
        ));
        assert!(matches!(
            parse_command_line("date yesterday"),
            Err(CommandParseError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_command_line("set A1"),
            Err(CommandParseError::MissingArgument("segment id"))
        ));
        assert!(matches!(
            parse_command_line("refresh now"),
            Err(CommandParseError::TrailingArgument(_))
        ));
    }
}
