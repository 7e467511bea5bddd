//! Data contracts shared between the segment database backend, the mirror
//! core and the inspector.
//!
//! Field names follow the JSON produced by the backend (`maybeId`,
//! `originalPartnerBlankAllocation`, ...), so every type here can be fed
//! straight from a REST answer or an offline snapshot file.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of positions in every sector, prime or spare.
pub const SEGMENTS_PER_SECTOR: u8 = 82;

/// Number of prime sectors (A-F).
pub const PRIME_SECTOR_COUNT: usize = 6;

/// Total number of prime positions on the mirror.
pub const PRIME_POSITION_COUNT: usize = PRIME_SECTOR_COUNT * SEGMENTS_PER_SECTOR as usize;

/// Date format used on the wire and in export documents.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One of the seven 60 degree divisions of the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sector {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Sector {
    pub const ALL: [Sector; 7] = [
        Sector::A,
        Sector::B,
        Sector::C,
        Sector::D,
        Sector::E,
        Sector::F,
        Sector::G,
    ];

    pub const PRIME: [Sector; PRIME_SECTOR_COUNT] = [
        Sector::A,
        Sector::B,
        Sector::C,
        Sector::D,
        Sector::E,
        Sector::F,
    ];

    pub fn letter(self) -> char {
        match self {
            Sector::A => 'A',
            Sector::B => 'B',
            Sector::C => 'C',
            Sector::D => 'D',
            Sector::E => 'E',
            Sector::F => 'F',
            Sector::G => 'G',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Sector::A),
            'B' => Some(Sector::B),
            'C' => Some(Sector::C),
            'D' => Some(Sector::D),
            'E' => Some(Sector::E),
            'F' => Some(Sector::F),
            'G' => Some(Sector::G),
            _ => None,
        }
    }

    /// Numeric sector as used by the issue tracker (A = 1 ... G = 7).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn is_spare(self) -> bool {
        self == Sector::G
    }

    /// All positions of this sector in label order.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        (1..=SEGMENTS_PER_SECTOR).map(move |index| Position {
            sector: self,
            index,
        })
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionParseError {
    #[error("empty position")]
    Empty,
    #[error("invalid sector letter '{0}'")]
    InvalidSector(char),
    #[error("invalid position index '{0}'")]
    InvalidIndex(String),
    #[error("position index {0} outside 1..=82")]
    OutOfRange(u32),
}

/// Addressable location on the mirror, e.g. `A23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    sector: Sector,
    index: u8,
}

impl Position {
    pub fn new(sector: Sector, index: u8) -> Result<Self, PositionParseError> {
        if index == 0 || index > SEGMENTS_PER_SECTOR {
            return Err(PositionParseError::OutOfRange(index as u32));
        }
        Ok(Self { sector, index })
    }

    pub fn sector(self) -> Sector {
        self.sector
    }

    /// 1-based index within the sector.
    pub fn index(self) -> u8 {
        self.index
    }

    pub fn is_spare(self) -> bool {
        self.sector.is_spare()
    }

    /// Every position of the mirror, prime sectors first.
    pub fn all() -> impl Iterator<Item = Position> {
        Sector::ALL.into_iter().flat_map(Sector::positions)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sector.letter(), self.index)
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(PositionParseError::Empty)?;
        let sector = Sector::from_letter(letter.to_ascii_uppercase())
            .ok_or(PositionParseError::InvalidSector(letter))?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PositionParseError::InvalidIndex(digits.to_string()));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| PositionParseError::InvalidIndex(digits.to_string()))?;
        if index == 0 || index > SEGMENTS_PER_SECTOR as u32 {
            return Err(PositionParseError::OutOfRange(index));
        }
        Ok(Self {
            sector,
            index: index as u8,
        })
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Parses `yyyy-MM-dd`, also accepting a full ISO timestamp by keeping its
/// date part.
pub fn parse_wire_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    let trimmed = text.trim().trim_matches('"');
    let date_part = match trimmed.get(..10) {
        Some(prefix) if trimmed.len() > 10 => prefix,
        _ => trimmed,
    };
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
}

pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serde adapter for backend dates: written as `yyyy-MM-dd`, read from
/// either that form or epoch milliseconds.
pub mod wire_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(super::DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        match RawDate::deserialize(deserializer)? {
            RawDate::Millis(millis) => DateTime::from_timestamp_millis(millis)
                .map(|stamp| stamp.date_naive())
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}"))),
            RawDate::Text(text) => super::parse_wire_date(&text).map_err(de::Error::custom),
        }
    }
}

/// A bare date answer (`nextChange`, `prevChange`, `mostRecentChange`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireDate(#[serde(with = "wire_date")] pub NaiveDate);

/// State of one position as of a date: occupied when `maybe_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentToM1Pos {
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    #[serde(rename = "maybeId", default, skip_serializing_if = "Option::is_none")]
    pub maybe_id: Option<String>,
    pub position: Position,
}

impl SegmentToM1Pos {
    pub fn installed(position: Position, segment_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            date,
            maybe_id: Some(segment_id.into()),
            position,
        }
    }

    pub fn empty(position: Position, date: NaiveDate) -> Self {
        Self {
            date,
            maybe_id: None,
            position,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.maybe_id.is_some()
    }
}

/// Bulk state of all positions: pairs of `(segment id or null, position)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentToM1Positions {
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub positions: Vec<(Option<String>, Position)>,
}

impl SegmentToM1Positions {
    pub fn records(&self) -> impl Iterator<Item = SegmentToM1Pos> + '_ {
        self.positions
            .iter()
            .map(|(maybe_id, position)| SegmentToM1Pos {
                date: self.date,
                maybe_id: maybe_id.clone(),
                position: *position,
            })
    }
}

/// Per-position record imported from the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSegmentData {
    pub position: Position,
    #[serde(default)]
    pub segment_id: String,
    #[serde(default)]
    pub jira_key: String,
    #[serde(default)]
    pub jira_uri: String,
    #[serde(default)]
    pub sector: u8,
    #[serde(default)]
    pub segment_type: u32,
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub original_partner_blank_allocation: String,
    #[serde(default)]
    pub item_location: String,
    #[serde(default)]
    pub risk_of_loss: String,
    #[serde(default)]
    pub components: String,
    #[serde(default)]
    pub status: String,
}

impl JiraSegmentData {
    /// Record with only the addressing fields set.
    pub fn for_position(position: Position) -> Self {
        Self {
            position,
            segment_id: String::new(),
            jira_key: String::new(),
            jira_uri: String::new(),
            sector: position.sector().number(),
            segment_type: 0,
            part_number: String::new(),
            original_partner_blank_allocation: String::new(),
            item_location: String::new(),
            risk_of_loss: String::new(),
            components: String::new(),
            status: String::new(),
        }
    }

    /// Spare segments carry a tracker sector number of 7 or more.
    pub fn is_spare(&self) -> bool {
        self.sector >= 7
    }

    pub fn planned_segment_id(&self) -> Option<&str> {
        let id = self.segment_id.trim();
        (!id.is_empty()).then_some(id)
    }
}
