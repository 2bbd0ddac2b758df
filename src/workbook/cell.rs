use chrono::{DateTime, Timelike, Utc};

use crate::{Result, error::XlsxError};

/// Seconds between the Unix epoch and 1899-12-30T00:00:00Z, the OLE
/// Automation date epoch (25569 days before 1970-01-01).
const OA_EPOCH_UNIX_SECONDS: i64 = -2_209_161_600;

const SECONDS_PER_DAY: i64 = 86_400;

/// The value types a cell supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellType {
    /// Numeric literal, written verbatim into `<v>`.
    #[default]
    Number,
    /// Text resolved through the shared-string table; the cell stores the
    /// table index once the sheet has interned it.
    String,
    /// RFC 3339 timestamp, encoded as an OLE Automation day count.
    Datetime,
    /// Text embedded directly in the worksheet, never interned.
    InlineString,
}

/// A single spreadsheet cell: a type, the raw textual payload, and how
/// many columns it spans.
#[derive(Debug, Clone)]
pub struct Cell {
    pub cell_type: CellType,
    pub value: String,
    /// Number of columns this cell spans. Zero is caller error; the sheet
    /// writer panics on it.
    pub colspan: u32,
}

// shorthand constructors
impl Cell {
    pub fn number(value: impl Into<String>) -> Self {
        Cell {
            cell_type: CellType::Number,
            value: value.into(),
            colspan: 1,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Cell {
            cell_type: CellType::String,
            value: value.into(),
            colspan: 1,
        }
    }

    /// A datetime cell; `value` must be RFC 3339, e.g. `2014-12-20T00:00:00Z`.
    pub fn datetime(value: impl Into<String>) -> Self {
        Cell {
            cell_type: CellType::Datetime,
            value: value.into(),
            colspan: 1,
        }
    }

    pub fn inline_string(value: impl Into<String>) -> Self {
        Cell {
            cell_type: CellType::InlineString,
            value: value.into(),
            colspan: 1,
        }
    }

    /// Span `n` columns; the merged range is recorded when the cell is written.
    pub fn colspan(mut self, n: u32) -> Self {
        self.colspan = n;
        self
    }

    /// An empty Number cell, the zero value used by [`super::Sheet::new_row`].
    pub(crate) fn empty() -> Self {
        Cell {
            cell_type: CellType::Number,
            value: String::new(),
            colspan: 1,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

/// An ordered run of cells. Its length must match the owning sheet's
/// column count at the point of append.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row { cells }
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row { cells }
    }
}

/// A worksheet column: header name and display width in character units.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub width: f64,
}

impl Column {
    pub fn new(name: impl Into<String>, width: f64) -> Self {
        Column {
            name: name.into(),
            width,
        }
    }
}

/// Workbook document properties, written into `docProps/core.xml`.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub created_by: String,
    pub modified_by: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        let now = Utc::now();
        DocumentInfo {
            created_by: "xlsxstream".to_string(),
            modified_by: "xlsxstream".to_string(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// Parse an RFC 3339 timestamp. Malformed input is a hard error in both
/// the buffered and streaming paths.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// Convert a datetime to the OLE Automation format: fractional days since
/// 1899-12-30T00:00:00Z. Exact midnight renders as a bare integer,
/// anything else as a fixed-point value with six fractional digits.
///
/// Datetimes before the epoch have no agreed encoding here and are
/// rejected rather than silently producing a negative day count.
pub fn oa_date(d: &DateTime<Utc>) -> Result<String> {
    let secs = d.timestamp() - OA_EPOCH_UNIX_SECONDS;
    if secs < 0 {
        return Err(XlsxError::PreEpochDatetime(d.to_rfc3339()));
    }

    if d.hour() == 0 && d.minute() == 0 && d.second() == 0 {
        Ok((secs / SECONDS_PER_DAY).to_string())
    } else {
        Ok(format!("{:.6}", secs as f64 / SECONDS_PER_DAY as f64))
    }
}
