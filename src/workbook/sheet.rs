use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{
    Result,
    error::XlsxError,
    workbook::{
        WorkbookWriter, cell_ref,
        cell::{Cell, CellType, Column, DocumentInfo, Row, oa_date, parse_datetime},
        templates, xml_escape,
    },
};

/// Deduplicating store for cell text, backing `xl/sharedStrings.xml`.
///
/// Values are XML-escaped before lookup, so strings that differ only in
/// escapable characters still dedupe and the stored table is ready for
/// direct emission. An entry's index is its zero-based first-insertion
/// position; entries are never removed or reordered.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    index: HashMap<String, usize>,
    ordered: Vec<String>,
}

impl SharedStrings {
    pub fn new() -> Self {
        SharedStrings::default()
    }

    /// Escape `raw` and return its table index, inserting it on first sight.
    pub fn intern(&mut self, raw: &str) -> usize {
        let escaped = xml_escape(raw);
        if let Some(&i) = self.index.get(&escaped) {
            return i;
        }
        let i = self.ordered.len();
        self.index.insert(escaped.clone(), i);
        self.ordered.push(escaped);
        i
    }

    /// The escaped entries in insertion order; position `i` holds the
    /// string cells referencing index `i`.
    pub fn export(&self) -> Vec<String> {
        self.ordered.clone()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// An in-memory worksheet for buffered use: rows accumulate here and are
/// streamed out in one go by [`Sheet::save_to_writer`].
#[derive(Debug, Clone)]
pub struct Sheet {
    pub title: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    shared: SharedStrings,
    pub document_info: DocumentInfo,
}

impl Default for Sheet {
    /// A sheet with no column schema, for wholly inline-string rows.
    fn default() -> Self {
        Sheet::new(Vec::new())
    }
}

impl Sheet {
    pub fn new(columns: Vec<Column>) -> Self {
        Sheet {
            title: "Data".to_string(),
            columns,
            rows: Vec::new(),
            shared: SharedStrings::new(),
            document_info: DocumentInfo::default(),
        }
    }

    pub fn with_title(title: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut s = Sheet::new(columns);
        s.title = title.into();
        s
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A row pre-sized to the column count with empty Number cells;
    /// callers fill every slot before appending.
    pub fn new_row(&self) -> Row {
        Row {
            cells: vec![Cell::empty(); self.columns.len()],
        }
    }

    /// Append a copy of `row`, resolving cell values against this sheet:
    /// string cells are interned and store their table index, datetime
    /// cells are validated as RFC 3339 (malformed values are an error,
    /// matching the streaming path) but keep their original text so the
    /// sheet writer encodes them once, at render time.
    pub fn append_row(&mut self, row: Row) -> Result<()> {
        if row.cells.len() != self.columns.len() {
            return Err(XlsxError::Arity {
                expected: self.columns.len(),
                actual: row.cells.len(),
            });
        }

        let mut cells = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let mut cell = cell.clone();
            match cell.cell_type {
                CellType::String => {
                    cell.value = self.shared.intern(&cell.value).to_string();
                }
                CellType::Datetime => {
                    oa_date(&parse_datetime(&cell.value)?)?;
                }
                CellType::Number | CellType::InlineString => {}
            }
            cells.push(cell);
        }

        self.rows.push(Row { cells });
        Ok(())
    }

    /// The shared strings in the order they were interned.
    pub fn shared_strings(&self) -> &[String] {
        self.shared.as_slice()
    }

    /// One-shot buffered export to `path`.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.save_to_writer(BufWriter::new(file))
    }

    /// One-shot buffered export: one workbook, one sheet, all rows, then
    /// the shared-string hand-off and close.
    pub fn save_to_writer<W: Write + Seek>(&self, sink: W) -> Result<()> {
        let mut workbook = WorkbookWriter::new(sink);
        let writer = workbook.new_sheet_writer(self)?;
        writer.write_rows(&self.rows)?;
        workbook.set_shared_strings(self.shared.export());
        workbook.close()
    }
}

/// The streaming core: renders row batches straight into a per-sheet
/// spool file. Resident state is the current row plus the recorded merge
/// ranges, independent of total row count.
///
/// Created through [`WorkbookWriter::new_sheet_writer`], which writes the
/// worksheet prologue immediately. Rows are numbered in call order; the
/// dimension footer and merge metadata are emitted on [`SheetWriter::close`].
pub struct SheetWriter {
    spool: BufWriter<NamedTempFile>,
    current_row: u64,
    max_cols: u64,
    merge_cells: Vec<String>,
    closed: bool,
}

impl SheetWriter {
    pub(crate) fn new(sheet: &Sheet) -> Result<Self> {
        let mut spool = BufWriter::new(NamedTempFile::new()?);
        spool.write_all(templates::sheet_start_xml(sheet.columns()).as_bytes())?;

        Ok(SheetWriter {
            spool,
            current_row: 0,
            max_cols: 0,
            merge_cells: Vec::new(),
            closed: false,
        })
    }

    /// Write a batch of rows at the next absolute row positions.
    ///
    /// Rows within the batch are numbered `current_row + 1 ..`, and the
    /// counter advances by the batch size afterwards, so successive calls
    /// append contiguously. Panics if the writer is already closed or a
    /// cell carries a zero colspan.
    pub fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        assert!(!self.closed, "can not write to closed sheet writer");

        for (i, row) in rows.iter().enumerate() {
            let row_index = self.current_row + i as u64;

            if row.cells.len() as u64 > self.max_cols {
                self.max_cols = row.cells.len() as u64;
            }

            write!(self.spool, "<row r=\"{}\">", row_index + 1)?;

            for (col, cell) in row.cells.iter().enumerate() {
                let col = col as u64;
                assert!(cell.colspan >= 1, "{} is not a valid colspan", cell.colspan);

                if cell.colspan > 1 {
                    let start = cell_ref(col, row_index);
                    let end = cell_ref(col + u64::from(cell.colspan) - 1, row_index);
                    self.merge_cells.push(format!("{start}:{end}"));
                }

                write_cell(&mut self.spool, col, row_index, cell)?;
            }

            write!(self.spool, "</row>")?;
        }

        self.current_row += rows.len() as u64;
        Ok(())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Emit the dimension footer, close `<sheetData>`, list any merged
    /// ranges, and close the worksheet element. Panics on a second close.
    pub fn close(&mut self) -> Result<()> {
        assert!(!self.closed, "sheet writer already closed");

        // An empty sheet saturates to A1:A1.
        let end = cell_ref(
            self.max_cols.saturating_sub(1),
            self.current_row.saturating_sub(1),
        );
        write!(self.spool, "<dimension ref=\"A1:{end}\"/></sheetData>")?;

        if !self.merge_cells.is_empty() {
            write!(self.spool, "<mergeCells count=\"{}\">", self.merge_cells.len())?;
            for range in &self.merge_cells {
                write!(self.spool, "<mergeCell ref=\"{range}\"/>")?;
            }
            write!(self.spool, "</mergeCells>")?;
        }

        write!(self.spool, "</worksheet>")?;
        self.spool.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Hand the finished spool back for copying into the archive.
    pub(crate) fn into_spool(self) -> Result<NamedTempFile> {
        self.spool
            .into_inner()
            .map_err(|e| XlsxError::Io(e.into_error()))
    }
}

/// Render one `<c>` element at the given zero-based position.
///
/// String cells are assumed to already hold their shared-string index;
/// datetime cells are parsed and encoded here, with failures propagated;
/// inline strings are escaped per occurrence and never interned.
fn write_cell<W: Write>(w: &mut W, col: u64, row: u64, cell: &Cell) -> Result<()> {
    let r = cell_ref(col, row);
    match cell.cell_type {
        CellType::String => {
            write!(w, "<c r=\"{r}\" t=\"s\" s=\"1\"><v>{}</v></c>", cell.value)?;
        }
        CellType::Number => {
            write!(w, "<c r=\"{r}\" t=\"n\" s=\"1\"><v>{}</v></c>", cell.value)?;
        }
        CellType::Datetime => {
            let encoded = oa_date(&parse_datetime(&cell.value)?)?;
            write!(w, "<c r=\"{r}\" s=\"2\"><v>{encoded}</v></c>")?;
        }
        CellType::InlineString => {
            write!(
                w,
                "<c r=\"{r}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                xml_escape(&cell.value)
            )?;
        }
    }
    Ok(())
}
