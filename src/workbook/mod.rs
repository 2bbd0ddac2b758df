//! Workbook orchestration and the coordinate codec.
//!
//! A [`WorkbookWriter`] wraps the output sink in a zip writer, hands out
//! one streaming [`SheetWriter`] at a time, and on close writes the fixed
//! structural parts before copying each finished worksheet body into its
//! `xl/worksheets/sheet{N}.xml` entry.

use std::io::{self, Seek, SeekFrom, Write};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::Result;

pub mod cell;
pub mod sheet;
pub mod templates;

pub use cell::{Cell, CellType, Column, DocumentInfo, Row, oa_date, parse_datetime};
pub use sheet::{SharedStrings, Sheet, SheetWriter};

/// From a zero-based column number return the spreadsheet column name,
/// in bijective base 26: 0 => "A", 25 => "Z", 26 => "AA".
pub fn col_name(n: u64) -> String {
    let mut n = n + 1;
    let mut name = String::new();

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}

/// Decode a column name back to its zero-based number; inverse of
/// [`col_name`]. Returns `None` for empty or non-alphabetic input.
pub fn col_index(name: &str) -> Option<u64> {
    if name.is_empty() {
        return None;
    }

    let mut col: u64 = 0;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let upper = ch.to_ascii_uppercase();
        col = col * 26 + (upper as u64 - 'A' as u64 + 1);
    }

    Some(col - 1)
}

/// Given zero-based column and row indices output the spreadsheet cell
/// reference: (0, 0) => "A1"; (2, 2) => "C3"; (26, 45) => "AA46".
pub fn cell_ref(col: u64, row: u64) -> String {
    format!("{}{}", col_name(col), row + 1)
}

pub(crate) fn xml_escape(s: &str) -> String {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Writes an XLSX workbook to a seekable sink.
///
/// At most one sheet writer is open at a time: opening the next one (or
/// closing the workbook) closes the previous writer first. `close`
/// consumes the workbook, so writing after close or closing twice is
/// rejected at compile time rather than at run time.
pub struct WorkbookWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    sheets: Vec<SheetWriter>,
    sheet_names: Vec<String>,
    shared_strings: Vec<String>,
    document_info: Option<DocumentInfo>,
}

impl<W: Write + Seek> WorkbookWriter<W> {
    /// Wrap `sink` in an archive writer. Nothing is written until sheets
    /// are opened and the workbook is closed.
    pub fn new(sink: W) -> Self {
        WorkbookWriter {
            zip: ZipWriter::new(sink),
            sheets: Vec::new(),
            sheet_names: Vec::new(),
            shared_strings: Vec::new(),
            document_info: None,
        }
    }

    /// Open a streaming writer for the next worksheet, closing the
    /// previous one if the caller left it open (a close failure aborts
    /// the open). The new sheet takes the next 1-based archive ordinal
    /// and its title joins the workbook manifest; its worksheet prologue
    /// (column widths included) is written immediately.
    ///
    /// All rows must be written before the next `new_sheet_writer` or
    /// `close` call.
    pub fn new_sheet_writer(&mut self, sheet: &Sheet) -> Result<&mut SheetWriter> {
        if let Some(prev) = self.sheets.last_mut() {
            if !prev.is_closed() {
                prev.close()?;
            }
        }

        let writer = SheetWriter::new(sheet)?;
        self.sheet_names.push(sheet.title.clone());
        self.document_info = Some(sheet.document_info.clone());
        self.sheets.push(writer);

        Ok(self.sheets.last_mut().expect("sheet writer just pushed"))
    }

    /// Hand over the exported shared-string table to be rendered at
    /// close. The buffered path ([`Sheet::save_to_writer`]) does this
    /// automatically; streaming callers that interned strings themselves
    /// do it before `close`.
    pub fn set_shared_strings(&mut self, strings: Vec<String>) {
        self.shared_strings = strings;
    }

    /// Close any open sheet writer, write the fixed parts and the shared
    /// strings, copy each worksheet body into the archive, and finish the
    /// zip. Covers the zero-sheet case: the fixed parts are always
    /// written.
    pub fn close(mut self) -> Result<()> {
        if let Some(writer) = self.sheets.last_mut() {
            if !writer.is_closed() {
                writer.close()?;
            }
        }

        let WorkbookWriter {
            mut zip,
            sheets,
            sheet_names,
            shared_strings,
            document_info,
        } = self;

        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let info = document_info.unwrap_or_default();

        zip_write_str(
            &mut zip,
            "[Content_Types].xml",
            &templates::content_types_xml(&sheet_names),
            options,
        )?;
        zip_write_str(&mut zip, "_rels/.rels", templates::RELS_DOT_RELS, options)?;
        zip_write_str(
            &mut zip,
            "docProps/app.xml",
            &templates::app_xml(&sheet_names),
            options,
        )?;
        zip_write_str(
            &mut zip,
            "docProps/core.xml",
            &templates::core_xml(&info),
            options,
        )?;
        zip_write_str(
            &mut zip,
            "xl/workbook.xml",
            &templates::workbook_xml(&sheet_names),
            options,
        )?;
        zip_write_str(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &templates::workbook_rels_xml(sheet_names.len()),
            options,
        )?;
        zip_write_str(&mut zip, "xl/styles.xml", templates::STYLES, options)?;
        zip_write_str(
            &mut zip,
            "xl/sharedStrings.xml",
            &templates::shared_strings_xml(&shared_strings),
            options,
        )?;

        for (i, writer) in sheets.into_iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            let mut spool = writer.into_spool()?;
            spool.seek(SeekFrom::Start(0))?;
            io::copy(&mut spool, &mut zip)?;
        }

        let mut sink = zip.finish()?;
        sink.flush()?;
        Ok(())
    }
}

pub(crate) fn zip_write_str<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    content: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(path, options)?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}
