//! End-to-end tests: write a workbook into memory, then read the archive
//! back and check the emitted parts.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use xlsxstream::workbook::{Cell, Column, Row, Sheet, WorkbookWriter};

fn three_column_sheet() -> Sheet {
    Sheet::new(vec![
        Column::new("Amount", 10.0),
        Column::new("Name", 20.0),
        Column::new("Date", 16.0),
    ])
}

fn read_part(archive_bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes.to_vec())).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

fn part_names(archive_bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(archive_bytes.to_vec())).unwrap();
    archive.file_names().map(|n| n.to_string()).collect()
}

/// Collect the `r` attribute of every `<row>` element in a worksheet part.
fn row_numbers(worksheet_xml: &str) -> Vec<u64> {
    let mut reader = Reader::from_str(worksheet_xml);
    let mut rows = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"row" => {
                for attr in e.attributes() {
                    let attr = attr.unwrap();
                    if attr.key.as_ref() == b"r" {
                        let v = String::from_utf8_lossy(&attr.value).parse().unwrap();
                        rows.push(v);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    rows
}

/// Collect the text of every `<si><t>` entry in a sharedStrings part.
fn shared_string_entries(sst_xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(sst_xml);
    let mut entries = Vec::new();
    let mut in_t = false;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"t" => in_t = true,
            Event::End(e) if e.name().as_ref() == b"t" => in_t = false,
            Event::Text(t) if in_t => {
                entries.push(t.unescape().unwrap().into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    entries
}

#[test]
fn buffered_sheet_round_trips_through_the_archive() {
    let mut sheet = three_column_sheet();

    let mut row = sheet.new_row();
    row.cells[0] = Cell::number("10");
    row.cells[1] = Cell::string("Apple");
    row.cells[2] = Cell::datetime("1970-01-01T00:00:00Z");
    sheet.append_row(row).unwrap();

    let mut row = sheet.new_row();
    row.cells[0] = Cell::number("20");
    row.cells[1] = Cell::string("Apple");
    row.cells[2] = Cell::datetime("2014-12-20T00:00:00Z");
    sheet.append_row(row).unwrap();

    let mut out = Cursor::new(Vec::new());
    sheet.save_to_writer(&mut out).unwrap();
    let bytes = out.into_inner();

    let names = part_names(&bytes);
    for expected in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/app.xml",
        "docProps/core.xml",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/sharedStrings.xml",
        "xl/worksheets/sheet1.xml",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing part {expected}");
    }

    let worksheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert_eq!(row_numbers(&worksheet), vec![1, 2]);
    assert!(worksheet.contains("<dimension ref=\"A1:C2\"/>"));
    // "Apple" interned once, both rows reference index 0
    assert!(worksheet.contains("<c r=\"B1\" t=\"s\" s=\"1\"><v>0</v></c>"));
    assert!(worksheet.contains("<c r=\"B2\" t=\"s\" s=\"1\"><v>0</v></c>"));
    // epoch datetime renders as the integer OLE day count
    assert!(worksheet.contains("<c r=\"C1\" s=\"2\"><v>25569</v></c>"));
    assert!(worksheet.contains("<c r=\"C2\" s=\"2\"><v>41993</v></c>"));

    let sst = read_part(&bytes, "xl/sharedStrings.xml");
    assert_eq!(shared_string_entries(&sst), vec!["Apple"]);
    assert!(sst.contains("count=\"1\" uniqueCount=\"1\""));
}

#[test]
fn streaming_batches_number_rows_contiguously() {
    let sheet = Sheet::default();
    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);

    let writer = workbook.new_sheet_writer(&sheet).unwrap();
    let row = |s: &str| Row::new(vec![Cell::inline_string(s)]);
    writer.write_rows(&[row("a"), row("b")]).unwrap();
    writer.write_rows(&[row("c"), row("d"), row("e")]).unwrap();
    workbook.close().unwrap();

    let worksheet = read_part(&out.into_inner(), "xl/worksheets/sheet1.xml");
    assert_eq!(row_numbers(&worksheet), vec![1, 2, 3, 4, 5]);
    assert!(worksheet.contains("<dimension ref=\"A1:A5\"/>"));
    assert!(worksheet.contains("<c r=\"A3\" t=\"inlineStr\"><is><t>c</t></is></c>"));
}

#[test]
fn colspan_records_a_merge_range() {
    let sheet = Sheet::default();
    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);

    let writer = workbook.new_sheet_writer(&sheet).unwrap();
    let plain = Row::new(vec![
        Cell::inline_string("a"),
        Cell::inline_string("b"),
        Cell::inline_string("c"),
        Cell::inline_string("d"),
    ]);
    let spanned = Row::new(vec![
        Cell::inline_string("x"),
        Cell::inline_string("wide").colspan(3),
    ]);
    writer.write_rows(&[plain, spanned]).unwrap();
    workbook.close().unwrap();

    let worksheet = read_part(&out.into_inner(), "xl/worksheets/sheet1.xml");
    assert!(worksheet.contains("<mergeCells count=\"1\">"));
    assert!(worksheet.contains("<mergeCell ref=\"B2:D2\"/>"));
}

#[test]
fn multiple_sheets_land_in_open_order() {
    let first = Sheet::with_title("First", vec![Column::new("a", 10.0)]);
    let second = Sheet::with_title("Second", vec![Column::new("b", 10.0)]);

    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);

    let writer = workbook.new_sheet_writer(&first).unwrap();
    writer
        .write_rows(&[Row::new(vec![Cell::inline_string("one")])])
        .unwrap();
    // leaving the first writer open: new_sheet_writer closes it
    let writer = workbook.new_sheet_writer(&second).unwrap();
    writer
        .write_rows(&[Row::new(vec![Cell::inline_string("two")])])
        .unwrap();
    workbook.close().unwrap();

    let bytes = out.into_inner();
    let manifest = read_part(&bytes, "xl/workbook.xml");
    assert!(manifest.contains("<sheet name=\"First\" sheetId=\"1\" r:id=\"rId1\"/>"));
    assert!(manifest.contains("<sheet name=\"Second\" sheetId=\"2\" r:id=\"rId2\"/>"));

    let content_types = read_part(&bytes, "[Content_Types].xml");
    assert!(content_types.contains("/xl/worksheets/sheet1.xml"));
    assert!(content_types.contains("/xl/worksheets/sheet2.xml"));

    assert!(read_part(&bytes, "xl/worksheets/sheet2.xml").contains("<t>two</t>"));

    let app = read_part(&bytes, "docProps/app.xml");
    assert!(app.contains("<vt:i4>2</vt:i4>"));
    assert!(app.contains("<vt:lpstr>First</vt:lpstr><vt:lpstr>Second</vt:lpstr>"));
}

#[test]
fn zero_sheet_workbook_still_writes_the_fixed_parts() {
    let mut out = Cursor::new(Vec::new());
    let workbook = WorkbookWriter::new(&mut out);
    workbook.close().unwrap();

    let bytes = out.into_inner();
    let names = part_names(&bytes);
    assert!(names.iter().any(|n| n == "[Content_Types].xml"));
    assert!(names.iter().any(|n| n == "xl/styles.xml"));
    assert!(!names.iter().any(|n| n.starts_with("xl/worksheets/")));

    let sst = read_part(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains("count=\"0\" uniqueCount=\"0\""));
}

#[test]
fn empty_sheet_dimension_saturates_to_a1() {
    let sheet = Sheet::default();
    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);
    workbook.new_sheet_writer(&sheet).unwrap();
    workbook.close().unwrap();

    let worksheet = read_part(&out.into_inner(), "xl/worksheets/sheet1.xml");
    assert!(worksheet.contains("<dimension ref=\"A1:A1\"/>"));
}

#[test]
fn streaming_datetime_parse_failures_propagate() {
    let sheet = Sheet::default();
    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);

    let writer = workbook.new_sheet_writer(&sheet).unwrap();
    let result = writer.write_rows(&[Row::new(vec![Cell::datetime("yesterday")])]);
    assert!(result.is_err());
}

#[test]
fn save_to_file_produces_a_readable_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    let mut sheet = Sheet::new(vec![Column::new("Name", 20.0)]);
    let mut row = sheet.new_row();
    row.cells[0] = Cell::string("Apple");
    sheet.append_row(row).unwrap();
    sheet.save_to_file(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let worksheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(worksheet.contains("<c r=\"A1\" t=\"s\" s=\"1\"><v>0</v></c>"));
}

#[test]
#[should_panic(expected = "closed sheet writer")]
fn writing_after_close_is_a_fault() {
    let sheet = Sheet::default();
    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);

    let writer = workbook.new_sheet_writer(&sheet).unwrap();
    writer.close().unwrap();
    let _ = writer.write_rows(&[Row::new(vec![Cell::inline_string("late")])]);
}

#[test]
#[should_panic(expected = "not a valid colspan")]
fn zero_colspan_is_a_fault() {
    let sheet = Sheet::default();
    let mut out = Cursor::new(Vec::new());
    let mut workbook = WorkbookWriter::new(&mut out);

    let writer = workbook.new_sheet_writer(&sheet).unwrap();
    let _ = writer.write_rows(&[Row::new(vec![Cell::inline_string("x").colspan(0)])]);
}
