//! Renderers for the fixed XML parts of the archive.
//!
//! These parts are written once per workbook. They depend on the sheet
//! title list, the document properties, and the shared-string table, but
//! never on row content.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::workbook::{
    cell::{Column, DocumentInfo},
    xml_escape,
};

pub(crate) const RELS_DOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#,
);

/// Fixed style sheet: three number formats (thousands-separated currency,
/// date-time, date-only), two fonts, minimal fills and borders. Cells
/// reference `cellXfs` entries 1 (text/number) and 2 (datetime).
pub(crate) const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="x14ac" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac">"#,
    r#"<numFmts count="3">"#,
    r#"<numFmt numFmtId="43" formatCode="_-* #,##0.00_-;\-* #,##0.00_-;_-* &quot;-&quot;??_-;_-@_-"/>"#,
    r#"<numFmt numFmtId="164" formatCode="yyyy\-mm\-dd\ hh:mm"/>"#,
    r#"<numFmt numFmtId="165" formatCode="yyyy\-mm\-dd;@"/>"#,
    r#"</numFmts>"#,
    r#"<fonts count="2" x14ac:knownFonts="1">"#,
    r#"<font><sz val="11"/><color rgb="FF000000"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font>"#,
    r#"<font><sz val="11"/><color rgb="FF000000"/><name val="Arial Unicode MS"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="3">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
    r#"<xf numFmtId="164" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="0"/>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"<dxfs count="0"/>"#,
    r#"<tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/>"#,
    r#"</styleSheet>"#,
);

pub(crate) fn content_types_xml(sheet_names: &[String]) -> String {
    let mut overrides = String::new();
    for i in 1..=sheet_names.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"{}"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
            r#"</Types>"#,
        ),
        overrides
    )
}

pub(crate) fn workbook_xml(sheet_names: &[String]) -> String {
    let mut sheets = String::new();
    for (i, name) in sheet_names.iter().enumerate() {
        let sheet_id = i + 1;
        let escaped_name = xml_escape(name);
        sheets.push_str(&format!(
            r#"<sheet name="{escaped_name}" sheetId="{sheet_id}" r:id="rId{sheet_id}"/>"#
        ));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<fileVersion appName="xl" lastEdited="5" lowestEdited="5" rupBuild="9303"/>"#,
            r#"<workbookPr defaultThemeVersion="124226"/>"#,
            r#"<bookViews><workbookView xWindow="480" yWindow="60" windowWidth="18195" windowHeight="8505"/></bookViews>"#,
            r#"<sheets>{}</sheets>"#,
            r#"<calcPr calcId="145621"/>"#,
            r#"</workbook>"#,
        ),
        sheets
    )
}

pub(crate) fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }

    let strings_id = sheet_count + 1;
    let styles_id = sheet_count + 2;
    rels.push_str(&format!(
        r#"<Relationship Id="rId{strings_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#
    ));
    rels.push_str(&format!(
        r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    ));

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"{}"#,
            r#"</Relationships>"#,
        ),
        rels
    )
}

fn w3cdtf(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn core_xml(info: &DocumentInfo) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:creator>{}</dc:creator>"#,
            r#"<cp:lastModifiedBy>{}</cp:lastModifiedBy>"#,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            r#"</cp:coreProperties>"#,
        ),
        xml_escape(&info.created_by),
        xml_escape(&info.modified_by),
        w3cdtf(&info.created_at),
        w3cdtf(&info.modified_at),
    )
}

pub(crate) fn app_xml(sheet_names: &[String]) -> String {
    let mut titles = String::new();
    for name in sheet_names {
        titles.push_str(&format!("<vt:lpstr>{}</vt:lpstr>", xml_escape(name)));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            r#"<Application>None</Application>"#,
            r#"<DocSecurity>0</DocSecurity>"#,
            r#"<ScaleCrop>false</ScaleCrop>"#,
            r#"<HeadingPairs><vt:vector size="2" baseType="variant">"#,
            r#"<vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant>"#,
            r#"<vt:variant><vt:i4>{}</vt:i4></vt:variant>"#,
            r#"</vt:vector></HeadingPairs>"#,
            r#"<TitlesOfParts><vt:vector size="{}" baseType="lpstr">{}</vt:vector></TitlesOfParts>"#,
            r#"<LinksUpToDate>false</LinksUpToDate>"#,
            r#"<SharedDoc>false</SharedDoc>"#,
            r#"<HyperlinksChanged>false</HyperlinksChanged>"#,
            r#"</Properties>"#,
        ),
        sheet_names.len(),
        sheet_names.len(),
        titles
    )
}

/// The entries are stored pre-escaped by the shared-string table, so they
/// are emitted verbatim and each `<si>` position equals the index cells
/// reference.
pub(crate) fn shared_strings_xml(strings: &[String]) -> String {
    let mut entries = String::new();
    for s in strings {
        entries.push_str(&format!("<si><t>{s}</t></si>"));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
        ),
        strings.len(),
        entries
    )
}

/// Worksheet prologue: sheet-view defaults, per-column widths (1-based
/// ordinals), and the opening `<sheetData>` tag. The sheet writer appends
/// rows after this and closes the element on `close`.
pub(crate) fn sheet_start_xml(columns: &[Column]) -> String {
    let mut cols = String::new();
    if !columns.is_empty() {
        cols.push_str("<cols>");
        for (i, c) in columns.iter().enumerate() {
            let ordinal = i + 1;
            cols.push_str(&format!(
                r#"<col min="{ordinal}" max="{ordinal}" width="{}" customWidth="1" style="1"/>"#,
                c.width
            ));
        }
        cols.push_str("</cols>");
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
            r#"mc:Ignorable="x14ac" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac">"#,
            r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#,
            r#"<sheetFormatPr defaultRowHeight="15" x14ac:dyDescent="0.25"/>"#,
            r#"{}"#,
            r#"<sheetData>"#,
        ),
        cols
    )
}
