//! Test fixtures: minimal OpenDocument spreadsheets written with `zip`.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

const MANIFEST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
 <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#;

/// Write a single-sheet `.ods` file.
///
/// Cells that parse as numbers become float cells, `true`/`false` become
/// boolean cells, empty strings become empty cells, anything else is text.
pub fn write_ods(path: &Path, rows: &[&[&str]]) {
    let file = File::create(path).expect("create fixture");
    let mut zip = ZipWriter::new(file);
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);

    // mimetype must come first and uncompressed
    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(MIMETYPE.as_bytes()).unwrap();

    zip.start_file("META-INF/manifest.xml", FileOptions::default())
        .unwrap();
    zip.write_all(MANIFEST_XML.as_bytes()).unwrap();

    zip.start_file("content.xml", FileOptions::default()).unwrap();
    zip.write_all(content_xml(rows).as_bytes()).unwrap();

    zip.finish().unwrap();
}

fn content_xml(rows: &[&[&str]]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2"><office:body><office:spreadsheet><table:table table:name="Sheet1">"#,
    );

    for row in rows {
        xml.push_str("<table:table-row>");
        for cell in row.iter() {
            xml.push_str(&cell_xml(cell));
        }
        xml.push_str("</table:table-row>");
    }

    xml.push_str("</table:table></office:spreadsheet></office:body></office:document-content>");
    xml
}

fn cell_xml(cell: &str) -> String {
    if cell.is_empty() {
        return "<table:table-cell/>".to_string();
    }
    if cell == "true" || cell == "false" {
        return format!(
            r#"<table:table-cell office:value-type="boolean" office:boolean-value="{0}"><text:p>{0}</text:p></table:table-cell>"#,
            cell
        );
    }
    if cell.parse::<f64>().is_ok() {
        return format!(
            r#"<table:table-cell office:value-type="float" office:value="{0}"><text:p>{0}</text:p></table:table-cell>"#,
            cell
        );
    }
    format!(
        r#"<table:table-cell office:value-type="string"><text:p>{}</text:p></table:table-cell>"#,
        escape(cell)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
