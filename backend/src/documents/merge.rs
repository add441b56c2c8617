//! Placeholder merge over the text parts of an OOXML package (`.docx` / `.xlsx`).
//!
//! Word and Excel split text into runs at arbitrary points, so a `{{NAME}}` token may be
//! spread across several `<w:t>` / `<t>` elements. The part is cut at every paragraph (or
//! shared string) tag, so a text box nested in a paragraph is a block of its own. Within a
//! block the run texts are joined to find placeholders; each value is written into the run
//! where its placeholder starts, the rest of the placeholder is cut from the runs it spans,
//! and runs without a placeholder are left byte for byte.

use super::GenerationError;
use common::model::values::resolve;
use common::model::FormValues;
use regex::{Captures, Regex};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

struct Patterns {
    word_boundary: Regex,
    word_text: Regex,
    shared_boundary: Regex,
    shared_string: Regex,
    sheet_text: Regex,
    placeholder: Regex,
}

impl Patterns {
    fn new() -> Result<Self, GenerationError> {
        Ok(Patterns {
            word_boundary: Regex::new(r"<w:p(?:\s[^>]*)?/?>|</w:p>")?,
            shared_boundary: Regex::new(r"<si(?:\s[^>]*)?/?>|</si>")?,
            word_text: Regex::new(r"(?s)(<w:t(?: [^>]*)?>)(.*?)(</w:t>)")?,
            shared_string: Regex::new(r"(?s)<si>.*?</si>")?,
            sheet_text: Regex::new(r"(?s)(<t(?: [^>]*)?>)(.*?)(</t>)")?,
            placeholder: Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}")?,
        })
    }
}

fn is_word_part(name: &str) -> bool {
    name == "word/document.xml"
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

fn is_shared_strings(name: &str) -> bool {
    name == "xl/sharedStrings.xml"
}

/// Returns a copy of the package with every placeholder replaced by its value.
pub fn merge_template(package: &[u8], values: &FormValues) -> Result<Vec<u8>, GenerationError> {
    let patterns = Patterns::new()?;
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let merged = if is_word_part(&name) {
            let xml = read_part(&mut entry, &name)?;
            Some(merge_blocks(&xml, &patterns.word_boundary, &patterns.word_text, &patterns, values))
        } else if is_shared_strings(&name) {
            let xml = read_part(&mut entry, &name)?;
            Some(merge_blocks(&xml, &patterns.shared_boundary, &patterns.sheet_text, &patterns, values))
        } else {
            None
        };

        match merged {
            Some(xml) => {
                writer.start_file(name, options)?;
                writer.write_all(xml.as_bytes())?;
            }
            None => writer.raw_copy_file(entry)?,
        }
    }

    Ok(writer.finish()?.into_inner())
}

/// Plain text of the document, one entry per paragraph (Word) or sheet row (Excel).
pub fn extract_lines(package: &[u8]) -> Result<Vec<String>, GenerationError> {
    let patterns = Patterns::new()?;
    let mut archive = ZipArchive::new(Cursor::new(package))?;

    if let Ok(mut entry) = archive.by_name("word/document.xml") {
        let xml = read_part(&mut entry, "word/document.xml")?;
        let mut lines = Vec::new();
        let mut opened = false;
        for segment in segments(&xml, &patterns.word_boundary) {
            let text = joined_text(segment.body, &patterns.word_text);
            if opened || !text.is_empty() {
                lines.push(text);
            }
            opened = segment
                .boundary
                .is_some_and(|tag| tag.starts_with("<w:p") && !tag.ends_with("/>"));
        }
        return Ok(lines);
    }

    let shared: Vec<String> = match archive.by_name("xl/sharedStrings.xml") {
        Ok(mut entry) => {
            let xml = read_part(&mut entry, "xl/sharedStrings.xml")?;
            patterns
                .shared_string
                .find_iter(&xml)
                .map(|item| joined_text(item.as_str(), &patterns.sheet_text))
                .collect()
        }
        Err(_) => Vec::new(),
    };

    let mut sheets: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/worksheets/sheet") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    sheets.sort();

    let row = Regex::new(r"(?s)<row[ >].*?</row>")?;
    let cell = Regex::new(r#"(?s)<c((?: [^>]*?)?)(?:/>|>(.*?)</c>)"#)?;
    let value = Regex::new(r"(?s)<v>(.*?)</v>")?;

    let mut lines = Vec::new();
    for sheet in sheets {
        let mut entry = archive.by_name(&sheet)?;
        let xml = read_part(&mut entry, &sheet)?;
        for row_match in row.find_iter(&xml) {
            let cells: Vec<String> = cell
                .captures_iter(row_match.as_str())
                .filter_map(|caps| {
                    let attrs = caps.get(1).map_or("", |m| m.as_str());
                    let body = caps.get(2).map_or("", |m| m.as_str());
                    let text = if attrs.contains(r#"t="s""#) {
                        let index: usize = value.captures(body)?.get(1)?.as_str().trim().parse().ok()?;
                        shared.get(index)?.clone()
                    } else if attrs.contains(r#"t="inlineStr""#) {
                        joined_text(body, &patterns.sheet_text)
                    } else {
                        unescape_xml(value.captures(body)?.get(1)?.as_str())
                    };
                    Some(text).filter(|text| !text.trim().is_empty())
                })
                .collect();
            lines.push(cells.join("    "));
        }
        lines.push(String::new());
    }
    Ok(lines)
}

fn read_part<R: Read>(entry: &mut R, name: &str) -> Result<String, GenerationError> {
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| GenerationError::Encoding {
        part: name.to_string(),
    })
}

fn joined_text(block: &str, text: &Regex) -> String {
    text.captures_iter(block)
        .map(|caps| unescape_xml(&caps[2]))
        .collect()
}

/// Text between two block tags, followed by the tag that ends it (`None` for the tail).
struct Segment<'a> {
    body: &'a str,
    boundary: Option<&'a str>,
}

fn segments<'a>(xml: &'a str, boundary: &Regex) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for tag in boundary.find_iter(xml) {
        segments.push(Segment {
            body: &xml[last..tag.start()],
            boundary: Some(tag.as_str()),
        });
        last = tag.end();
    }
    segments.push(Segment {
        body: &xml[last..],
        boundary: None,
    });
    segments
}

fn merge_blocks(
    xml: &str,
    boundary: &Regex,
    text: &Regex,
    patterns: &Patterns,
    values: &FormValues,
) -> String {
    let mut merged = String::with_capacity(xml.len());
    for segment in segments(xml, boundary) {
        merged.push_str(&merge_block(segment.body, text, patterns, values));
        merged.push_str(segment.boundary.unwrap_or_default());
    }
    merged
}

fn merge_block(block: &str, text: &Regex, patterns: &Patterns, values: &FormValues) -> String {
    // byte range of every run's text within `joined`
    let mut joined = String::new();
    let mut ranges = Vec::new();
    for caps in text.captures_iter(block) {
        let start = joined.len();
        joined.push_str(&unescape_xml(&caps[2]));
        ranges.push(start..joined.len());
    }
    if !patterns.placeholder.is_match(&joined) {
        return block.to_string();
    }

    let mut texts = vec![String::new(); ranges.len()];
    let copy = |texts: &mut Vec<String>, from: usize, to: usize| {
        for (run, range) in ranges.iter().enumerate() {
            let (start, end) = (from.max(range.start), to.min(range.end));
            if start < end {
                texts[run].push_str(&joined[start..end]);
            }
        }
    };

    let mut cursor = 0;
    for caps in patterns.placeholder.captures_iter(&joined) {
        let Some(found) = caps.get(0) else { continue };
        copy(&mut texts, cursor, found.start());
        let key = format!("{{{{{}}}}}", &caps[1]);
        let value = resolve(values, &key).unwrap_or_default();
        if let Some(run) = ranges.iter().position(|range| range.contains(&found.start())) {
            texts[run].push_str(value);
        }
        cursor = found.end();
    }
    copy(&mut texts, cursor, joined.len());

    let mut run = 0;
    text.replace_all(block, |caps: &Captures| {
        let index = run;
        run += 1;
        let original = &joined[ranges[index].clone()];
        if texts[index] == original {
            return caps[0].to_string();
        }
        format!(
            "{}{}{}",
            preserve_space(&caps[1]),
            escape_xml(&texts[index]),
            &caps[3]
        )
    })
    .into_owned()
}

fn preserve_space(open_tag: &str) -> String {
    if open_tag.contains("xml:space") {
        return open_tag.to_string();
    }
    let name_end = open_tag.find([' ', '>']).unwrap_or(open_tag.len());
    format!(
        r#"{} xml:space="preserve"{}"#,
        &open_tag[..name_end],
        &open_tag[name_end..]
    )
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub(crate) fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal package holding the given parts.
    pub(crate) fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn part(package: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn placeholders_split_across_runs_are_merged() {
        let document = concat!(
            r#"<w:document><w:body>"#,
            r#"<w:p><w:pPr/><w:r><w:t>No. {{CONTRACT</w:t></w:r><w:r><w:t>_NUMBER}} from </w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve">{{ DATE }}</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>untouched &amp; kept</w:t></w:r></w:p>"#,
            r#"</w:body></w:document>"#
        );
        let template = package(&[
            ("word/document.xml", document),
            ("word/styles.xml", "<w:styles/>"),
        ]);

        let merged = merge_template(
            &template,
            &values(&[("{{CONTRACT_NUMBER}}", "A&B-7"), ("DATE", "01.02.2024")]),
        )
        .unwrap();

        let xml = part(&merged, "word/document.xml");
        assert!(xml.contains(r#"<w:t xml:space="preserve">No. A&amp;B-7</w:t>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve"> from </w:t>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">01.02.2024</w:t>"#));
        assert!(xml.contains("<w:p><w:r><w:t>untouched &amp; kept</w:t></w:r></w:p>"));
        assert_eq!(part(&merged, "word/styles.xml"), "<w:styles/>");
    }

    #[test]
    fn shared_strings_are_merged_and_unknown_placeholders_vanish() {
        let strings = r#"<sst><si><t>Weight: {{WEIGHT}} kg</t></si><si><r><t>{{MISSING}}</t></r><r><t>!</t></r></si></sst>"#;
        let merged = merge_template(
            &package(&[("xl/sharedStrings.xml", strings)]),
            &values(&[("{{WEIGHT}}", "12.50")]),
        )
        .unwrap();

        let xml = part(&merged, "xl/sharedStrings.xml");
        assert!(xml.contains(r#"<t xml:space="preserve">Weight: 12.50 kg</t>"#));
        assert!(xml.contains(r#"<r><t xml:space="preserve"></t></r><r><t>!</t></r>"#));
    }

    #[test]
    fn runs_keep_their_formatting() {
        let document = concat!(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Buyer:</w:t></w:r><w:r><w:tab/></w:r>"#,
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t>{{BUYER}}</w:t></w:r>"#,
            r#"<w:r><w:br/><w:t>Date: {{DA</w:t></w:r><w:r><w:t>TE}}</w:t></w:r></w:p>"#
        );
        let merged = merge_template(
            &package(&[("word/document.xml", document)]),
            &values(&[("BUYER", "ACME"), ("DATE", "today")]),
        )
        .unwrap();

        let xml = part(&merged, "word/document.xml");
        assert!(xml.contains(r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Buyer:</w:t></w:r><w:r><w:tab/></w:r>"#));
        assert!(xml.contains(r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">ACME</w:t></w:r>"#));
        assert!(xml.contains(r#"<w:r><w:br/><w:t xml:space="preserve">Date: today</w:t></w:r>"#));
        assert!(xml.contains(r#"<w:r><w:t xml:space="preserve"></w:t></w:r></w:p>"#));
    }

    #[test]
    fn text_box_inside_a_paragraph_is_merged() {
        let document = concat!(
            r#"<w:p><w:r><w:t>Outer {{A}}</w:t></w:r><w:r><w:txbxContent>"#,
            r#"<w:p><w:r><w:t>Inner {{B}}</w:t></w:r></w:p>"#,
            r#"</w:txbxContent></w:r><w:r><w:t>after {{A}}</w:t></w:r></w:p>"#
        );
        let merged = merge_template(
            &package(&[("word/document.xml", document)]),
            &values(&[("A", "1"), ("B", "2")]),
        )
        .unwrap();

        let xml = part(&merged, "word/document.xml");
        assert!(xml.contains(r#"<w:t xml:space="preserve">Outer 1</w:t>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">Inner 2</w:t>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">after 1</w:t>"#));
        assert_eq!(
            extract_lines(&merged).unwrap(),
            ["Outer 1", "Inner 2", "after 1"]
        );
    }

    #[test]
    fn lines_of_a_word_document() {
        let document = r#"<w:body><w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>&lt;end&gt;</w:t></w:r></w:p></w:body>"#;
        let lines = extract_lines(&package(&[("word/document.xml", document)])).unwrap();
        assert_eq!(lines, ["Hello world", "<end>"]);
    }

    #[test]
    fn lines_of_a_workbook() {
        let strings = r#"<sst><si><t>Name</t></si><si><t>Total</t></si></sst>"#;
        let sheet = r#"<sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>Cargo</t></is></c><c r="B2"><v>42</v></c></row></sheetData>"#;
        let lines = extract_lines(&package(&[
            ("xl/sharedStrings.xml", strings),
            ("xl/worksheets/sheet1.xml", sheet),
        ]))
        .unwrap();
        assert_eq!(lines, ["Name    Total", "Cargo    42", ""]);
    }

    #[test]
    fn xml_entities() {
        assert_eq!(unescape_xml("a &amp; b &#65;&#x42; &bogus; &"), "a & b AB &bogus; &");
        assert_eq!(escape_xml(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
    }
}
