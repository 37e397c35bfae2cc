//! DOCX zip/XML loading and structure analysis (spec.md §4.7).
//!
//! The inline parser below is a smaller sibling of the teacher's vendored
//! `docx-lite`-derived parser: same `zip` + `quick-xml` event loop shape,
//! trimmed to the paragraph/run/table shape this crate's strategies need.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ExpedienteError, Result};

#[derive(Debug, Clone, Default)]
pub struct ParsedRun {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedParagraph {
    pub runs: Vec<ParsedRun>,
}

impl ParsedParagraph {
    /// Concatenates this paragraph's runs with single spaces (spec.md §6).
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub paragraphs: Vec<ParsedParagraph>,
    pub tables: Vec<ParsedTable>,
}

impl ParsedDocument {
    pub fn full_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Opens the DOCX zip container and parses `word/document.xml`.
pub fn parse_docx(bytes: &[u8]) -> Result<ParsedDocument> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExpedienteError::Parsing(format!("not a valid DOCX zip: {e}")))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExpedienteError::InvalidInput("DOCX missing word/document.xml".into()))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ExpedienteError::Parsing(e.to_string()))?;

    parse_document_xml(&document_xml)
}

fn parse_document_xml(xml: &str) -> Result<ParsedDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = ParsedDocument::default();
    let mut buf = Vec::new();

    let mut in_table_depth = 0u32;
    let mut current_table: Option<ParsedTable> = None;
    let mut current_row: Option<Vec<String>> = None;
    let mut current_cell_paragraphs: Vec<ParsedParagraph> = Vec::new();

    let mut current_paragraph: Option<ParsedParagraph> = None;
    let mut current_run: Option<ParsedRun> = None;
    let mut in_text = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ExpedienteError::Parsing(e.to_string()))?
        {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let is_empty = matches!(reader.read_event_into(&mut Vec::new()), Ok(_));
                let _ = is_empty;
                match e.name().as_ref() {
                    b"w:tbl" => {
                        in_table_depth += 1;
                        current_table = Some(ParsedTable::default());
                    }
                    b"w:tr" => current_row = Some(Vec::new()),
                    b"w:tc" => current_cell_paragraphs = Vec::new(),
                    b"w:p" => current_paragraph = Some(ParsedParagraph::default()),
                    b"w:r" => current_run = Some(ParsedRun::default()),
                    b"w:b" => {
                        if let Some(run) = current_run.as_mut() {
                            run.bold = true;
                        }
                    }
                    b"w:t" => in_text = true,
                    _ => {}
                }
            }
            Event::Text(e) => {
                if in_text {
                    if let Some(run) = current_run.as_mut() {
                        run.text.push_str(&e.unescape().unwrap_or_default());
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => {
                    if let Some(run) = current_run.take() {
                        if let Some(para) = current_paragraph.as_mut() {
                            para.runs.push(run);
                        }
                    }
                }
                b"w:p" => {
                    if let Some(para) = current_paragraph.take() {
                        if in_table_depth > 0 {
                            current_cell_paragraphs.push(para);
                        } else {
                            document.paragraphs.push(para);
                        }
                    }
                }
                b"w:tc" => {
                    let text = current_cell_paragraphs
                        .iter()
                        .map(|p| p.text())
                        .collect::<Vec<_>>()
                        .join(" ");
                    if let Some(row) = current_row.as_mut() {
                        row.push(text);
                    }
                    current_cell_paragraphs = Vec::new();
                }
                b"w:tr" => {
                    if let (Some(row), Some(table)) = (current_row.take(), current_table.as_mut())
                    {
                        table.rows.push(row);
                    }
                }
                b"w:tbl" => {
                    in_table_depth = in_table_depth.saturating_sub(1);
                    if let Some(table) = current_table.take() {
                        document.tables.push(table);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    Ok(document)
}

/// Structural summary of a parsed DOCX, driving strategy selection
/// (spec.md §4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct TableStructure {
    pub row_count: usize,
    pub has_header_row: bool,
    pub column_headers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendedStrategy {
    TableBased,
    Fuzzy,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocxStructure {
    pub has_tables: bool,
    pub has_bold_labels: bool,
    pub has_cross_references: bool,
    pub has_structured_format: bool,
    pub has_key_value_pairs: bool,
    pub tables: Vec<TableStructure>,
    pub recommended_strategy: RecommendedStrategy,
}

const CROSS_REFERENCE_PHRASES: &[&str] = &[
    "arriba mencionada",
    "anteriormente indicado",
    "previamente",
];

/// Thresholds match spec.md §4.7: a header row plus at least two data rows
/// recommends `TableBased`; no structural signals at all recommends
/// `Fuzzy`; cross-references coexisting with structure recommend `Hybrid`.
pub fn analyze_structure(doc: &ParsedDocument) -> DocxStructure {
    let tables: Vec<TableStructure> = doc
        .tables
        .iter()
        .map(|t| {
            let has_header_row = !t.rows.is_empty();
            let column_headers = t.rows.first().cloned().unwrap_or_default();
            TableStructure {
                row_count: t.rows.len(),
                has_header_row,
                column_headers,
            }
        })
        .collect();

    let has_tables = tables
        .iter()
        .any(|t| t.has_header_row && t.row_count >= 3);

    let has_bold_labels = doc.paragraphs.iter().any(|p| {
        p.runs.iter().any(|r| r.bold && !r.text.trim().is_empty())
            && p.runs.iter().any(|r| !r.bold && !r.text.trim().is_empty())
    });

    let full_text_lower = doc.full_text().to_lowercase();
    let has_cross_references = CROSS_REFERENCE_PHRASES
        .iter()
        .any(|phrase| full_text_lower.contains(phrase));

    let key_value_line_count = doc
        .full_text()
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            matches!(trimmed.split_once(':'), Some((label, value)) if !label.trim().is_empty() && !value.trim().is_empty() && label.len() < 50)
        })
        .count();
    let has_key_value_pairs = key_value_line_count >= 2;

    let has_structured_format = has_tables || has_key_value_pairs || has_bold_labels;

    let recommended_strategy = if has_cross_references && has_structured_format {
        RecommendedStrategy::Hybrid
    } else if has_tables {
        RecommendedStrategy::TableBased
    } else if !has_structured_format {
        RecommendedStrategy::Fuzzy
    } else {
        RecommendedStrategy::Fuzzy
    };

    DocxStructure {
        has_tables,
        has_bold_labels,
        has_cross_references,
        has_structured_format,
        has_key_value_pairs,
        tables,
        recommended_strategy,
    }
}
