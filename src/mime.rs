//! Source-kind sniffing from raw bytes or a declared filename/content type.
//!
//! Mirrors the teacher's MIME lookup table: a declared type is consulted
//! first, falling back to a magic-byte sniff of the first handful of bytes
//! when it is absent or ambiguous.

use crate::types::SourceKind;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const XML_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Guesses the [`SourceKind`] for a byte buffer, optionally aided by a
/// declared filename or content type. Returns `None` when nothing matches;
/// callers surface that as `InvalidInput` (spec.md §7 — "unknown file
/// kind").
pub fn sniff_source_kind(declared: Option<&str>, bytes: &[u8]) -> Option<SourceKind> {
    if let Some(declared) = declared {
        if let Some(kind) = from_declared(declared) {
            return Some(kind);
        }
    }
    sniff_bytes(bytes)
}

fn from_declared(declared: &str) -> Option<SourceKind> {
    let lower = declared.to_ascii_lowercase();
    if lower.ends_with(".xml") || lower.contains("application/xml") || lower.contains("text/xml") {
        Some(SourceKind::Xml)
    } else if lower.ends_with(".pdf") || lower.contains("application/pdf") {
        Some(SourceKind::Pdf)
    } else if lower.ends_with(".docx")
        || lower.contains("wordprocessingml")
        || lower.contains("msword")
    {
        Some(SourceKind::Docx)
    } else {
        None
    }
}

fn sniff_bytes(bytes: &[u8]) -> Option<SourceKind> {
    let trimmed = bytes.strip_prefix(XML_BOM).unwrap_or(bytes);
    let leading = trimmed.iter().take(64).position(|b| !b.is_ascii_whitespace());
    if let Some(pos) = leading {
        if trimmed[pos..].starts_with(b"<") {
            return Some(SourceKind::Xml);
        }
    }
    if bytes.starts_with(b"%PDF-") {
        return Some(SourceKind::Pdf);
    }
    if bytes.starts_with(ZIP_MAGIC) {
        // DOCX is a zip container; PDF and plain XML are ruled out above,
        // so any remaining zip magic is treated as DOCX (Non-goals exclude
        // other OOXML kinds from this crate's scope).
        return Some(SourceKind::Docx);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_extension_wins_over_sniff() {
        assert_eq!(
            sniff_source_kind(Some("oficio.pdf"), b"not actually pdf bytes"),
            Some(SourceKind::Pdf)
        );
    }

    #[test]
    fn sniffs_xml_with_bom() {
        let mut bytes = XML_BOM.to_vec();
        bytes.extend_from_slice(b"<Cnbv_Expediente/>");
        assert_eq!(sniff_source_kind(None, &bytes), Some(SourceKind::Xml));
    }

    #[test]
    fn sniffs_pdf_magic() {
        assert_eq!(sniff_source_kind(None, b"%PDF-1.7 ..."), Some(SourceKind::Pdf));
    }

    #[test]
    fn sniffs_docx_zip_magic() {
        let bytes = [0x50, 0x4B, 0x03, 0x04, 0, 0];
        assert_eq!(sniff_source_kind(None, &bytes), Some(SourceKind::Docx));
    }

    #[test]
    fn unknown_bytes_return_none() {
        assert_eq!(sniff_source_kind(None, b"\x00\x01\x02garbage"), None);
    }
}
