//! XML Expediente Parser (spec.md §4.6).
//!
//! Streaming `quick-xml` reader, mirroring the teacher's event-loop
//! structure (push/pop an element-name stack, react on `Text`), generalized
//! to the Expediente field set and the registry's `Cnbv_` prefix tolerance.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::{ExpedienteError, Result};
use crate::types::{
    missing_date, Expediente, ExtractionMetadata, PersonaSolicitud, SolicitudEspecifica,
    SolicitudParte,
};
use crate::validation::Validated;

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const CNBV_PREFIX: &str = "Cnbv_";

static RFC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-ZÑ&]{3,4}\d{6}[A-Z0-9]{3}$").unwrap());
static CURP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}\d{6}[HM][A-Z]{5}[A-Z0-9]\d$").unwrap());
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

const AREA_CATALOG: &[&str] = &[
    "ASEGURAMIENTO",
    "HACENDARIO",
    "PENAL",
    "CIVIL",
    "ADMINISTRATIVO",
];

/// Strips an optional `Cnbv_` prefix so callers can match field names
/// regardless of which form the document uses.
fn normalize_tag(name: &str) -> &str {
    name.strip_prefix(CNBV_PREFIX).unwrap_or(name)
}

#[derive(Default)]
enum Container {
    #[default]
    Root,
    Party,
    Especifica,
    Persona,
}

/// Parses `xml_bytes` into an `Expediente` plus its per-source metadata.
/// Pure function: same bytes always produce the same output.
#[tracing::instrument(skip_all, fields(xml_bytes = xml_bytes.len()))]
pub fn parse(xml_bytes: &[u8]) -> Result<Validated<(Expediente, ExtractionMetadata)>> {
    if xml_bytes.is_empty() {
        return Err(ExpedienteError::InvalidInput("empty XML input".into()));
    }
    let trimmed = xml_bytes.strip_prefix(BOM).unwrap_or(xml_bytes);

    let mut reader = Reader::from_reader(trimmed);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut expediente = Expediente::default();
    let mut metadata = ExtractionMetadata::for_xml();
    let mut validated: Validated<()> = Validated::new(());

    let mut element_stack: Vec<String> = Vec::new();
    let mut container_stack: Vec<Container> = vec![Container::Root];
    let mut buf = Vec::new();
    let mut pending_nil = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ExpedienteError::Parsing(e.to_string()))?
        {
            Event::Eof => break,
            Event::Start(e) => {
                let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                pending_nil = is_xsi_nil(&e);
                let tag = normalize_tag(&raw_name).to_string();

                match tag.as_str() {
                    "SolicitudParte" => {
                        expediente.solicitudes_parte.push(SolicitudParte::default());
                        container_stack.push(Container::Party);
                    }
                    "SolicitudEspecifica" => {
                        expediente
                            .solicitudes_especificas
                            .push(SolicitudEspecifica::default());
                        container_stack.push(Container::Especifica);
                    }
                    "PersonaSolicitud" => {
                        if let Some(last) = expediente.solicitudes_especificas.last_mut() {
                            last.personas.push(PersonaSolicitud::default());
                        }
                        container_stack.push(Container::Persona);
                    }
                    _ => {}
                }
                element_stack.push(tag);
            }
            Event::Empty(e) => {
                let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let tag = normalize_tag(&raw_name).to_string();
                let nil = is_xsi_nil(&e);
                if !nil {
                    apply_leaf(
                        &tag,
                        "",
                        &container_stack,
                        &mut expediente,
                        &mut metadata,
                        &mut validated,
                    );
                }
            }
            Event::Text(e) => {
                if pending_nil {
                    pending_nil = false;
                    continue;
                }
                let text = e.unescape().unwrap_or_default().into_owned();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if let Some(tag) = element_stack.last().cloned() {
                    apply_leaf(
                        &tag,
                        text,
                        &container_stack,
                        &mut expediente,
                        &mut metadata,
                        &mut validated,
                    );
                }
            }
            Event::End(_) => {
                if let Some(tag) = element_stack.pop() {
                    if matches!(
                        tag.as_str(),
                        "SolicitudParte" | "SolicitudEspecifica" | "PersonaSolicitud"
                    ) {
                        container_stack.pop();
                    }
                }
                pending_nil = false;
            }
            _ => {}
        }
        buf.clear();
    }

    if !expediente.is_well_formed() {
        return Err(ExpedienteError::InvalidInput(
            "XML document has no NumeroExpediente".into(),
        ));
    }

    Ok(Validated::new((expediente, metadata))
        .with_warnings(validated.warnings))
}

fn is_xsi_nil(e: &quick_xml::events::BytesStart) -> bool {
    e.attributes().flatten().any(|a| {
        let key = String::from_utf8_lossy(a.key.as_ref().local_name().as_ref()).into_owned();
        key.eq_ignore_ascii_case("nil")
            && String::from_utf8_lossy(&a.value).eq_ignore_ascii_case("true")
    })
}

fn apply_leaf(
    tag: &str,
    text: &str,
    container_stack: &[Container],
    expediente: &mut Expediente,
    metadata: &mut ExtractionMetadata,
    validated: &mut Validated<()>,
) {
    match container_stack.last() {
        Some(Container::Party) => {
            if let Some(party) = expediente.solicitudes_parte.last_mut() {
                match tag {
                    "Nombre" => party.nombre = Some(text.to_string()),
                    "Rol" => party.rol = Some(text.to_string()),
                    _ => {}
                }
            }
            return;
        }
        Some(Container::Especifica) => {
            if tag == "Descripcion" {
                if let Some(e) = expediente.solicitudes_especificas.last_mut() {
                    e.descripcion = Some(text.to_string());
                }
            }
            return;
        }
        Some(Container::Persona) => {
            if let Some(e) = expediente.solicitudes_especificas.last_mut() {
                if let Some(p) = e.personas.last_mut() {
                    match tag {
                        "Nombre" => p.nombre = Some(text.to_string()),
                        "Rfc" => {
                            record_pattern(tag, text, metadata);
                            p.rfc = Some(text.to_string());
                        }
                        "Curp" => {
                            record_pattern(tag, text, metadata);
                            p.curp = Some(text.to_string());
                        }
                        _ => {}
                    }
                }
            }
            return;
        }
        _ => {}
    }

    match tag {
        "NumeroExpediente" => {
            expediente.case_id = text.to_string();
            metadata.record_field(false, false);
        }
        "Oficina" => {
            expediente.office_id = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "Folio" => {
            expediente.folio = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "Anio" => {
            expediente.year = text.parse::<i32>().ok();
            if expediente.year.is_none() {
                validated.warnings.push(format!("non-numeric Anio: {text}"));
            }
            metadata.record_field(expediente.year.is_some(), false);
        }
        "AreaCodigo" => {
            expediente.area_code = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "AreaDescripcion" => {
            let in_catalog = AREA_CATALOG.contains(&text);
            expediente.area_description = Some(text.to_string());
            metadata.record_field(false, in_catalog);
        }
        "FechaPublicacion" => {
            let matches_pattern = DATE_PATTERN.is_match(text);
            expediente.fecha_publicacion = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .unwrap_or_else(|_| missing_date());
            metadata.record_field(matches_pattern, false);
        }
        "PlazoDias" => {
            expediente.deadline_days = text.parse::<u32>().unwrap_or(0);
            metadata.record_field(false, false);
        }
        "AutoridadSolicitante" => {
            expediente.requesting_authority = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "Referencia1" => {
            expediente.references[0] = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "Referencia2" => {
            expediente.references[1] = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "Referencia3" => {
            expediente.references[2] = Some(text.to_string());
            metadata.record_field(false, false);
        }
        "Aseguramiento" => {
            expediente.has_asset_freeze = text.eq_ignore_ascii_case("true") || text == "1";
            metadata.record_field(false, false);
        }
        _ => {
            // Unknown root-level element with non-empty text: captured for
            // future-proofing, always a warning (spec.md §4.6).
            validated
                .warnings
                .push(format!("unrecognized XML element captured: {tag}"));
        }
    }
}

fn record_pattern(tag: &str, text: &str, metadata: &mut ExtractionMetadata) {
    let matches = match tag {
        "Rfc" => RFC_PATTERN.is_match(text),
        "Curp" => CURP_PATTERN.is_match(text),
        _ => false,
    };
    metadata.record_field(matches, false);
}
