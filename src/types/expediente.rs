//! The canonical case record produced by a fused pipeline run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel used for dates that are missing or failed to parse, rather than
/// propagating an `Option` through every consumer (spec.md §3: "dates
/// either valid or sentinel 'missing'").
pub fn missing_date() -> NaiveDate {
    NaiveDate::MIN
}

/// A person named within a `SolicitudEspecifica`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonaSolicitud {
    pub nombre: Option<String>,
    pub rfc: Option<String>,
    pub curp: Option<String>,
}

/// One specific request within an Expediente, owning an ordered list of
/// persons it names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolicitudEspecifica {
    pub descripcion: Option<String>,
    pub personas: Vec<PersonaSolicitud>,
}

/// A request party attached to the case at the top level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolicitudParte {
    pub nombre: Option<String>,
    pub rol: Option<String>,
}

/// Bank-enrichment slots mandated by Article 4 once an Expediente has been
/// classified (populated downstream of fusion, nullable until then).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LawMandatedFields {
    pub cuenta_bancaria: Option<String>,
    pub institucion: Option<String>,
    pub monto_congelado: Option<String>,
}

/// The "five situations" semantic breakdown produced by classification
/// (spec.md §4.10).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub situacion_aseguramiento: bool,
    pub situacion_desbloqueo: bool,
    pub situacion_transferencia: bool,
    pub situacion_documentacion: bool,
    pub situacion_informacion: bool,
}

impl SemanticAnalysis {
    /// Number of the five sub-requirements flagged true.
    pub fn matched_count(&self) -> usize {
        [
            self.situacion_aseguramiento,
            self.situacion_desbloqueo,
            self.situacion_transferencia,
            self.situacion_documentacion,
            self.situacion_informacion,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

/// The canonical regulatory case record. Owned by the pipeline run that
/// produced it; consumed as an immutable value once fusion emits it.
///
/// Invariants (spec.md §3): `case_id` is non-empty on success; `deadline_days`
/// is non-negative; `fecha_publicacion` is either a real date or
/// [`missing_date`]; party/person lists preserve insertion order and may be
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expediente {
    pub case_id: String,
    pub office_id: Option<String>,
    pub folio: Option<String>,
    pub year: Option<i32>,
    pub area_code: Option<String>,
    pub area_description: Option<String>,
    pub fecha_publicacion: NaiveDate,
    pub deadline_days: u32,
    pub requesting_authority: Option<String>,
    pub references: [Option<String>; 3],
    pub has_asset_freeze: bool,
    pub solicitudes_parte: Vec<SolicitudParte>,
    pub solicitudes_especificas: Vec<SolicitudEspecifica>,
    pub law_mandated_fields: Option<LawMandatedFields>,
    pub semantic_analysis: Option<SemanticAnalysis>,
}

impl Default for Expediente {
    fn default() -> Self {
        Self {
            case_id: String::new(),
            office_id: None,
            folio: None,
            year: None,
            area_code: None,
            area_description: None,
            fecha_publicacion: missing_date(),
            deadline_days: 0,
            requesting_authority: None,
            references: [None, None, None],
            has_asset_freeze: false,
            solicitudes_parte: Vec::new(),
            solicitudes_especificas: Vec::new(),
            law_mandated_fields: None,
            semantic_analysis: None,
        }
    }
}

impl Expediente {
    /// Per spec.md §3: "case id is non-empty on success".
    pub fn is_well_formed(&self) -> bool {
        !self.case_id.trim().is_empty()
    }

    pub fn has_missing_date(&self) -> bool {
        self.fecha_publicacion == missing_date()
    }
}
