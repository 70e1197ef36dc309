use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::estado::{Estado, normalize_estado};
use crate::api::types::{
    RawAnimal, RawAve, RawMovilizacion, RawPredio, RawTransporte, RawUsuario, RawValidacion,
};

/// The user that filed the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Requester {
    pub nombre: Option<String>,
    pub ci: Option<String>,
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnimalEntry {
    pub especie: Option<String>,
    /// `None` when the backend omitted it; counts as one animal.
    pub cantidad: Option<u64>,
    pub identificador: Option<String>,
    pub categoria: Option<String>,
    pub raza: Option<String>,
    pub sexo: Option<String>,
    pub color: Option<String>,
    pub edad_meses: Option<u64>,
    pub comerciante: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BirdEntry {
    pub especie: Option<String>,
    /// `total_aves`, or `total` when the former is missing.
    pub total: Option<u64>,
    pub numero_galpon: Option<String>,
    pub categoria: Option<String>,
    pub edad_semanas: Option<u64>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transport {
    pub es_terrestre: bool,
    pub tipo_transporte: Option<String>,
    pub nombre_transportista: Option<String>,
    pub cedula_transportista: Option<String>,
    pub telefono_transportista: Option<String>,
    pub placa: Option<String>,
    pub detalle_otro: Option<String>,
}

/// An origin or destination property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Property {
    pub nombre: Option<String>,
    pub parroquia: Option<String>,
    pub ubicacion: Option<String>,
    pub condicion_tenencia: Option<String>,
    pub cedula_propietario: Option<String>,
}

/// Technician validation attached to an approved request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub nombre_tecnico: Option<String>,
    pub tiempo_validez: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub fecha_emision: Option<NaiveDateTime>,
}

/// One request to move animals between two locations, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MobilizationRecord {
    pub id: i64,
    pub estado: Estado,
    pub estado_raw: Option<String>,
    pub requester: Option<Requester>,
    /// National id stored on the request itself.
    pub cedula: Option<String>,
    pub fecha_solicitud: Option<NaiveDateTime>,
    pub fecha_solicitud_raw: Option<String>,
    pub animals: Vec<AnimalEntry>,
    pub birds: Vec<BirdEntry>,
    pub origin: Option<Property>,
    pub destination: Option<Property>,
    pub validation: Option<Validation>,
    pub transport: Option<Transport>,
}

impl MobilizationRecord {
    pub fn from_raw(raw: RawMovilizacion) -> Self {
        let fecha_solicitud = raw.fecha_solicitud.as_deref().and_then(parse_fecha);
        if fecha_solicitud.is_none() && raw.fecha_solicitud.is_some() {
            tracing::debug!(id = raw.id, fecha = ?raw.fecha_solicitud, "unparseable fecha_solicitud");
        }

        Self {
            id: raw.id,
            estado: normalize_estado(raw.estado.as_deref()),
            estado_raw: raw.estado,
            requester: raw.usuario.map(Requester::from),
            cedula: non_blank(raw.cedula),
            fecha_solicitud,
            fecha_solicitud_raw: raw.fecha_solicitud,
            animals: raw
                .animals
                .unwrap_or_default()
                .into_iter()
                .map(AnimalEntry::from)
                .collect(),
            birds: raw
                .aves
                .unwrap_or_default()
                .into_iter()
                .map(BirdEntry::from)
                .collect(),
            origin: raw.predio_origen.map(Property::from),
            destination: raw.predio_destino.map(Property::from),
            validation: raw.validacion.map(Validation::from),
            transport: raw.transporte.map(Transport::from),
        }
    }

    /// Animal head count: each entry contributes `cantidad`, or 1 if absent.
    pub fn animal_count(&self) -> u64 {
        self.animals
            .iter()
            .map(|a| a.cantidad.unwrap_or(1))
            .fold(0, u64::saturating_add)
    }

    /// Bird count: each entry contributes its total, or 0 if absent.
    pub fn bird_count(&self) -> u64 {
        self.birds
            .iter()
            .map(|b| b.total.unwrap_or(0))
            .fold(0, u64::saturating_add)
    }

    pub fn requester_name(&self) -> Option<&str> {
        self.requester.as_ref().and_then(|r| r.nombre.as_deref())
    }

    /// National id used for identity matching.
    ///
    /// Sources in priority order: requester `ci`, request-level `cedula`,
    /// origin property owner. The first non-empty one wins.
    pub fn identity(&self) -> Option<&str> {
        let candidates = [
            self.requester.as_ref().and_then(|r| r.ci.as_deref()),
            self.cedula.as_deref(),
            self.origin
                .as_ref()
                .and_then(|p| p.cedula_propietario.as_deref()),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|ci| !ci.is_empty())
    }

    /// Technician name, only meaningful once the request has been decided.
    pub fn technician(&self) -> Option<&str> {
        match self.estado {
            Estado::Aprobado | Estado::Rechazado | Estado::Finalizado | Estado::Alerta => self
                .validation
                .as_ref()
                .and_then(|v| v.nombre_tecnico.as_deref()),
            _ => None,
        }
    }
}

impl From<RawUsuario> for Requester {
    fn from(raw: RawUsuario) -> Self {
        Self {
            nombre: non_blank(raw.nombre),
            ci: non_blank(raw.ci),
            telefono: non_blank(raw.telefono),
        }
    }
}

impl From<RawAnimal> for AnimalEntry {
    fn from(raw: RawAnimal) -> Self {
        Self {
            especie: non_blank(raw.especie),
            cantidad: raw.cantidad,
            identificador: non_blank(raw.identificador),
            categoria: non_blank(raw.categoria),
            raza: non_blank(raw.raza),
            sexo: non_blank(raw.sexo),
            color: non_blank(raw.color),
            edad_meses: raw.edad,
            comerciante: non_blank(raw.comerciante),
            observaciones: non_blank(raw.observaciones),
        }
    }
}

impl From<RawAve> for BirdEntry {
    fn from(raw: RawAve) -> Self {
        Self {
            especie: non_blank(raw.especie_ave),
            total: raw.total_aves.or(raw.total),
            numero_galpon: non_blank(raw.numero_galpon),
            categoria: non_blank(raw.categoria),
            edad_semanas: raw.edad,
            observaciones: non_blank(raw.observaciones),
        }
    }
}

impl From<RawTransporte> for Transport {
    fn from(raw: RawTransporte) -> Self {
        Self {
            es_terrestre: raw.es_terrestre.unwrap_or(false),
            tipo_transporte: non_blank(raw.tipo_transporte),
            nombre_transportista: non_blank(raw.nombre_transportista),
            cedula_transportista: non_blank(raw.cedula_transportista),
            telefono_transportista: non_blank(raw.telefono_transportista),
            placa: non_blank(raw.placa),
            detalle_otro: non_blank(raw.detalle_otro),
        }
    }
}

impl From<RawPredio> for Property {
    fn from(raw: RawPredio) -> Self {
        Self {
            nombre: non_blank(raw.nombre),
            parroquia: non_blank(raw.parroquia),
            ubicacion: non_blank(raw.ubicacion),
            condicion_tenencia: non_blank(raw.condicion_tenencia),
            cedula_propietario: non_blank(raw.cedula_propietario),
        }
    }
}

impl From<RawValidacion> for Validation {
    fn from(raw: RawValidacion) -> Self {
        Self {
            nombre_tecnico: non_blank(raw.nombre_tecnico),
            tiempo_validez: non_blank(raw.tiempo_validez),
            hora_inicio: non_blank(raw.hora_inicio),
            hora_fin: non_blank(raw.hora_fin),
            fecha_emision: raw.fecha_emision.as_deref().and_then(parse_fecha),
        }
    }
}

/// Parse the timestamp formats the backend has been seen to emit.
///
/// Explicit offsets keep their wall-clock time, so the calendar day is the
/// one the requester saw; `Z` timestamps and epoch milliseconds are read as
/// UTC. Plain dates are taken as midnight.
pub fn parse_fecha(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if raw.len() >= 10 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
