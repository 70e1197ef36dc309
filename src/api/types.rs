//! Formas JSON que devuelve el backend de movilizaciones.
//!
//! Estas structs reflejan el formato del servidor tal cual: nombres de campo
//! en español, mayúsculas inconsistentes (`Usuario`, `Animals`, `Aves`) y
//! números que a veces llegan como texto. La conversión al modelo canónico
//! vive en [`crate::movilizacion::record`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::ApiError;

/// Una movilización tal como la envía el servidor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMovilizacion {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub estado: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha_solicitud: Option<String>,
    /// Cédula registrada a nivel de solicitud (no siempre presente).
    #[serde(default, deserialize_with = "lenient_text")]
    pub cedula: Option<String>,
    #[serde(default, rename = "Usuario", deserialize_with = "lenient_entry")]
    pub usuario: Option<RawUsuario>,
    #[serde(default, rename = "Animals", deserialize_with = "lenient_entries")]
    pub animals: Option<Vec<RawAnimal>>,
    #[serde(default, rename = "Aves", deserialize_with = "lenient_entries")]
    pub aves: Option<Vec<RawAve>>,
    #[serde(default, deserialize_with = "lenient_entry")]
    pub predio_origen: Option<RawPredio>,
    #[serde(default, deserialize_with = "lenient_entry")]
    pub predio_destino: Option<RawPredio>,
    #[serde(default, rename = "Validacion", deserialize_with = "lenient_entry")]
    pub validacion: Option<RawValidacion>,
    #[serde(default, rename = "Transporte", deserialize_with = "lenient_entry")]
    pub transporte: Option<RawTransporte>,
}

/// Usuario solicitante (granjero, faenador, etc.).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUsuario {
    #[serde(default, deserialize_with = "lenient_text")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ci: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub telefono: Option<String>,
}

/// Entrada de ganado mayor o menor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnimal {
    #[serde(default, deserialize_with = "lenient_text")]
    pub especie: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cantidad: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub identificador: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub categoria: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub raza: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sexo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub color: Option<String>,
    /// Edad en meses.
    #[serde(default, deserialize_with = "lenient_count")]
    pub edad: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub comerciante: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub observaciones: Option<String>,
}

/// Entrada de aves; algunos endpoints usan `total` en lugar de `total_aves`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAve {
    #[serde(default, deserialize_with = "lenient_text")]
    pub especie_ave: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_aves: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub numero_galpon: Option<String>,
    /// Engorde o postura.
    #[serde(default, deserialize_with = "lenient_text")]
    pub categoria: Option<String>,
    /// Edad en semanas.
    #[serde(default, deserialize_with = "lenient_count")]
    pub edad: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub observaciones: Option<String>,
}

/// Predio de origen o destino.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPredio {
    #[serde(default, deserialize_with = "lenient_text")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub parroquia: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ubicacion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub condicion_tenencia: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cedula_propietario: Option<String>,
}

/// Datos de la validación técnica que firman el certificado.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValidacion {
    #[serde(default, deserialize_with = "lenient_text")]
    pub nombre_tecnico: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tiempo_validez: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hora_inicio: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hora_fin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha_emision: Option<String>,
}

/// Vía de transporte declarada en la solicitud.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransporte {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub es_terrestre: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tipo_transporte: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub nombre_transportista: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cedula_transportista: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub telefono_transportista: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub placa: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub detalle_otro: Option<String>,
}

/// Conteo por estado del endpoint `/movilizaciones/estadisticas/estados`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEstadoStat {
    #[serde(default, deserialize_with = "lenient_text")]
    pub estado: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<u64>,
}

/// Respuesta envuelta `{ success, data }` de los endpoints de reportes.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawEstadoStat>,
}

/// Cuerpo del POST `/movilizaciones/{id}/validacion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidacionForm {
    pub tiempo_validez: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub firma_tecnico: String,
}

/// Cuerpo del PUT `/movilizaciones/{id}/rechazar`.
#[derive(Debug, Clone, Serialize)]
pub struct RechazoBody<'a> {
    pub observaciones_tecnico: &'a str,
}

/// Los endpoints de listado devuelven un arreglo o `{ data: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

/// Decodifica una respuesta de listado aceptando ambas formas.
///
/// Los elementos que no se pueden interpretar se descartan con una
/// advertencia; sólo una forma externa desconocida es un error.
pub fn decode_list(body: Value) -> Result<Vec<RawMovilizacion>, ApiError> {
    let items = match serde_json::from_value::<ListEnvelope>(body) {
        Ok(ListEnvelope::Bare(items)) | Ok(ListEnvelope::Wrapped { data: items }) => items,
        Err(e) => {
            return Err(ApiError::Malformed(format!(
                "expected an array or {{data: [...]}}: {e}"
            )));
        }
    };

    let total = items.len();
    let records: Vec<RawMovilizacion> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawMovilizacion>(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable movilizacion");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(kept = records.len(), total, "list decoded with skipped entries");
    }
    Ok(records)
}

/// Decodifica una sola movilización, desenvolviendo `{ data: {...} }` si aparece.
pub fn decode_one(body: Value) -> Result<RawMovilizacion, ApiError> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("id") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| ApiError::Malformed(e.to_string()))
}

// Acepta números o textos numéricos; cualquier otra cosa cuenta como ausente.
// Los negativos se recortan a cero.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.max(0) as u64)
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|i| i.max(0) as u64),
        _ => None,
    }))
}

// Algunas cédulas y teléfonos llegan como número.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "si" | "sí" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

// Objeto anidado con forma inesperada: se trata como ausente en lugar de
// descartar toda la movilización.
fn lenient_entry<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value::<T>(v) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed nested object");
            None
        }
    }))
}

// Arreglo de entradas: cada elemento se decodifica por separado y sólo se
// omiten los que fallan. Cualquier cosa que no sea un arreglo cuenta como vacío.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(None);
    };
    let entries = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed entry");
                None
            }
        })
        .collect();
    Ok(Some(entries))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("id is not an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s}"))),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}
