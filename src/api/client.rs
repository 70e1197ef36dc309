use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::error::ApiError;
use super::session::Session;
use super::types::{RechazoBody, StatsEnvelope, decode_list, decode_one};
use crate::error::AppError;
use crate::movilizacion::{
    Estado, EstadoCount, FilterSpec, MobilizationRecord, Transicion, counts_from_stats,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can hand out mobilization records and forward transitions.
///
/// Implemented by [`ApiClient`]; tests substitute in-memory sources.
#[allow(async_fn_in_trait)]
pub trait MovilizacionSource {
    async fn fetch(
        &self,
        session: &Session,
        filters: &FilterSpec,
        remote: bool,
    ) -> Result<Vec<MobilizationRecord>, ApiError>;

    async fn transition(
        &self,
        session: &Session,
        id: i64,
        transicion: &Transicion,
    ) -> Result<Estado, ApiError>;
}

/// HTTP client for the mobilization backend.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /movilizaciones`
    pub async fn list(&self, session: &Session) -> Result<Vec<MobilizationRecord>, ApiError> {
        let body = self.get_json(session, "movilizaciones", &[]).await?;
        Ok(into_records(decode_list(body)?))
    }

    /// `GET /movilizaciones/filtrar`, sending only the non-empty filters.
    pub async fn filter_remote(
        &self,
        session: &Session,
        filters: &FilterSpec,
    ) -> Result<Vec<MobilizationRecord>, ApiError> {
        let query = filter_query(filters);
        let body = self.get_json(session, "movilizaciones/filtrar", &query).await?;
        Ok(into_records(decode_list(body)?))
    }

    /// Records filed by one national id, optionally within a date range.
    pub async fn by_cedula(
        &self,
        session: &Session,
        cedula: &str,
        desde: Option<NaiveDate>,
        hasta: Option<NaiveDate>,
    ) -> Result<Vec<MobilizationRecord>, AppError> {
        if cedula.trim().is_empty() {
            return Err(AppError::Validation("el número de cédula es requerido".into()));
        }
        let filters = FilterSpec {
            cedula: Some(cedula.trim().to_string()),
            fecha_inicio: desde,
            fecha_fin: hasta,
            ..Default::default()
        };
        Ok(self.filter_remote(session, &filters).await?)
    }

    /// `GET /movilizaciones/{id}`
    pub async fn get(&self, session: &Session, id: i64) -> Result<MobilizationRecord, ApiError> {
        let body = self
            .get_json(session, &format!("movilizaciones/{id}"), &[])
            .await?;
        Ok(MobilizationRecord::from_raw(decode_one(body)?))
    }

    /// `GET /movilizaciones/estadisticas/estados`
    pub async fn estado_stats(&self, session: &Session) -> Result<Vec<EstadoCount>, ApiError> {
        let body = self
            .get_json(session, "movilizaciones/estadisticas/estados", &[])
            .await?;
        let envelope: StatsEnvelope =
            serde_json::from_value(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Malformed("statistics response without success flag".into()));
        }
        Ok(counts_from_stats(envelope.data))
    }

    /// `GET /movilizaciones/{id}/certificado`, the rendered PDF bytes.
    pub async fn certificate(&self, session: &Session, id: i64) -> Result<Vec<u8>, ApiError> {
        let response = self
            .request(Method::GET, session, &format!("movilizaciones/{id}/certificado"))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Ask the backend to apply a lifecycle step.
    ///
    /// Returns the new estado only once the backend answers with a success
    /// status; any failure leaves the caller's view of the record untouched.
    pub async fn request_transition(
        &self,
        session: &Session,
        id: i64,
        transicion: &Transicion,
    ) -> Result<Estado, ApiError> {
        let builder = match transicion {
            Transicion::Aprobar(form) => self
                .request(Method::POST, session, &format!("movilizaciones/{id}/validacion"))
                .json(form),
            Transicion::Rechazar { observaciones } => self
                .request(Method::PUT, session, &format!("movilizaciones/{id}/rechazar"))
                .json(&RechazoBody {
                    observaciones_tecnico: observaciones,
                }),
            Transicion::Finalizar => self
                .request(Method::PUT, session, &format!("movilizaciones/{id}/finalizar"))
                .json(&serde_json::json!({})),
            Transicion::Alertar => self
                .request(Method::PUT, session, &format!("movilizaciones/{id}/alerta"))
                .json(&serde_json::json!({})),
        };

        let response = builder.send().await?;
        check_status(response).await?;
        let target = transicion.target();
        tracing::info!(id, estado = %target, "transition confirmed by backend");
        Ok(target)
    }

    fn request(&self, method: Method, session: &Session, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!(%method, %url, "backend request");
        self.client
            .request(method, url)
            .bearer_auth(session.token())
            .header("content-type", "application/json")
    }

    async fn get_json(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let response = self
            .request(Method::GET, session, path)
            .query(query)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.json::<Value>().await?;
        Ok(body)
    }
}

impl MovilizacionSource for ApiClient {
    async fn fetch(
        &self,
        session: &Session,
        filters: &FilterSpec,
        remote: bool,
    ) -> Result<Vec<MobilizationRecord>, ApiError> {
        if remote && !filters.is_empty() {
            self.filter_remote(session, filters).await
        } else {
            self.list(session).await
        }
    }

    async fn transition(
        &self,
        session: &Session,
        id: i64,
        transicion: &Transicion,
    ) -> Result<Estado, ApiError> {
        self.request_transition(session, id, transicion).await
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Auth {
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    // The backend usually answers `{ "message": "..." }`.
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);
    Err(ApiError::from_status(status.as_u16(), message))
}

fn filter_query(filters: &FilterSpec) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(estado) = filters.estado() {
        query.push(("estado", estado.api_value()));
    }
    if let Some(desde) = filters.fecha_inicio {
        query.push(("fechaInicio", desde.format("%Y-%m-%d").to_string()));
    }
    if let Some(hasta) = filters.fecha_fin {
        query.push(("fechaFin", hasta.format("%Y-%m-%d").to_string()));
    }
    if let Some(granjero) = filters.granjero.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query.push(("granjero", granjero.to_string()));
    }
    if let Some(cedula) = filters.identity() {
        query.push(("cedula", cedula.to_string()));
    }
    query
}

fn into_records(raw: Vec<super::types::RawMovilizacion>) -> Vec<MobilizationRecord> {
    raw.into_iter().map(MobilizationRecord::from_raw).collect()
}
