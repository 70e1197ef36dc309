use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::api::{ApiError, MovilizacionSource, Session};
use crate::error::AppError;
use crate::movilizacion::{
    Estado, EstadoCount, FilterSpec, MobilizationRecord, Totals, Transicion, aggregate,
    apply_filters, count_by_estado,
};

/// Hands out increasing tickets so only the newest request is honoured.
#[derive(Debug, Default)]
pub struct LatestGuard {
    current: AtomicU64,
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl LatestGuard {
    pub fn issue(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no newer ticket has been issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

/// Everything one report screen shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct View {
    pub records: Vec<MobilizationRecord>,
    pub totals: Totals,
    pub by_estado: Vec<EstadoCount>,
    /// Non-fatal problem to show next to an (empty) result.
    pub notice: Option<String>,
}

/// Outcome of a refresh.
#[derive(Debug)]
pub enum Refresh {
    Loaded(View),
    /// A newer refresh started while this one was in flight; its result was dropped.
    Superseded,
}

/// Fetches, filters and aggregates records for the report views.
pub struct Dashboard<S> {
    source: S,
    session: Session,
    guard: LatestGuard,
}

impl<S: MovilizacionSource> Dashboard<S> {
    pub fn new(source: S, session: Session) -> Self {
        Self {
            source,
            session,
            guard: LatestGuard::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Load records and build the view for `filters`.
    ///
    /// With `remote` the backend filter endpoint is used first; local filters
    /// are applied either way. Network and decoding failures produce an empty
    /// view with a notice. Auth failures are returned as errors.
    pub async fn refresh(&self, filters: &FilterSpec, remote: bool) -> Result<Refresh, AppError> {
        let ticket = self.guard.issue();
        let fetched = self.source.fetch(&self.session, filters, remote).await;

        if !self.guard.is_current(ticket) {
            tracing::debug!(?ticket, "dropping superseded refresh");
            return Ok(Refresh::Superseded);
        }

        let (records, notice) = match fetched {
            Ok(records) => (records, None),
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to an empty record set");
                (Vec::new(), Some(notice_for(&e)))
            }
        };

        let records = apply_filters(&records, filters);
        let view = View {
            totals: aggregate(&records),
            by_estado: count_by_estado(&records),
            records,
            notice,
        };
        tracing::debug!(
            total = view.totals.total_movilizaciones,
            animales = view.totals.total_animales,
            aves = view.totals.total_aves,
            "view refreshed"
        );
        Ok(Refresh::Loaded(view))
    }

    /// Validate a lifecycle step locally, then ask the backend to apply it.
    ///
    /// The record is never touched; the confirmed estado is returned and
    /// becomes visible on the next refresh.
    pub async fn request_transition(
        &self,
        record: &MobilizationRecord,
        transicion: &Transicion,
    ) -> Result<Estado, AppError> {
        transicion.check(&record.estado)?;
        let estado = self
            .source
            .transition(&self.session, record.id, transicion)
            .await?;
        Ok(estado)
    }
}

fn notice_for(error: &ApiError) -> String {
    match error {
        ApiError::Network(_) => {
            "No se pudo conectar con el servidor; no hay movilizaciones para mostrar.".into()
        }
        ApiError::Timeout => "El servidor tardó demasiado en responder.".into(),
        ApiError::Malformed(_) => "La respuesta del servidor no tiene el formato esperado.".into(),
        ApiError::Status { status, message } => {
            format!("Error al cargar movilizaciones ({status}): {message}")
        }
        ApiError::Auth { .. } => "Sesión expirada; vuelva a iniciar sesión.".into(),
    }
}
