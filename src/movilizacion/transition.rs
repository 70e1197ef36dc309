use super::estado::Estado;
use crate::api::types::ValidacionForm;
use crate::error::AppError;

/// A lifecycle step the client can ask the backend to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transicion {
    /// Technician validation; approves the request.
    Aprobar(ValidacionForm),
    Rechazar { observaciones: String },
    Finalizar,
    Alertar,
}

impl Transicion {
    /// The estado the record will be in once the backend confirms.
    pub fn target(&self) -> Estado {
        match self {
            Transicion::Aprobar(_) => Estado::Aprobado,
            Transicion::Rechazar { .. } => Estado::Rechazado,
            Transicion::Finalizar => Estado::Finalizado,
            Transicion::Alertar => Estado::Alerta,
        }
    }

    /// Check required fields and the lifecycle rules before any request.
    ///
    /// Returns the target estado when the step is allowed from `current`.
    pub fn check(&self, current: &Estado) -> Result<Estado, AppError> {
        match self {
            Transicion::Aprobar(form) => {
                let missing: Vec<&str> = [
                    ("tiempo_validez", &form.tiempo_validez),
                    ("hora_inicio", &form.hora_inicio),
                    ("hora_fin", &form.hora_fin),
                    ("firma_tecnico", &form.firma_tecnico),
                ]
                .into_iter()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|(name, _)| name)
                .collect();
                if !missing.is_empty() {
                    return Err(AppError::Validation(format!(
                        "missing validation fields: {}",
                        missing.join(", ")
                    )));
                }
            }
            Transicion::Rechazar { observaciones } => {
                if observaciones.trim().is_empty() {
                    return Err(AppError::Validation(
                        "a rejection needs the technician's observations".into(),
                    ));
                }
            }
            Transicion::Finalizar | Transicion::Alertar => {}
        }

        let target = self.target();
        if !current.can_transition_to(&target) {
            return Err(AppError::InvalidTransition {
                from: current.clone(),
                to: target,
            });
        }
        Ok(target)
    }
}
