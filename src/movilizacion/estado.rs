use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical lifecycle states of a mobilization request.
///
/// Each request flows through: PENDIENTE → APROBADO → FINALIZADO, with
/// RECHAZADO as the other exit from PENDIENTE and ALERTA as a flagged
/// sub-state of an approved request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estado {
    /// The backend sent no state at all.
    SinEstado,
    Pendiente,
    EnRevision,
    Aprobado,
    Finalizado,
    Alerta,
    Rechazado,
    /// A value missing from the mapping table, kept exactly as received.
    Desconocido(String),
}

/// Every raw backend value we know about, compared after trim + lowercase.
const ESTADO_TABLE: &[(&str, Estado)] = &[
    ("pendiente", Estado::Pendiente),
    ("en revisión", Estado::EnRevision),
    ("en revision", Estado::EnRevision),
    ("en_revision", Estado::EnRevision),
    ("revision", Estado::EnRevision),
    ("aprobado", Estado::Aprobado),
    ("aprobada", Estado::Aprobado),
    ("finalizado", Estado::Finalizado),
    ("finalizada", Estado::Finalizado),
    ("alerta", Estado::Alerta),
    ("rechazado", Estado::Rechazado),
    ("rechazada", Estado::Rechazado),
];

const FROM_PENDIENTE: &[Estado] = &[Estado::Aprobado, Estado::Rechazado];
const FROM_APROBADO: &[Estado] = &[Estado::Finalizado, Estado::Alerta];
const FROM_ALERTA: &[Estado] = &[Estado::Finalizado];

/// Map a raw backend state onto the closed [`Estado`] set.
///
/// `None` and blank strings become [`Estado::SinEstado`]. Values outside the
/// mapping table are passed through as [`Estado::Desconocido`] and logged.
pub fn normalize_estado(raw: Option<&str>) -> Estado {
    let Some(raw) = raw else {
        return Estado::SinEstado;
    };
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return Estado::SinEstado;
    }

    match ESTADO_TABLE.iter().find(|(known, _)| *known == key) {
        Some((_, estado)) => estado.clone(),
        None => {
            tracing::warn!(estado = raw, "unrecognized estado from backend");
            Estado::Desconocido(raw.to_string())
        }
    }
}

/// Display colour used by the terminal views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstadoColor {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl Estado {
    /// Human label shown in tables, cards and charts.
    pub fn label(&self) -> &str {
        match self {
            Estado::SinEstado => "Sin estado",
            Estado::Pendiente => "Pendiente",
            Estado::EnRevision => "En revisión",
            Estado::Aprobado => "Aprobado",
            Estado::Finalizado => "Finalizada",
            Estado::Alerta => "Alerta",
            Estado::Rechazado => "Rechazado",
            Estado::Desconocido(raw) => raw,
        }
    }

    /// Lower-case value the backend expects in query strings.
    pub fn api_value(&self) -> String {
        match self {
            Estado::SinEstado => String::new(),
            Estado::Pendiente | Estado::EnRevision => "pendiente".to_string(),
            Estado::Aprobado => "aprobado".to_string(),
            Estado::Finalizado => "finalizado".to_string(),
            Estado::Alerta => "alerta".to_string(),
            Estado::Rechazado => "rechazado".to_string(),
            Estado::Desconocido(raw) => raw.trim().to_lowercase(),
        }
    }

    pub fn color(&self) -> EstadoColor {
        match self {
            Estado::Aprobado | Estado::Finalizado => EstadoColor::Green,
            Estado::Pendiente | Estado::EnRevision => EstadoColor::Yellow,
            Estado::Alerta => EstadoColor::Orange,
            Estado::Rechazado => EstadoColor::Red,
            Estado::SinEstado | Estado::Desconocido(_) => EstadoColor::Gray,
        }
    }

    /// Position in the canonical ordering used by summaries.
    pub fn rank(&self) -> usize {
        match self {
            Estado::Pendiente => 0,
            Estado::EnRevision => 1,
            Estado::Aprobado => 2,
            Estado::Alerta => 3,
            Estado::Finalizado => 4,
            Estado::Rechazado => 5,
            Estado::SinEstado => 6,
            Estado::Desconocido(_) => 7,
        }
    }

    /// Whether two states count as the same for filtering.
    ///
    /// Unknown states compare on their trimmed, lower-cased raw text.
    pub fn same_as(&self, other: &Estado) -> bool {
        match (self, other) {
            (Estado::Desconocido(a), Estado::Desconocido(b)) => {
                a.trim().to_lowercase() == b.trim().to_lowercase()
            }
            _ => self == other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Estado::Finalizado | Estado::Rechazado)
    }

    /// States the backend accepts as the next step from `self`.
    pub fn successors(&self) -> &'static [Estado] {
        match self {
            Estado::Pendiente | Estado::EnRevision => FROM_PENDIENTE,
            Estado::Aprobado => FROM_APROBADO,
            Estado::Alerta => FROM_ALERTA,
            _ => &[],
        }
    }

    pub fn can_transition_to(&self, next: &Estado) -> bool {
        self.successors().contains(next)
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_values_regardless_of_case() {
        assert_eq!(normalize_estado(Some("PENDIENTE")), Estado::Pendiente);
        assert_eq!(normalize_estado(Some("  Aprobado ")), Estado::Aprobado);
        assert_eq!(normalize_estado(Some("finalizada")), Estado::Finalizado);
        assert_eq!(normalize_estado(Some("Finalizado")), Estado::Finalizado);
        assert_eq!(normalize_estado(Some("En Revision")), Estado::EnRevision);
        assert_eq!(normalize_estado(Some("en revisión")), Estado::EnRevision);
        assert_eq!(normalize_estado(Some("ALERTA")), Estado::Alerta);
        assert_eq!(normalize_estado(Some("rechazada")), Estado::Rechazado);
    }

    #[test]
    fn null_input_returns_sentinel() {
        let estado = normalize_estado(None);
        assert_eq!(estado, Estado::SinEstado);
        assert_eq!(estado.label(), "Sin estado");
        assert_eq!(normalize_estado(Some("   ")), Estado::SinEstado);
    }

    #[test]
    fn unknown_value_passes_through_unchanged() {
        let estado = normalize_estado(Some("En Tránsito"));
        assert_eq!(estado, Estado::Desconocido("En Tránsito".into()));
        assert_eq!(estado.label(), "En Tránsito");
    }

    #[test]
    fn labels() {
        assert_eq!(Estado::Pendiente.to_string(), "Pendiente");
        assert_eq!(Estado::EnRevision.to_string(), "En revisión");
        assert_eq!(Estado::Aprobado.to_string(), "Aprobado");
        assert_eq!(Estado::Finalizado.to_string(), "Finalizada");
        assert_eq!(Estado::Alerta.to_string(), "Alerta");
        assert_eq!(Estado::Rechazado.to_string(), "Rechazado");
    }

    #[test]
    fn unknown_states_compare_case_insensitively() {
        let a = Estado::Desconocido("En Tránsito".into());
        let b = Estado::Desconocido(" en tránsito".into());
        assert!(a.same_as(&b));
        assert!(!a.same_as(&Estado::Pendiente));
    }

    #[test]
    fn lifecycle_transitions() {
        assert!(Estado::Pendiente.can_transition_to(&Estado::Aprobado));
        assert!(Estado::Pendiente.can_transition_to(&Estado::Rechazado));
        assert!(Estado::EnRevision.can_transition_to(&Estado::Aprobado));
        assert!(Estado::Aprobado.can_transition_to(&Estado::Finalizado));
        assert!(Estado::Aprobado.can_transition_to(&Estado::Alerta));
        assert!(Estado::Alerta.can_transition_to(&Estado::Finalizado));

        assert!(!Estado::Pendiente.can_transition_to(&Estado::Finalizado));
        assert!(!Estado::Rechazado.can_transition_to(&Estado::Aprobado));
        assert!(!Estado::Finalizado.can_transition_to(&Estado::Alerta));
    }

    #[test]
    fn terminal_states() {
        assert!(Estado::Finalizado.is_terminal());
        assert!(Estado::Rechazado.is_terminal());
        assert!(!Estado::Alerta.is_terminal());
        assert!(Estado::Finalizado.successors().is_empty());
    }

    #[test]
    fn colors_follow_report_palette() {
        assert_eq!(Estado::Aprobado.color(), EstadoColor::Green);
        assert_eq!(Estado::Finalizado.color(), EstadoColor::Green);
        assert_eq!(Estado::Pendiente.color(), EstadoColor::Yellow);
        assert_eq!(Estado::Alerta.color(), EstadoColor::Orange);
        assert_eq!(Estado::Rechazado.color(), EstadoColor::Red);
        assert_eq!(Estado::SinEstado.color(), EstadoColor::Gray);
    }

    #[test]
    fn api_values_are_lowercase() {
        assert_eq!(Estado::EnRevision.api_value(), "pendiente");
        assert_eq!(Estado::Desconocido(" Otro ".into()).api_value(), "otro");
    }
}
