//! Interfaz de línea de comandos basada en clap.
//!
//! Define [`Cli`] con los subcomandos [`Command`] de consulta (listar, resumen,
//! estados, mensual, ver, usuario), de certificado y de ciclo de vida
//! (aprobar, rechazar, finalizar, alertar), más las flags globales
//! `--api-url`, `--token` y `--verbose`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::api::ValidacionForm;
use crate::error::AppError;
use crate::movilizacion::{FilterSpec, Transicion};

/// Reportes y certificación de movilizaciones de ganado.
#[derive(Debug, Parser)]
#[command(name = "movilizaciones", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL base del backend (sobrescribe MOVILIZACIONES_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Token de sesión (sobrescribe MOVILIZACIONES_TOKEN).
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Habilita registro detallado en stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Filtros compartidos por los comandos de consulta.
#[derive(Debug, Clone, Default, Args)]
pub struct FiltroArgs {
    /// Fecha de solicitud mínima (AAAA-MM-DD), inclusive.
    #[arg(long, conflicts_with = "anio")]
    pub desde: Option<NaiveDate>,

    /// Fecha de solicitud máxima (AAAA-MM-DD), inclusive.
    #[arg(long, conflicts_with = "anio")]
    pub hasta: Option<NaiveDate>,

    /// Estado de la solicitud (pendiente, aprobado, finalizado, ...).
    #[arg(long)]
    pub estado: Option<String>,

    /// Nombre del solicitante, búsqueda parcial.
    #[arg(long)]
    pub granjero: Option<String>,

    /// Cédula exacta del solicitante.
    #[arg(long)]
    pub cedula: Option<String>,

    /// Búsqueda libre en id, solicitante, cédula y predios.
    #[arg(long)]
    pub texto: Option<String>,

    /// Año del periodo de reporte.
    #[arg(long)]
    pub anio: Option<i32>,

    /// Mes del periodo (1-12); requiere --anio.
    #[arg(long, requires = "anio", conflicts_with_all = ["mes_desde", "mes_hasta"])]
    pub mes: Option<u32>,

    /// Primer mes de un rango; requiere --anio.
    #[arg(long, requires = "anio")]
    pub mes_desde: Option<u32>,

    /// Último mes de un rango; requiere --anio.
    #[arg(long, requires = "anio")]
    pub mes_hasta: Option<u32>,

    /// Usa el endpoint de filtrado del servidor antes de filtrar localmente.
    #[arg(long, default_value_t = false)]
    pub remoto: bool,
}

impl FiltroArgs {
    /// Traduce las flags a un [`FilterSpec`], resolviendo el periodo si hay `--anio`.
    pub fn to_filter_spec(&self) -> Result<FilterSpec, AppError> {
        let (fecha_inicio, fecha_fin) = match self.anio {
            Some(year) => {
                let (start, end) =
                    FilterSpec::for_period(year, self.mes, self.mes_desde, self.mes_hasta)?;
                (Some(start), Some(end))
            }
            None => (self.desde, self.hasta),
        };
        if let (Some(desde), Some(hasta)) = (fecha_inicio, fecha_fin)
            && desde > hasta
        {
            return Err(AppError::Validation(format!(
                "--desde {desde} is after --hasta {hasta}"
            )));
        }
        Ok(FilterSpec {
            fecha_inicio,
            fecha_fin,
            estado: self.estado.clone(),
            granjero: self.granjero.clone(),
            cedula: self.cedula.clone(),
            ci: None,
            texto: self.texto.clone(),
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista las movilizaciones que cumplen los filtros.
    Listar {
        #[command(flatten)]
        filtros: FiltroArgs,
    },

    /// Totales de movilizaciones, animales y aves.
    Resumen {
        #[command(flatten)]
        filtros: FiltroArgs,

        /// Imprime los totales como JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Conteo de movilizaciones por estado.
    Estados {
        #[command(flatten)]
        filtros: FiltroArgs,

        /// Usa las estadísticas calculadas por el servidor.
        #[arg(long, default_value_t = false)]
        servidor: bool,
    },

    /// Conteo de movilizaciones por mes de solicitud.
    Mensual {
        #[command(flatten)]
        filtros: FiltroArgs,
    },

    /// Muestra el detalle de una solicitud.
    Ver { id: i64 },

    /// Movilizaciones de un solicitante por cédula.
    Usuario {
        cedula: String,

        #[arg(long)]
        desde: Option<NaiveDate>,

        #[arg(long)]
        hasta: Option<NaiveDate>,
    },

    /// Certificado zoosanitario de una solicitud validada.
    Certificado {
        id: i64,

        /// Guarda el PDF oficial del servidor en este archivo en lugar de imprimir el texto.
        #[arg(long)]
        salida: Option<PathBuf>,
    },

    /// Aprueba una solicitud registrando la validación técnica.
    Aprobar {
        id: i64,

        /// Tiempo de validez de la guía, p. ej. "5 horas".
        #[arg(long)]
        validez: String,

        /// Hora de inicio (HH:MM).
        #[arg(long)]
        hora_inicio: String,

        /// Hora de fin (HH:MM).
        #[arg(long)]
        hora_fin: String,

        /// Firma del técnico.
        #[arg(long)]
        firma: String,
    },

    /// Rechaza una solicitud con observaciones.
    Rechazar {
        id: i64,

        #[arg(long)]
        observaciones: String,
    },

    /// Marca una solicitud aprobada como finalizada.
    Finalizar { id: i64 },

    /// Marca una solicitud con alerta.
    Alertar { id: i64 },
}

impl Command {
    /// El paso de ciclo de vida que pide el comando, si es uno.
    pub fn transicion(&self) -> Option<(i64, Transicion)> {
        match self {
            Command::Aprobar {
                id,
                validez,
                hora_inicio,
                hora_fin,
                firma,
            } => Some((
                *id,
                Transicion::Aprobar(ValidacionForm {
                    tiempo_validez: validez.clone(),
                    hora_inicio: hora_inicio.clone(),
                    hora_fin: hora_fin.clone(),
                    firma_tecnico: firma.clone(),
                }),
            )),
            Command::Rechazar { id, observaciones } => Some((
                *id,
                Transicion::Rechazar {
                    observaciones: observaciones.clone(),
                },
            )),
            Command::Finalizar { id } => Some((*id, Transicion::Finalizar)),
            Command::Alertar { id } => Some((*id, Transicion::Alertar)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_listar_with_filters() {
        let cli = Cli::parse_from([
            "movilizaciones",
            "listar",
            "--desde",
            "2025-08-01",
            "--hasta",
            "2025-08-31",
            "--estado",
            "aprobado",
        ]);
        match cli.command {
            Command::Listar { filtros } => {
                let spec = filtros.to_filter_spec().unwrap();
                assert_eq!(spec.fecha_inicio, NaiveDate::from_ymd_opt(2025, 8, 1));
                assert_eq!(spec.fecha_fin, NaiveDate::from_ymd_opt(2025, 8, 31));
                assert_eq!(spec.estado.as_deref(), Some("aprobado"));
                assert!(!filtros.remoto);
            }
            _ => panic!("expected Listar command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "movilizaciones",
            "--api-url",
            "http://example/api",
            "--token",
            "a.b.c",
            "--verbose",
            "ver",
            "7",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://example/api"));
        assert_eq!(cli.token.as_deref(), Some("a.b.c"));
        assert!(matches!(cli.command, Command::Ver { id: 7 }));
    }

    #[test]
    fn period_flags_become_a_date_range() {
        let cli = Cli::parse_from(["movilizaciones", "mensual", "--anio", "2024", "--mes", "2"]);
        let Command::Mensual { filtros } = cli.command else {
            panic!("expected Mensual command");
        };
        let spec = filtros.to_filter_spec().unwrap();
        assert_eq!(spec.fecha_inicio, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(spec.fecha_fin, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn month_without_year_is_rejected() {
        assert!(Cli::try_parse_from(["movilizaciones", "listar", "--mes", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["movilizaciones", "listar", "--anio", "2025", "--desde", "2025-01-01"])
                .is_err()
        );
    }

    #[test]
    fn reversed_range_is_a_validation_error() {
        let filtros = FiltroArgs {
            desde: NaiveDate::from_ymd_opt(2025, 9, 1),
            hasta: NaiveDate::from_ymd_opt(2025, 8, 1),
            ..Default::default()
        };
        assert!(matches!(filtros.to_filter_spec(), Err(AppError::Validation(_))));
    }

    #[test]
    fn lifecycle_commands_map_to_transitions() {
        let cli = Cli::parse_from([
            "movilizaciones",
            "aprobar",
            "12",
            "--validez",
            "5 horas",
            "--hora-inicio",
            "08:00",
            "--hora-fin",
            "13:00",
            "--firma",
            "LM",
        ]);
        let (id, transicion) = cli.command.transicion().unwrap();
        assert_eq!(id, 12);
        assert!(matches!(transicion, Transicion::Aprobar(ref f) if f.firma_tecnico == "LM"));

        let cli = Cli::parse_from(["movilizaciones", "finalizar", "3"]);
        assert!(matches!(cli.command.transicion(), Some((3, Transicion::Finalizar))));

        let cli = Cli::parse_from(["movilizaciones", "listar"]);
        assert!(cli.command.transicion().is_none());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
