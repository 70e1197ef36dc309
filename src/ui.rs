//! Interfaz de terminal: spinners y salida coloreada.
//!
//! Usa `indicatif` para el spinner mientras se consulta el backend y `console`
//! para colorear los estados. Las funciones `*_table`/`*_text` devuelven el
//! texto para poder probarlo; las `print_*` lo escriben en stdout.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::certificate::CertificateView;
use crate::error::{AppError, ErrorClass};
use crate::movilizacion::{
    Estado, EstadoColor, EstadoCount, MobilizationRecord, MonthCount, Totals,
};

/// Spinner mostrado en stderr mientras dura una petición.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

/// Estilo de terminal para cada color de estado.
pub fn estado_style(estado: &Estado) -> Style {
    match estado.color() {
        EstadoColor::Green => Style::new().green().bold(),
        EstadoColor::Yellow => Style::new().yellow(),
        // 208: naranja en la paleta de 256 colores.
        EstadoColor::Orange => Style::new().color256(208),
        EstadoColor::Red => Style::new().red().bold(),
        EstadoColor::Gray => Style::new().dim(),
    }
}

fn styled_estado(estado: &Estado, width: usize) -> String {
    let label = format!("{:<width$}", estado.label());
    estado_style(estado).apply_to(label).to_string()
}

fn fecha_text(record: &MobilizationRecord) -> String {
    match (record.fecha_solicitud, &record.fecha_solicitud_raw) {
        (Some(fecha), _) => fecha.format("%d/%m/%Y").to_string(),
        (None, Some(raw)) => raw.clone(),
        (None, None) => "-".to_string(),
    }
}

pub fn records_table(records: &[MobilizationRecord]) -> String {
    if records.is_empty() {
        return "No hay movilizaciones que coincidan con los filtros.\n".to_string();
    }
    let header = Style::new().bold();
    let mut out = format!(
        "{}\n",
        header.apply_to(format!(
            "{:>6}  {:<10}  {:<28}  {:<12}  {:<12}  {:>8}  {:>6}",
            "ID", "Fecha", "Solicitante", "Cédula", "Estado", "Animales", "Aves"
        ))
    );
    for record in records {
        out.push_str(&format!(
            "{:>6}  {:<10}  {:<28}  {:<12}  {}  {:>8}  {:>6}\n",
            record.id,
            fecha_text(record),
            truncate(record.requester_name().unwrap_or("-"), 28),
            record.identity().unwrap_or("-"),
            styled_estado(&record.estado, 12),
            record.animal_count(),
            record.bird_count(),
        ));
    }
    out
}

pub fn totals_text(totals: &Totals) -> String {
    format!(
        "Total movilizaciones: {}\nTotal animales:       {}\nTotal aves:           {}\n",
        totals.total_movilizaciones, totals.total_animales, totals.total_aves
    )
}

pub fn estado_counts_table(counts: &[EstadoCount]) -> String {
    if counts.is_empty() {
        return "Sin datos por estado.\n".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{}  {:>6}\n", styled_estado(&c.estado, 14), c.total))
        .collect()
}

pub fn month_counts_table(counts: &[MonthCount]) -> String {
    if counts.is_empty() {
        return "Sin datos por mes.\n".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{:<11} {}  {:>6}\n", month_name(c.month), c.year, c.total))
        .collect()
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio", "Julio", "Agosto",
        "Septiembre", "Octubre", "Noviembre", "Diciembre",
    ];
    (month as usize)
        .checked_sub(1)
        .and_then(|idx| NAMES.get(idx))
        .copied()
        .unwrap_or("?")
}

pub fn record_detail(record: &MobilizationRecord) -> String {
    let mut out = format!(
        "Solicitud {}  {}\n",
        record.id,
        styled_estado(&record.estado, 0)
    );
    out.push_str(&format!("  Fecha:        {}\n", fecha_text(record)));
    out.push_str(&format!(
        "  Solicitante:  {} ({})\n",
        record.requester_name().unwrap_or("-"),
        record.identity().unwrap_or("-")
    ));
    let predio = |p: &Option<crate::movilizacion::Property>| {
        p.as_ref()
            .and_then(|p| p.nombre.clone())
            .unwrap_or_else(|| "-".to_string())
    };
    out.push_str(&format!("  Origen:       {}\n", predio(&record.origin)));
    out.push_str(&format!("  Destino:      {}\n", predio(&record.destination)));
    out.push_str(&format!(
        "  Animales:     {} en {} registro(s)\n",
        record.animal_count(),
        record.animals.len()
    ));
    out.push_str(&format!(
        "  Aves:         {} en {} registro(s)\n",
        record.bird_count(),
        record.birds.len()
    ));
    if let Some(tecnico) = record.technician() {
        out.push_str(&format!("  Técnico:      {tecnico}\n"));
    }
    out
}

pub fn print_records(records: &[MobilizationRecord]) {
    print!("{}", records_table(records));
}

pub fn print_totals(totals: &Totals) {
    println!();
    print!("{}", totals_text(totals));
}

pub fn print_estado_counts(counts: &[EstadoCount]) {
    print!("{}", estado_counts_table(counts));
}

pub fn print_month_counts(counts: &[MonthCount]) {
    print!("{}", month_counts_table(counts));
}

pub fn print_record(record: &MobilizationRecord) {
    print!("{}", record_detail(record));
}

pub fn print_certificate(view: &CertificateView) {
    print!("{view}");
}

/// Aviso no fatal, p. ej. el servidor no respondió y la vista está vacía.
pub fn print_notice(notice: &str) {
    eprintln!("  {} {notice}", Style::new().yellow().apply_to("!"));
}

pub fn print_transition_ok(id: i64, before: &Estado, after: &Estado) {
    println!(
        "  {} Solicitud {id}: {} -> {}",
        Style::new().green().bold().apply_to("✓"),
        styled_estado(before, 0),
        styled_estado(after, 0)
    );
}

/// La petición falló: la solicitud sigue en su estado anterior.
pub fn print_transition_failed(id: i64, current: &Estado) {
    eprintln!(
        "  {} Solicitud {id} sin cambios, sigue en {}",
        Style::new().red().bold().apply_to("✗"),
        styled_estado(current, 0)
    );
}

pub fn print_error(error: &AppError) {
    let hint = match error.class() {
        ErrorClass::Auth => "Sesión inválida o expirada; revise el token.",
        ErrorClass::Network => "No se pudo completar la petición al servidor.",
        ErrorClass::Malformed => "Respuesta inesperada del servidor.",
        ErrorClass::Validation => "Datos inválidos.",
        ErrorClass::Internal => "Error interno.",
    };
    eprintln!("{} {hint}", Style::new().red().bold().apply_to("error:"));
    eprintln!("  {error}");
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
