//! Zoosanitary certificate view.
//!
//! Fills the fixed certificate layout from a record, substituting the blank
//! markers the paper form uses whenever a field is missing. Rendering is plain
//! text; the official PDF still comes from the backend.

use std::fmt::{self, Write as _};

use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::movilizacion::{AnimalEntry, BirdEntry, Estado, MobilizationRecord};

const BLANK_PERSON: &str = "_________________";
const BLANK_DATE: &str = "________";
const BLANK_VALIDITY: &str = "___";
const SLAUGHTERHOUSE_MARKER: &str = "Centro Faenamiento";
const TENURE_KINDS: [&str; 3] = ["Propio", "Arrendado", "Prestado"];
const MIN_ANIMAL_ROWS: usize = 7;
const MIN_BIRD_ROWS: usize = 3;

/// Hour and minute as printed on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: String,
    pub minute: String,
}

impl ClockTime {
    /// Split `HH:MM[:SS]`; missing parts print as `00`.
    pub fn from_field(raw: Option<&str>) -> Self {
        let mut parts = raw.unwrap_or_default().split(':').map(str::trim);
        let mut next = || {
            parts
                .next()
                .filter(|p| !p.is_empty())
                .unwrap_or("00")
                .to_string()
        };
        let hour = next();
        let minute = next();
        Self { hour, minute }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hour, self.minute)
    }
}

/// Every field of the certificate, already resolved to printable text.
#[derive(Debug, Clone)]
pub struct CertificateView {
    pub numero: String,
    pub fecha: String,
    pub nombre: String,
    pub ci: String,
    pub telefono: String,
    pub animals: Vec<AnimalEntry>,
    pub birds: Vec<BirdEntry>,
    pub origen_nombre: String,
    pub origen_parroquia: String,
    pub origen_ubicacion: String,
    /// Tenure kind ticked under "Datos adicionales", if any.
    pub tenencia: Option<String>,
    pub destino_es_faenamiento: bool,
    pub destino_nombre: String,
    pub destino_ubicacion: String,
    pub destino_parroquia: String,
    pub terrestre: bool,
    pub tipo_transporte: String,
    pub transportista: String,
    pub placa: String,
    pub cedula_transportista: String,
    pub telefono_transportista: String,
    pub detalle_otro: String,
    pub tiempo_validez: String,
    pub hora_inicio: ClockTime,
    pub hora_fin: ClockTime,
    pub fecha_emision: String,
    pub tecnico: String,
    pub interesado: String,
}

impl CertificateView {
    /// Build the view for a record the backend has already validated.
    pub fn from_record(record: &MobilizationRecord) -> Result<Self, AppError> {
        if !matches!(
            record.estado,
            Estado::Aprobado | Estado::Finalizado | Estado::Alerta
        ) {
            return Err(AppError::Validation(format!(
                "request {} is {}; only validated requests have a certificate",
                record.id, record.estado
            )));
        }

        let requester = record.requester.clone().unwrap_or_default();
        let origin = record.origin.clone().unwrap_or_default();
        let destination = record.destination.clone().unwrap_or_default();
        let transport = record.transport.clone().unwrap_or_default();
        let validation = record.validation.clone().unwrap_or_default();

        let destino_nombre = destination.nombre.clone().unwrap_or_default();
        let destino_es_faenamiento = destino_nombre.contains(SLAUGHTERHOUSE_MARKER);

        // The form shows tenure under the origin; older records only carry it on the destination.
        let tenencia = origin
            .condicion_tenencia
            .clone()
            .or(destination.condicion_tenencia.clone())
            .filter(|t| TENURE_KINDS.contains(&t.as_str()));

        Ok(Self {
            numero: format!("{:06}", record.id),
            fecha: format_date(record.fecha_solicitud, BLANK_DATE),
            nombre: requester.nombre.unwrap_or_else(|| BLANK_PERSON.into()),
            ci: requester.ci.unwrap_or_else(|| BLANK_PERSON.into()),
            telefono: requester.telefono.unwrap_or_else(|| BLANK_PERSON.into()),
            animals: record.animals.clone(),
            birds: record.birds.clone(),
            origen_nombre: origin.nombre.unwrap_or_default(),
            origen_parroquia: origin.parroquia.unwrap_or_default(),
            origen_ubicacion: origin.ubicacion.unwrap_or_default(),
            tenencia,
            destino_es_faenamiento,
            destino_nombre,
            destino_ubicacion: destination.ubicacion.unwrap_or_default(),
            destino_parroquia: destination.parroquia.unwrap_or_default(),
            terrestre: transport.es_terrestre,
            tipo_transporte: transport.tipo_transporte.unwrap_or_default(),
            transportista: transport.nombre_transportista.unwrap_or_default(),
            placa: transport.placa.unwrap_or_default(),
            cedula_transportista: transport.cedula_transportista.unwrap_or_default(),
            telefono_transportista: transport.telefono_transportista.unwrap_or_default(),
            detalle_otro: transport.detalle_otro.unwrap_or_else(|| "N/A".into()),
            tiempo_validez: validation
                .tiempo_validez
                .unwrap_or_else(|| BLANK_VALIDITY.into()),
            hora_inicio: ClockTime::from_field(validation.hora_inicio.as_deref()),
            hora_fin: ClockTime::from_field(validation.hora_fin.as_deref()),
            fecha_emision: format_date(validation.fecha_emision, BLANK_DATE),
            tecnico: validation
                .nombre_tecnico
                .unwrap_or_else(|| "NOMBRE TÉCNICO".into()),
            interesado: record
                .requester_name()
                .map(str::to_string)
                .unwrap_or_else(|| "NOMBRE USUARIO".into()),
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "CERTIFICADO ZOOSANITARIO PARA LA MOVILIZACIÓN DE ANIMALES EN LAS ISLAS")?;
        writeln!(out, "SANTA CRUZ                                             No. {}", self.numero)?;
        writeln!(out)?;
        writeln!(
            out,
            "La Agencia de Regulación y Control de la Bioseguridad y Cuarentena para Galápagos, \
             con fecha: {} autoriza al señor(a) {} con C.I. No. {}, y teléfono No. {}, \
             residente de la Provincia de Galápagos.",
            self.fecha, self.nombre, self.ci, self.telefono
        )?;
        writeln!(out)?;

        writeln!(out, "I LA MOVILIZACIÓN DE LOS SIGUIENTES ANIMALES DE LA ESPECIE")?;
        writeln!(
            out,
            "{:<5}{:<16}{:<12}{:<12}{:<8}{:<10}{:<10}{:<14}Observaciones",
            "Ord.", "Identificación", "Categoría", "Raza", "Sexo", "Color", "Edad", "Comerciante"
        )?;
        let animal_rows = self.animals.len().max(MIN_ANIMAL_ROWS);
        for idx in 0..animal_rows {
            match self.animals.get(idx) {
                Some(a) => writeln!(
                    out,
                    "{:<5}{:<16}{:<12}{:<12}{:<8}{:<10}{:<10}{:<14}{}",
                    idx + 1,
                    text(&a.identificador),
                    text(&a.categoria),
                    text(&a.raza),
                    text(&a.sexo),
                    text(&a.color),
                    a.edad_meses.map(|e| format!("{e} meses")).unwrap_or_default(),
                    text(&a.comerciante),
                    text(&a.observaciones),
                )?,
                None => writeln!(out, "{}", idx + 1)?,
            }
        }
        writeln!(out)?;

        writeln!(out, "Para el uso exclusivo de aves")?;
        writeln!(
            out,
            "{:<5}{:<12}{:<12}{:<12}{:<10}Observaciones",
            "Ord.", "No. galpón", "Categoría", "Edad", "Total"
        )?;
        let bird_rows = self.birds.len().max(MIN_BIRD_ROWS);
        for idx in 0..bird_rows {
            match self.birds.get(idx) {
                Some(b) => writeln!(
                    out,
                    "{:<5}{:<12}{:<12}{:<12}{:<10}{}",
                    idx + 1,
                    b.numero_galpon.as_deref().unwrap_or("-"),
                    text(&b.categoria),
                    b.edad_semanas.map(|e| format!("{e} semanas")).unwrap_or_default(),
                    b.total.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
                    text(&b.observaciones),
                )?,
                None => writeln!(out, "{}", idx + 1)?,
            }
        }
        writeln!(out)?;

        writeln!(out, "Desde:")?;
        writeln!(out, "  Predio / granja: {}", self.origen_nombre)?;
        writeln!(out, "  Parroquia: {}", self.origen_parroquia)?;
        writeln!(out, "  Localidad / sitio / km: {}", self.origen_ubicacion)?;
        let tenure: Vec<String> = TENURE_KINDS
            .iter()
            .map(|kind| format!("{} {kind}", checkbox(self.tenencia.as_deref() == Some(*kind))))
            .collect();
        writeln!(out, "  Datos adicionales: {}", tenure.join("  "))?;
        writeln!(out, "Destino:")?;
        writeln!(
            out,
            "  {} Centro de faenamiento: {}",
            checkbox(self.destino_es_faenamiento),
            if self.destino_es_faenamiento { self.destino_nombre.as_str() } else { "" }
        )?;
        writeln!(
            out,
            "  {} Predio. Nombre del predio: {}",
            checkbox(!self.destino_es_faenamiento),
            if self.destino_es_faenamiento { "" } else { self.destino_nombre.as_str() }
        )?;
        writeln!(out, "  Ubicación. Dirección o referencia: {}", self.destino_ubicacion)?;
        writeln!(out, "  Parroquia: {}", self.destino_parroquia)?;
        writeln!(out)?;

        writeln!(out, "II VÍA DE TRANSPORTE")?;
        writeln!(out, "  {} Terrestre", checkbox(self.terrestre))?;
        writeln!(out, "  Tipo de transporte: {}", self.tipo_transporte)?;
        writeln!(out, "  Nombre del transportista: {}", self.transportista)?;
        writeln!(out, "  No. matrícula / placa: {}", self.placa)?;
        writeln!(out, "  Cédula de identidad: {}", self.cedula_transportista)?;
        writeln!(out, "  Teléfono: {}", self.telefono_transportista)?;
        writeln!(out, "  {} Otros", checkbox(!self.terrestre))?;
        writeln!(out, "  Detalle de otro: {}", self.detalle_otro)?;
        writeln!(out)?;

        writeln!(out, "III VALIDEZ Y FIRMAS DE RESPONSABILIDAD")?;
        writeln!(
            out,
            "ESTA GUÍA ES VÁLIDA POR EL TIEMPO DE {} A PARTIR DE LAS {} HASTA {}",
            self.tiempo_validez, self.hora_inicio, self.hora_fin
        )?;
        writeln!(out, "FECHA DE EMISIÓN: {}", self.fecha_emision)?;
        writeln!(out)?;
        writeln!(out, "{:<45}{}", self.tecnico, self.interesado)?;
        writeln!(
            out,
            "{:<45}{}",
            "NOMBRE Y FIRMA DEL MÉDICO(A) VETERINARIO(A) / TÉCNICO", "NOMBRE Y FIRMA DEL INTERESADO"
        )?;
        writeln!(out)?;
        writeln!(out, "Original usuario, copia 1 centro de faenamiento, copia 2 área técnica.")
    }
}

impl fmt::Display for CertificateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn format_date(value: Option<NaiveDateTime>, blank: &str) -> String {
    value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| blank.to_string())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}
