//! Composable filters over mobilization records.
//!
//! All active filters are AND-combined. Blank text fields are ignored, so an
//! empty [`FilterSpec`] returns every record in its original order.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use super::estado::{Estado, normalize_estado};
use super::record::MobilizationRecord;
use crate::error::AppError;

/// User-specified filter set. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Inclusive lower bound on the request date.
    pub fecha_inicio: Option<NaiveDate>,
    /// Inclusive upper bound on the request date (whole day).
    pub fecha_fin: Option<NaiveDate>,
    pub estado: Option<String>,
    /// Case-insensitive substring of the requester name.
    pub granjero: Option<String>,
    /// Exact national id. Takes precedence over `ci`.
    pub cedula: Option<String>,
    pub ci: Option<String>,
    /// Free text over id, names, ids, estado and properties.
    pub texto: Option<String>,
}

impl FilterSpec {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.fecha_inicio.is_none()
            && self.fecha_fin.is_none()
            && active(&self.estado).is_none()
            && active(&self.granjero).is_none()
            && self.identity().is_none()
            && active(&self.texto).is_none()
    }

    /// The identity filter in effect, if any.
    pub fn identity(&self) -> Option<&str> {
        active(&self.cedula).or_else(|| active(&self.ci))
    }

    /// The estado filter, normalized the same way records are.
    pub fn estado(&self) -> Option<Estado> {
        active(&self.estado).map(|raw| normalize_estado(Some(raw)))
    }

    /// Date bounds for a reporting period.
    ///
    /// A single `month` selects that month; `month_from`..=`month_to`
    /// selects a range of months; neither selects the whole year.
    pub fn for_period(
        year: i32,
        month: Option<u32>,
        month_from: Option<u32>,
        month_to: Option<u32>,
    ) -> Result<(NaiveDate, NaiveDate), AppError> {
        let (first, last) = match (month, month_from, month_to) {
            (Some(m), _, _) => (m, m),
            (None, Some(from), Some(to)) => (from, to),
            (None, None, None) => (1, 12),
            _ => {
                return Err(AppError::Validation(
                    "a month range needs both --mes-desde and --mes-hasta".into(),
                ));
            }
        };
        if !(1..=12).contains(&first) || !(1..=12).contains(&last) || first > last {
            return Err(AppError::Validation(format!(
                "invalid month range {first}..{last}"
            )));
        }

        let start = NaiveDate::from_ymd_opt(year, first, 1)
            .ok_or_else(|| AppError::Validation(format!("invalid year {year}")))?;
        let end = last_day_of_month(year, last)
            .ok_or_else(|| AppError::Validation(format!("invalid year {year}")))?;
        Ok((start, end))
    }
}

/// Apply filters to a slice of records, returning the matching ones.
///
/// The input is never modified and the relative order is preserved.
/// Records whose request date could not be parsed are excluded whenever a
/// date bound is active.
pub fn apply_filters(records: &[MobilizationRecord], filters: &FilterSpec) -> Vec<MobilizationRecord> {
    if filters.is_empty() {
        return records.to_vec();
    }

    let compiled = Compiled::new(filters);
    records
        .iter()
        .filter(|record| compiled.matches(record))
        .cloned()
        .collect()
}

// Filter values prepared once per call instead of once per record.
struct Compiled<'a> {
    from: Option<NaiveDateTime>,
    to: Option<NaiveDate>,
    estado: Option<Estado>,
    granjero: Option<String>,
    identity: Option<&'a str>,
    texto: Option<String>,
}

impl<'a> Compiled<'a> {
    fn new(filters: &'a FilterSpec) -> Self {
        Self {
            from: filters.fecha_inicio.map(|d| d.and_time(NaiveTime::MIN)),
            to: filters.fecha_fin,
            estado: filters.estado(),
            granjero: active(&filters.granjero).map(str::to_lowercase),
            identity: filters.identity(),
            texto: active(&filters.texto).map(str::to_lowercase),
        }
    }

    fn matches(&self, record: &MobilizationRecord) -> bool {
        // Date range
        if self.from.is_some() || self.to.is_some() {
            let Some(fecha) = record.fecha_solicitud else {
                return false;
            };
            if self.from.is_some_and(|from| fecha < from) {
                return false;
            }
            // The end day is inclusive down to the last sub-second.
            if self.to.is_some_and(|to| fecha.date() > to) {
                return false;
            }
        }

        if let Some(ref estado) = self.estado {
            if !record.estado.same_as(estado) {
                return false;
            }
        }

        if let Some(ref granjero) = self.granjero {
            let matches = record
                .requester_name()
                .is_some_and(|name| name.to_lowercase().contains(granjero.as_str()));
            if !matches {
                return false;
            }
        }

        if let Some(identity) = self.identity {
            if record.identity() != Some(identity) {
                return false;
            }
        }

        if let Some(ref texto) = self.texto {
            if !matches_text(record, texto) {
                return false;
            }
        }

        true
    }
}

fn matches_text(record: &MobilizationRecord, needle: &str) -> bool {
    let id = record.id.to_string();
    let requester = record.requester.as_ref();
    let fields = [
        Some(id.as_str()),
        requester.and_then(|r| r.nombre.as_deref()),
        requester.and_then(|r| r.ci.as_deref()),
        Some(record.estado.label()),
        record.origin.as_ref().and_then(|p| p.nombre.as_deref()),
        record.destination.as_ref().and_then(|p| p.nombre.as_deref()),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .filter(|d| d.year() == year)
}
