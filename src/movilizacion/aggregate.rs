//! Summary counts over a (usually filtered) record set.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::estado::{Estado, normalize_estado};
use super::record::MobilizationRecord;
use crate::api::types::RawEstadoStat;

/// Totals shown on the report cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_movilizaciones: usize,
    pub total_animales: u64,
    pub total_aves: u64,
}

/// Number of records in one estado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstadoCount {
    pub estado: Estado,
    pub total: u64,
}

/// Number of requests filed in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub total: u64,
}

pub fn aggregate(records: &[MobilizationRecord]) -> Totals {
    records.iter().fold(Totals::default(), |mut acc, record| {
        acc.total_movilizaciones += 1;
        acc.total_animales = acc.total_animales.saturating_add(record.animal_count());
        acc.total_aves = acc.total_aves.saturating_add(record.bird_count());
        acc
    })
}

/// Records per estado, in canonical order with unknown states last.
pub fn count_by_estado(records: &[MobilizationRecord]) -> Vec<EstadoCount> {
    let mut counts: Vec<EstadoCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|c| c.estado.same_as(&record.estado)) {
            Some(entry) => entry.total += 1,
            None => counts.push(EstadoCount {
                estado: record.estado.clone(),
                total: 1,
            }),
        }
    }
    sort_counts(&mut counts);
    counts
}

/// Convert the backend's pre-computed statistics into the same shape.
pub fn counts_from_stats(stats: Vec<RawEstadoStat>) -> Vec<EstadoCount> {
    let mut counts: Vec<EstadoCount> = Vec::new();
    for stat in stats {
        let estado = normalize_estado(stat.estado.as_deref());
        let total = stat.total.unwrap_or(0);
        match counts.iter_mut().find(|c| c.estado.same_as(&estado)) {
            Some(entry) => entry.total += total,
            None => counts.push(EstadoCount { estado, total }),
        }
    }
    sort_counts(&mut counts);
    counts
}

/// Requests per calendar month, oldest first. Undated records are skipped.
pub fn count_by_month(records: &[MobilizationRecord]) -> Vec<MonthCount> {
    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for fecha in records.iter().filter_map(|r| r.fecha_solicitud) {
        *months.entry((fecha.year(), fecha.month())).or_insert(0) += 1;
    }
    months
        .into_iter()
        .map(|((year, month), total)| MonthCount { year, month, total })
        .collect()
}

fn sort_counts(counts: &mut [EstadoCount]) {
    counts.sort_by(|a, b| {
        a.estado
            .rank()
            .cmp(&b.estado.rank())
            .then_with(|| a.estado.label().cmp(b.estado.label()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::decode_list;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<MobilizationRecord> {
        decode_list(value)
            .unwrap()
            .into_iter()
            .map(MobilizationRecord::from_raw)
            .collect()
    }

    #[test]
    fn aggregates_reference_example() {
        let all = records(json!([
            { "id": 1, "estado": "PENDIENTE", "Animals": [{ "cantidad": 5 }], "Aves": [] },
            { "id": 2, "estado": "finalizado", "Animals": [], "Aves": [{ "total_aves": 100 }] }
        ]));
        assert_eq!(
            aggregate(&all),
            Totals {
                total_movilizaciones: 2,
                total_animales: 5,
                total_aves: 100,
            }
        );
    }

    #[test]
    fn oversized_counts_saturate_totals() {
        let all = records(json!([
            { "id": 1, "Animals": [{ "cantidad": 1e20 }, { "cantidad": 1e20 }] },
            { "id": 2, "Animals": [{ "cantidad": 1e20 }], "Aves": [{ "total_aves": 1e20 }] },
            { "id": 3, "Aves": [{ "total": 1e20 }] }
        ]));
        let totals = aggregate(&all);
        assert_eq!(totals.total_movilizaciones, 3);
        assert_eq!(totals.total_animales, u64::MAX);
        assert_eq!(totals.total_aves, u64::MAX);
    }

    #[test]
    fn malformed_fields_still_count_the_record() {
        let all = records(json!([
            { "id": 1, "estado": "pendiente", "Animals": [{ "cantidad": 5 }] },
            { "id": 2, "estado": 3 },
            { "id": 3, "fecha_solicitud": 1754000000000u64 },
            { "id": 4, "Animals": [{ "cantidad": 2 }, null] }
        ]));
        let totals = aggregate(&all);
        assert_eq!(totals.total_movilizaciones, 4);
        // id 2 and id 3 have no animals, id 4 keeps its valid entry.
        assert_eq!(totals.total_animales, 7);
    }

    #[test]
    fn single_record_animals_match_entry_sum() {
        let one = records(json!([
            { "id": 1, "Animals": [{ "cantidad": 3 }, {}, { "cantidad": 0 }] }
        ]));
        assert_eq!(aggregate(&one).total_animales, one[0].animal_count());
        assert_eq!(aggregate(&one).total_animales, 4);
    }

    #[test]
    fn missing_arrays_contribute_nothing() {
        let all = records(json!([{ "id": 1 }, { "id": 2, "Aves": null }]));
        let totals = aggregate(&all);
        assert_eq!(totals.total_movilizaciones, 2);
        assert_eq!(totals.total_animales, 0);
        assert_eq!(totals.total_aves, 0);
    }

    #[test]
    fn empty_set_is_all_zero() {
        assert_eq!(aggregate(&[]), Totals::default());
    }

    #[test]
    fn totals_serialize_camel_case() {
        let json = serde_json::to_value(Totals {
            total_movilizaciones: 1,
            total_animales: 2,
            total_aves: 3,
        })
        .unwrap();
        assert_eq!(json, json!({ "totalMovilizaciones": 1, "totalAnimales": 2, "totalAves": 3 }));
    }

    #[test]
    fn counts_by_estado_in_canonical_order() {
        let all = records(json!([
            { "id": 1, "estado": "rechazado" },
            { "id": 2, "estado": "pendiente" },
            { "id": 3, "estado": "PENDIENTE" },
            { "id": 4, "estado": "en tránsito" },
            { "id": 5 },
            { "id": 6, "estado": "Aprobada" }
        ]));
        let counts = count_by_estado(&all);
        let summary: Vec<(&str, u64)> = counts.iter().map(|c| (c.estado.label(), c.total)).collect();
        assert_eq!(
            summary,
            vec![
                ("Pendiente", 2),
                ("Aprobado", 1),
                ("Rechazado", 1),
                ("Sin estado", 1),
                ("en tránsito", 1),
            ]
        );
    }

    #[test]
    fn stats_merge_duplicate_spellings() {
        let stats = vec![
            RawEstadoStat { estado: Some("finalizado".into()), total: Some(4) },
            RawEstadoStat { estado: Some("Finalizada".into()), total: Some(1) },
            RawEstadoStat { estado: Some("pendiente".into()), total: None },
        ];
        let counts = counts_from_stats(stats);
        assert_eq!(counts[0], EstadoCount { estado: Estado::Pendiente, total: 0 });
        assert_eq!(counts[1], EstadoCount { estado: Estado::Finalizado, total: 5 });
    }

    #[test]
    fn counts_by_month_are_chronological() {
        let all = records(json!([
            { "id": 1, "fecha_solicitud": "2025-08-05" },
            { "id": 2, "fecha_solicitud": "2025-07-20" },
            { "id": 3, "fecha_solicitud": "2025-08-15T10:00:00Z" },
            { "id": 4, "fecha_solicitud": "sin fecha" }
        ]));
        assert_eq!(
            count_by_month(&all),
            vec![
                MonthCount { year: 2025, month: 7, total: 1 },
                MonthCount { year: 2025, month: 8, total: 2 },
            ]
        );
    }
}
