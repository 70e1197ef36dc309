mod aggregate;
mod estado;
mod filter;
mod record;
mod transition;

pub use aggregate::{
    EstadoCount, MonthCount, Totals, aggregate, count_by_estado, count_by_month, counts_from_stats,
};
pub use estado::{Estado, EstadoColor, normalize_estado};
pub use filter::{FilterSpec, apply_filters};
pub use record::{
    AnimalEntry, BirdEntry, MobilizationRecord, Property, Requester, Transport, Validation, parse_fecha,
};
pub use transition::Transicion;
