//! Cliente de reportes de movilizaciones de ganado.
//!
//! Filtra, agrega y certifica solicitudes de movilización obtenidas de un
//! backend REST. El binario `movilizaciones` es una capa fina sobre estos
//! módulos.

pub mod api;
pub mod certificate;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod movilizacion;
pub mod ui;
