pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ApiClient, DEFAULT_API_URL, MovilizacionSource};
pub use error::ApiError;
pub use session::Session;
pub use types::ValidacionForm;
