//! Registro estructurado sobre `tracing`.
//!
//! Prioridad del nivel: `RUST_LOG` > `--verbose` > `log_level` del archivo de
//! configuración > `"warn"`. La salida va a stderr para no mezclarse con los
//! reportes en stdout. Nunca se registran tokens de sesión.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Directiva de filtro a usar cuando `RUST_LOG` no está definida.
fn fallback_directive(verbose: bool, config_level: Option<&str>) -> &str {
    if verbose {
        "debug"
    } else {
        config_level
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Inicializa el suscriptor global. Llamar una sola vez, al arrancar.
pub fn init(verbose: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let directive = fallback_directive(verbose, config_level);
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    // try_init: los tests pueden haber instalado ya un suscriptor.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();

    tracing::debug!(
        app = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "logging initialised"
    );
}
