use std::process::ExitCode;

use clap::Parser;

use movilizaciones::api::{ApiClient, Session};
use movilizaciones::certificate::CertificateView;
use movilizaciones::cli::{Cli, Command, FiltroArgs};
use movilizaciones::config::AppConfig;
use movilizaciones::dashboard::{Dashboard, Refresh, View};
use movilizaciones::error::AppError;
use movilizaciones::movilizacion::{aggregate, count_by_month};
use movilizaciones::{logging, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            ui::print_error(&e);
            return exit_code(&e);
        }
    };
    config.apply_cli(cli.api_url.as_deref(), cli.token.as_deref());
    logging::init(cli.verbose, config.log_level.as_deref());
    tracing::debug!(api_url = %config.api_url, timeout_secs = config.timeout_secs, "configuration loaded");

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(class = %e.class(), "command failed");
            ui::print_error(&e);
            exit_code(&e)
        }
    }
}

fn exit_code(error: &AppError) -> ExitCode {
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1))
}

async fn run(command: Command, config: &AppConfig) -> Result<(), AppError> {
    let session = Session::new(config.token.as_str())?;
    let client = ApiClient::new(config.api_url.as_str(), config.timeout())?;
    let dashboard = Dashboard::new(client, session);

    if let Some((id, transicion)) = command.transicion() {
        let record = dashboard.source().get(dashboard.session(), id).await?;
        let spinner = ui::Spinner::start("Enviando solicitud al servidor...");
        let result = dashboard.request_transition(&record, &transicion).await;
        spinner.finish();
        return match result {
            Ok(estado) => {
                ui::print_transition_ok(id, &record.estado, &estado);
                Ok(())
            }
            Err(e) => {
                ui::print_transition_failed(id, &record.estado);
                Err(e)
            }
        };
    }

    match command {
        Command::Listar { filtros } => {
            let view = load_view(&dashboard, &filtros).await?;
            ui::print_records(&view.records);
            ui::print_totals(&view.totals);
        }
        Command::Resumen { filtros, json } => {
            let view = load_view(&dashboard, &filtros).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.totals)?);
            } else {
                ui::print_totals(&view.totals);
            }
        }
        Command::Estados { filtros, servidor } => {
            if servidor {
                let counts = dashboard.source().estado_stats(dashboard.session()).await?;
                ui::print_estado_counts(&counts);
            } else {
                let view = load_view(&dashboard, &filtros).await?;
                ui::print_estado_counts(&view.by_estado);
            }
        }
        Command::Mensual { filtros } => {
            let view = load_view(&dashboard, &filtros).await?;
            ui::print_month_counts(&count_by_month(&view.records));
        }
        Command::Ver { id } => {
            let record = dashboard.source().get(dashboard.session(), id).await?;
            ui::print_record(&record);
        }
        Command::Usuario {
            cedula,
            desde,
            hasta,
        } => {
            let records = dashboard
                .source()
                .by_cedula(dashboard.session(), &cedula, desde, hasta)
                .await?;
            ui::print_records(&records);
            ui::print_totals(&aggregate(&records));
        }
        Command::Certificado { id, salida } => {
            if let Some(path) = salida {
                let pdf = dashboard.source().certificate(dashboard.session(), id).await?;
                std::fs::write(&path, pdf)?;
                println!("Certificado guardado en {}", path.display());
            } else {
                let record = dashboard.source().get(dashboard.session(), id).await?;
                ui::print_certificate(&CertificateView::from_record(&record)?);
            }
        }
        Command::Aprobar { .. }
        | Command::Rechazar { .. }
        | Command::Finalizar { .. }
        | Command::Alertar { .. } => {}
    }
    Ok(())
}

async fn load_view(dashboard: &Dashboard<ApiClient>, filtros: &FiltroArgs) -> Result<View, AppError> {
    let spec = filtros.to_filter_spec()?;
    let spinner = ui::Spinner::start("Cargando movilizaciones...");
    let refresh = dashboard.refresh(&spec, filtros.remoto).await;
    spinner.finish();

    let view = match refresh? {
        Refresh::Loaded(view) => view,
        // Only one refresh is ever in flight from the CLI.
        Refresh::Superseded => View::default(),
    };
    if let Some(notice) = &view.notice {
        ui::print_notice(notice);
    }
    Ok(view)
}
