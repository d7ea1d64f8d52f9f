use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use gentimer::cli::Cli;
use gentimer::{AppError, logging, server};
use gentimer_core::{AppConfigExt, Controller, SharedTimer, Shutdown, UiLink};
use gentimer_overlay::{TimerWindow, UiThreadOptions, spawn_ui_thread};
use gentimer_types::AppConfig;
use tokio::net::TcpListener;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Held until exit so buffered log lines are flushed
    let _log_guard = logging::init();

    match run(cli) {
        Ok(()) => {
            tracing::info!("gentimer exited");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "gentimer failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    cli.apply(&mut config);

    let timer = SharedTimer::new();
    let link = UiLink::new();
    let shutdown = Shutdown::new();

    // The window exists before the server accepts its first request
    let window_config = config.window.clone();
    let (ui_tx, ui_thread) = spawn_ui_thread(
        move || TimerWindow::new(&window_config),
        timer.clone(),
        UiThreadOptions::from(&config),
        shutdown.clone(),
    )?;
    link.attach(Arc::new(ui_tx));

    let controller = Arc::new(Controller::new(
        timer,
        link,
        shutdown.clone(),
        Duration::from_millis(config.tick_interval_ms.max(1)),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("gentimer-worker")
        .build()
        .map_err(AppError::Runtime)?;

    let served = runtime.block_on(serve_until_shutdown(
        &config,
        controller.clone(),
        shutdown.clone(),
    ));
    if served.is_err() {
        controller.request_quit();
    }
    runtime.block_on(controller.stop_ticker());
    drop(runtime);

    if ui_thread.join().is_err() {
        tracing::error!("UI thread panicked");
    }
    served
}

async fn serve_until_shutdown(
    config: &AppConfig,
    controller: Arc<Controller>,
    shutdown: Shutdown,
) -> Result<(), AppError> {
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let ctrl_c = {
        let controller = controller.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, closing timer window");
                controller.request_quit();
            }
        })
    };

    let result = server::serve(listener, controller, shutdown)
        .await
        .map_err(AppError::Runtime);
    ctrl_c.abort();
    result
}
