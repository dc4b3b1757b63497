mod cli;
mod headless;
mod replay;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vista_common::VistaError;
use vista_config::VistaConfig;
use vista_webview::{
    CoordinatorDeps, CoordinatorSettings, JsonFileStorage, PersistedPanelRecord, StorageProvider,
    WebviewPanelCoordinator,
};

use headless::{
    CommandAllowList, HeadlessHost, JsonLines, JsonLinesProxy, LoggingActivation, LoggingOpener,
};

fn load_config(args: &cli::Args) -> (VistaConfig, Option<VistaError>) {
    let loaded = match &args.config {
        Some(path) => vista_config::load_config_from(path),
        None => vista_config::load_config(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (VistaConfig::default(), Some(e.into())),
    }
}

fn storage_dir(args: &cli::Args, config: &VistaConfig) -> Result<PathBuf, VistaError> {
    args.storage
        .clone()
        .or_else(|| config.storage.resolved_directory())
        .ok_or_else(|| VistaError::Other("no storage directory available".into()))
}

async fn run_replay(
    script: PathBuf,
    config: &VistaConfig,
    storage: JsonFileStorage,
) -> Result<usize, VistaError> {
    let commands = replay::load_script(&script)?;
    tracing::info!(script = %script.display(), commands = commands.len(), "replaying");

    let sink = Arc::new(JsonLines::stdout());
    let host = Arc::new(HeadlessHost::default());
    let deps = CoordinatorDeps {
        host: host.clone(),
        proxy: Arc::new(JsonLinesProxy::new(Arc::clone(&sink))),
        activation: Arc::new(LoggingActivation),
        opener: Arc::new(LoggingOpener),
        policy: Arc::new(CommandAllowList::default()),
        storage: Arc::new(storage),
    };
    let coordinator = WebviewPanelCoordinator::new(deps, CoordinatorSettings::from(config)).await?;
    replay::Replayer::new(coordinator, host, sink).run(commands).await
}

/// Print every readable persisted panel record, ordered by id.
async fn run_inspect(
    config: &VistaConfig,
    storage: &dyn StorageProvider,
    sink: &JsonLines,
) -> Result<usize, VistaError> {
    let store = storage.open(&config.persistence.panel_namespace).await?;
    let mut printed = 0;
    let mut keys = store.keys().await?;
    keys.sort();
    for key in keys {
        let Some(value) = store.get(&key).await? else {
            continue;
        };
        match PersistedPanelRecord::from_value(value) {
            Ok(record) => {
                sink.emit(&record);
                printed += 1;
            }
            Err(e) => tracing::warn!(panel_id = %key, error = %e, "unreadable panel record"),
        }
    }
    Ok(printed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    let (config, config_error) = load_config(&args);

    // Initialize logging on stderr; stdout carries JSON lines
    let log_directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.as_directive().to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
            ),
        )
        .init();

    tracing::info!("Vista v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let storage = match storage_dir(&args, &config) {
        Ok(dir) => {
            tracing::info!(directory = %dir.display(), "using storage");
            JsonFileStorage::new(dir)
        }
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        cli::Command::Replay { script } => run_replay(script, &config, storage)
            .await
            .map(|failed| {
                if failed > 0 {
                    tracing::warn!(failed, "some replay commands failed");
                }
            }),
        cli::Command::Inspect => run_inspect(&config, &storage, &JsonLines::stdout())
            .await
            .map(|printed| tracing::info!(records = printed, "inspect finished")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
