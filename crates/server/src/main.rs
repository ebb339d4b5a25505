use std::sync::{Arc, OnceLock};

use clap::Parser;
use tracing::info;
use warden_auth::AuthManager;
use warden_loader::DirectorySource;
use warden_router::{DefinitionWatcher, GatewayRouter};
use warden_server::cli::{Cli, Commands};
use warden_server::{state_factory, telemetry, WardenConfig, WardenTableBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ValidateConfig) => {
            return match WardenConfig::load(std::path::Path::new(&cli.config)) {
                Ok(_) => {
                    println!("config OK");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("config error: {err}");
                    std::process::exit(1);
                }
            };
        }
        Some(Commands::Reload { url }) => {
            let client = reqwest::Client::new();
            let response = client.get(format!("{url}/warden/reload")).send().await?;
            println!("{}", response.text().await?);
            return Ok(());
        }
        Some(Commands::Run) | None => {}
    }

    let mut config = WardenConfig::load(std::path::Path::new(&cli.config))?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(port) = cli.listen_port {
        config.listen_port = port;
    }

    telemetry::init(&config.log_level);

    let store = state_factory::create_store(&config.storage)?;
    let auth = Arc::new(AuthManager::new(store));
    let analytics: Arc<dyn warden_analytics::AnalyticsSink> = if config.enable_analytics {
        Arc::new(warden_analytics::StoreSink::new(state_factory::create_store(&config.storage)?))
    } else {
        Arc::new(warden_analytics::NullSink::new())
    };

    let router_handle: Arc<OnceLock<GatewayRouter>> = Arc::new(OnceLock::new());
    let table_builder = Arc::new(WardenTableBuilder {
        source: DirectorySource::new(config.api_definitions_path.clone()),
        auth,
        analytics,
        http_client: reqwest::Client::new(),
        per_key_locking: config.per_key_locking,
        admin_secret: Arc::from(config.secret.as_str()),
        router_handle: router_handle.clone(),
    });

    let initial_table = table_builder.build().await?;
    let gateway_router = GatewayRouter::new(initial_table);
    router_handle.set(gateway_router.clone()).unwrap_or_else(|_| unreachable!("router_handle is set exactly once, here"));

    info!(listen_port = config.listen_port, storage = ?config.storage.storage_type, "warden-server starting");

    let watcher = DefinitionWatcher::new(gateway_router.clone(), table_builder, &config.api_definitions_path).spawn();

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = warden_router::bind_listener(addr).await?;

    axum::serve(listener, tower::make::Shared::new(gateway_router)).with_graceful_shutdown(shutdown_signal()).await?;

    watcher.abort();
    info!("warden-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
