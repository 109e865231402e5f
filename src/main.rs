use std::sync::Arc;

use certsync::{
    admission::{start_admission_server, IngressInterceptor},
    cli::Cli,
    config::AppConfig,
    controller::{Controller, IngressReconciler, SecretReconciler},
    domain::ResourceKind,
    observability::{init_observability, log_config_info, start_health_server},
    replication::SecretReplicator,
    store::{EventSource, MemoryStore, ObjectStore},
    Result, APP_NAME, VERSION,
};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tokio::try_join;
use tracing::{error, info};

fn install_rustls_provider() {
    use rustls::crypto::{ring, CryptoProvider};

    if CryptoProvider::get_default().is_none() {
        ring::default_provider().install_default().expect("install ring crypto provider");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_rustls_provider();

    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if the error is NOT "file not found"
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    cli.apply(&mut config);
    config.validate()?;

    let health_checker = init_observability(&config.observability).await?;

    info!(app_name = APP_NAME, version = VERSION, "Starting certsync controller");
    log_config_info(&config);

    let store = Arc::new(MemoryStore::new());
    let ingress_events = store.subscribe(ResourceKind::Ingress);
    let secret_events = store.subscribe(ResourceKind::Secret);
    let object_store: Arc<dyn ObjectStore> = store;

    let replicator =
        SecretReplicator::new(object_store.clone(), &config.replication.source_namespace);
    let interceptor = IngressInterceptor::new(replicator.clone());

    let ingress_controller = Controller::new(
        IngressReconciler::new(object_store.clone(), replicator),
        ingress_events,
        &config.controller,
    );
    let secret_controller = Controller::new(
        SecretReconciler::new(object_store, &config.replication.source_namespace),
        secret_events,
        &config.controller,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            return;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let admission_task =
        start_admission_server(config.admission.clone(), interceptor, shutdown_rx.clone());
    let health_task = start_health_server(&config.health, health_checker.clone(), shutdown_rx.clone());
    let ingress_task = ingress_controller.run(shutdown_rx.clone());
    let secret_task = secret_controller.run(shutdown_rx);

    health_checker.mark_ready();

    if let Err(e) = try_join!(admission_task, health_task, ingress_task, secret_task) {
        error!("Controller services terminated with error: {}", e);
        std::process::exit(1);
    }

    info!("Controller shutdown completed");
    Ok(())
}
