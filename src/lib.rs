pub mod config;
pub mod console; // Headless prompt loop
pub mod core_state; // Signed-in session + injected services
pub mod home; // Collection feed & document detail
pub mod models;
pub mod pipeline; // Capture → resolve → normalize → review → commit
pub mod storage; // Per-user append-only document collection

use tracing_subscriber::EnvFilter;

use crate::config::WalletConfig;
use crate::core_state::{CoreError, WalletState};
use crate::pipeline::RegistryClient;
use crate::storage::JsonDocumentStore;

pub fn run() -> Result<(), CoreError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = WalletConfig::from_env()?;
    tracing::info!(
        registry = %config.registry_url,
        timeout_secs = config.request_timeout_secs,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let resolver = RegistryClient::from_config(&config)?;
    let store = JsonDocumentStore::open(&config.data_dir);
    let state = WalletState::new(resolver, store);
    state.sign_in(config.user_scope.clone())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(console::drive(
        &state,
        std::io::stdin().lock(),
        std::io::stdout().lock(),
    ));

    state.sign_out()?;
    result
}
