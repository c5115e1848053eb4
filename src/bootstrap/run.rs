use std::sync::Arc;

use lr_app::{ActivationOrchestrator, ActivationOrchestratorConfig};
use lr_core::ActivationCallback;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::config::{load_host_config, HostConfig};
use super::tracing::init_tracing_subscriber;
use super::wiring::wire_platform;

/// Terminal result of the host's single activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Ready,
    Rejected,
    Failed,
    Unsupported,
    Interrupted,
}

impl Terminal {
    pub fn exit_code(self) -> i32 {
        match self {
            Terminal::Ready => 0,
            Terminal::Rejected => 1,
            Terminal::Failed => 2,
            Terminal::Unsupported => 3,
            Terminal::Interrupted => 130,
        }
    }
}

struct ChannelCallback {
    tx: mpsc::UnboundedSender<Terminal>,
}

impl ChannelCallback {
    fn send(&self, terminal: Terminal) {
        if self.tx.send(terminal).is_err() {
            warn!(?terminal, "activation outcome arrived after the host stopped waiting");
        }
    }
}

impl ActivationCallback for ChannelCallback {
    fn on_ready(&self) {
        self.send(Terminal::Ready);
    }

    fn on_activation_rejected(&self) {
        self.send(Terminal::Rejected);
    }

    fn on_activation_failed(&self) {
        self.send(Terminal::Failed);
    }

    fn on_unsupported_feature(&self) {
        self.send(Terminal::Unsupported);
    }
}

/// Load config, install tracing, run one activation and return the exit code.
pub fn run() -> anyhow::Result<i32> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Failed to load .env: {err}");
        }
    }

    let config = load_host_config()?;
    init_tracing_subscriber(config.logging.file)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let terminal = runtime.block_on(async {
        tokio::select! {
            result = run_activation(&config) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                Ok(Terminal::Interrupted)
            }
        }
    })?;

    info!(?terminal, "activation finished");
    Ok(terminal.exit_code())
}

/// Run a single activation against the configured backend.
///
/// Must be called from within a Tokio runtime.
pub async fn run_activation(config: &HostConfig) -> anyhow::Result<Terminal> {
    let wired = wire_platform(&config.platform, &config.simulation);
    let orchestrator = ActivationOrchestrator::new(
        ActivationOrchestratorConfig::from_config(&config.activation),
        wired.ports,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    orchestrator
        .activate(Some(Arc::new(ChannelCallback { tx })))
        .await;

    if let Some(delay) = wired.resume_after {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("host surface resumed");
            orchestrator.on_host_resumed().await;
        });
    }

    let terminal = rx
        .recv()
        .await
        .ok_or_else(|| anyhow::anyhow!("activation ended without a terminal outcome"))?;

    orchestrator.teardown().await;
    Ok(terminal)
}
