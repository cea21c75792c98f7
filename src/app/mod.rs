use crate::adapters::discord::GatewayClient;
use crate::adapters::http;
use crate::config::GatewayConfig;
use crate::core::forwarder::EngineForwarder;
use crate::core::status::GatewayStatus;
use crate::utils::error::Result;
use serenity::gateway::ShardManager;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct RunningBot {
    shards: Arc<ShardManager>,
    task: JoinHandle<()>,
}

/// Process lifecycle: health endpoint in the foreground, Discord gateway in the background.
pub struct GatewayApp {
    config: GatewayConfig,
    status: Arc<GatewayStatus>,
}

impl GatewayApp {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            status: Arc::new(GatewayStatus::new()),
        }
    }

    pub fn status(&self) -> Arc<GatewayStatus> {
        self.status.clone()
    }

    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.listen_addr()).await?;
        self.run_with_listener(listener, shutdown).await
    }

    pub async fn run_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("🚀 Starting Gateway Bot...");

        let forwarder = EngineForwarder::new(&self.config)?;
        let bot = self.start_bot(&forwarder).await;

        let served = http::serve(listener, http::router(self.status.clone()), shutdown).await;

        tracing::info!("🛑 Stopping Gateway Bot...");
        forwarder.close();
        if let Some(bot) = bot {
            bot.shards.shutdown_all().await;
            if let Err(e) = bot.task.await {
                tracing::error!("Gateway task ended abnormally: {}", e);
            }
        }
        self.status.mark_disconnected();

        served
    }

    async fn start_bot(&self, forwarder: &EngineForwarder) -> Option<RunningBot> {
        let Some(token) = self.config.discord.token.as_deref() else {
            // keep serving /ping so the platform can report the misconfiguration
            tracing::error!("FATAL: DISCORD_TOKEN is missing!");
            return None;
        };

        let client = match GatewayClient::connect(
            token,
            &self.config.discord,
            forwarder.engine_url(),
            forwarder.clone(),
            self.status.clone(),
        )
        .await
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("❌ Could not create Discord client: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                return None;
            }
        };

        let shards = client.shard_manager();
        let status = self.status.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = client.run().await {
                tracing::error!("❌ Discord client error: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            }
            status.mark_disconnected();
        });

        Some(RunningBot { shards, task })
    }
}

/// Resolves on ctrl-c, or SIGTERM on unix (what container runtimes send).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
