//! Top-level real-time engine that ties the subsystems together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use sessiongate_core::config::RealtimeConfig;

use crate::channel::ChannelRegistry;
use crate::connection::ConnectionPool;
use crate::notifier::RealtimeNotifier;

/// Channel registry, connection pool and notifier sharing one configuration.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Channel registry.
    pub channels: ChannelRegistry,
    /// Open WebSocket connections.
    pub connections: ConnectionPool,
    /// Notifier publishing on `channels`.
    pub notifier: Arc<RealtimeNotifier>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("channels", &self.channels.channel_count())
            .field("connections", &self.connections.count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let channels = ChannelRegistry::new(config.channel_buffer_size);
        let notifier = Arc::new(RealtimeNotifier::new(channels.clone(), &config));

        info!(
            channel_prefix = %config.channel_prefix,
            buffer = config.channel_buffer_size,
            "Real-time engine initialized"
        );

        Self {
            channels,
            connections: ConnectionPool::new(),
            notifier,
            config,
            shutdown_tx,
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Returns a receiver that fires when the engine shuts down.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Tell every open socket to close.
    pub fn shutdown(&self) {
        info!(
            connections = self.connections.count(),
            "Shutting down real-time engine"
        );
        let _ = self.shutdown_tx.send(());
    }
}
