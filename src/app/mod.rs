//! Wires the configured adapters into a ready-to-use `CheckService`.

use crate::adapters::http::BridgeClient;
use crate::config::settings::{JsonFileSettingsStore, TargetSettings};
use crate::config::toml_config::TomlConfig;
use crate::core::checker::{CheckService, Delivery};
use crate::core::commands::{CommandHandler, PendingReply};
use crate::core::conversation::ConversationStore;
use crate::core::directory::DirectoryAdapter;
use crate::core::notifier::NotificationDispatcher;
use crate::core::orchestrator::BatchOrchestrator;
use crate::domain::session::{SessionEvent, SessionMonitor, SessionState};
use crate::utils::error::{CheckerError, Result};
use std::sync::Arc;

pub struct App {
    pub service: Arc<CheckService<JsonFileSettingsStore>>,
    pub session: Arc<SessionMonitor>,
    client: Arc<BridgeClient>,
    config: TomlConfig,
}

/// Builds the service graph. The bridge is not contacted until
/// `refresh_session` or the first lookup.
pub async fn bootstrap(config: &TomlConfig) -> Result<App> {
    let client = Arc::new(BridgeClient::new(
        &config.directory.base_url,
        config.directory.api_key.clone(),
        config.lookup_timeout(),
    )?);

    let session = if config.directory.probe_session {
        let session = Arc::new(SessionMonitor::default());
        session.apply(SessionEvent::ConnectRequested);
        session
    } else {
        Arc::new(SessionMonitor::connected())
    };

    let adapter = DirectoryAdapter::new(client.clone(), session.clone())
        .with_timeout(config.lookup_timeout());
    let orchestrator = BatchOrchestrator::new(adapter, config.batch_policy());
    let dispatcher = NotificationDispatcher::new(client.clone());
    let store = JsonFileSettingsStore::new(&config.notification.settings_file);
    let targets = TargetSettings::load(store).await?;

    tracing::info!(
        bridge = %client.base_url(),
        concurrency = config.batch.concurrency,
        settings = %config.notification.settings_file,
        "Checker initialised"
    );

    Ok(App {
        service: Arc::new(CheckService::new(orchestrator, dispatcher, targets)),
        session,
        client,
        config: config.clone(),
    })
}

impl App {
    /// Re-reads the bridge connection state unless the session is already
    /// connected (or probing is disabled). Returns the resulting state.
    pub async fn refresh_session(&self) -> SessionState {
        let current = self.session.state();
        if !self.config.directory.probe_session || current == SessionState::Connected {
            return current;
        }

        match self.client.session_event().await {
            Ok(Some(event)) => {
                let state = self.session.observe(event);
                tracing::info!("WhatsApp session is {}", state);
                state
            }
            Ok(None) => {
                tracing::info!("WhatsApp session is still connecting");
                self.session.state()
            }
            Err(CheckerError::SessionUnavailable { state }) => {
                tracing::warn!("Bridge status reports the session as {}", state);
                if state == SessionState::LoggedOut {
                    self.session.apply(SessionEvent::Closed { logged_out: true })
                } else {
                    self.session.state()
                }
            }
            Err(e) => {
                // without a status endpoint each lookup reports its own failure
                tracing::warn!(error = %e, "Could not read bridge status, assuming connected");
                self.session.apply(SessionEvent::Opened)
            }
        }
    }

    /// Delivery to use when the caller did not opt out.
    pub fn default_delivery(&self) -> Delivery {
        if self.config.notification.enabled {
            Delivery::NotifyTarget
        } else {
            Delivery::Skip
        }
    }

    pub fn command_handler(&self) -> CommandHandler<JsonFileSettingsStore> {
        let conversations: ConversationStore<PendingReply> =
            ConversationStore::new(self.config.conversation_ttl());
        CommandHandler::new(self.service.clone(), conversations)
    }
}
