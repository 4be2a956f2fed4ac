//! Dot-prefixed chat commands (`.menu`, `.check`, `.setnum`, `.summary`).
//!
//! Commands given without their argument open a pending reply for the sender;
//! the same sender's next plain message completes it. Messages from other
//! senders never complete someone else's prompt.

use crate::core::checker::{CheckService, Delivery};
use crate::core::conversation::ConversationStore;
use crate::core::notifier::NotifyOutcome;
use crate::domain::ports::SettingsStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const MENU: &str = "Available Commands:
1. .check <num1,num2,...> - Check WhatsApp registration status of numbers.
2. .setnum <phone_number> - Set your personal phone number for notifications.
3. .summary - Send the last check summary to your personal number.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Menu,
    Check(String),
    SetNumber(String),
    Summary,
    Unknown(String),
}

impl ChatCommand {
    /// Returns `None` for anything that is not a dot command.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('.') {
            return None;
        }

        let (name, args) = match text.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (text, ""),
        };

        let command = match name.to_lowercase().as_str() {
            ".menu" => ChatCommand::Menu,
            ".check" => ChatCommand::Check(args.to_string()),
            ".setnum" => ChatCommand::SetNumber(args.to_string()),
            ".summary" => ChatCommand::Summary,
            _ => ChatCommand::Unknown(name.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReply {
    CheckNumbers,
    TargetNumber,
}

pub struct CommandHandler<S: SettingsStore> {
    service: Arc<CheckService<S>>,
    conversations: ConversationStore<PendingReply>,
    last_reports: Mutex<HashMap<String, String>>,
}

impl<S: SettingsStore> CommandHandler<S> {
    pub fn new(service: Arc<CheckService<S>>, conversations: ConversationStore<PendingReply>) -> Self {
        Self {
            service,
            conversations,
            last_reports: Mutex::new(HashMap::new()),
        }
    }

    /// Handles one incoming message and returns the reply, if any. Plain
    /// messages without a pending prompt are ignored.
    pub async fn handle(&self, sender: &str, text: &str) -> Option<String> {
        let expired = self.conversations.purge_expired().await;
        if expired > 0 {
            tracing::debug!(expired, "Dropped expired prompts");
        }

        if let Some(command) = ChatCommand::parse(text) {
            self.conversations.cancel(sender).await;
            tracing::debug!(sender, ?command, "Chat command received");
            return Some(self.dispatch(sender, command).await);
        }

        let pending = self.conversations.take(sender).await?;
        let reply = match pending {
            PendingReply::CheckNumbers => self.run_check(sender, text).await,
            PendingReply::TargetNumber => self.set_number(text).await,
        };
        Some(reply)
    }

    async fn dispatch(&self, sender: &str, command: ChatCommand) -> String {
        match command {
            ChatCommand::Menu => MENU.to_string(),
            ChatCommand::Check(args) if args.is_empty() => {
                self.conversations
                    .begin(sender, PendingReply::CheckNumbers)
                    .await;
                "Reply with the numbers to check, separated by commas. Example: 1234567890,9876543210"
                    .to_string()
            }
            ChatCommand::Check(args) => self.run_check(sender, &args).await,
            ChatCommand::SetNumber(args) if args.is_empty() => {
                self.conversations
                    .begin(sender, PendingReply::TargetNumber)
                    .await;
                "Reply with your personal phone number, including the country code.".to_string()
            }
            ChatCommand::SetNumber(args) => self.set_number(&args).await,
            ChatCommand::Summary => self.send_summary(sender).await,
            ChatCommand::Unknown(_) => "Unknown command. Type .menu for available commands.".to_string(),
        }
    }

    async fn run_check(&self, sender: &str, numbers: &str) -> String {
        let report = self.service.check(numbers, Delivery::Skip).await;
        if report.result.is_empty() {
            return "Please provide numbers to check. Example: .check 1234567890,9876543210"
                .to_string();
        }

        self.last_reports
            .lock()
            .await
            .insert(sender.to_string(), report.text.clone());
        report.text
    }

    async fn set_number(&self, number: &str) -> String {
        match self.service.set_target(number).await {
            Ok(target) => format!(
                "Your personal number has been set to {}.",
                target.identifier()
            ),
            Err(e) => {
                tracing::error!(error = %e, "Could not update notification target");
                format!("Could not save your personal number: {}", e.user_friendly_message())
            }
        }
    }

    async fn send_summary(&self, sender: &str) -> String {
        let Some(target) = self.service.target().await else {
            return "You have not set a personal phone number. Use .setnum to set it.".to_string();
        };
        let Some(report) = self.last_reports.lock().await.get(sender).cloned() else {
            return "No check has been run yet. Use .check first.".to_string();
        };

        match self.service.notify(&report).await {
            NotifyOutcome::Delivered => format!(
                "Summary sent to your personal number: {}.",
                target.identifier()
            ),
            NotifyOutcome::NoTargetConfigured => {
                "You have not set a personal phone number. Use .setnum to set it.".to_string()
            }
            NotifyOutcome::Failed(detail) => format!("Failed to send summary: {}", detail),
        }
    }
}
