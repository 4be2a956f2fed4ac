use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix the bridge uses to address a personal chat.
pub const USER_JID_SUFFIX: &str = "@s.whatsapp.net";

/// A trimmed, non-empty phone number. Format is not validated here; the
/// directory decides whether it is a real number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Returns `None` when the input is empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chat address of this number on the bridge.
    pub fn jid(&self) -> String {
        format!("{}{}", self.0, USER_JID_SUFFIX)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identifier::parse(&value).ok_or_else(|| "identifier cannot be empty".to_string())
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Registered,
    NotRegistered,
    Error,
}

/// What the directory answered for one identifier. Bridges answer either with a
/// flag or with the list of matching accounts; both collapse to a membership bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Flag(bool),
    Matches(usize),
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        match self {
            Registration::Flag(registered) => *registered,
            Registration::Matches(count) => *count > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOutcome {
    identifier: Identifier,
    status: LookupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
}

impl LookupOutcome {
    pub fn registered(identifier: Identifier) -> Self {
        Self {
            identifier,
            status: LookupStatus::Registered,
            error_detail: None,
        }
    }

    pub fn not_registered(identifier: Identifier) -> Self {
        Self {
            identifier,
            status: LookupStatus::NotRegistered,
            error_detail: None,
        }
    }

    pub fn error(identifier: Identifier, detail: impl Into<String>) -> Self {
        Self {
            identifier,
            status: LookupStatus::Error,
            error_detail: Some(detail.into()),
        }
    }

    pub fn from_registration(identifier: Identifier, registration: &Registration) -> Self {
        if registration.is_registered() {
            Self::registered(identifier)
        } else {
            Self::not_registered(identifier)
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn status(&self) -> LookupStatus {
        self.status
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.status == LookupStatus::Error
    }
}

/// Outcomes of one batch, in input order. Counts are always derived from the
/// outcomes so they cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    outcomes: Vec<LookupOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<LookupOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[LookupOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn registered_count(&self) -> usize {
        self.count(LookupStatus::Registered)
    }

    pub fn not_registered_count(&self) -> usize {
        self.count(LookupStatus::NotRegistered)
    }

    pub fn error_count(&self) -> usize {
        self.count(LookupStatus::Error)
    }

    pub fn identifiers_with(&self, status: LookupStatus) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.status == status)
            .map(|o| o.identifier.to_string())
            .collect()
    }

    fn count(&self, status: LookupStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// Destination that receives batch summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget(Identifier);

impl NotificationTarget {
    pub fn new(identifier: Identifier) -> Self {
        Self(identifier)
    }

    pub fn identifier(&self) -> &Identifier {
        &self.0
    }
}

/// Persisted settings document. The file keeps the `phoneNumber` key so that
/// settings written by earlier versions still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
}

impl Settings {
    pub fn target(&self) -> Option<NotificationTarget> {
        Identifier::parse(&self.phone_number).map(NotificationTarget::new)
    }

    pub fn with_target(target: &NotificationTarget) -> Self {
        Self {
            phone_number: target.identifier().to_string(),
        }
    }
}

/// Body accepted by an HTTP front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub numbers: Vec<String>,
}

/// Body returned to an HTTP front end. Failed lookups are listed apart from
/// the two membership lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub registered: Vec<String>,
    pub not_registered: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<&BatchResult> for CheckResponse {
    fn from(result: &BatchResult) -> Self {
        Self {
            registered: result.identifiers_with(LookupStatus::Registered),
            not_registered: result.identifiers_with(LookupStatus::NotRegistered),
            errors: result.identifiers_with(LookupStatus::Error),
        }
    }
}
