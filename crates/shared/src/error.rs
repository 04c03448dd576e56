use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the barbershop API.
///
/// Handlers reply with either a Spanish `mensaje` or the framework's
/// `message`, which is a list of strings for request validation failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        rename = "statusCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl ServerErrorBody {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(ErrorMessage::Single(message.into())),
            ..Self::default()
        }
    }

    /// Human readable message, `mensaje` first. Blank messages count as absent.
    pub fn message(&self) -> Option<String> {
        if let Some(mensaje) = self.mensaje.as_deref().map(str::trim) {
            if !mensaje.is_empty() {
                return Some(mensaje.to_string());
            }
        }

        let joined = match self.message.as_ref()? {
            ErrorMessage::Single(message) => message.trim().to_string(),
            ErrorMessage::Many(messages) => messages
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        };
        (!joined.is_empty()).then_some(joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp '{0}'")]
pub struct InvalidTimestamp(pub String);
