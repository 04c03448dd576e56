use shared::{domain::TurnoEstado, error::ServerErrorBody};
use thiserror::Error;

/// Failure of a call against the barbershop API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Error status with a readable message in the body.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("el servidor respondió con estado {status}")]
    Status { status: u16 },
    #[error("error de red: {0}")]
    Transport(String),
    #[error("respuesta inválida del servidor: {0}")]
    Decode(String),
    #[error("URL de API inválida '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("la operación se interrumpió: {0}")]
    Interrupted(String),
}

impl ApiError {
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ServerErrorBody>(body)
            .ok()
            .and_then(|body| body.message())
        {
            Some(message) => ApiError::Rejected { status, message },
            None => ApiError::Status { status },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } | ApiError::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// Message written by the server, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Server message verbatim, or `fallback` when the server sent none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Action refused by a view before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("el registro {0} no está en la lista actual")]
    UnknownRecord(String),
    #[error("la acción no está disponible para un turno {0}")]
    NotEligible(TurnoEstado),
    #[error("hay una confirmación pendiente")]
    ConfirmationPending,
    #[error("no hay un formulario abierto")]
    NoOpenForm,
    #[error("ya hay un envío en curso")]
    AlreadySubmitting,
    #[error("{0}")]
    Validation(String),
}
