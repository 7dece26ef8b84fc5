// lib.rs - shared core for the ERP mobile app

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod config;
pub mod debounce;
pub mod detail;
pub mod endpoints;
pub mod filters;
pub mod form;
pub mod guard;
pub mod list;
pub mod pagination;
pub mod resources;
pub mod shell;
pub mod telemetry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use crux_core::{App, Core, Request};

pub use crate::capabilities::{Capabilities, Effect};
pub use crate::config::{ClientConfig, ConfigError};
pub use crate::detail::{DetailEvent, DetailQuery, DetailViewModel};
pub use crate::form::{FieldErrors, FormEvent, FormViewModel, MutationForm, Validate};
pub use crate::list::{FetchStatus, ListEvent, ListQuery, ListViewModel};
pub use crate::resources::{Editable, Resource};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const SEARCH_DEBOUNCE_MS: u64 = 500;
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = capabilities::DEFAULT_TIMEOUT_MS;
pub const MAX_REQUEST_TIMEOUT_MS: u64 = capabilities::MAX_TIMEOUT_MS;

pub const NETWORK_ERROR_COPY: &str =
    "İnternet bağlantısı kurulamadı. Lütfen bağlantınızı kontrol edip tekrar deneyin.";
pub const TIMEOUT_ERROR_COPY: &str = "İstek zaman aşımına uğradı. Lütfen tekrar deneyin.";
pub const SESSION_EXPIRED_COPY: &str = "Oturumunuzun süresi doldu. Lütfen tekrar giriş yapın.";
pub const FORBIDDEN_COPY: &str = "Bu işlem için yetkiniz bulunmuyor.";
pub const NOT_FOUND_COPY: &str = "Kayıt bulunamadı.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Server,
    Decode,
    InvalidRequest,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Server => "SERVER_ERROR",
            Self::Decode => "DECODE_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 => Self::NotFound,
            408 => Self::Timeout,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    /// Message the server put in its error body, shown to the user verbatim.
    pub server_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Copy for the screen's error banner. Transport and session failures get
    /// fixed copy; anything else prefers the server's own message and falls
    /// back to the screen's generic one.
    #[must_use]
    pub fn user_facing_message(&self, fallback: &str) -> String {
        match self.kind {
            ErrorKind::Network => NETWORK_ERROR_COPY.into(),
            ErrorKind::Timeout => TIMEOUT_ERROR_COPY.into(),
            ErrorKind::Authentication => SESSION_EXPIRED_COPY.into(),
            ErrorKind::Authorization => self
                .server_message
                .clone()
                .unwrap_or_else(|| FORBIDDEN_COPY.into()),
            ErrorKind::NotFound => self
                .server_message
                .clone()
                .unwrap_or_else(|| NOT_FOUND_COPY.into()),
            ErrorKind::Validation
            | ErrorKind::Server
            | ErrorKind::Decode
            | ErrorKind::InvalidRequest
            | ErrorKind::Unknown => self
                .server_message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = ErrorKind::from_status(status);
        let server_message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(|e| e.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let mut error =
            Self::new(kind, format!("HTTP error: {status}")).with_context("http_status", status.to_string());
        error.server_message = server_message;
        error
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(server) = &self.server_message {
            write!(f, " (server: {server})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

pub type AppResult<T> = Result<T, AppError>;

impl From<capabilities::HttpError> for AppError {
    fn from(e: capabilities::HttpError) -> Self {
        use capabilities::HttpError;

        let kind = match &e {
            HttpError::ConnectionError { .. } | HttpError::Cancelled { .. } => ErrorKind::Network,
            HttpError::Timeout { .. } => ErrorKind::Timeout,
            HttpError::InvalidResponse { .. } => ErrorKind::Decode,
            HttpError::InvalidUrl { .. }
            | HttpError::InvalidHeader { .. }
            | HttpError::InvalidBody(_)
            | HttpError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        };
        let mut error = AppError::new(kind, e.to_string());
        if let Some(request_id) = e.request_id() {
            error = error.with_context("request_id", request_id);
        }
        error
    }
}

/// A response body that doesn't have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed response body: {0}")]
    Json(String),
    #[error("response is missing field '{0}'")]
    MissingField(String),
}

impl From<DecodeError> for AppError {
    fn from(e: DecodeError) -> Self {
        AppError::new(ErrorKind::Decode, e.to_string())
    }
}
