use serde::Serialize;

use crate::audit::sanitize_error;
use crate::errors::{AppError, AppResult};

/// Lifecycle of one outgoing request, tracked per feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum RequestState<T> {
    Idle,
    Pending,
    Fulfilled(T),
    Rejected(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    /// Move to `Pending`. Refused while a request is already pending; this
    /// only stops double clicks within one form instance.
    pub fn begin(&mut self) -> AppResult<()> {
        if self.is_pending() {
            return Err(AppError::Validation(
                "A request is already in progress".to_string(),
            ));
        }
        *self = RequestState::Pending;
        Ok(())
    }

    pub fn settle(&mut self, result: &Result<T, AppError>)
    where
        T: Clone,
    {
        *self = match result {
            Ok(value) => RequestState::Fulfilled(value.clone()),
            Err(e) => RequestState::Rejected(sanitize_error(e, "request")),
        };
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Rejected(msg) => Some(msg),
            _ => None,
        }
    }
}
