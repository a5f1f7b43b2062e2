use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Parking slot {0} does not exist.")]
    UnknownSlot(u8),
    #[error("Parking slot {0} is already reserved.")]
    SlotOccupied(u8),
    #[error("Slot {0} is already empty.")]
    AlreadyEmpty(u8),
    #[error("The {field} is already used by the reservation of slot {slot_id}.")]
    DuplicateIdentity { field: String, slot_id: u8 },
    #[error("No available slots.")]
    NoAvailableSlot,
    #[error("Freeing slot {0} requires confirmation.")]
    ConfirmationRequired(u8),
    #[error("{0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("{0}")]
    LedgerStoreError(#[from] std::io::Error),
    #[error("{0}")]
    ConversionEntityError(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::UnknownSlot(_) => "unknown_slot",
            AppError::SlotOccupied(_) => "slot_occupied",
            AppError::AlreadyEmpty(_) => "already_empty",
            AppError::DuplicateIdentity { .. } => "duplicate_identity",
            AppError::NoAvailableSlot => "no_available_slot",
            AppError::ConfirmationRequired(_) => "confirmation_required",
            AppError::NetworkError(_) => "network_error",
            AppError::LedgerStoreError(_) => "ledger_store_error",
            AppError::ConversionEntityError(_) => "conversion_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownSlot(_) => StatusCode::NOT_FOUND,
            AppError::SlotOccupied(_)
            | AppError::AlreadyEmpty(_)
            | AppError::DuplicateIdentity { .. }
            | AppError::NoAvailableSlot => StatusCode::CONFLICT,
            AppError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            AppError::NetworkError(_) => StatusCode::BAD_GATEWAY,
            AppError::LedgerStoreError(_) | AppError::ConversionEntityError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::ConversionEntityError(value.to_string())
    }
}

// 抽出に失敗したリクエストも他のエラーと同じ形で返す
impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::InvalidRequest(value.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(value: PathRejection) -> Self {
        AppError::InvalidRequest(value.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        AppError::InvalidRequest(value.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "Unexpected error happened"
            );
        } else {
            tracing::debug!(error.code = self.code(), error.message = %self, "Request rejected");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
