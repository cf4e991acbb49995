use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// 事务内的数据库错误归类: 锁竞争/死锁/序列化失败/超时属于可安全重试
    /// 的并发冲突 (调用方可用同一个 purchase_id 重新提交), 其余原样返回。
    pub fn from_txn_db_err(err: sea_orm::DbErr) -> AppError {
        let msg = err.to_string();
        let lowered = msg.to_lowercase();
        let retryable = lowered.contains("deadlock")
            || lowered.contains("could not serialize")
            || lowered.contains("lock timeout")
            || lowered.contains("lock_not_available")
            || lowered.contains("statement timeout")
            || lowered.contains("canceling statement due to statement timeout");
        if retryable {
            AppError::ConcurrencyError(msg)
        } else {
            AppError::DatabaseError(err)
        }
    }

    /// 错误是否可由调用方用同一个幂等键安全重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ConcurrencyError(_))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg,
                )
            }
            AppError::NotFound(msg) => (actix_web::http::StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::InsufficientFunds(msg) => {
                log::warn!("Insufficient funds: {msg}");
                (
                    actix_web::http::StatusCode::PAYMENT_REQUIRED,
                    "INSUFFICIENT_FUNDS",
                    msg,
                )
            }
            AppError::ConfigurationError(msg) => {
                log::error!("Configuration error: {msg}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg,
                )
            }
            AppError::ConcurrencyError(msg) => {
                log::warn!("Concurrency conflict (retryable): {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "CONCURRENCY_ERROR",
                    msg,
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    &"Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    &"Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlock_maps_to_concurrency_error() {
        let err = sea_orm::DbErr::Custom("deadlock detected".to_string());
        let mapped = AppError::from_txn_db_err(err);
        assert!(matches!(mapped, AppError::ConcurrencyError(_)));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn test_serialization_failure_maps_to_concurrency_error() {
        let err = sea_orm::DbErr::Custom(
            "could not serialize access due to concurrent update".to_string(),
        );
        assert!(AppError::from_txn_db_err(err).is_retryable());
    }

    #[test]
    fn test_plain_db_error_stays_database_error() {
        let err = sea_orm::DbErr::Custom("relation does not exist".to_string());
        let mapped = AppError::from_txn_db_err(err);
        assert!(matches!(mapped, AppError::DatabaseError(_)));
        assert!(!mapped.is_retryable());
    }
}
