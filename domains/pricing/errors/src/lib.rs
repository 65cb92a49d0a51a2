use chrono::NaiveDate;
use common_errors::AppError;
use thiserror::Error;

/// Failures of the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sql_connection::PgError),
    #[error("Connection error: {0}")]
    Connection(#[from] sql_connection::PoolError),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid room category id: {0}")]
    InvalidCategory(i64),
    #[error("Invalid date range: {from} .. {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("Room category {0} not found")]
    CategoryNotFound(i64),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PricingError {
    /// Input errors are rejected without retry; everything else is
    /// treated as a degraded dependency.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PricingError::InvalidCategory(_) | PricingError::InvalidRange { .. }
        )
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match &err {
            PricingError::InvalidCategory(_) => {
                AppError::bad_request("INVALID_CATEGORY", &err.to_string())
            }
            PricingError::InvalidRange { .. } => {
                AppError::bad_request("INVALID_DATE_RANGE", &err.to_string())
            }
            PricingError::CategoryNotFound(_) => {
                AppError::not_found("CATEGORY_NOT_FOUND", &err.to_string())
            }
            PricingError::Storage(_) => {
                AppError::service_unavailable(
                    "PRICING_UNAVAILABLE",
                    "Pricing data is temporarily unavailable",
                )
                .with_details(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use common_errors::ErrorKind;

    use super::*;

    #[test]
    fn test_error_mapping() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let range = PricingError::InvalidRange { from: day, to: day };
        assert!(range.is_invalid_input());
        assert_eq!(AppError::from(range).code(), "INVALID_DATE_RANGE");

        let storage =
            PricingError::from(StorageError::Unavailable("down".into()));
        assert!(!storage.is_invalid_input());
        assert_eq!(
            AppError::from(storage).kind(),
            ErrorKind::ServiceUnavailable
        );
    }
}
