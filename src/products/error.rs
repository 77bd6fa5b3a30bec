use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record was rejected by validation or a table constraint.
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        // SQLSTATE class 22 is data exception, 23 integrity violation.
        if let sqlx::Error::Database(db) = &e {
            if let Some(code) = db.code() {
                if code.starts_with("22") || code.starts_with("23") {
                    return StoreError::Invalid(db.message().to_string());
                }
            }
        }
        StoreError::Backend(anyhow::Error::new(e))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Invalid(msg) => ApiError::invalid_with("Invalid product data", msg),
            StoreError::Backend(e) => ApiError::StoreFailure(e),
        }
    }
}
