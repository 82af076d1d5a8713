//! Conversions from external infrastructure errors into domain errors.

use csv::Error as CsvError;
use evosync_domain::EvosyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub EvosyncError);

impl From<InfraError> for EvosyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<EvosyncError> for InfraError {
    fn from(value: EvosyncError) -> Self {
        InfraError(value)
    }
}

impl std::fmt::Display for InfraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoEvosyncError {
    fn into_evosync(self) -> EvosyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → EvosyncError */
/* -------------------------------------------------------------------------- */

impl IntoEvosyncError for SqlError {
    fn into_evosync(self) -> EvosyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        EvosyncError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        EvosyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        EvosyncError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        EvosyncError::Database("foreign key constraint violation".into())
                    }
                    _ => EvosyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => EvosyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                EvosyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                EvosyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => EvosyncError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => EvosyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => EvosyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_evosync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → EvosyncError */
/* -------------------------------------------------------------------------- */

impl IntoEvosyncError for r2d2::Error {
    fn into_evosync(self) -> EvosyncError {
        EvosyncError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_evosync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → EvosyncError */
/* -------------------------------------------------------------------------- */

impl IntoEvosyncError for HttpError {
    fn into_evosync(self) -> EvosyncError {
        if self.is_timeout() {
            return EvosyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return EvosyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error(status.as_u16(), status.canonical_reason().unwrap_or("unknown status"));
        }

        if self.is_decode() {
            return EvosyncError::Remote {
                status: 0,
                message: format!("invalid response body: {self}"),
            };
        }

        EvosyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_evosync())
    }
}

/// Map a non-success HTTP status onto the domain taxonomy.
pub(crate) fn status_error(code: u16, detail: &str) -> EvosyncError {
    let message = format!("HTTP {code} {detail}");
    match code {
        401 | 403 => EvosyncError::Auth(message),
        404 => EvosyncError::NotFound(message),
        _ => EvosyncError::Remote { status: code, message },
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error / csv::Error → EvosyncError */
/* -------------------------------------------------------------------------- */

impl IntoEvosyncError for serde_json::Error {
    fn into_evosync(self) -> EvosyncError {
        if self.is_io() {
            EvosyncError::Internal(format!("json i/o failure: {self}"))
        } else {
            EvosyncError::InvalidInput(format!("invalid JSON: {self}"))
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_evosync())
    }
}

impl IntoEvosyncError for CsvError {
    fn into_evosync(self) -> EvosyncError {
        if self.is_io_error() {
            EvosyncError::Internal(format!("csv i/o failure: {self}"))
        } else {
            EvosyncError::InvalidInput(format!("invalid CSV: {self}"))
        }
    }
}

impl From<CsvError> for InfraError {
    fn from(value: CsvError) -> Self {
        InfraError(value.into_evosync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
