use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound(ObjectId),

    #[error("Email already exists")]
    DuplicateEmail(String),

    #[error("User validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Map an error raised by a create, update or delete.
    ///
    /// Store failures on these paths are reported as `400`, the same way
    /// validation failures are. Reads keep the `500` mapping of
    /// `From<UserError> for AppError`.
    pub fn into_write_error(self) -> AppError {
        match self {
            UserError::Database(msg) => {
                tracing::error!(error = %msg, "Store error during write");
                AppError::BadRequest(msg)
            }
            other => other.into(),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => {
                tracing::debug!(user_id = %id, "User lookup missed");
                AppError::NotFound(err.to_string())
            }
            UserError::DuplicateEmail(ref email) => {
                tracing::debug!(email = %email, "Duplicate email rejected");
                AppError::BadRequest(err.to_string())
            }
            UserError::Validation(_) => AppError::BadRequest(err.to_string()),
            UserError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

/// Flattens field errors into `field: message` pairs, ordered by field name.
impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let details = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match e.message {
                    Some(ref message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect::<Vec<_>>()
            .join(", ");

        UserError::Validation(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_read_path_maps_database_to_500() {
        let err: AppError = UserError::Database("connection refused".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_write_path_maps_database_to_400() {
        let err = UserError::Database("connection refused".into()).into_write_error();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Bad Request: connection refused");
    }

    #[test]
    fn test_not_found_is_404_on_both_paths() {
        let id = ObjectId::new();
        let read: AppError = UserError::NotFound(id).into();
        assert_eq!(read.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            UserError::NotFound(id).into_write_error().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_duplicate_email_message() {
        let err = UserError::DuplicateEmail("a@x.com".into());
        assert_eq!(err.to_string(), "Email already exists");
        assert_eq!(err.into_write_error().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "name",
            validator::ValidationError::new("length").with_message("name is required".into()),
        );
        errors.add(
            "email",
            validator::ValidationError::new("length").with_message("email is required".into()),
        );

        let err = UserError::from(errors);
        assert_eq!(
            err.to_string(),
            "User validation failed: email: email is required, name: name is required"
        );
    }
}
