use config::ConfigError;
use serde_json::json;
use tracing::{event, instrument, Level};
use warp::{
    filters::{body::BodyDeserializeError, cors::CorsForbidden},
    http::StatusCode,
    reject::{Reject, UnsupportedMediaType},
    reply::{Json, WithStatus},
    Rejection, Reply,
};

#[derive(Debug)]
pub enum Error {
    ValidationError(String),
    InvalidArgument(String),
    NotFound(String),
    DatabaseQueryError(sqlx::Error),
    ConfigurationError(ConfigError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::ValidationError(ref msg) => write!(f, "{}", msg),
            Error::InvalidArgument(ref msg) => write!(f, "{}", msg),
            Error::NotFound(ref msg) => write!(f, "{}", msg),
            Error::DatabaseQueryError(ref e) => {
                write!(f, "Query could not be executed: {}", e)
            }
            Error::ConfigurationError(ref e) => {
                write!(f, "Cannot load configuration: {}", e)
            }
        }
    }
}

impl Reject for Error {}

// SQLSTATE check_violation, raised by the content length constraint
const CHECK_VIOLATION: &str = "23514";

fn is_check_violation_code(code: Option<&str>) -> bool {
    code == Some(CHECK_VIOLATION)
}

fn is_check_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(err) => is_check_violation_code(err.code().as_deref()),
        _ => false,
    }
}

impl Error {
    /// Maps every error kind onto the status code the API answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ValidationError(_) | Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DatabaseQueryError(e) if is_check_violation(e) => StatusCode::BAD_REQUEST,
            Error::DatabaseQueryError(_) | Error::ConfigurationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message put in the `error` field of the response body.
    /// Store faults are not leaked to the client.
    pub fn public_message(&self) -> String {
        match self {
            Error::DatabaseQueryError(e) if is_check_violation(e) => {
                "content is shorter than the minimum allowed length".to_string()
            }
            Error::DatabaseQueryError(_) | Error::ConfigurationError(_) => {
                "Internal Server Error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

fn error_reply(message: String, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(error) = r.find::<Error>() {
        let status = error.status_code();
        if status.is_server_error() {
            event!(Level::ERROR, "{}", error);
        } else {
            event!(Level::WARN, "{}", error);
        }
        Ok(error_reply(error.public_message(), status))
    } else if let Some(error) = r.find::<BodyDeserializeError>() {
        event!(Level::WARN, "{}", error);
        Ok(error_reply(error.to_string(), StatusCode::BAD_REQUEST))
    } else if let Some(error) = r.find::<UnsupportedMediaType>() {
        event!(Level::WARN, "{}", error);
        Ok(error_reply(
            error.to_string(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ))
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::WARN, "{}", error);
        Ok(error_reply(error.to_string(), StatusCode::FORBIDDEN))
    } else {
        Ok(error_reply(
            "unknown endpoint".to_string(),
            StatusCode::NOT_FOUND,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            Error::ValidationError("content missing".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidArgument("malformatted id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::NotFound("note with id: 7 not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_faults_are_hidden_behind_500() {
        let error = Error::DatabaseQueryError(sqlx::Error::PoolTimedOut);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.public_message(), "Internal Server Error");
    }

    #[test]
    fn only_check_violations_count_as_bad_content() {
        assert!(is_check_violation_code(Some("23514")));
        assert!(!is_check_violation_code(Some("23505")));
        assert!(!is_check_violation_code(None));
        assert!(!is_check_violation(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn store_faults_render_a_generic_500() {
        let rejection = warp::reject::custom(Error::DatabaseQueryError(sqlx::Error::PoolTimedOut));
        let response = return_error(rejection).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_messages_are_passed_through() {
        let error = Error::ValidationError("content missing".into());
        assert_eq!(error.public_message(), "content missing");
    }

    #[tokio::test]
    async fn recover_uses_the_error_status() {
        let rejection = warp::reject::custom(Error::NotFound("gone".into()));
        let response = return_error(rejection).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let rejection = warp::reject::custom(Error::InvalidArgument("malformatted id".into()));
        let response = return_error(rejection).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unmatched_rejections_are_unknown_endpoints() {
        let response = return_error(warp::reject::not_found())
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
