use rouille::Response;
use thiserror::Error;

use crate::{auth::error::AuthError, library::error::LibraryError, session::error::SessionError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("sign in first")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),

    #[error("{message}")]
    PartiallyApplied { applied: usize, message: String },
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Unauthenticated => ApiError::Unauthenticated,

            LibraryError::Forbidden(id) => {
                ApiError::Forbidden(format!("playlist {id} belongs to another user"))
            }

            LibraryError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),

            LibraryError::Validation(e) => ApiError::BadRequest(e.to_string()),

            err @ LibraryError::MovesInterrupted { applied, .. } => ApiError::PartiallyApplied {
                applied,
                message: err.to_string(),
            },

            err @ (LibraryError::Upstream(_)
            | LibraryError::IncompletePage(_)
            | LibraryError::MissingField(_)) => {
                log::error!("{err}");
                ApiError::Internal("streaming service error".into())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidState => ApiError::BadRequest(err.to_string()),
            AuthError::Rejected(_) => ApiError::BadRequest("sign-in was refused".into()),
            AuthError::Transport(_) | AuthError::Decode(_) | AuthError::Session(_) => {
                log::error!("sign-in failed: {err}");
                ApiError::Internal("sign-in failed".into())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        log::error!("session store: {err}");
        ApiError::Internal("internal server error".into())
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthenticated => 303,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) | ApiError::PartiallyApplied { .. } => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Unauthenticated => Response::redirect_303("/"),

            ApiError::PartiallyApplied { applied, message } => Response::text(message)
                .with_status_code(status)
                .with_additional_header("X-Moves-Applied", applied.to_string()),

            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Internal(msg) => Response::text(msg).with_status_code(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::moves::InvalidMove, remote::error::RemoteError};

    #[test]
    fn library_errors_map_to_statuses() {
        let cases = [
            (LibraryError::Forbidden("p".into()), 403),
            (LibraryError::NotFound("playlist p".into()), 404),
            (
                LibraryError::Validation(InvalidMove {
                    input: "x".into(),
                }),
                400,
            ),
            (
                LibraryError::Upstream(RemoteError::Transport("timed out".into())),
                500,
            ),
            (LibraryError::IncompletePage("short".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status_code, status);
        }
    }

    #[test]
    fn unauthenticated_redirects_home() {
        let response = ApiError::from(LibraryError::Unauthenticated).into_response();

        assert_eq!(response.status_code, 303);
        assert!(
            response
                .headers
                .iter()
                .any(|(k, v)| k.eq_ignore_ascii_case("Location") && v == "/")
        );
    }

    #[test]
    fn partial_failure_reports_applied_moves() {
        let err = LibraryError::MovesInterrupted {
            applied: 2,
            total: 5,
            source: RemoteError::Status {
                status: 502,
                message: "Bad gateway".into(),
            },
        };

        let response = ApiError::from(err).into_response();

        assert_eq!(response.status_code, 500);
        assert!(
            response
                .headers
                .iter()
                .any(|(k, v)| k == "X-Moves-Applied" && v == "2")
        );
    }
}
