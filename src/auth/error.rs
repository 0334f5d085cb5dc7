use thiserror::Error;

use crate::session::error::SessionError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in state does not match this visitor")]
    InvalidState,

    #[error("authorization server refused the code: {0}")]
    Rejected(String),

    #[error("could not reach authorization server: {0}")]
    Transport(String),

    #[error("could not decode token response: {0}")]
    Decode(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<ureq::Error> for AuthError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => AuthError::Rejected(format!(
                "{status} {}",
                response.into_string().unwrap_or_default().trim()
            )),
            ureq::Error::Transport(transport) => AuthError::Transport(transport.to_string()),
        }
    }
}
