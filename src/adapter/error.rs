use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("record is missing field {0}")]
    MissingField(String),

    #[error("field {path} is not {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },
}
