pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Occurs when a `TET_*` environment variable holds a value tet does not understand.
    #[error("invalid value {value:?} for {key}: expected one of {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// Occurs when a reporter fails to write progress or the final report.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
