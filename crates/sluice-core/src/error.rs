use thiserror::Error;

/// Canonical result for the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Largest element count a single materialized array may hold.
pub const MAX_ARRAY_SIZE: u64 = i32::MAX as u64 - 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A stage was linked, evaluated or turned into a cursor a second time.
    #[error("stage {stage} has already been linked or consumed")]
    StageConsumed { stage: String },

    /// A call arrived in a state that does not accept it (e.g. reading a builder mid-build).
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("requested size {requested} exceeds maximum array size {max}")]
    SizeExceeded { requested: u64, max: u64 },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: u64, len: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Capacity check shared by every materialization path.
    pub fn check_array_size(requested: u64) -> Result<usize> {
        if requested > MAX_ARRAY_SIZE {
            Err(Error::SizeExceeded {
                requested,
                max: MAX_ARRAY_SIZE,
            })
        } else {
            Ok(requested as usize)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}
