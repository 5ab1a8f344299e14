//! Error types for qamask

use thiserror::Error;

/// Main error type for qamask operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Unsupported sensor: {0}")]
    UnsupportedSensor(String),

    #[error("Condition '{condition}' is not available for {sensor}")]
    UnsupportedCondition { condition: String, sensor: String },

    #[error("Invalid level {value} for '{condition}' on {sensor}: accepted values are {accepted}")]
    InvalidLevel {
        condition: String,
        sensor: String,
        value: i32,
        accepted: String,
    },

    #[error("A level is required for '{condition}' on {sensor}")]
    MissingLevel { condition: String, sensor: String },

    #[error("Invalid bit field: offset {offset}, width {width}, target {target} ({reason})")]
    InvalidBitField {
        offset: u32,
        width: u32,
        target: String,
        reason: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown sensor/collection or a condition the sensor does not define
    Configuration,
    /// A level or bit-field value outside its legal set
    Value,
    /// Failure reading or writing a raster
    Io,
    /// Raster shape or indexing problems
    Raster,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedSensor(_) | Error::UnsupportedCondition { .. } => {
                ErrorKind::Configuration
            }
            Error::InvalidLevel { .. }
            | Error::MissingLevel { .. }
            | Error::InvalidBitField { .. } => ErrorKind::Value,
            Error::Io(_) | Error::UnsupportedDataType(_) | Error::Other(_) => ErrorKind::Io,
            Error::InvalidDimensions { .. }
            | Error::IndexOutOfBounds { .. }
            | Error::SizeMismatch { .. } => ErrorKind::Raster,
        }
    }
}

/// Result type alias for qamask operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_configuration() {
        let err = Error::UnsupportedSensor("sentinel".into());
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = Error::UnsupportedCondition {
            condition: "water".into(),
            sensor: "Landsat 8 collection 1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_kind_value() {
        let err = Error::InvalidLevel {
            condition: "snow".into(),
            sensor: "Landsat 8 collection 0".into(),
            value: 1,
            accepted: "0, 3".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(err.to_string().contains("accepted values are 0, 3"));
    }
}
