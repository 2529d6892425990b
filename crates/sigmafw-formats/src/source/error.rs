//! Source extraction error types

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while reading or interpreting an input document
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the input document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Document is not well-formed XML
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Required child element is absent
    #[error("<{element}> is missing required child <{child}>")]
    MissingElement {
        /// Element being interpreted
        element: &'static str,
        /// Name of the missing child
        child: &'static str,
    },

    /// Name field is present but empty
    #[error("<{element}> has an empty <{field}>")]
    EmptyField {
        /// Element being interpreted
        element: &'static str,
        /// Name of the empty child
        field: &'static str,
    },

    /// Field that should hold a decimal integer does not
    #[error("<{element}>/<{field}> is not an integer: {value:?}")]
    InvalidInteger {
        /// Element being interpreted
        element: &'static str,
        /// Name of the offending child
        field: &'static str,
        /// Text found
        value: String,
    },

    /// Integer does not fit its wire field
    #[error("<{element}>/<{field}> value {value} exceeds {max}")]
    OutOfRange {
        /// Element being interpreted
        element: &'static str,
        /// Name of the offending child
        field: &'static str,
        /// Parsed value
        value: u64,
        /// Largest representable value
        max: u64,
    },

    /// Entry of a data list is not a hexadecimal byte
    #[error("invalid hex byte {value:?} in <{element}> data")]
    InvalidHexByte {
        /// Element being interpreted
        element: &'static str,
        /// Entry found
        value: String,
    },

    /// Declared size disagrees with the data list
    #[error("<{element}> declares {declared} bytes but its data holds {actual}")]
    SizeMismatch {
        /// Element being interpreted
        element: &'static str,
        /// Value of the Size field
        declared: usize,
        /// Number of decoded bytes
        actual: usize,
    },

    /// Control name cannot be stored as ASCII
    #[error("control name {name:?} is not ASCII")]
    NonAsciiName {
        /// Offending "<module> <parameter>" name
        name: String,
    },
}

/// Result type for source extraction
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SourceError::MissingElement {
            element: "ModuleParameter",
            child: "Address",
        };
        assert_eq!(
            err.to_string(),
            "<ModuleParameter> is missing required child <Address>"
        );

        let err = SourceError::SizeMismatch {
            element: "Register",
            declared: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "<Register> declares 4 bytes but its data holds 3"
        );
    }
}
