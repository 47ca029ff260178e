//! Error types for recset core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while decoding containers or loading datasets.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] recset_storage::StorageError),

    /// Example codec error.
    #[error("codec error: {0}")]
    Codec(#[from] recset_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Container bytes violate the framing rules.
    ///
    /// The cursor position is undefined afterwards and the reader refuses
    /// further reads.
    #[error("malformed container: {message}")]
    MalformedContainer {
        /// Description of the violation.
        message: String,
    },

    /// Checksum mismatch in a framed record.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the container.
        expected: u32,
        /// Checksum computed over the bytes read.
        actual: u32,
    },

    /// The payload decoded to something other than an 8-bit RGB raster.
    #[error("unsupported image layout: expected RGB image, got {layout}")]
    UnsupportedImageLayout {
        /// Name of the decoded layout.
        layout: String,
    },

    /// The image codec rejected the payload.
    #[error("image decode failed: {message}")]
    ImageDecode {
        /// Description of the failure.
        message: String,
    },

    /// No index entry for a record name.
    #[error("record not found: {name}")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A listing file line could not be parsed.
    #[error("invalid listing at line {line}: {message}")]
    InvalidListing {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Parallel annotation arrays have different lengths.
    #[error("annotation mismatch: {field} has {actual} entries, expected {expected}")]
    AnnotationMismatch {
        /// The offending feature key.
        field: String,
        /// Number of boxes.
        expected: usize,
        /// Length of the offending array.
        actual: usize,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// The dataset does not provide this operation.
    #[error("unsupported operation: {message}")]
    Unsupported {
        /// Description of the missing capability.
        message: String,
    },

    /// No dataset registered under this name.
    #[error("dataset not found: {name}")]
    DatasetNotFound {
        /// Canonical `category/name` that was requested.
        name: String,
    },

    /// A dataset file is absent and cannot be fetched.
    #[error("missing dataset file: {}", path.display())]
    MissingFile {
        /// Expected location of the file.
        path: PathBuf,
    },

    /// A fetched file does not match its expected checksum.
    #[error("checksum verification failed for {}", path.display())]
    ChecksumFailed {
        /// The file that failed verification.
        path: PathBuf,
    },

    /// The fetcher failed.
    #[error("download failed: {message}")]
    Download {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a malformed container error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer {
            message: message.into(),
        }
    }

    /// Creates an image decode error.
    pub fn image_decode(message: impl Into<String>) -> Self {
        Self::ImageDecode {
            message: message.into(),
        }
    }

    /// Creates an unsupported image layout error.
    pub fn unsupported_layout(layout: impl Into<String>) -> Self {
        Self::UnsupportedImageLayout {
            layout: layout.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an invalid listing error.
    pub fn invalid_listing(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidListing {
            line,
            message: message.into(),
        }
    }

    /// Creates an annotation mismatch error.
    pub fn annotation_mismatch(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::AnnotationMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a dataset not found error.
    pub fn dataset_not_found(name: impl Into<String>) -> Self {
        Self::DatasetNotFound { name: name.into() }
    }

    /// Creates a download error.
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Returns whether this error leaves the container unreadable.
    ///
    /// Framing violations and checksum mismatches are fatal for the reader;
    /// image errors are not, since the payload was fully consumed.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedContainer { .. } | Self::ChecksumMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_classification() {
        assert!(CoreError::malformed("invalid magic").is_malformed());
        assert!(CoreError::ChecksumMismatch {
            expected: 1,
            actual: 2
        }
        .is_malformed());
        assert!(!CoreError::unsupported_layout("L8").is_malformed());
        assert!(!CoreError::image_decode("bad png").is_malformed());
        assert!(!CoreError::not_found("a.jpg").is_malformed());
    }

    #[test]
    fn display_messages() {
        let err = CoreError::annotation_mismatch("image/object/bbox/ymax", 3, 2);
        assert_eq!(
            err.to_string(),
            "annotation mismatch: image/object/bbox/ymax has 2 entries, expected 3"
        );

        let err = CoreError::invalid_listing(4, "start offset is not a number");
        assert_eq!(
            err.to_string(),
            "invalid listing at line 4: start offset is not a number"
        );

        let err = CoreError::ChecksumMismatch {
            expected: 0xdead_beef,
            actual: 0x0000_0001,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected deadbeef, got 00000001"
        );
    }

    #[test]
    fn storage_errors_convert() {
        let err: CoreError = recset_storage::StorageError::Closed.into();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}
