use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! not_supported_error {
    ($msg:expr) => {
        crate::Error::NotSupported($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::NotSupported(format!($fmt, $($arg)*))
    };
}

macro_rules! unresolved_error {
    ($msg:expr) => {
        crate::Error::Unresolved($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Unresolved(format!($fmt, $($arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every detection point of the decoder maps to exactly one variant. Nothing in the decoding
/// path panics on bad input; the caller decides whether a failure aborts the whole load or is
/// only reported.
///
/// # Error Categories
///
/// ## Malformed encoding
/// - [`Error::Malformed`] - Invalid compressed integer prefix, bad tag, bad leading byte
/// - [`Error::OutOfBounds`] - Truncated buffer or an index outside a heap/table
///
/// ## Unsupported features
/// - [`Error::NotSupported`] - Function pointers, internal tags, `Module`/`ModuleRef` scopes,
///   class-typed attribute arguments
///
/// ## Resolution
/// - [`Error::Unresolved`] - Missing assembly, type, or nested type
/// - [`Error::MemberNotFound`] / [`Error::AmbiguousMember`] - `MemberRef` target lookup failed
/// - [`Error::SignatureMismatch`] - Decoded counts disagree with a known definition
///
/// ## Context and limits
/// - [`Error::GenericContext`] - A `VAR`/`MVAR` was decoded against the wrong container kind
/// - [`Error::RecursionLimit`] - Nested type descriptors exceeded the configured depth
/// - [`Error::ImageLimit`] / [`Error::DuplicateImage`] - Registry constraints
///
/// # Examples
///
/// ```rust
/// use sigscope::{Error, Parser};
///
/// let mut parser = Parser::new(&[0xE0]);
/// match parser.read_compressed_uint() {
///     Err(Error::Malformed { message, .. }) => println!("bad encoding: {message}"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be decoded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding.
    ///
    /// Raised for truncated blobs as well as heap offsets and table rows that do not exist.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The encoded construct is valid metadata, but deliberately not supported.
    #[error("Not supported - {0}")]
    NotSupported(String),

    /// A type, nested type or assembly reference could not be resolved.
    #[error("Unresolved reference - {0}")]
    Unresolved(String),

    /// A decoded signature disagrees with the definition it is bound to.
    #[error("Signature mismatch - {what}: expected {expected}, found {found}")]
    SignatureMismatch {
        /// Which count or property disagreed
        what: &'static str,
        /// The value recorded on the definition
        expected: u32,
        /// The value decoded from the signature
        found: u32,
    },

    /// No member matched a `MemberRef` lookup.
    #[error("Member not found - {0}")]
    MemberNotFound(String),

    /// More than one member matched a `MemberRef` lookup.
    #[error("Ambiguous member - {0}")]
    AmbiguousMember(String),

    /// A generic parameter was decoded against a container of the wrong kind.
    ///
    /// This is a caller bug rather than a data error: `VAR` must be decoded against a
    /// class container and `MVAR` against a method container.
    #[error("Invalid generic context - {0}")]
    GenericContext(String),

    /// Recursion limit reached.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The registry refused to allocate another image id.
    #[error("Exceeded the maximum number of loaded images - {0}")]
    ImageLimit(u32),

    /// An image with the same assembly name is already registered.
    #[error("Assembly already registered - {0}")]
    DuplicateImage(String),

    /// A runtime collaborator (constructor invocation, object construction, write-back)
    /// reported a failure.
    #[error("Runtime - {0}")]
    Runtime(String),
}

impl Error {
    /// Returns `true` for the malformed-encoding category (bad prefix, bad tag, truncation).
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. } | Error::OutOfBounds)
    }

    /// Returns `true` if the input used a deliberately unsupported construct.
    #[must_use]
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Error::NotSupported(_))
    }

    /// Returns `true` for failed lookups: unresolved references and missing or ambiguous
    /// members.
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Error::Unresolved(_) | Error::MemberNotFound(_) | Error::AmbiguousMember(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_carries_location() {
        let err = malformed_error!("bad tag - {}", 0x42);
        match err {
            Error::Malformed {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "bad tag - 66");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            _ => panic!("expected Malformed"),
        }
    }

    #[test]
    fn categories() {
        assert!(Error::OutOfBounds.is_malformed());
        assert!(not_supported_error!("FNPTR").is_not_supported());
        assert!(unresolved_error!("System.Foo").is_resolution_failure());
        assert!(Error::AmbiguousMember("Foo".into()).is_resolution_failure());
        assert!(!Error::RecursionLimit(50).is_malformed());
    }

    #[test]
    fn display() {
        let err = Error::SignatureMismatch {
            what: "parameter count",
            expected: 1,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Signature mismatch - parameter count: expected 1, found 2"
        );
    }
}
