//! Error types for catalog merging

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog merging
#[derive(Error, Debug)]
pub enum Error {
    /// A fragment could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Fragment path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// A fragment is not well-formed XML
    #[error("Invalid XML in {file}: {message}")]
    Xml {
        /// Fragment name
        file: String,
        /// Parser message
        message: String,
    },

    /// A diff directive selects nothing in the working document
    #[error("Selector not found in {file}: {selector}")]
    SelectorNotFound {
        /// Fragment name
        file: String,
        /// The `sel` attribute
        selector: String,
    },

    /// A diff selector is not a valid node-selecting XPath expression
    #[error("Invalid selector in {file}: {selector}: {message}")]
    InvalidSelector {
        /// Fragment name
        file: String,
        /// The `sel` attribute
        selector: String,
        /// What went wrong
        message: String,
    },

    /// A diff child other than `add`, `replace` or `remove`
    #[error("Unsupported diff directive in {file}: {directive}")]
    UnsupportedDirective {
        /// Fragment name
        file: String,
        /// The directive as found
        directive: String,
    },

    /// A diff directive without `sel` attribute
    #[error("Missing sel attribute on <{directive}> in {file}")]
    MissingSelector {
        /// Fragment name
        file: String,
        /// Directive tag
        directive: String,
    },

    /// The selected node cannot be the target of this directive
    #[error("Invalid target for {selector} in {file}: {message}")]
    InvalidTarget {
        /// Fragment name
        file: String,
        /// The `sel` attribute
        selector: String,
        /// Why the node was rejected
        message: String,
    },
}

impl Error {
    /// Create a new Xml error
    pub fn xml<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Error::Xml {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidTarget error
    pub fn invalid_target<F, S, M>(file: F, selector: S, message: M) -> Self
    where
        F: Into<String>,
        S: Into<String>,
        M: Into<String>,
    {
        Error::InvalidTarget {
            file: file.into(),
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Check if this error was raised by a diff directive
    pub fn is_diff_error(&self) -> bool {
        matches!(
            self,
            Error::SelectorNotFound { .. }
                | Error::InvalidSelector { .. }
                | Error::UnsupportedDirective { .. }
                | Error::MissingSelector { .. }
                | Error::InvalidTarget { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SelectorNotFound {
            file: "ext_01/libraries/wares.xml".to_string(),
            selector: "/wares/ware[@id='nope']".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Selector not found in ext_01/libraries/wares.xml: /wares/ware[@id='nope']"
        );
        assert!(err.is_diff_error());

        let err = Error::xml("a.xml", "unexpected end of input");
        assert!(!err.is_diff_error());
    }
}
