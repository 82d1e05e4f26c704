//! Error types and handling for the branch finder

use thiserror::Error;

/// Main error type for the branch finder
///
/// The locator kinds (`PermissionDenied` through `NoUsableData`) are produced by
/// collaborators and recovered inside [`crate::LocationResolver`] and
/// [`crate::BranchSearchRanker`]; they are never returned from those operations.
#[derive(Error, Debug)]
pub enum BranchFinderError {
    /// The platform refused access to the device position
    #[error("Location permission denied: {message}")]
    PermissionDenied { message: String },

    /// A collaborator did not answer within the allotted time
    #[error("Timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// A coordinate fell outside the serviced region
    #[error("Coordinate ({latitude}, {longitude}) is outside the service region")]
    OutOfRegion { latitude: f64, longitude: f64 },

    /// Network, HTTP or decoding failure in an external collaborator
    #[error("Collaborator error: {message}")]
    Collaborator { message: String },

    /// The collaborator answered but gave nothing usable
    #[error("No usable data: {message}")]
    NoUsableData { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BranchFinderError {
    /// Create a new permission error
    pub fn permission_denied<S: Into<String>>(message: S) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a new collaborator error
    pub fn collaborator<S: Into<String>>(message: S) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Create a new no-usable-data error
    pub fn no_usable_data<S: Into<String>>(message: S) -> Self {
        Self::NoUsableData {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BranchFinderError::PermissionDenied { .. } => {
                "Location access is turned off. Please choose a branch manually.".to_string()
            }
            BranchFinderError::Timeout { .. } => {
                "Finding your location took too long. Showing branches near the island centre."
                    .to_string()
            }
            BranchFinderError::OutOfRegion { .. } => {
                "Your location appears to be outside the service area.".to_string()
            }
            BranchFinderError::Collaborator { .. } => {
                "Unable to reach the branch directory. Please check your internet connection."
                    .to_string()
            }
            BranchFinderError::NoUsableData { .. } => {
                "No branches were found nearby. Please choose a branch manually.".to_string()
            }
            BranchFinderError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            BranchFinderError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
