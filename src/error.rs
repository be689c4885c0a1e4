//! Error types for registry and reporting operations.

use ktf_ffi::{c_int, KernelError};
use ktf_map::MapError;

/// Result type for ktf operations.
pub type KtfResult<T> = std::result::Result<T, KtfError>;

/// Errors that can occur in the registry.
///
/// None of these are fatal: callers on the C side see them as negative
/// errno values through [`KtfError::errno`].
#[derive(Debug, thiserror::Error)]
pub enum KtfError {
    #[error("Out of memory while {0}")]
    NoMemory(&'static str),

    #[error("Invalid test case name: {0}")]
    InvalidName(#[from] MapError),

    #[error("Test set {case} still active with test {test}")]
    Busy { case: String, test: String },

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl KtfError {
    /// The errno this error is reported as.
    pub fn kernel_error(&self) -> KernelError {
        match self {
            KtfError::NoMemory(_) => KernelError::ENOMEM,
            KtfError::InvalidName(MapError::Exists(_)) => KernelError::EEXIST,
            KtfError::InvalidName(_) => KernelError::EINVAL,
            KtfError::Busy { .. } => KernelError::EBUSY,
            KtfError::Config(_) | KtfError::ConfigParse(_) | KtfError::InvalidConfig(_) => {
                KernelError::EINVAL
            }
        }
    }

    /// Negative errno.
    pub fn errno(&self) -> c_int {
        self.kernel_error().to_errno()
    }
}

impl From<KtfError> for KernelError {
    fn from(error: KtfError) -> Self {
        error.kernel_error()
    }
}
