use serde::{Deserialize, Serialize};

/// Error body returned by the classification service, either with
/// `success: false` on a 2xx response or alongside a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub success: bool,
    pub error: String,
}

impl ServiceErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
