//! Per-item results of batch operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vault_core::error::{AppError, ErrorKind};

/// Why one item of a batch was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub id: Uuid,
    /// Error kind, as rendered in error responses.
    pub error: String,
    pub message: String,
}

/// Result of a batch: which items took effect and which did not.
///
/// A failing item never aborts its siblings. The batch counts as a success
/// when at least one item succeeded or nothing was submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success: bool,
    pub submitted: usize,
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<ItemFailure>,
    /// `PARTIAL_BATCH_FAILURE` when any item failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn new(submitted: usize) -> Self {
        Self {
            submitted,
            ..Self::default()
        }
    }

    pub fn succeed(&mut self, id: Uuid) {
        self.succeeded.push(id);
    }

    pub fn fail(&mut self, id: Uuid, err: &AppError) {
        self.failed.push(ItemFailure {
            id,
            error: err.kind.to_string(),
            message: err.message.clone(),
        });
    }

    /// Record the same error for several items.
    pub fn fail_all(&mut self, ids: impl IntoIterator<Item = Uuid>, err: &AppError) {
        for id in ids {
            self.fail(id, err);
        }
    }

    /// Compute the overall flag once every item is accounted for.
    pub fn finish(mut self) -> Self {
        self.success = self.submitted == 0 || !self.succeeded.is_empty();
        if !self.failed.is_empty() {
            self.error = Some(ErrorKind::PartialBatchFailure.to_string());
        }
        self
    }
}
