//! Collaborator seams for storing the queue order and finished crops.
//!
//! Implementations live outside the core (HTTP in the browser bindings, the
//! in-memory [`ImageQueue`](crate::queue::ImageQueue) for the order). Calls are
//! synchronous from the engines' point of view; failures come back as
//! [`PersistError`] and the engines never retry on their own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::viewport::FitMode;

/// Where the user goes after a save when the store gives no hint.
pub const DEFAULT_NEXT_LOCATION: &str = "/";

/// Errors reported by a persistence collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    /// The request never completed (network, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The store answered but refused the request.
    #[error("request rejected with status {status}")]
    Rejected { status: u16 },

    /// The submitted order does not match what the store holds.
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

impl PersistError {
    /// Whether trying the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PersistError::Transport(_) => true,
            PersistError::Rejected { status } => *status >= 500 || *status == 429,
            PersistError::InvalidOrder(_) => false,
        }
    }
}

/// Receives the complete item order when a drag session ends.
pub trait OrderStore {
    fn submit_order(&mut self, ids: &[String]) -> Result<(), PersistError>;
}

/// Receives the rendered output of a crop session.
pub trait CropStore {
    fn save_crop(&mut self, submission: &CropSubmission) -> Result<SaveReceipt, PersistError>;
}

/// A finished crop: the frame-sized PNG and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropSubmission {
    pub image_id: String,
    pub png: Vec<u8>,
    pub mode: FitMode,
}

impl CropSubmission {
    /// Mode classification stored alongside the image.
    pub fn mode_label(&self) -> &'static str {
        self.mode.save_label()
    }
}

/// Response to a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    /// Next page to visit, e.g. the following pending image.
    pub next_url: Option<String>,
}

impl SaveReceipt {
    pub fn next_location(&self) -> &str {
        match self.next_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_NEXT_LOCATION,
        }
    }
}

impl<T: OrderStore + ?Sized> OrderStore for &mut T {
    fn submit_order(&mut self, ids: &[String]) -> Result<(), PersistError> {
        (**self).submit_order(ids)
    }
}

impl<T: CropStore + ?Sized> CropStore for &mut T {
    fn save_crop(&mut self, submission: &CropSubmission) -> Result<SaveReceipt, PersistError> {
        (**self).save_crop(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(PersistError::Transport("offline".into()).is_retryable());
        assert!(PersistError::Rejected { status: 503 }.is_retryable());
        assert!(PersistError::Rejected { status: 429 }.is_retryable());
        assert!(!PersistError::Rejected { status: 400 }.is_retryable());
        assert!(!PersistError::InvalidOrder("mismatch".into()).is_retryable());
    }

    #[test]
    fn test_next_location_fallback() {
        assert_eq!(SaveReceipt::default().next_location(), "/");
        let empty = SaveReceipt {
            next_url: Some(String::new()),
        };
        assert_eq!(empty.next_location(), "/");
        let next = SaveReceipt {
            next_url: Some("/crop/7".into()),
        };
        assert_eq!(next.next_location(), "/crop/7");
    }

    #[test]
    fn test_mode_label() {
        let submission = CropSubmission {
            image_id: "3".into(),
            png: vec![],
            mode: FitMode::Contain,
        };
        assert_eq!(submission.mode_label(), "manual_contain");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PersistError::Rejected { status: 404 }.to_string(),
            "request rejected with status 404"
        );
    }
}
