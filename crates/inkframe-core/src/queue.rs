//! Upload queue: pending images waiting for a crop, ready images in display
//! order, and the round-robin cursor the frame rotates through.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{OrderStore, PersistError};
use crate::viewport::FitMode;

/// Default time each ready image stays on the frame.
pub const DEFAULT_ROTATION_SECS: u64 = 300;
/// Shortest allowed rotation interval.
pub const MIN_ROTATION_SECS: u64 = 10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("image already queued: {0}")]
    DuplicateId(String),

    #[error("image not found: {0}")]
    UnknownId(String),

    #[error("order does not match the ready images")]
    OrderMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedImage {
    pub id: String,
    pub name: String,
    pub status: ImageStatus,
    /// Display position; only set once ready.
    pub order: Option<usize>,
    /// Save label of the crop (`manual_cover` / `manual_contain`).
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageQueue {
    /// Arrival order.
    images: Vec<QueuedImage>,
    /// Index of the ready image shown last.
    last_displayed: Option<usize>,
    rotation_secs: u64,
}

impl Default for ImageQueue {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            last_displayed: None,
            rotation_secs: DEFAULT_ROTATION_SECS,
        }
    }
}

impl ImageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&QueuedImage> {
        self.images.iter().find(|img| img.id == id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn add_pending(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), QueueError> {
        let id = id.into();
        if self.get(&id).is_some() {
            return Err(QueueError::DuplicateId(id));
        }
        tracing::debug!(%id, "image queued");
        self.images.push(QueuedImage {
            id,
            name: name.into(),
            status: ImageStatus::Pending,
            order: None,
            mode: None,
        });
        Ok(())
    }

    /// Pending images, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &QueuedImage> {
        self.images
            .iter()
            .filter(|img| img.status == ImageStatus::Pending)
    }

    /// The pending image to crop after `current`.
    ///
    /// Starts from the first pending image when `current` is absent or no
    /// longer pending; `None` once past the last one.
    pub fn next_pending(&self, current: Option<&str>) -> Option<&QueuedImage> {
        let pending: Vec<&QueuedImage> = self.pending().collect();
        let Some(current) = current else {
            return pending.first().copied();
        };
        match pending.iter().position(|img| img.id == current) {
            Some(idx) => pending.get(idx + 1).copied(),
            None => pending.first().copied(),
        }
    }

    /// Mark an image cropped; it goes to the end of the display order.
    pub fn mark_ready(&mut self, id: &str, mode: FitMode) -> Result<(), QueueError> {
        let index = self
            .images
            .iter()
            .position(|img| img.id == id)
            .ok_or_else(|| QueueError::UnknownId(id.to_string()))?;

        // Take it out of the order first so the rest close ranks
        self.images[index].status = ImageStatus::Pending;
        self.images[index].order = None;
        self.renumber();

        let position = self.ready().len();
        let image = &mut self.images[index];
        image.status = ImageStatus::Ready;
        image.mode = Some(mode.save_label().to_string());
        image.order = Some(position);
        tracing::debug!(id, position, "image ready");
        Ok(())
    }

    /// Ready images in display order.
    pub fn ready(&self) -> Vec<&QueuedImage> {
        let mut ready: Vec<&QueuedImage> = self
            .images
            .iter()
            .filter(|img| img.status == ImageStatus::Ready)
            .collect();
        ready.sort_by_key(|img| img.order);
        ready
    }

    pub fn ready_order(&self) -> Vec<String> {
        self.ready().into_iter().map(|img| img.id.clone()).collect()
    }

    /// Replace the display order. `ids` must be exactly the ready ids.
    pub fn apply_order(&mut self, ids: &[String]) -> Result<(), QueueError> {
        let mut given: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut current: Vec<&str> = self.ready().into_iter().map(|img| img.id.as_str()).collect();
        given.sort_unstable();
        given.dedup();
        current.sort_unstable();
        if given.len() != ids.len() || given != current {
            return Err(QueueError::OrderMismatch);
        }

        for (position, id) in ids.iter().enumerate() {
            if let Some(image) = self.images.iter_mut().find(|img| &img.id == id) {
                image.order = Some(position);
            }
        }
        tracing::debug!(count = ids.len(), "display order updated");
        Ok(())
    }

    /// Drop an image and close the gap in the display order.
    pub fn remove(&mut self, id: &str) -> Result<QueuedImage, QueueError> {
        let index = self
            .images
            .iter()
            .position(|img| img.id == id)
            .ok_or_else(|| QueueError::UnknownId(id.to_string()))?;
        let removed = self.images.remove(index);
        self.renumber();

        let ready = self.ready().len();
        if self.last_displayed.is_some_and(|last| last >= ready) {
            self.last_displayed = None;
        }
        Ok(removed)
    }

    /// The next ready image to show, cycling back to the first.
    pub fn advance_display(&mut self) -> Option<&QueuedImage> {
        let count = self.ready().len();
        if count == 0 {
            self.last_displayed = None;
            return None;
        }
        let next = self.last_displayed.map_or(0, |last| (last + 1) % count);
        self.last_displayed = Some(next);
        self.ready().get(next).copied()
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_secs.max(MIN_ROTATION_SECS))
    }

    pub fn set_rotation_interval(&mut self, secs: u64) {
        self.rotation_secs = secs.max(MIN_ROTATION_SECS);
    }

    /// Compact ready positions to `0..n` keeping their relative order.
    fn renumber(&mut self) {
        let order = self.ready_order();
        for (position, id) in order.iter().enumerate() {
            if let Some(image) = self.images.iter_mut().find(|img| &img.id == id) {
                image.order = Some(position);
            }
        }
    }
}

impl OrderStore for ImageQueue {
    fn submit_order(&mut self, ids: &[String]) -> Result<(), PersistError> {
        self.apply_order(ids)
            .map_err(|e| PersistError::InvalidOrder(e.to_string()))
    }
}
