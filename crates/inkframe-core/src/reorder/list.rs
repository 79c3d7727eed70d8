//! Ordered container of unique item identifiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building or editing an [`OrderedList`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("duplicate item id: {0}")]
    DuplicateId(String),

    #[error("unknown item id: {0}")]
    UnknownId(String),
}

/// Which side of the target the active item lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Active item was before the target; it goes after it.
    Forward,
    /// Active item was after the target; it goes before it.
    Backward,
}

/// The single source of truth for item order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OrderedList {
    ids: Vec<String>,
}

impl OrderedList {
    /// Build a list, rejecting repeated ids.
    pub fn new<I, S>(ids: I) -> Result<Self, ListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Vec::new();
        for id in ids {
            let id = id.into();
            if list.contains(&id) {
                return Err(ListError::DuplicateId(id));
            }
            list.push(id);
        }
        Ok(Self { ids: list })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|x| x == id)
    }

    /// The item directly after `id`, if any.
    pub fn successor(&self, id: &str) -> Option<&str> {
        let index = self.index_of(id)?;
        self.ids.get(index + 1).map(String::as_str)
    }

    /// Whether moving `active` next to `target` would change the order.
    ///
    /// Forward moves compare the successors of both items; backward moves
    /// compare the active item's successor with the target. Unknown ids and
    /// `active == target` never move.
    pub fn would_move(&self, active: &str, target: &str) -> bool {
        let (Some(i), Some(j)) = (self.index_of(active), self.index_of(target)) else {
            return false;
        };
        if i < j {
            self.successor(active) != self.successor(target)
        } else if i > j {
            self.successor(active) != Some(target)
        } else {
            false
        }
    }

    /// Move `active` after `target` (forward) or before it (backward).
    ///
    /// Returns the direction taken, or `None` when the order is unchanged.
    pub fn move_relative(
        &mut self,
        active: &str,
        target: &str,
    ) -> Result<Option<MoveDirection>, ListError> {
        let i = self
            .index_of(active)
            .ok_or_else(|| ListError::UnknownId(active.to_string()))?;
        let j = self
            .index_of(target)
            .ok_or_else(|| ListError::UnknownId(target.to_string()))?;
        if i == j {
            return Ok(None);
        }

        // Inserting at the target's original index lands after it when moving
        // forward (the removal shifted it left) and before it when moving back.
        let item = self.ids.remove(i);
        self.ids.insert(j, item);
        let direction = if i < j {
            MoveDirection::Forward
        } else {
            MoveDirection::Backward
        };
        Ok(Some(direction))
    }
}

impl TryFrom<Vec<String>> for OrderedList {
    type Error = ListError;

    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(ids)
    }
}

impl From<OrderedList> for Vec<String> {
    fn from(list: OrderedList) -> Self {
        list.ids
    }
}
