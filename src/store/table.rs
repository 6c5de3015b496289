//! A keyed collection of rows with its own id sequence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row type stored in a [`Table`].
pub trait Row: Clone {
    type Id: Copy + Eq + From<u64> + Into<u64>;

    fn id(&self) -> Self::Id;
}

/// Rows keyed by id, iterated in insertion (id) order.
///
/// Ids are never reused: `next_id` only grows, even when rows are removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Row> Table<T> {
    /// Allocates an id, builds the row with it and stores it.
    pub fn insert_with(&mut self, build: impl FnOnce(T::Id) -> T) -> &T {
        let key = self.next_id;
        self.next_id += 1;
        let row = build(T::Id::from(key));
        self.rows.entry(key).or_insert(row)
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.get(&id.into())
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.rows.get_mut(&id.into())
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id.into())
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.rows.remove(&id.into())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.rows.values().find(|row| pred(row))
    }

    pub fn find_mut(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.rows.values_mut().find(|row| pred(row))
    }

    /// Keeps only the rows matching `keep`, returning how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| keep(row));
        before - self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
