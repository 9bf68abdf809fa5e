//! Per-resource-kind interning of host handles.
//!
//! An [`IdentityTable`] hands out one [`ResId`] per distinct handle, in the order handles are first
//! seen. Handles are compared by the host-assigned identity (`Eq + Hash` on the handle itself),
//! never by the contents of the resource behind them, so two structurally identical nodes keep
//! two distinct ids.
//!
//! "Null or destroyed" is expressed as `None`; callers filter dead handles through the host before
//! asking for an id.

use crate::err::{Result, SnapshotError};
use crate::res_id::ResId;

use hashbrown::HashMap as FastMap;
use log::debug;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct IdentityTable<R> {
    object_map: FastMap<R, ResId, ahash::RandomState>,
    object_list: Vec<R>,
}

impl<R> Default for IdentityTable<R> {
    fn default() -> Self {
        IdentityTable {
            object_map: FastMap::with_hasher(ahash::RandomState::new()),
            object_list: Vec::new(),
        }
    }
}

impl<R: Copy + Eq + Hash + Debug> IdentityTable<R> {
    pub fn new() -> Self {
        IdentityTable::default()
    }

    /// Returns the id of `resource`, interning it when `create_if_missing` is set.
    ///
    /// `None` always yields [`ResId::INVALID`] and leaves the table untouched.
    pub fn id_of(&mut self, resource: Option<R>, create_if_missing: bool) -> ResId {
        self.id_of_with(resource, create_if_missing, |_| {})
    }

    /// Like [`IdentityTable::id_of`], calling `on_create` once if (and only if) a new id was
    /// assigned.
    pub fn id_of_with<F>(
        &mut self,
        resource: Option<R>,
        create_if_missing: bool,
        on_create: F,
    ) -> ResId
    where
        F: FnOnce(R),
    {
        let Some(resource) = resource else {
            return ResId::INVALID;
        };

        if let Some(&id) = self.object_map.get(&resource) {
            return id;
        }

        if !create_if_missing {
            return ResId::INVALID;
        }

        self.add_new_object(resource, on_create)
    }

    /// Advisory lookup, never creates.
    #[inline]
    pub fn find_id(&self, resource: Option<R>) -> ResId {
        resource
            .and_then(|r| self.object_map.get(&r).copied())
            .unwrap_or(ResId::INVALID)
    }

    /// Interning lookup, creates on first sight.
    #[inline]
    pub fn get_id(&mut self, resource: Option<R>) -> ResId {
        self.id_of(resource, true)
    }

    /// Strict getter that turns "missing" or "already present" into errors on request.
    pub fn get_id_strict(
        &mut self,
        resource: R,
        create_if_missing: bool,
        fail_if_missing: bool,
        fail_if_exists: bool,
    ) -> Result<ResId> {
        if let Some(&id) = self.object_map.get(&resource) {
            if fail_if_exists {
                return Err(SnapshotError::DuplicateRegistration { id });
            }
            return Ok(id);
        }

        if !create_if_missing {
            if fail_if_missing {
                return Err(SnapshotError::MissingIdentity {
                    what: format!("{:?}", resource),
                });
            }
            return Ok(ResId::INVALID);
        }

        Ok(self.add_new_object(resource, |_| {}))
    }

    /// Registers a resource that must not have been seen before.
    pub fn register_only<F>(&mut self, resource: R, on_create: F) -> Result<ResId>
    where
        F: FnOnce(R),
    {
        if let Some(&id) = self.object_map.get(&resource) {
            return Err(SnapshotError::DuplicateRegistration { id });
        }
        Ok(self.add_new_object(resource, on_create))
    }

    fn add_new_object<F>(&mut self, resource: R, on_create: F) -> ResId
    where
        F: FnOnce(R),
    {
        let id = ResId::new(self.object_list.len());
        self.object_map.insert(resource, id);
        self.object_list.push(resource);
        debug!("Interned {:?} as {}", resource, id);

        on_create(resource);
        id
    }

    /// Returns the resource behind `id`, failing if `id` does not index a current slot.
    pub fn lookup(&self, id: ResId) -> Result<R> {
        id.index()
            .and_then(|idx| self.object_list.get(idx).copied())
            .ok_or(SnapshotError::InvalidObjectId {
                id,
                len: self.object_list.len(),
            })
    }

    pub fn object_by_index(&self, index: usize) -> Result<&R> {
        self.object_list
            .get(index)
            .ok_or_else(|| SnapshotError::InvalidObjectId {
                id: ResId::new(index),
                len: self.object_list.len(),
            })
    }

    #[inline]
    pub fn contains(&self, resource: R) -> bool {
        self.object_map.contains_key(&resource)
    }
}

impl<R> IdentityTable<R> {
    pub fn is_valid_id(&self, id: ResId) -> bool {
        id.index().is_some_and(|idx| idx < self.object_list.len())
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    /// Interned resources, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ResId, &R)> {
        self.object_list
            .iter()
            .enumerate()
            .map(|(idx, r)| (ResId::new(idx), r))
    }

    pub fn ids(&self) -> impl Iterator<Item = ResId> + use<R> {
        (0..self.object_list.len()).map(ResId::new)
    }

    pub fn as_slice(&self) -> &[R] {
        &self.object_list
    }

    /// Creates a watcher whose checkpoint is the current size of the table.
    pub fn watcher(&self) -> StorageWatcher {
        StorageWatcher {
            checkpoint: self.object_list.len(),
        }
    }
}

/// Tracks which entries of an append-only [`IdentityTable`] were added after a checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageWatcher {
    checkpoint: usize,
}

impl StorageWatcher {
    pub fn checkpoint(&self) -> usize {
        self.checkpoint
    }

    pub fn has_new_objects<R>(&self, table: &IdentityTable<R>) -> bool {
        table.len() > self.checkpoint
    }

    pub fn num_new_objects<R>(&self, table: &IdentityTable<R>) -> usize {
        table.len().saturating_sub(self.checkpoint)
    }

    /// Entries interned since the checkpoint.
    pub fn new_objects<'t, R>(
        &self,
        table: &'t IdentityTable<R>,
    ) -> impl Iterator<Item = (ResId, &'t R)> {
        table.iter().skip(self.checkpoint)
    }

    /// Moves the checkpoint to the current end of `table`.
    pub fn update<R>(&mut self, table: &IdentityTable<R>) {
        self.checkpoint = table.len();
    }
}
