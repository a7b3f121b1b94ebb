//! Object indices
//!
//! Generic container for one object type: primary lookup by instance
//! number, derived unique secondary key (name, activation code,
//! (owner, asset) pair) and an embedded undo log. All mutation goes
//! through `create`/`modify`/`remove` so pre-images are recorded while
//! a session is open.
//!
//! Instance numbers are assigned monotonically and never reused; rolling
//! back a session restores the allocation watermark, so replaying the
//! same input sequence reproduces identical ids.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::objects::DbObject;
use crate::types::ObjectId;

use super::undo::UndoLog;

/// Internal index failure; reaching one of these from evaluator code is
/// a bug, not a user error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Object not found in index: {0}")]
    ObjectMissing(ObjectId),
}

pub type IndexResult<T> = Result<T, IndexError>;

impl From<IndexError> for crate::validation::errors::OpError {
    fn from(err: IndexError) -> Self {
        crate::validation::errors::OpError::Invariant(err.to_string())
    }
}

/// Indexed container for one object type
#[derive(Debug)]
pub struct ObjectIndex<T: DbObject> {
    objects: BTreeMap<u64, T>,
    /// Derived unique secondary key -> instance
    by_key: BTreeMap<Vec<u8>, u64>,
    next_instance: u64,
    undo: UndoLog<T>,
}

impl<T: DbObject> ObjectIndex<T> {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            by_key: BTreeMap::new(),
            next_instance: 0,
            undo: UndoLog::new(),
        }
    }

    fn object_id(instance: u64) -> ObjectId {
        ObjectId::new(T::SPACE_ID, T::TYPE_ID, instance)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, instance: u64) -> Option<&T> {
        self.objects.get(&instance)
    }

    pub fn find_by_key(&self, key: &[u8]) -> Option<&T> {
        let instance = self.by_key.get(key)?;
        self.objects.get(instance)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Allocate the next instance number, build the object with it and
    /// insert. Records an insert undo entry.
    pub fn create(&mut self, init: impl FnOnce(u64) -> T) -> &T {
        let instance = self.next_instance;
        self.next_instance += 1;

        let object = init(instance);
        debug_assert_eq!(object.instance(), instance, "initializer must use the assigned id");

        if let Some(key) = object.secondary_key() {
            self.by_key.insert(key, instance);
        }
        self.undo.note_created(instance);
        self.objects.insert(instance, object);
        self.objects
            .get(&instance)
            .expect("object inserted above")
    }

    /// Snapshot the pre-image, apply `mutator`, maintain the secondary
    /// key. Records a modify undo entry.
    pub fn modify(&mut self, instance: u64, mutator: impl FnOnce(&mut T)) -> IndexResult<()> {
        let object = self
            .objects
            .get_mut(&instance)
            .ok_or(IndexError::ObjectMissing(Self::object_id(instance)))?;

        let old_key = object.secondary_key();
        self.undo.note_modified(instance, object);
        mutator(object);
        let new_key = object.secondary_key();

        if old_key != new_key {
            if let Some(key) = old_key {
                self.by_key.remove(&key);
            }
            if let Some(key) = new_key {
                self.by_key.insert(key, instance);
            }
        }
        Ok(())
    }

    /// Erase from the index and all secondary keys. Records a remove
    /// undo entry holding the full pre-image. The instance number is
    /// never reassigned.
    pub fn remove(&mut self, instance: u64) -> IndexResult<T> {
        let object = self
            .objects
            .remove(&instance)
            .ok_or(IndexError::ObjectMissing(Self::object_id(instance)))?;

        if let Some(key) = object.secondary_key() {
            self.by_key.remove(&key);
        }
        self.undo.note_removed(instance, object.clone());
        Ok(object)
    }

    // =========================================================================
    // Undo Sessions (driven by the database facade)
    // =========================================================================

    pub(crate) fn begin_undo_session(&mut self) {
        self.undo.begin(self.next_instance);
    }

    pub(crate) fn commit_undo_session(&mut self) {
        self.undo.commit();
    }

    pub(crate) fn undo_session(&mut self) {
        if let Some(watermark) = self.undo.undo(&mut self.objects) {
            self.next_instance = watermark;
            self.rebuild_secondary_keys();
        }
    }

    /// The primary map is the source of truth; after a rollback the
    /// derived key map is rebuilt from it wholesale.
    fn rebuild_secondary_keys(&mut self) {
        self.by_key.clear();
        for (instance, object) in &self.objects {
            if let Some(key) = object.secondary_key() {
                self.by_key.insert(key, *instance);
            }
        }
    }
}

impl<T: DbObject> Default for ObjectIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Named {
        instance: u64,
        name: String,
    }

    impl DbObject for Named {
        const SPACE_ID: u8 = 9;
        const TYPE_ID: u8 = 9;

        fn instance(&self) -> u64 {
            self.instance
        }

        fn secondary_key(&self) -> Option<Vec<u8>> {
            Some(self.name.as_bytes().to_vec())
        }
    }

    fn named(instance: u64, name: &str) -> Named {
        Named {
            instance,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_create_assigns_sequential_instances() {
        let mut index: ObjectIndex<Named> = ObjectIndex::new();
        index.create(|i| named(i, "a"));
        index.create(|i| named(i, "b"));
        assert_eq!(index.get(0).unwrap().name, "a");
        assert_eq!(index.get(1).unwrap().name, "b");
    }

    #[test]
    fn test_secondary_key_follows_modify() {
        let mut index: ObjectIndex<Named> = ObjectIndex::new();
        index.create(|i| named(i, "old"));

        index.modify(0, |o| o.name = "new".to_string()).unwrap();
        assert!(index.find_by_key(b"old").is_none());
        assert_eq!(index.find_by_key(b"new").unwrap().instance, 0);
    }

    #[test]
    fn test_remove_erases_secondary_key_and_keeps_watermark() {
        let mut index: ObjectIndex<Named> = ObjectIndex::new();
        index.create(|i| named(i, "a"));
        index.remove(0).unwrap();

        assert!(index.find_by_key(b"a").is_none());
        // The removed id is never reused.
        index.create(|i| named(i, "b"));
        assert_eq!(index.get(1).unwrap().name, "b");
    }

    #[test]
    fn test_rollback_restores_objects_keys_and_watermark() {
        let mut index: ObjectIndex<Named> = ObjectIndex::new();
        index.create(|i| named(i, "keep"));

        index.begin_undo_session();
        index.create(|i| named(i, "drop"));
        index.modify(0, |o| o.name = "renamed".to_string()).unwrap();
        index.undo_session();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(0).unwrap().name, "keep");
        assert!(index.find_by_key(b"renamed").is_none());
        assert_eq!(index.find_by_key(b"keep").unwrap().instance, 0);

        // Watermark restored: the next creation reuses instance 1 only
        // because the rolled-back creation never committed.
        index.create(|i| named(i, "next"));
        assert_eq!(index.get(1).unwrap().name, "next");
    }

    #[test]
    fn test_modify_missing_object_fails_closed() {
        let mut index: ObjectIndex<Named> = ObjectIndex::new();
        let err = index.modify(42, |_| {}).unwrap_err();
        assert_eq!(err, IndexError::ObjectMissing(ObjectId::new(9, 9, 42)));
    }
}
