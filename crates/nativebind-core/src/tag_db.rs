//! Wrapper type tag relations.
//!
//! [`TagDb`] records, for every registered [`TypeTag`], its parent tag.
//! The relation is a tree: registration rejects anything that would create
//! a cycle, so the subtype walk in [`TagDb::is_subtype`] always terminates.
//!
//! The database is populated once during the single-threaded initialization
//! phase and read-only afterwards; there is no removal operation.

use rustc_hash::FxHashMap;

use crate::error::RegistrationError;
use crate::type_tag::TypeTag;

/// Child tag -> parent tag relation store.
///
/// A parent may be named before it is registered itself (generated
/// registration code is not ordered by inheritance depth); the subtype walk
/// follows parent links as far as they are recorded.
#[derive(Debug, Default)]
pub struct TagDb {
    parents: FxHashMap<TypeTag, Option<TypeTag>>,
}

impl TagDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tag` with the given parent.
    ///
    /// Re-registering with the identical parent is idempotent. Registering
    /// with a different parent is a [`RegistrationError::TagConflict`], and
    /// a registration whose parent chain leads back to `tag` is a
    /// [`RegistrationError::TagCycle`]; both leave the database unchanged.
    pub fn register(
        &mut self,
        tag: TypeTag,
        parent: Option<TypeTag>,
    ) -> Result<(), RegistrationError> {
        if let Some(existing) = self.parents.get(&tag) {
            if *existing == parent {
                return Ok(());
            }
            return Err(RegistrationError::TagConflict {
                tag,
                existing: *existing,
                requested: parent,
            });
        }

        // Walk the prospective parent chain before inserting anything, so a
        // failed registration is atomic.
        let mut cursor = parent;
        while let Some(ancestor) = cursor {
            if ancestor == tag {
                return Err(RegistrationError::TagCycle { tag });
            }
            cursor = self.parents.get(&ancestor).copied().flatten();
        }

        self.parents.insert(tag, parent);
        Ok(())
    }

    /// Whether `tag` has been registered.
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.parents.contains_key(&tag)
    }

    /// Whether `tag` is `ancestor` or has it anywhere up its parent chain.
    ///
    /// Reflexive for registered tags; always `false` for unregistered ones.
    pub fn is_subtype(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        if !self.parents.contains_key(&tag) {
            return false;
        }
        let mut cursor = Some(tag);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parents.get(&current).copied().flatten();
        }
        false
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Drop every relation. Only the lifecycle teardown calls this.
    pub fn clear(&mut self) {
        self.parents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TypeTag {
        TypeTag::from_name(name)
    }

    #[test]
    fn reflexive_for_registered_tags() {
        let mut db = TagDb::new();
        db.register(tag("Node"), None).unwrap();
        assert!(db.is_subtype(tag("Node"), tag("Node")));
    }

    #[test]
    fn not_reflexive_for_unregistered_tags() {
        let db = TagDb::new();
        assert!(!db.is_subtype(tag("Ghost"), tag("Ghost")));
    }

    #[test]
    fn child_is_subtype_of_registered_ancestor() {
        let mut db = TagDb::new();
        db.register(tag("Node"), None).unwrap();
        db.register(tag("Node2D"), Some(tag("Node"))).unwrap();
        db.register(tag("Sprite"), Some(tag("Node2D"))).unwrap();

        assert!(db.is_subtype(tag("Sprite"), tag("Node2D")));
        assert!(db.is_subtype(tag("Sprite"), tag("Node")));
        assert!(!db.is_subtype(tag("Node"), tag("Sprite")));
    }

    #[test]
    fn duplicate_registration_is_idempotent() {
        let mut db = TagDb::new();
        db.register(tag("Node2D"), Some(tag("Node"))).unwrap();
        db.register(tag("Node2D"), Some(tag("Node"))).unwrap();
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn conflicting_parent_is_rejected() {
        let mut db = TagDb::new();
        db.register(tag("Node2D"), Some(tag("Node"))).unwrap();
        let err = db
            .register(tag("Node2D"), Some(tag("Control")))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::TagConflict { .. }));
    }

    #[test]
    fn cycle_is_rejected_and_db_unchanged() {
        let mut db = TagDb::new();
        // Forward reference: B named as parent before being registered.
        db.register(tag("A"), Some(tag("B"))).unwrap();
        let err = db.register(tag("B"), Some(tag("A"))).unwrap_err();
        assert_eq!(err, RegistrationError::TagCycle { tag: tag("B") });

        assert!(db.is_subtype(tag("A"), tag("B")));
        assert!(!db.is_subtype(tag("B"), tag("A")));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut db = TagDb::new();
        let err = db.register(tag("A"), Some(tag("A"))).unwrap_err();
        assert_eq!(err, RegistrationError::TagCycle { tag: tag("A") });
        assert!(db.is_empty());
    }

    #[test]
    fn deep_cycle_is_rejected() {
        let mut db = TagDb::new();
        db.register(tag("B"), Some(tag("C"))).unwrap();
        db.register(tag("A"), Some(tag("B"))).unwrap();
        let err = db.register(tag("C"), Some(tag("A"))).unwrap_err();
        assert_eq!(err, RegistrationError::TagCycle { tag: tag("C") });
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn clear_empties_the_db() {
        let mut db = TagDb::new();
        db.register(tag("Node"), None).unwrap();
        db.clear();
        assert!(db.is_empty());
        assert!(!db.is_subtype(tag("Node"), tag("Node")));
    }
}
