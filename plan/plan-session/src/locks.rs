//! Advisory soft locks.
//!
//! An entity may carry a transient `EditingBy` tag to discourage two
//! authors from dragging the same wall at once. The tag is purely
//! advisory: the authority's version check remains the sole correctness
//! mechanism, and an expired or missing tag never blocks an intent.

use hashbrown::HashMap;

use plan_types::{AuthorId, EntityRef};

/// A transient "being edited by" tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditingTag {
    /// The author holding the tag.
    pub author: AuthorId,
    /// Absolute expiry, in the session's millisecond ticks.
    pub expires_at_ms: u64,
}

/// Table of advisory tags, keyed by entity.
#[derive(Debug, Clone, Default)]
pub struct LockTable {
    tags: HashMap<EntityRef, EditingTag>,
}

impl LockTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to tag an entity for an author.
    ///
    /// Succeeds when the entity is untagged, the existing tag expired, or
    /// the author already holds it (refreshing the expiry). Returns the
    /// blocking tag otherwise.
    ///
    /// # Errors
    ///
    /// The unexpired tag of another author.
    pub fn try_tag(
        &mut self,
        entity: EntityRef,
        author: AuthorId,
        now_ms: u64,
        ttl_ms: u64,
    ) -> Result<(), EditingTag> {
        if let Some(existing) = self.tags.get(&entity) {
            if existing.author != author && existing.expires_at_ms > now_ms {
                return Err(*existing);
            }
        }
        self.tags.insert(
            entity,
            EditingTag {
                author,
                expires_at_ms: now_ms.saturating_add(ttl_ms),
            },
        );
        Ok(())
    }

    /// Release an author's tag on an entity. Tags of other authors are
    /// left alone.
    pub fn release(&mut self, entity: EntityRef, author: AuthorId) {
        if self.tags.get(&entity).is_some_and(|t| t.author == author) {
            self.tags.remove(&entity);
        }
    }

    /// The unexpired tag on an entity, if any.
    #[must_use]
    pub fn holder(&self, entity: EntityRef, now_ms: u64) -> Option<EditingTag> {
        self.tags
            .get(&entity)
            .copied()
            .filter(|t| t.expires_at_ms > now_ms)
    }

    /// Drop every expired tag.
    pub fn sweep(&mut self, now_ms: u64) {
        self.tags.retain(|_, tag| tag.expires_at_ms > now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_types::SegmentId;

    fn entity() -> EntityRef {
        EntityRef::Segment(SegmentId::new())
    }

    #[test]
    fn tag_blocks_other_authors_until_expiry() {
        let mut table = LockTable::new();
        let target = entity();
        let alice = AuthorId::new();
        let bob = AuthorId::new();

        table.try_tag(target, alice, 1_000, 500).expect("tag");
        assert!(table.try_tag(target, bob, 1_200, 500).is_err());
        // Expired: bob may take over.
        assert!(table.try_tag(target, bob, 1_600, 500).is_ok());
        assert_eq!(table.holder(target, 1_700).map(|t| t.author), Some(bob));
    }

    #[test]
    fn holder_refreshes_its_own_tag() {
        let mut table = LockTable::new();
        let target = entity();
        let alice = AuthorId::new();

        table.try_tag(target, alice, 1_000, 500).expect("tag");
        table.try_tag(target, alice, 1_400, 500).expect("refresh");
        assert!(table.holder(target, 1_800).is_some());
    }

    #[test]
    fn release_only_drops_own_tag() {
        let mut table = LockTable::new();
        let target = entity();
        let alice = AuthorId::new();
        let bob = AuthorId::new();

        table.try_tag(target, alice, 0, 500).expect("tag");
        table.release(target, bob);
        assert!(table.holder(target, 100).is_some());
        table.release(target, alice);
        assert!(table.holder(target, 100).is_none());
    }

    #[test]
    fn sweep_drops_expired_tags() {
        let mut table = LockTable::new();
        let target = entity();
        table.try_tag(target, AuthorId::new(), 0, 100).expect("tag");
        table.sweep(200);
        assert!(table.holder(target, 50).is_none());
    }
}
