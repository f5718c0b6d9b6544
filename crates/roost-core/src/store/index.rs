use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::StoreError;
use crate::models::{Message, MessageId};

/// The full, deduplicated set of messages known to a view.
///
/// `by_id` owns the messages and gives O(1) lookup; `order` keeps their ids
/// strictly ascending. The two stay in bijection: every id in `order` has
/// exactly one entry in `by_id` and vice versa.
#[derive(Default)]
pub struct MessageIndex {
    by_id: HashMap<MessageId, Message>,
    order: Vec<MessageId>,
}

impl MessageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an unordered batch into the store.
    ///
    /// Ids already present are dropped (idempotent bulk load). Returns the
    /// newly stored ids in ascending order. A batch carrying two distinct
    /// messages under one id is a caller bug; the first one wins and the
    /// conflict is logged.
    pub fn insert(&mut self, batch: Vec<Message>) -> Vec<MessageId> {
        let mut added: Vec<MessageId> = Vec::with_capacity(batch.len());
        for msg in batch {
            match self.insert_one(msg) {
                Ok(id) => added.push(id),
                Err(StoreError::DuplicateId { id }) => {
                    if added.contains(&id) {
                        warn!(%id, "conflicting messages under one id in a batch, keeping the first");
                    } else {
                        debug!(%id, "dropping already known message");
                    }
                }
                Err(err) => warn!(%err, "message rejected by index"),
            }
        }
        added.sort_unstable();
        added
    }

    /// Merge a batch the caller guarantees precedes everything stored.
    ///
    /// Cheaper than `insert`: the survivors are spliced at the front of the
    /// id sequence instead of merge-searched individually.
    pub fn prepend(&mut self, batch: Vec<Message>) -> Vec<MessageId> {
        let mut fresh: Vec<Message> = Vec::with_capacity(batch.len());
        for msg in batch {
            if self.by_id.contains_key(&msg.id) || fresh.iter().any(|m| m.id == msg.id) {
                debug!(id = %msg.id, "dropping already known message");
                continue;
            }
            fresh.push(msg);
        }
        fresh.sort_unstable_by(|a, b| a.id.cmp(&b.id));

        if let (Some(newest), Some(oldest)) = (fresh.last(), self.order.first()) {
            debug_assert!(
                newest.id < *oldest,
                "prepend batch must precede all stored messages"
            );
        }

        let ids: Vec<MessageId> = fresh.iter().map(|m| m.id).collect();
        for msg in fresh {
            self.by_id.insert(msg.id, msg);
        }
        self.order.splice(0..0, ids.iter().copied());
        ids
    }

    /// Low-level single insert. Keeps the existing entry and reports the
    /// collision on an occupied id, so the caller decides whether to log,
    /// skip, or abort.
    fn insert_one(&mut self, msg: Message) -> Result<MessageId, StoreError> {
        let id = msg.id;
        match self.by_id.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId { id }),
            Entry::Vacant(slot) => {
                slot.insert(msg);
                if let Err(pos) = self.order.binary_search(&id) {
                    self.order.insert(pos, id);
                }
                Ok(id)
            }
        }
    }

    /// Removing an unknown id is a no-op returning `None`.
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let msg = self.by_id.remove(&id)?;
        if let Ok(pos) = self.order.binary_search(&id) {
            self.order.remove(pos);
        }
        Some(msg)
    }

    /// Relocate a message from `old_id` to `new_id`, rewriting its stored
    /// `id` field and its sort position. Local echo reconciliation: the
    /// provisional fractional id becomes the server-assigned integer one.
    ///
    /// Returns `Ok(true)` when a relocation happened, `Ok(false)` when
    /// `old_id` is unknown (the reconciliation raced a removal) or the ids
    /// are equal, and `Err(DuplicateId)` when `new_id` is already taken.
    pub fn change_id(&mut self, old_id: MessageId, new_id: MessageId) -> Result<bool, StoreError> {
        if old_id == new_id {
            return Ok(false);
        }
        if self.by_id.contains_key(&new_id) {
            return Err(StoreError::DuplicateId { id: new_id });
        }
        let Some(mut msg) = self.by_id.remove(&old_id) else {
            debug!(%old_id, "change_id for unknown message");
            return Ok(false);
        };
        msg.id = new_id;
        self.by_id.insert(new_id, msg);
        if let Ok(pos) = self.order.binary_search(&old_id) {
            self.order.remove(pos);
        }
        if let Err(pos) = self.order.binary_search(&new_id) {
            self.order.insert(pos, new_id);
        }
        Ok(true)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.by_id.get_mut(&id)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All stored ids, strictly ascending.
    pub fn ids(&self) -> &[MessageId] {
        &self.order
    }

    pub fn first_id(&self) -> Option<MessageId> {
        self.order.first().copied()
    }

    pub fn last_id(&self) -> Option<MessageId> {
        self.order.last().copied()
    }

    /// Stored messages in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> + '_ {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.order.clear();
    }
}
