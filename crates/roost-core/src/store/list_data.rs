use serde::Serialize;
use tracing::{debug, instrument};

use crate::errors::StoreError;
use crate::filter::Filter;
use crate::models::{Message, MessageId};
use crate::policy::{MutingPolicy, UserIdentity};
use crate::store::index::MessageIndex;

/// Where a batch of newly admitted messages landed relative to the filtered
/// view as it was *before* the add. The renderer splices each group into
/// place instead of re-rendering the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddResult {
    /// Admitted messages older than the previous window, ascending.
    pub top: Vec<Message>,
    /// Admitted messages inside the previous window, ascending.
    pub interior: Vec<Message>,
    /// Admitted messages newer than the previous window (or everything, if
    /// the window was empty), ascending.
    pub bottom: Vec<Message>,
}

/// Ordered, indexed message data for one logical view.
///
/// Holds the full deduplicated store, the muting-filtered subsequence that
/// is actually rendered, and the selection cursor. Single-threaded by
/// design: the owning event loop serializes all access.
pub struct MessageListData {
    filter: Filter,
    muting_enabled: bool,
    muting: Box<dyn MutingPolicy>,
    identity: Box<dyn UserIdentity>,
    index: MessageIndex,
    /// Ids of the messages that pass the inclusion predicate, ascending.
    /// Always a subsequence of the index order.
    visible_ids: Vec<MessageId>,
    selected: Option<MessageId>,
}

impl MessageListData {
    pub fn new(
        filter: Filter,
        muting_enabled: bool,
        muting: Box<dyn MutingPolicy>,
        identity: Box<dyn UserIdentity>,
    ) -> Self {
        Self {
            filter,
            muting_enabled,
            muting,
            identity,
            index: MessageIndex::new(),
            visible_ids: Vec::new(),
            selected: None,
        }
    }

    /// The inclusion predicate: mentions always show, direct messages are
    /// never muted, everything else defers to the muting policy.
    fn admits(&self, msg: &Message) -> bool {
        if !self.muting_enabled || msg.mentioned {
            return true;
        }
        match msg.topic_key() {
            Some((stream_id, topic)) => !self.muting.is_topic_muted(stream_id, topic),
            None => true,
        }
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Bulk load with no placement classification, for initial population
    /// where the whole view gets rebuilt anyway.
    pub fn add_anywhere(&mut self, messages: Vec<Message>) {
        let added = self.index.insert(messages);
        for id in added {
            if self.index.get(id).is_some_and(|m| self.admits(m)) {
                if let Err(pos) = self.visible_ids.binary_search(&id) {
                    self.visible_ids.insert(pos, id);
                }
            }
        }
    }

    /// Page in older history. The caller guarantees the batch precedes
    /// everything currently stored.
    pub fn prepend(&mut self, messages: Vec<Message>) {
        let added = self.index.prepend(messages);
        let admitted: Vec<MessageId> = added
            .into_iter()
            .filter(|&id| self.index.get(id).is_some_and(|m| self.admits(m)))
            .collect();
        self.visible_ids.splice(0..0, admitted);
    }

    /// Primary ingestion path for newly learned messages. Merges the batch
    /// into the store, admits survivors into the filtered view, and reports
    /// where each admitted message landed relative to the pre-update window.
    #[instrument(skip_all, fields(batch = messages.len()))]
    pub fn add_messages(&mut self, messages: Vec<Message>) -> AddResult {
        let window = self
            .visible_ids
            .first()
            .copied()
            .zip(self.visible_ids.last().copied());

        let added = self.index.insert(messages);
        let mut result = AddResult::default();
        for id in added {
            let admitted = match self.index.get(id) {
                Some(m) if self.admits(m) => m.clone(),
                _ => continue,
            };
            match window {
                None => result.bottom.push(admitted),
                Some((min_id, _)) if id < min_id => result.top.push(admitted),
                Some((_, max_id)) if id > max_id => result.bottom.push(admitted),
                Some(_) => result.interior.push(admitted),
            }
            if let Err(pos) = self.visible_ids.binary_search(&id) {
                self.visible_ids.insert(pos, id);
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Removal and mutation
    // ------------------------------------------------------------------

    /// Remove each id from the store and the filtered view. Unknown ids are
    /// no-ops. The selection may go stale; callers re-anchor with
    /// `reset_select_to_closest` after bulk removals.
    pub fn remove(&mut self, ids: &[MessageId]) {
        for &id in ids {
            if self.index.remove(id).is_none() {
                debug!(%id, "remove of unknown message id");
                continue;
            }
            if let Ok(pos) = self.visible_ids.binary_search(&id) {
                self.visible_ids.remove(pos);
            }
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.visible_ids.clear();
        self.selected = None;
    }

    /// Relocate a message to its server-assigned id and tell the view layer
    /// to relabel the rendered element. `re_render` fires only when a
    /// relocation actually happened; the selection follows the message.
    pub fn change_message_id(
        &mut self,
        old_id: MessageId,
        new_id: MessageId,
        re_render: impl FnOnce(MessageId, MessageId),
    ) -> Result<(), StoreError> {
        let was_visible = self.visible_ids.binary_search(&old_id).is_ok();
        if !self.index.change_id(old_id, new_id)? {
            return Ok(());
        }
        if was_visible {
            if let Ok(pos) = self.visible_ids.binary_search(&old_id) {
                self.visible_ids.remove(pos);
            }
            if let Err(pos) = self.visible_ids.binary_search(&new_id) {
                self.visible_ids.insert(pos, new_id);
            }
        }
        if self.selected == Some(old_id) {
            self.selected = Some(new_id);
        }
        re_render(old_id, new_id);
        Ok(())
    }

    /// Recompute the filtered view from the full store. Called when the
    /// muting policy itself changes, not on per-message mutation.
    pub fn update_items_for_muting(&mut self) {
        let visible: Vec<MessageId> = self
            .index
            .iter()
            .filter(|m| self.admits(m))
            .map(|m| m.id)
            .collect();
        self.visible_ids = visible;
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(id)
    }

    /// Mutable access so the owner can flip `unread`/`mentioned` flags in
    /// place before re-filtering.
    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.index.get_mut(id)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.index.contains(id)
    }

    /// The filtered view as a fresh snapshot, ascending by id.
    pub fn all_messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.visible_ids.iter().filter_map(|&id| self.index.get(id))
    }

    /// Number of messages in the filtered view.
    pub fn len(&self) -> usize {
        self.visible_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_ids.is_empty()
    }

    /// Number of messages in the full store, muted ones included.
    pub fn all_len(&self) -> usize {
        self.index.len()
    }

    pub fn first(&self) -> Option<&Message> {
        self.visible_ids.first().and_then(|&id| self.index.get(id))
    }

    pub fn last(&self) -> Option<&Message> {
        self.visible_ids.last().and_then(|&id| self.index.get(id))
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn is_search(&self) -> bool {
        self.filter.is_search()
    }

    // ------------------------------------------------------------------
    // Selection cursor
    // ------------------------------------------------------------------

    pub fn selected_id(&self) -> Option<MessageId> {
        self.selected
    }

    /// Set the cursor. The id is not required to be currently visible; it
    /// may have been captured before a mutation and re-anchored afterwards.
    pub fn set_selected_id(&mut self, id: MessageId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Position of the selected message within the filtered view, `None`
    /// when nothing is selected or the selection left the view.
    pub fn selected_idx(&self) -> Option<usize> {
        let id = self.selected?;
        self.visible_ids.binary_search(&id).ok()
    }

    /// The visible id minimizing the distance to `target`. Between two
    /// equidistant candidates the lower id wins (the scan replaces the best
    /// candidate only on strictly smaller distance).
    pub fn closest_id(&self, target: MessageId) -> Option<MessageId> {
        let mut best: Option<MessageId> = None;
        for &id in &self.visible_ids {
            match best {
                Some(b) if id.distance(target) >= b.distance(target) => {}
                _ => best = Some(id),
            }
        }
        best
    }

    /// Re-anchor the cursor after the surrounding data changed. Keeps the
    /// selection empty if there was none.
    pub fn reset_select_to_closest(&mut self) {
        if let Some(sel) = self.selected {
            self.selected = self.closest_id(sel);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First unread message in the filtered view. When everything is read,
    /// falls back to the id of the last message in the *full* store
    /// ("caught up, anchor at the bottom"); `None` only for an empty store.
    pub fn first_unread_message_id(&self) -> Option<MessageId> {
        for &id in &self.visible_ids {
            if self.index.get(id).is_some_and(|m| m.unread) {
                return Some(id);
            }
        }
        self.index.last_id()
    }

    /// Most recent visible message sent by the current user.
    pub fn get_last_message_sent_by_me(&self) -> Option<&Message> {
        self.visible_ids
            .iter()
            .rev()
            .filter_map(|&id| self.index.get(id))
            .find(|m| self.identity.is_me(m.sender_id))
    }
}
