//! The single in-flight "replace this item's text" workflow.

use tracing::debug;

use crate::{
    Result,
    codec::{self, Glyphs, ItemState},
    surface::{ChatMessage, ChatSurface, MessageRef},
};

/// An active edit: who asked, which item, and the prompt awaiting a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub editor_user_id: String,
    pub item: MessageRef,
    pub prompt: MessageRef,
    /// Display text of the item when the edit began.
    pub original_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    /// A prompt was sent and the session installed.
    Started(MessageRef),
    /// Another session is already open; it is left untouched.
    Busy(EditSession),
}

/// Prompt text shown while an item is being edited.
pub fn prompt_text(item_text: &str) -> String {
    format!("Editing: `{item_text}`")
}

/// Holds at most one [`EditSession`] for the whole process.
///
/// Every transition takes the session out of the slot before touching the
/// chat surface, so a failed call leaves the slot idle rather than stuck.
#[derive(Debug, Default)]
pub struct EditSlot {
    active: Option<EditSession>,
}

impl EditSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&EditSession> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the open session edits `item`.
    pub fn targets(&self, item: &MessageRef) -> bool {
        self.active.as_ref().is_some_and(|s| &s.item == item)
    }

    /// Whether the open session's prompt lives in `channel_id`.
    pub fn prompt_in(&self, channel_id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.prompt.channel_id == channel_id)
    }

    /// Open a session for `item` on behalf of `editor_user_id`.
    pub async fn begin(
        &mut self,
        surface: &dyn ChatSurface,
        glyphs: &Glyphs,
        editor_user_id: &str,
        item: &ChatMessage,
    ) -> Result<BeginOutcome> {
        if let Some(existing) = &self.active {
            return Ok(BeginOutcome::Busy(existing.clone()));
        }

        let original_text = codec::decode(glyphs, &item.content).text;
        let prompt = surface
            .send_message(&item.reference.channel_id, &prompt_text(&original_text))
            .await?;

        debug!(item = %item.reference, prompt = %prompt, editor = editor_user_id, "edit session started");
        self.active = Some(EditSession {
            editor_user_id: editor_user_id.to_string(),
            item: item.reference.clone(),
            prompt: prompt.clone(),
            original_text,
        });
        Ok(BeginOutcome::Started(prompt))
    }

    /// Replace the item text with `new_text` (as an unchecked item) and
    /// close the session. Returns the closed session, or `None` when idle.
    pub async fn commit(
        &mut self,
        surface: &dyn ChatSurface,
        glyphs: &Glyphs,
        new_text: &str,
    ) -> Result<Option<EditSession>> {
        let Some(session) = self.active.take() else {
            return Ok(None);
        };

        let edited = surface
            .edit_message(
                &session.item,
                &codec::render(glyphs, ItemState::Unchecked, new_text),
            )
            .await;
        let closed = close(surface, glyphs, &session).await;
        edited.and(closed)?;

        debug!(item = %session.item, "edit session committed");
        Ok(Some(session))
    }

    /// Delete the prompt and close the session, resetting the item's edit
    /// reaction if user copies of it remain. No-op when idle.
    pub async fn cancel(
        &mut self,
        surface: &dyn ChatSurface,
        glyphs: &Glyphs,
    ) -> Result<Option<EditSession>> {
        let Some(session) = self.active.take() else {
            return Ok(None);
        };

        close(surface, glyphs, &session).await?;

        debug!(item = %session.item, "edit session cancelled");
        Ok(Some(session))
    }

    /// Delete the prompt and close the session without touching the item.
    pub async fn discard(&mut self, surface: &dyn ChatSurface) -> Result<Option<EditSession>> {
        let Some(session) = self.active.take() else {
            return Ok(None);
        };

        surface.delete_message(&session.prompt).await?;

        debug!(item = %session.item, "edit session discarded");
        Ok(Some(session))
    }
}

/// Delete the prompt and reset the edit reaction. Both are attempted; the
/// first failure is returned.
async fn close(surface: &dyn ChatSurface, glyphs: &Glyphs, session: &EditSession) -> Result<()> {
    let deleted = surface.delete_message(&session.prompt).await;
    let reset = reset_edit_reaction(surface, glyphs, &session.item).await;
    deleted.and(reset)
}

/// Put the edit reaction back to the bot's lone copy when users still hold one.
async fn reset_edit_reaction(
    surface: &dyn ChatSurface,
    glyphs: &Glyphs,
    item: &MessageRef,
) -> Result<()> {
    let message = surface.fetch_message(item).await?;
    if message.user_reactions(&glyphs.edit) == 0 {
        return Ok(());
    }
    surface.remove_reaction_emoji(item, &glyphs.edit).await?;
    surface.add_reaction(item, &glyphs.edit).await
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::surface_memory::{InMemorySurface, SurfaceOp},
    };

    async fn item(surface: &InMemorySurface, text: &str) -> ChatMessage {
        let glyphs = Glyphs::default();
        let reference = surface
            .send_message("c1", &codec::render(&glyphs, ItemState::Unchecked, text))
            .await
            .unwrap();
        surface.add_reaction(&reference, &glyphs.edit).await.unwrap();
        surface.get(&reference).unwrap()
    }

    #[tokio::test]
    async fn begin_sends_prompt_and_installs_session() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let mut slot = EditSlot::new();

        let outcome = slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        let BeginOutcome::Started(prompt) = outcome else {
            panic!("expected a new session");
        };
        assert_eq!(surface.get(&prompt).unwrap().content, "Editing: `milk`");
        assert!(slot.targets(&milk.reference));
        assert!(slot.prompt_in("c1"));
        assert!(!slot.prompt_in("c2"));
        assert_eq!(slot.current().unwrap().original_text, "milk");
    }

    #[tokio::test]
    async fn second_begin_is_rejected() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let eggs = item(&surface, "eggs").await;
        let mut slot = EditSlot::new();

        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        let before = slot.current().cloned().unwrap();
        let outcome = slot.begin(&surface, &glyphs, "bob", &eggs).await.unwrap();

        assert_eq!(outcome, BeginOutcome::Busy(before.clone()));
        assert_eq!(slot.current(), Some(&before));
        assert_eq!(surface.channel_messages("c1").len(), 3);
    }

    #[tokio::test]
    async fn commit_rewrites_item_and_removes_prompt() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let mut slot = EditSlot::new();
        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        let prompt = slot.current().unwrap().prompt.clone();

        let closed = slot.commit(&surface, &glyphs, "oat milk").await.unwrap();

        assert!(closed.is_some());
        assert!(!slot.is_active());
        assert_eq!(surface.get(&milk.reference).unwrap().content, "◻ oat milk");
        assert!(surface.get(&prompt).is_none());
    }

    #[tokio::test]
    async fn cancel_resets_edit_reaction_only_when_users_hold_it() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let mut slot = EditSlot::new();

        surface.react(&milk.reference, "alice", &glyphs.edit);
        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        surface.clear_operations();
        slot.cancel(&surface, &glyphs).await.unwrap();

        let ops = surface.operations();
        assert!(ops.contains(&SurfaceOp::RemoveReactionEmoji {
            target: milk.reference.clone(),
            emoji: glyphs.edit.clone(),
        }));
        let tally = surface.get(&milk.reference).unwrap();
        let edit = tally.reaction(&glyphs.edit).unwrap();
        assert_eq!((edit.count, edit.includes_own), (1, true));

        // The user already removed theirs: nothing to reset.
        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        surface.clear_operations();
        slot.cancel(&surface, &glyphs).await.unwrap();
        assert!(
            !surface
                .operations()
                .iter()
                .any(|op| matches!(op, SurfaceOp::RemoveReactionEmoji { .. }))
        );
    }

    #[tokio::test]
    async fn cancel_and_discard_are_idempotent() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let mut slot = EditSlot::new();

        assert!(slot.cancel(&surface, &glyphs).await.unwrap().is_none());
        assert!(slot.discard(&surface).await.unwrap().is_none());
        assert!(slot.commit(&surface, &glyphs, "x").await.unwrap().is_none());
        assert!(surface.operations().is_empty());
    }

    #[tokio::test]
    async fn failed_surface_call_leaves_slot_idle() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let mut slot = EditSlot::new();
        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();

        surface.delete_message(&milk.reference).await.unwrap();
        assert!(slot.commit(&surface, &glyphs, "oat milk").await.is_err());
        assert!(!slot.is_active());
    }

    #[tokio::test]
    async fn prompt_is_removed_even_when_item_is_gone() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let eggs = item(&surface, "eggs").await;
        let mut slot = EditSlot::new();

        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        let prompt = slot.current().unwrap().prompt.clone();
        surface.delete_message(&milk.reference).await.unwrap();
        assert!(slot.commit(&surface, &glyphs, "oat milk").await.is_err());
        assert!(surface.get(&prompt).is_none());

        slot.begin(&surface, &glyphs, "alice", &eggs).await.unwrap();
        let prompt = slot.current().unwrap().prompt.clone();
        surface.delete_message(&eggs.reference).await.unwrap();
        assert!(slot.cancel(&surface, &glyphs).await.is_err());
        assert!(surface.get(&prompt).is_none());
        assert!(surface.channel_messages("c1").is_empty());
    }

    #[tokio::test]
    async fn discard_keeps_item_untouched() {
        let surface = InMemorySurface::new("bot");
        let glyphs = Glyphs::default();
        let milk = item(&surface, "milk").await;
        let mut slot = EditSlot::new();
        slot.begin(&surface, &glyphs, "alice", &milk).await.unwrap();
        surface.clear_operations();

        slot.discard(&surface).await.unwrap();

        assert_eq!(surface.operations().len(), 1);
        assert_eq!(surface.get(&milk.reference).unwrap().content, "◻ milk");
    }
}
