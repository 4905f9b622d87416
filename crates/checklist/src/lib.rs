//! Reaction-driven checklist over a chat message stream.
//!
//! Plain-text lines sent to a tracked channel become item messages whose
//! state lives entirely in the message body and its control reactions. The
//! chat history is the item store; nothing else is persisted apart from the
//! channel registry.

pub mod actor;
pub mod codec;
pub mod command;
pub mod error;
pub mod event;
pub mod reconciler;
pub mod session;
pub mod surface;
pub mod surface_memory;

pub use {
    actor::{EventReceiver, EventSender, event_channel, spawn_reconciler},
    codec::{ControlReaction, Item, ItemState},
    error::{Error, Result},
    event::{ChatEvent, InboundMessage, ReactionEvent},
    reconciler::Reconciler,
    session::{BeginOutcome, EditSession, EditSlot},
    surface::{ChatMessage, ChatSurface, MessageRef, ReactionTally},
    surface_memory::InMemorySurface,
};
