//! Discord transport for the checklist bot.
//!
//! Gateway events are translated into [`cartlist_checklist::ChatEvent`]s and
//! queued for the reconciler; outbound calls go through [`DiscordSurface`].

pub mod bot;
pub mod error;
pub mod handler;
pub mod surface;

pub use {
    bot::{DiscordClient, GatewayHandle},
    error::{Error, Result},
    handler::DiscordHandler,
    surface::DiscordSurface,
};
