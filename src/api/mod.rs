pub mod bgg_api;
pub mod models;

use futures::future::BoxFuture;

use crate::api::models::{GuildResponse, PlaysResponse};
use crate::error::FetchError;
use crate::util::dates::Window;

/// Surface of the remote game-tracking service the pipeline depends on.
/// Production code talks to BoardGameGeek through [`bgg_api::BggApi`];
/// tests substitute a scripted implementation.
pub trait GameTracker: Sync {
    /// One page of the guild roster.
    fn guild_page(
        &self,
        guild_id: u32,
        page: u32,
    ) -> BoxFuture<'_, Result<GuildResponse, FetchError>>;

    /// One page of a member's logged plays inside the window.
    fn plays_page<'a>(
        &'a self,
        username: &'a str,
        window: Window,
        page: u32,
    ) -> BoxFuture<'a, Result<PlaysResponse, FetchError>>;
}
