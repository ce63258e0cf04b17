use std::fmt;

use async_trait::async_trait;
use lumen_model::{ContentId, ProfileId};

use crate::error::Result;

/// External store of per-profile resume positions.
///
/// The store is authoritative; the player only reads on session start and
/// writes best-effort updates.
#[async_trait]
pub trait WatchHistory: Send + Sync + fmt::Debug {
    /// Last persisted position in seconds, `0.0` when none exists
    async fn get_watch_time(
        &self,
        profile_id: ProfileId,
        content_id: ContentId,
    ) -> Result<f64>;

    async fn update_watch_time(
        &self,
        profile_id: ProfileId,
        content_id: ContentId,
        seconds: f64,
        completed: bool,
    ) -> Result<()>;
}
