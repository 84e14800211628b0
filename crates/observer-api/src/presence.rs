//! In-process mirror of the platform's member statuses.
//!
//! The relay keeps this cache current (ready snapshots replace a guild,
//! presence events update one member). The tracker only reads it, through
//! [`MemberDirectory`], when it needs a live status for a boundary or an
//! early log.

use std::collections::BTreeMap;

use observer_core::{boundary::MemberDirectory, status::Status};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
  #[error("guild {0} has not been announced")]
  UnknownGuild(u64),

  #[error("member {member_id} is not cached in guild {guild_id}")]
  UnknownMember { guild_id: u64, member_id: u64 },
}

#[derive(Debug, Default)]
pub struct PresenceCache {
  guilds: RwLock<BTreeMap<u64, BTreeMap<u64, Status>>>,
}

impl PresenceCache {
  pub fn new() -> Self { Self::default() }

  /// Replace everything known about `guild_id` with `members`.
  pub async fn replace_guild(
    &self,
    guild_id: u64,
    members: impl IntoIterator<Item = (u64, Status)>,
  ) {
    let members = members.into_iter().collect();
    self.guilds.write().await.insert(guild_id, members);
  }

  /// Record the live status of one member, announcing the guild if needed.
  pub async fn update(&self, guild_id: u64, member_id: u64, status: Status) {
    self
      .guilds
      .write()
      .await
      .entry(guild_id)
      .or_default()
      .insert(member_id, status);
  }

  /// Every guild with cached members, ascending.
  pub async fn guilds(&self) -> Vec<u64> {
    self.guilds.read().await.keys().copied().collect()
  }
}

impl MemberDirectory for PresenceCache {
  type Error = LookupError;

  async fn members(&self, guild_id: u64) -> Result<Vec<u64>, LookupError> {
    let guilds = self.guilds.read().await;
    let members = guilds.get(&guild_id).ok_or(LookupError::UnknownGuild(guild_id))?;
    Ok(members.keys().copied().collect())
  }

  async fn current_status(
    &self,
    guild_id: u64,
    member_id: u64,
  ) -> Result<Status, LookupError> {
    let guilds = self.guilds.read().await;
    guilds
      .get(&guild_id)
      .ok_or(LookupError::UnknownGuild(guild_id))?
      .get(&member_id)
      .copied()
      .ok_or(LookupError::UnknownMember { guild_id, member_id })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn replace_then_update() {
    let cache = PresenceCache::new();
    cache
      .replace_guild(7, [(2, Status::Idle), (1, Status::Online)])
      .await;
    cache.update(7, 2, Status::Dnd).await;

    assert_eq!(cache.members(7).await.unwrap(), vec![1, 2]);
    assert_eq!(cache.current_status(7, 2).await.unwrap(), Status::Dnd);

    cache.replace_guild(7, [(3, Status::Offline)]).await;
    assert_eq!(cache.members(7).await.unwrap(), vec![3]);
    assert_eq!(
      cache.current_status(7, 1).await,
      Err(LookupError::UnknownMember { guild_id: 7, member_id: 1 })
    );
  }

  #[tokio::test]
  async fn unknown_guilds_fail_lookup() {
    let cache = PresenceCache::new();
    assert_eq!(cache.members(5).await, Err(LookupError::UnknownGuild(5)));

    cache.update(5, 1, Status::Online).await;
    cache.update(4, 1, Status::Online).await;
    assert_eq!(cache.guilds().await, vec![4, 5]);
  }
}
