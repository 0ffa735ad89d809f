//! Time-boxed cache for the shared upstream client handle.
//!
//! One handle serves every concurrent request until its TTL lapses or the configuration
//! changes. Readers take the fast path under a shared lock; a miss escalates to an upgradable
//! read so at most one caller constructs a replacement while the rest wait for it.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use async_lock::RwLockUpgradableReadGuard;
// self
use crate::{_prelude::*, config::ConfigEntry, error::ConfigError, upstream::AccessTokenApi};

/// Lifetime of a cached client handle.
pub const CLIENT_TTL: Duration = Duration::minutes(30);

/// Builds upstream handles from the stored configuration.
pub trait ClientFactory
where
	Self: Send + Sync,
{
	/// Constructs a new handle; fails when the configuration cannot produce one.
	fn build(&self, config: &ConfigEntry) -> Result<Arc<dyn AccessTokenApi>, ConfigError>;
}

/// Handle plus the instant after which it must not be used.
#[derive(Clone, Debug)]
pub struct CachedClient {
	/// Shared upstream handle.
	pub handle: Arc<dyn AccessTokenApi>,
	/// End of the handle's validity window.
	pub expires_at: OffsetDateTime,
}
impl CachedClient {
	/// Returns `true` when the handle may still serve requests at `now`.
	pub fn is_live_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at && self.handle.is_live()
	}
}

/// State of the shared slot.
#[derive(Clone, Debug, Default)]
pub enum Slot {
	/// Nothing cached; the next request builds a handle.
	#[default]
	Empty,
	/// A handle valid until its `expires_at`.
	Live(CachedClient),
}
impl Slot {
	/// Returns the cached handle when it is still live at `now`.
	pub fn live_at(&self, now: OffsetDateTime) -> Option<&CachedClient> {
		match self {
			Slot::Live(cached) if cached.is_live_at(now) => Some(cached),
			_ => None,
		}
	}
}

/// Single-slot cache guarding the shared handle.
#[derive(Debug)]
pub struct ClientCache {
	slot: AsyncRwLock<Slot>,
	ttl: Duration,
	builds: AtomicU64,
}
impl ClientCache {
	/// Creates an empty cache whose handles live for `ttl`.
	pub fn new(ttl: Duration) -> Self {
		Self { slot: AsyncRwLock::new(Slot::Empty), ttl, builds: AtomicU64::new(0) }
	}

	/// Lifetime assigned to newly built handles.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Number of handles stored so far.
	pub fn builds(&self) -> u64 {
		self.builds.load(Ordering::Relaxed)
	}

	/// Returns `true` while a live handle is cached.
	pub async fn is_live(&self) -> bool {
		let now = OffsetDateTime::now_utc();

		self.slot.read().await.live_at(now).is_some()
	}

	/// Returns the cached handle, running `load` to replace it when absent or expired.
	///
	/// A failed load clears a stale slot and is returned to the caller; nothing is cached.
	pub async fn get_or_build<F, Fut>(&self, load: F) -> Result<Arc<dyn AccessTokenApi>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Arc<dyn AccessTokenApi>>>,
	{
		{
			let now = OffsetDateTime::now_utc();
			let guard = self.slot.read().await;

			if let Some(cached) = guard.live_at(now) {
				return Ok(cached.handle.clone());
			}
		}

		let guard = self.slot.upgradable_read().await;

		// Another caller may have rebuilt the handle while this one waited.
		if let Some(cached) = guard.live_at(OffsetDateTime::now_utc()) {
			return Ok(cached.handle.clone());
		}

		match load().await {
			Ok(handle) => {
				let mut slot = RwLockUpgradableReadGuard::upgrade(guard).await;

				*slot = Slot::Live(CachedClient {
					handle: handle.clone(),
					expires_at: OffsetDateTime::now_utc() + self.ttl,
				});
				self.builds.fetch_add(1, Ordering::Relaxed);

				Ok(handle)
			},
			Err(e) => {
				if matches!(*guard, Slot::Live(_)) {
					*RwLockUpgradableReadGuard::upgrade(guard).await = Slot::Empty;
				}

				Err(e)
			},
		}
	}

	/// Drops the cached handle so the next request rebuilds it.
	pub async fn invalidate(&self) {
		*self.slot.write().await = Slot::Empty;
	}
}
impl Default for ClientCache {
	fn default() -> Self {
		Self::new(CLIENT_TTL)
	}
}
