//! Load-once realm configuration store shared by the refresher and dispatcher.

// crates.io
use async_lock::OnceCell;
// self
use crate::{
	_prelude::*,
	auth::RealmName,
	config::{RealmConfig, RealmSource},
	error::ConfigError,
};

type RealmMap = BTreeMap<RealmName, Arc<RealmConfig>>;

/// Read-only realm registry populated exactly once from a [`RealmSource`].
///
/// Concurrent first callers of [`ensure_loaded`](Self::ensure_loaded) share a single load.
/// Realms whose properties fail validation are logged and skipped; a failure of the source
/// itself leaves the store empty so the next call retries.
pub struct RealmConfigStore {
	source: Arc<dyn RealmSource>,
	realms: OnceCell<RealmMap>,
}
impl RealmConfigStore {
	/// Creates an unloaded store reading from `source`.
	pub fn new(source: impl 'static + RealmSource) -> Self {
		Self::with_source(Arc::new(source))
	}

	/// Creates an unloaded store from a shared source handle.
	pub fn with_source(source: Arc<dyn RealmSource>) -> Self {
		Self { source, realms: OnceCell::new() }
	}

	/// Returns `true` once the realms have been loaded.
	pub fn is_loaded(&self) -> bool {
		self.realms.is_initialized()
	}

	/// Loads the realms if that has not happened yet and returns them.
	pub async fn ensure_loaded(&self) -> Result<&BTreeMap<RealmName, Arc<RealmConfig>>> {
		let realms = self.realms.get_or_try_init(|| self.load()).await?;

		Ok(realms)
	}

	/// Looks up a realm, loading the store first when needed.
	pub async fn get(&self, realm: &str) -> Result<Arc<RealmConfig>> {
		self.ensure_loaded()
			.await?
			.get(realm)
			.cloned()
			.ok_or_else(|| ConfigError::UnknownRealm { realm: realm.into() }.into())
	}

	/// Returns the loaded realm names in order, loading the store first when needed.
	pub async fn realm_names(&self) -> Result<Vec<RealmName>> {
		Ok(self.ensure_loaded().await?.keys().cloned().collect())
	}

	async fn load(&self) -> Result<RealmMap> {
		let snapshot = self.source.load().await?;
		let mut realms = RealmMap::new();

		for (name, props) in snapshot {
			let parsed = RealmName::new(&name)
				.map_err(ConfigError::from)
				.and_then(|realm| RealmConfig::from_properties(realm, &props));

			match parsed {
				Ok(config) => {
					tracing::debug!(
						realm = %config.name,
						clients = config.client_identities.len(),
						"Realm configuration accepted."
					);

					realms.insert(config.name.clone(), Arc::new(config));
				},
				Err(e) => {
					tracing::warn!(realm = %name, error = %e, "Skipping misconfigured realm.");
				},
			}
		}

		tracing::info!(realms = realms.len(), "Realm configuration loaded.");

		Ok(realms)
	}
}
impl Debug for RealmConfigStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RealmConfigStore").field("realms", &self.realms.get()).finish()
	}
}
