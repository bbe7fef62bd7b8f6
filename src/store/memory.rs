//! Thread-safe in-memory [`TokenStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, RealmName},
	store::{CachedToken, StoreFuture, StoreKey, TokenStore},
};

type TokenMap = Arc<RwLock<HashMap<RealmName, HashMap<ClientIdentity, CachedToken>>>>;

/// Token cache that keeps tokens in-process for the lifetime of the program.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(TokenMap);
impl MemoryStore {
	fn save_now(map: TokenMap, key: StoreKey, token: CachedToken) {
		map.write().entry(key.realm).or_default().insert(key.client, token);
	}

	fn fetch_now(map: TokenMap, realm: &str, client: &str) -> Option<CachedToken> {
		map.read().get(realm).and_then(|tokens| tokens.get(client)).cloned()
	}

	fn snapshot_now(map: TokenMap, realm: &str) -> BTreeMap<ClientIdentity, CachedToken> {
		map.read()
			.get(realm)
			.map(|tokens| tokens.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
			.unwrap_or_default()
	}
}
impl TokenStore for MemoryStore {
	fn save(&self, key: StoreKey, token: CachedToken) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::save_now(map, key, token);

			Ok(())
		})
	}

	fn fetch<'a>(
		&'a self,
		realm: &'a str,
		client: &'a str,
	) -> StoreFuture<'a, Option<CachedToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::fetch_now(map, realm, client)) })
	}

	fn snapshot<'a>(
		&'a self,
		realm: &'a str,
	) -> StoreFuture<'a, BTreeMap<ClientIdentity, CachedToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::snapshot_now(map, realm)) })
	}
}
