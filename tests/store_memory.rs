// self
use realm_dispatch::{
	_preludet::*,
	auth::{ClientIdentity, RealmName, TokenSecret},
	store::{CachedToken, MemoryStore, StoreKey, TokenStore},
};

fn key(realm: &str, client: &str) -> StoreKey {
	StoreKey::new(
		&RealmName::new(realm).expect("Realm fixture should be valid."),
		&ClientIdentity::new(client).expect("Client fixture should be valid."),
	)
}

#[tokio::test]
async fn save_overwrites_per_client() {
	let store = MemoryStore::default();

	store
		.save(key("master", "ADS"), CachedToken::new(TokenSecret::new("old")))
		.await
		.expect("First save should succeed.");
	store
		.save(key("master", "ADS"), CachedToken::new(TokenSecret::new("new")))
		.await
		.expect("Second save should succeed.");

	let fetched = store
		.fetch("master", "ADS")
		.await
		.expect("Fetch should succeed.")
		.expect("Token should be cached.");

	assert_eq!(fetched.access_token.expose(), "new");
}

#[tokio::test]
async fn realms_are_isolated() {
	let store = MemoryStore::default();

	store
		.save(key("master", "VSAS"), CachedToken::new(TokenSecret::new("m")))
		.await
		.expect("Save should succeed.");
	store
		.save(key("edge", "VSAS"), CachedToken::new(TokenSecret::new("e")))
		.await
		.expect("Save should succeed.");

	let master = store.snapshot("master").await.expect("Snapshot should succeed.");
	let unknown = store.snapshot("nowhere").await.expect("Snapshot should succeed.");

	assert_eq!(master.len(), 1);
	assert_eq!(master["VSAS"].access_token.expose(), "m");
	assert!(unknown.is_empty());
	assert!(store.fetch("edge", "ADS").await.expect("Fetch should succeed.").is_none());
}

#[tokio::test]
async fn concurrent_writers_and_readers_agree() {
	let store = Arc::new(MemoryStore::default());
	let writers = (0..8).map(|i| {
		let store = store.clone();

		tokio::spawn(async move {
			store
				.save(
					key("master", &format!("client-{i}")),
					CachedToken::new(TokenSecret::new("t")),
				)
				.await
		})
	});

	for writer in writers.collect::<Vec<_>>() {
		writer.await.expect("Writer task should join.").expect("Save should succeed.");
	}

	assert_eq!(store.snapshot("master").await.expect("Snapshot should succeed.").len(), 8);
}
