//! Token cache contract and the built-in in-memory implementation.
//!
//! The cache maps realm → client identity → most recent bearer token. Entries are only
//! ever overwritten; nothing expires on its own.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, RealmName, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage contract shared by the refresher (writer) and dispatcher (reader).
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Stores or replaces the token for `key`.
	fn save(&self, key: StoreKey, token: CachedToken) -> StoreFuture<'_, ()>;

	/// Fetches the token cached for a realm/client pair, if present.
	fn fetch<'a>(&'a self, realm: &'a str, client: &'a str)
	-> StoreFuture<'a, Option<CachedToken>>;

	/// Returns every token cached for a realm.
	fn snapshot<'a>(
		&'a self,
		realm: &'a str,
	) -> StoreFuture<'a, BTreeMap<ClientIdentity, CachedToken>>;
}

/// Bearer token plus the instant it was obtained.
///
/// `obtained_at` is informational only; tokens are replaced by the next refresh cycle and
/// never evicted by age.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Opaque bearer token.
	pub access_token: TokenSecret,
	/// When the token endpoint issued this token.
	pub obtained_at: OffsetDateTime,
}
impl CachedToken {
	/// Wraps a freshly obtained token stamped with the current UTC time.
	pub fn new(access_token: TokenSecret) -> Self {
		Self { access_token, obtained_at: OffsetDateTime::now_utc() }
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a cached token.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Realm the token belongs to.
	pub realm: RealmName,
	/// Client identity the token was issued to.
	pub client: ClientIdentity,
}
impl StoreKey {
	/// Builds a key for the provided realm/client pair.
	pub fn new(realm: &RealmName, client: &ClientIdentity) -> Self {
		Self { realm: realm.clone(), client: client.clone() }
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.realm, self.client)
	}
}
