//! Token refresh cycles: one client-credentials exchange per realm client identity.
//!
//! [`TokenRefresher::refresh_all`] walks every loaded realm and every client identity it
//! declares, exchanging the client's secret for a bearer token and overwriting the cached
//! entry. A failure only affects its own realm/client pair; the previous token (if any)
//! stays cached until a later cycle succeeds.

mod counters;

pub use counters::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::ClientIdentity,
	config::{RealmConfig, RealmConfigStore},
	http::HttpTransport,
	oauth::ClientCredentialsExchange,
	obs::{self, TaskKind, TaskOutcome, TaskSpan},
	store::{CachedToken, StoreKey, TokenStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Refresher specialized for the crate's default reqwest transport.
pub type ReqwestRefresher = TokenRefresher<ReqwestHttpClient>;

/// Outcome of one refresh cycle.
#[derive(Debug, Default)]
pub struct RefreshReport {
	/// Realm/client pairs whose token was replaced.
	pub refreshed: Vec<StoreKey>,
	/// Units that failed during the cycle.
	pub failures: Vec<RefreshFailure>,
}
impl RefreshReport {
	/// Returns `true` when every unit succeeded.
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// One failed unit of a refresh cycle.
#[derive(Debug)]
pub struct RefreshFailure {
	/// Failed realm/client pair; `None` when the realm registry itself could not load.
	pub key: Option<StoreKey>,
	/// Underlying failure.
	pub error: Error,
}

/// Populates the token cache from the realm registry.
pub struct TokenRefresher<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for token endpoint calls.
	pub transport: Arc<C>,
	/// Realm registry supplying endpoints and credentials.
	pub realms: Arc<RealmConfigStore>,
	/// Token cache written after each successful exchange.
	pub store: Arc<dyn TokenStore>,
	/// Shared counters for refresh outcomes.
	pub metrics: Arc<RefreshMetrics>,
}
impl<C> TokenRefresher<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a refresher over a caller-provided transport.
	pub fn with_transport(
		realms: Arc<RealmConfigStore>,
		store: Arc<dyn TokenStore>,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self { transport: transport.into(), realms, store, metrics: Default::default() }
	}

	/// Runs one full cycle over every realm and client identity.
	pub async fn refresh_all(&self) -> RefreshReport {
		let span = TaskSpan::new(TaskKind::Refresh, "refresh_all");
		let report = span.instrument(self.refresh_all_inner()).await;

		self.metrics.record_cycle();

		tracing::info!(
			refreshed = report.refreshed.len(),
			failed = report.failures.len(),
			"Token refresh cycle finished."
		);

		report
	}

	/// Exchanges and caches the token of one client identity.
	pub async fn refresh_client(&self, realm: &RealmConfig, client: &ClientIdentity) -> Result<()> {
		const KIND: TaskKind = TaskKind::Refresh;

		let span = TaskSpan::new(KIND, "refresh_client").with_subject(&realm.name, client);

		obs::record_task_outcome(KIND, TaskOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span
			.instrument(async move {
				let exchange = ClientCredentialsExchange::for_client(realm, client)?;
				let token = exchange.exchange(self.transport.as_ref()).await?;

				self.store.save(StoreKey::new(&realm.name, client), CachedToken::new(token)).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(()) => {
				obs::record_task_outcome(KIND, TaskOutcome::Success);
				self.metrics.record_success();

				tracing::debug!(realm = %realm.name, client = %client, "Token refreshed.");
			},
			Err(e) => {
				obs::record_task_outcome(KIND, TaskOutcome::Failure);
				self.metrics.record_failure();

				tracing::warn!(
					realm = %realm.name,
					client = %client,
					error = %e,
					"Token refresh failed; keeping the previous token."
				);
			},
		}

		result
	}

	async fn refresh_all_inner(&self) -> RefreshReport {
		let mut report = RefreshReport::default();
		let realms = match self.realms.ensure_loaded().await {
			Ok(realms) => realms,
			Err(error) => {
				self.metrics.record_failure();

				tracing::warn!(error = %error, "Realm configuration unavailable; skipping cycle.");

				report.failures.push(RefreshFailure { key: None, error });

				return report;
			},
		};

		for realm in realms.values() {
			for client in &realm.client_identities {
				let key = StoreKey::new(&realm.name, client);

				match self.refresh_client(realm, client).await {
					Ok(()) => report.refreshed.push(key),
					Err(error) => report.failures.push(RefreshFailure { key: Some(key), error }),
				}
			}
		}

		report
	}
}
#[cfg(feature = "reqwest")]
impl TokenRefresher<ReqwestHttpClient> {
	/// Creates a refresher with a default reqwest transport.
	pub fn new(realms: Arc<RealmConfigStore>, store: Arc<dyn TokenStore>) -> Self {
		Self::with_transport(realms, store, ReqwestHttpClient::default())
	}
}
impl<C> Clone for TokenRefresher<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			realms: self.realms.clone(),
			store: self.store.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<C> Debug for TokenRefresher<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRefresher")
			.field("realms", &self.realms)
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{RecordingTransport, realm_properties, realm_store},
		error::AuthError,
		store::MemoryStore,
	};

	fn refresher() -> (TokenRefresher<RecordingTransport>, RecordingTransport, Arc<MemoryStore>) {
		let realms = realm_store([
			(
				"edge",
				realm_properties(
					("edge-host", None),
					("keycloak", 8180),
					"edge",
					"backend",
					&[("VSAS", "s3")],
				),
			),
			(
				"master",
				realm_properties(
					("backend", Some(8080)),
					("keycloak", 8180),
					"teamaware",
					"backend",
					&[("ADS", "s1"), ("VSAS", "s2")],
				),
			),
		]);
		let store = Arc::new(MemoryStore::default());
		let transport = RecordingTransport::default();

		(TokenRefresher::with_transport(realms, store.clone(), transport.clone()), transport, store)
	}

	#[tokio::test]
	async fn refresh_all_populates_every_client() {
		let (refresher, transport, store) = refresher();

		transport
			.respond(200, "{\"access_token\":\"edge-vsas\"}")
			.respond(200, "{\"access_token\":\"master-ads\"}")
			.respond(200, "{\"access_token\":\"master-vsas\"}");

		let report = refresher.refresh_all().await;

		assert!(report.is_clean());
		assert_eq!(report.refreshed.len(), 3);

		let master = store.snapshot("master").await.expect("Snapshot should succeed.");

		assert_eq!(master.len(), 2);
		assert_eq!(master["ADS"].access_token.expose(), "master-ads");
		assert_eq!(master["VSAS"].access_token.expose(), "master-vsas");
		assert_eq!(
			transport.requests()[0].uri().to_string(),
			"http://keycloak:8180/auth/realms/edge/protocol/openid-connect/token"
		);
		assert_eq!(refresher.metrics.cycles(), 1);
		assert_eq!(refresher.metrics.successes(), 3);
	}

	#[tokio::test]
	async fn one_failing_client_does_not_stop_the_cycle() {
		let (refresher, transport, store) = refresher();

		transport
			.respond(200, "{\"access_token\":\"edge-vsas\"}")
			.respond(401, "{\"error\":\"unauthorized_client\"}")
			.respond(200, "{\"access_token\":\"master-vsas\"}");

		let report = refresher.refresh_all().await;

		assert_eq!(report.refreshed.len(), 2);
		assert_eq!(report.failures.len(), 1);

		let failure = &report.failures[0];

		assert_eq!(failure.key.as_ref().map(ToString::to_string).as_deref(), Some("master/ADS"));
		assert!(matches!(failure.error, Error::Auth(AuthError::Status { status: 401, .. })));
		assert!(store.fetch("master", "ADS").await.expect("Fetch should succeed.").is_none());
		assert!(store.fetch("master", "VSAS").await.expect("Fetch should succeed.").is_some());
		assert_eq!(refresher.metrics.failures(), 1);
	}

	#[tokio::test]
	async fn failed_exchange_keeps_previous_token() {
		let (refresher, transport, store) = refresher();

		transport
			.respond(200, "{\"access_token\":\"first\"}")
			.respond(200, "{\"access_token\":\"a\"}")
			.respond(200, "{\"access_token\":\"b\"}")
			.respond(500, "down")
			.respond(200, "{}")
			.respond(200, "{\"access_token\":\"b2\"}");

		refresher.refresh_all().await;

		let report = refresher.refresh_all().await;

		assert_eq!(report.failures.len(), 2);

		let edge = store.fetch("edge", "VSAS").await.expect("Fetch should succeed.");
		let ads = store.fetch("master", "ADS").await.expect("Fetch should succeed.");
		let vsas = store.fetch("master", "VSAS").await.expect("Fetch should succeed.");

		assert_eq!(edge.map(|t| t.access_token.expose().to_owned()).as_deref(), Some("first"));
		assert_eq!(ads.map(|t| t.access_token.expose().to_owned()).as_deref(), Some("a"));
		assert_eq!(vsas.map(|t| t.access_token.expose().to_owned()).as_deref(), Some("b2"));
	}
}
