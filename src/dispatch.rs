//! Authenticated resource dispatch.
//!
//! [`Dispatcher::send`] turns a [`RequestSpec`] into one HTTP call against
//! `http://<host>:<port>/api/<resource>`, authenticated with the bearer token cached for
//! the resource's client identity. Failures are returned to the caller; nothing is retried.

pub mod resource;

pub use resource::*;

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
// self
use crate::{
	_prelude::*,
	config::{self, MASTER_REALM, RealmConfig, RealmConfigStore, keys},
	error::{ConfigError, DispatchError},
	http::{self, HttpTransport},
	obs::{self, TaskKind, TaskOutcome, TaskSpan},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Header used to tunnel `PATCH` through a `POST`.
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";
/// `User-Agent` sent with body-less requests.
pub const GET_USER_AGENT: &str = "Mozilla/5.0";
/// `Content-Type` for XML resources.
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";
/// `Content-Type` for every other resource.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

const ACCEPT_JSON: &str = "application/json";

#[cfg(feature = "reqwest")]
/// Dispatcher specialized for the crate's default reqwest transport.
pub type ReqwestDispatcher = Dispatcher<ReqwestHttpClient>;

/// Which realm supplies the resource port and bearer token for a dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Routing {
	/// Port and token always come from the `master` realm; only the host follows the target.
	#[default]
	MasterFunneled,
	/// Port and token come from the target realm itself.
	PerRealm,
}

/// Sends authenticated requests built from [`RequestSpec`]s.
pub struct Dispatcher<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every resource request.
	pub transport: Arc<C>,
	/// Realm registry resolving hosts and ports.
	pub realms: Arc<RealmConfigStore>,
	/// Token cache read for bearer credentials.
	pub store: Arc<dyn TokenStore>,
	/// Port/token routing policy.
	pub routing: Routing,
}
impl<C> Dispatcher<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a dispatcher over a caller-provided transport.
	pub fn with_transport(
		realms: Arc<RealmConfigStore>,
		store: Arc<dyn TokenStore>,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self { transport: transport.into(), realms, store, routing: Routing::default() }
	}

	/// Replaces the routing policy.
	pub fn with_routing(mut self, routing: Routing) -> Self {
		self.routing = routing;

		self
	}

	/// Sends one request and returns the response body with each line trimmed and the
	/// lines concatenated.
	pub async fn send(&self, spec: &RequestSpec) -> Result<String> {
		const KIND: TaskKind = TaskKind::Dispatch;

		let span = TaskSpan::new(KIND, "send").with_subject(&spec.realm, &spec.resource);

		obs::record_task_outcome(KIND, TaskOutcome::Attempt);

		let result = span.instrument(self.send_inner(spec)).await;

		match &result {
			Ok(_) => obs::record_task_outcome(KIND, TaskOutcome::Success),
			Err(e) => {
				obs::record_task_outcome(KIND, TaskOutcome::Failure);

				tracing::warn!(
					realm = %spec.realm,
					resource = %spec.resource,
					method = %spec.method,
					error = %e,
					"Dispatch failed."
				);
			},
		}

		result
	}

	/// Builds the wire request for `spec` without sending it.
	pub async fn build_request(&self, spec: &RequestSpec) -> Result<HttpRequest> {
		let target = self.realms.get(&spec.realm).await?;
		let routed = match self.routing {
			Routing::MasterFunneled => self.realms.get(MASTER_REALM).await?,
			Routing::PerRealm => target.clone(),
		};
		let url = resource_url(&target, &routed, spec)?;
		let client = spec.resource.token_key();
		let token = self.store.fetch(&routed.name, client).await?.ok_or_else(|| {
			DispatchError::MissingToken { realm: routed.name.to_string(), client: client.into() }
		})?;
		let bearer = token.access_token.bearer_header()?;
		let content_type =
			if spec.resource.is_xml() { XML_CONTENT_TYPE } else { JSON_CONTENT_TYPE };
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(CONTENT_TYPE, content_type)
			.header(ACCEPT, ACCEPT_JSON)
			.header(AUTHORIZATION, bearer);
		match spec.method {
			HttpMethod::Get =>
				builder = builder.method(Method::GET).header(USER_AGENT, GET_USER_AGENT),
			HttpMethod::Patch =>
				builder = builder.header(METHOD_OVERRIDE_HEADER, HttpMethod::Patch.as_str()),
			HttpMethod::Post => (),
		}

		let body =
			if spec.method.has_body() { spec.payload.clone().into_bytes() } else { Vec::new() };

		Ok(builder.body(body).map_err(ConfigError::from)?)
	}

	async fn send_inner(&self, spec: &RequestSpec) -> Result<String> {
		let request = self.build_request(spec).await?;

		tracing::debug!(
			method = %spec.method,
			uri = %request.uri(),
			bytes = request.body().len(),
			"Dispatching resource request."
		);

		let response = http::execute(self.transport.as_ref(), request)
			.await
			.map_err(DispatchError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(DispatchError::Status {
				status: status.as_u16(),
				body: http::body_preview(response.body()),
			}
			.into());
		}

		let body = String::from_utf8(response.into_body()).map_err(DispatchError::from)?;

		tracing::info!(status = status.as_u16(), "Resource request succeeded.");

		Ok(body.lines().map(str::trim).collect())
	}
}
#[cfg(feature = "reqwest")]
impl Dispatcher<ReqwestHttpClient> {
	/// Creates a dispatcher with a default reqwest transport.
	pub fn new(realms: Arc<RealmConfigStore>, store: Arc<dyn TokenStore>) -> Self {
		Self::with_transport(realms, store, ReqwestHttpClient::default())
	}
}
impl<C> Clone for Dispatcher<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			realms: self.realms.clone(),
			store: self.store.clone(),
			routing: self.routing,
		}
	}
}
impl<C> Debug for Dispatcher<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("realms", &self.realms)
			.field("routing", &self.routing)
			.finish()
	}
}

fn resource_url(target: &RealmConfig, routed: &RealmConfig, spec: &RequestSpec) -> Result<Url> {
	let port = routed.endpoint_port.ok_or_else(|| ConfigError::MissingProperty {
		realm: routed.name.to_string(),
		key: keys::RESOURCE_PORT.into(),
	})?;

	let segments = ["api", spec.resource.as_str()];

	Ok(config::service_url(&target.name, &target.endpoint_host, port, &segments)?)
}
