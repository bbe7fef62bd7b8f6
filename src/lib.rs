//! Scheduled multi-realm REST dispatcher: keeps OAuth 2.0 client-credential tokens fresh for
//! every configured realm and sends bearer-authenticated requests on a fixed cadence.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod producer;
pub mod refresher;
pub mod schedule;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and fixtures shared by unit and integration tests.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode};
	// self
	use crate::{
		config::{RealmConfigStore, RealmProperties, StaticRealmSource, keys},
		dispatch::Dispatcher,
		http::{HttpTransport, ReqwestHttpClient},
		refresher::TokenRefresher,
		store::{MemoryStore, TokenStore},
	};

	/// Refresher type alias used by reqwest-backed integration tests.
	pub type ReqwestTestRefresher = TokenRefresher<ReqwestHttpClient>;
	/// Dispatcher type alias used by reqwest-backed integration tests.
	pub type ReqwestTestDispatcher = Dispatcher<ReqwestHttpClient>;

	/// Builds a flat realm property set pointing both the resource and authorization endpoints at
	/// the provided hosts.
	pub fn realm_properties(
		resource: (&str, Option<u16>),
		auth: (&str, u16),
		realm_id: &str,
		audience: &str,
		clients: &[(&str, &str)],
	) -> RealmProperties {
		let mut props = RealmProperties::new();

		props.insert(keys::RESOURCE_ENDPOINT.into(), resource.0.into());

		if let Some(port) = resource.1 {
			props.insert(keys::RESOURCE_PORT.into(), port.to_string());
		}

		props.insert(keys::AUTH_ENDPOINT.into(), auth.0.into());
		props.insert(keys::AUTH_PORT.into(), auth.1.to_string());
		props.insert(keys::REALM_ID.into(), realm_id.into());
		props.insert(keys::TARGET_CLIENT.into(), audience.into());
		props.insert(
			keys::REALM_CLIENTS.into(),
			clients.iter().map(|(id, _)| *id).collect::<Vec<_>>().join(";"),
		);

		for (id, secret) in clients {
			props.insert(keys::client_secret(id), (*secret).into());
		}

		props
	}

	/// Wraps the provided realm property sets into a lazily loaded configuration store.
	pub fn realm_store<'a, I>(realms: I) -> Arc<RealmConfigStore>
	where
		I: IntoIterator<Item = (&'a str, RealmProperties)>,
	{
		let source = StaticRealmSource::from_iter(
			realms.into_iter().map(|(name, props)| (name.to_owned(), props)),
		);

		Arc::new(RealmConfigStore::new(source))
	}

	/// Constructs a refresher + dispatcher pair backed by one in-memory token store and the
	/// default reqwest transport.
	pub fn build_reqwest_test_pair(
		realms: Arc<RealmConfigStore>,
	) -> (ReqwestTestRefresher, ReqwestTestDispatcher, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let transport = Arc::new(ReqwestHttpClient::default());
		let refresher =
			TokenRefresher::with_transport(realms.clone(), store.clone(), transport.clone());
		let dispatcher = Dispatcher::with_transport(realms, store, transport);

		(refresher, dispatcher, store_backend)
	}

	/// In-process transport that records every request and replays queued responses.
	///
	/// When the queue runs dry the transport answers `200` with an empty JSON object.
	#[derive(Clone, Debug, Default)]
	pub struct RecordingTransport {
		requests: Arc<Mutex<Vec<HttpRequest>>>,
		responses: Arc<Mutex<VecDeque<(u16, Vec<u8>)>>>,
	}
	impl RecordingTransport {
		/// Queues a response that will be returned to the next request.
		pub fn respond(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
			self.responses.lock().push_back((status, body.into()));

			self
		}

		/// Returns a clone of every request observed so far.
		pub fn requests(&self) -> Vec<HttpRequest> {
			self.requests.lock().clone()
		}
	}
	impl HttpTransport for RecordingTransport {
		type Handle = RecordingHandle;
		type TransportError = std::io::Error;

		fn handle(&self) -> Self::Handle {
			RecordingHandle(self.clone())
		}
	}

	/// Handle returned by [`RecordingTransport`].
	pub struct RecordingHandle(RecordingTransport);
	impl<'c> AsyncHttpClient<'c> for RecordingHandle {
		type Error = HttpClientError<std::io::Error>;
		type Future =
			Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			let transport = self.0.clone();

			Box::pin(async move {
				transport.requests.lock().push(request);

				let (status, body) =
					transport.responses.lock().pop_front().unwrap_or((200, b"{}".to_vec()));
				let mut response = HttpResponse::new(body);

				*response.status_mut() = StatusCode::from_u16(status)
					.map_err(|e| HttpClientError::Other(e.to_string()))?;

				Ok(response)
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "cli")] use {clap as _, color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {color_eyre as _, httpmock as _};
