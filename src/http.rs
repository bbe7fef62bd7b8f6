//! Transport primitives shared by the token exchange and the resource dispatcher.
//!
//! Every outbound request is an [`HttpRequest`] handed to an [`AsyncHttpClient`] handle
//! obtained from a [`HttpTransport`]. The crate ships [`ReqwestHttpClient`]; tests and
//! embedders can plug in any other client by implementing the trait.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::TransportError};

/// Abstraction over HTTP stacks capable of executing both token exchanges and resource
/// requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// refresher and dispatcher tasks. Handles must own whatever state their request futures
/// need so those futures remain `Send` across executor hops.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Executes `request` on a fresh handle, flattening transport failures.
pub(crate) async fn execute<C>(
	transport: &C,
	request: HttpRequest,
) -> Result<HttpResponse, TransportError>
where
	C: ?Sized + HttpTransport,
{
	let handle = transport.handle();

	handle.call(request).await.map_err(TransportError::from_client_error)
}

/// Renders at most a short, lossy UTF-8 preview of a response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
	const BODY_PREVIEW_LIMIT: usize = 256;

	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Neither the token endpoint nor the resource API is expected to redirect, so clients
/// built by [`ReqwestHttpClient::with_timeout`] disable redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with an optional per-request timeout.
	pub fn with_timeout(
		timeout: Option<std::time::Duration>,
	) -> Result<Self, crate::error::ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`HttpTransport`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_long_bodies() {
		assert_eq!(
			body_preview(b"{\"error\":\"invalid_client\"}"),
			"{\"error\":\"invalid_client\"}"
		);

		let preview = body_preview("x".repeat(300).as_bytes());

		assert_eq!(preview.chars().count(), 257);
		assert!(preview.ends_with('…'));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn timeout_client_builds() {
		assert!(ReqwestHttpClient::with_timeout(Some(std::time::Duration::from_secs(5))).is_ok());
		assert!(ReqwestHttpClient::with_timeout(None).is_ok());
	}
}
