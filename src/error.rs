//! Crate-level error types shared by the realm store, refresher, and dispatcher.

// crates.io
use oauth2::HttpClientError;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Missing or malformed realm configuration.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Client-credentials exchange failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Resource request failed.
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	/// A payload producer could not render its observation.
	#[error(transparent)]
	Produce(#[from] ProduceError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Realm, client, or resource identifier is invalid.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// A URL assembled from realm properties cannot be parsed.
	#[error("Realm `{realm}` produces an invalid URL: {url}.")]
	InvalidUrl {
		/// Realm the URL was built for.
		realm: String,
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// No realm with the requested name is configured.
	#[error("Realm `{realm}` is not configured.")]
	UnknownRealm {
		/// Requested realm name.
		realm: String,
	},
	/// A required realm property is absent or blank.
	#[error("Realm `{realm}` is missing the `{key}` property.")]
	MissingProperty {
		/// Realm being parsed.
		realm: String,
		/// Property key.
		key: String,
	},
	/// A port property is not a valid TCP port.
	#[error("Realm `{realm}` has an invalid `{key}` value: {value}.")]
	InvalidPort {
		/// Realm being parsed.
		realm: String,
		/// Property key.
		key: &'static str,
		/// Raw property value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: std::num::ParseIntError,
	},
	/// A listed client identity has no secret.
	#[error("Realm `{realm}` lists client `{client}` without a `{client}.client.secret` property.")]
	MissingClientSecret {
		/// Realm being parsed.
		realm: String,
		/// Client identity lacking a secret.
		client: String,
	},
	/// The realm source could not be read.
	#[error("Realm source could not be read: {message}.")]
	Source {
		/// Human-readable failure description.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Client-credentials exchange failures; the affected token stays stale until the next cycle.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The token endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The token endpoint answered with a non-success status.
	#[error("Token endpoint returned HTTP {status}: {body}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// The token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// The token endpoint response carried no `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
}

/// Resource request failures; reported to the caller, never retried.
#[derive(Debug, ThisError)]
pub enum DispatchError {
	/// The resource server could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The resource server answered with a non-success status.
	#[error("Resource endpoint returned HTTP {status}: {body}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// The response body is not valid UTF-8.
	#[error("Resource endpoint returned a body that is not valid UTF-8.")]
	Encoding(#[from] std::string::FromUtf8Error),
	/// No bearer token has been cached for the resource's client identity yet.
	#[error("No bearer token is cached for client `{client}` in realm `{realm}`.")]
	MissingToken {
		/// Realm the token was looked up in.
		realm: String,
		/// Client identity derived from the resource name.
		client: String,
	},
	/// The cached token cannot be carried in an `Authorization` header.
	#[error("Cached bearer token ({len} bytes) is not a valid header value.")]
	MalformedToken {
		/// Token length in bytes.
		len: usize,
	},
	/// The logical method is not one of GET, POST, or PATCH.
	#[error("HTTP method `{method}` is not supported.")]
	UnsupportedMethod {
		/// Method text as supplied.
		method: String,
	},
}

/// Payload rendering failures; the tick is skipped and nothing is sent.
#[derive(Debug, ThisError)]
pub enum ProduceError {
	/// The observation timestamp could not be formatted.
	#[error("Observation timestamp could not be formatted.")]
	Timestamp(#[from] time::error::Format),
	/// The observation could not be serialized.
	#[error("Observation could not be serialized.")]
	Serialize(#[from] serde_json::Error),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
	/// Request could not be converted for the transport.
	#[error(transparent)]
	Request(#[from] oauth2::http::Error),
	/// Transport-specific failure without a structured source.
	#[error("HTTP client error occurred while sending the request: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Flattens an [`HttpClientError`] emitted by an `AsyncHttpClient` handle.
	pub fn from_client_error<E>(err: HttpClientError<E>) -> Self
	where
		E: 'static + Send + Sync + StdError,
	{
		match err {
			HttpClientError::Reqwest(inner) => Self::network(*inner),
			HttpClientError::Http(inner) => Self::Request(inner),
			HttpClientError::Io(inner) => Self::Io(inner),
			HttpClientError::Other(message) => Self::Other { message },
			_ => Self::Other { message: "unclassified transport failure".into() },
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn client_errors_keep_their_category() {
		let io = TransportError::from_client_error(HttpClientError::<std::io::Error>::Io(
			std::io::Error::other("connection reset"),
		));

		assert!(matches!(io, TransportError::Io(_)));

		let other = TransportError::from_client_error(
			HttpClientError::<std::io::Error>::Other("boom".into()),
		);

		assert!(other.to_string().contains("boom"));
	}

	#[test]
	fn dispatch_errors_convert_into_crate_error_with_source() {
		let error: Error = DispatchError::from(TransportError::Io(std::io::Error::other(
			"connection refused",
		)))
		.into();

		assert!(matches!(error, Error::Dispatch(DispatchError::Transport(_))));
		assert!(StdError::source(&error).is_some());
	}
}
