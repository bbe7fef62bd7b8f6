//! Bearer token issued by a realm's token endpoint.

// crates.io
use oauth2::http::HeaderValue;
// self
use crate::{_prelude::*, error::DispatchError};

/// Opaque access token. Formatting never reveals the value; only its length is shown.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token string as issued.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw token value for callers that must put it on the wire.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds a sensitive `Authorization: Bearer <token>` header value.
	///
	/// Fails when the token contains bytes that cannot appear in a header.
	pub fn bearer_header(&self) -> Result<HeaderValue, DispatchError> {
		let mut value = HeaderValue::try_from(format!("Bearer {}", self.0))
			.map_err(|_| DispatchError::MalformedToken { len: self.0.len() })?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret(<{} bytes>)", self.0.len())
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatting_hides_the_token() {
		let token = TokenSecret::new("abc123");

		assert_eq!(format!("{token:?}"), "TokenSecret(<6 bytes>)");
		assert_eq!(token.to_string(), "<redacted>");
	}

	#[test]
	fn bearer_header_is_sensitive() {
		let header =
			TokenSecret::new("abc123").bearer_header().expect("Token should be header-safe.");

		assert_eq!(header.as_bytes(), b"Bearer abc123");
		assert!(header.is_sensitive());
		assert!(matches!(
			TokenSecret::new("line\nbreak").bearer_header(),
			Err(DispatchError::MalformedToken { len: 10 })
		));
	}
}
