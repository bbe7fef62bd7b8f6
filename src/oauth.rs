//! OAuth 2.0 client-credentials exchange against a realm's token endpoint.

pub use oauth2;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{
	ClientSecret, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, TokenSecret},
	config::RealmConfig,
	error::{AuthError, ConfigError},
	http::{self, HttpTransport},
};

const GRANT_TYPE: &str = "client_credentials";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Deserialize)]
struct TokenResponse {
	access_token: Option<String>,
}

/// One client-credentials exchange for a realm client identity.
#[derive(Clone, Debug)]
pub struct ClientCredentialsExchange {
	/// Token endpoint URL.
	pub token_endpoint: Url,
	/// Client identity authenticating with its own secret.
	pub client: ClientIdentity,
	/// Audience requested for the token.
	pub audience: String,
	secret: ClientSecret,
}
impl ClientCredentialsExchange {
	/// Prepares the exchange for `client` using the realm's endpoint, audience, and secret.
	pub fn for_client(config: &RealmConfig, client: &ClientIdentity) -> Result<Self> {
		let secret = config.client_secret(client).cloned().ok_or_else(|| {
			ConfigError::MissingClientSecret {
				realm: config.name.to_string(),
				client: client.to_string(),
			}
		})?;

		Ok(Self {
			token_endpoint: config.token_endpoint()?,
			client: client.clone(),
			audience: config.target_audience.clone(),
			secret,
		})
	}

	/// Renders the `Authorization: Basic` header value for the client credentials.
	pub fn basic_authorization(&self) -> String {
		let credentials = format!("{}:{}", self.client, self.secret.secret());

		format!("Basic {}", STANDARD.encode(credentials))
	}

	/// Renders the form body (`grant_type=client_credentials&audience=...`).
	pub fn form_body(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", GRANT_TYPE)
			.append_pair("audience", &self.audience)
			.finish()
	}

	/// Builds the token request.
	pub fn request(&self) -> Result<HttpRequest> {
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.token_endpoint.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.header(AUTHORIZATION, self.basic_authorization())
			.body(self.form_body().into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}

	/// Performs the exchange and returns the issued bearer token.
	pub async fn exchange<C>(&self, transport: &C) -> Result<TokenSecret>
	where
		C: ?Sized + HttpTransport,
	{
		let response = http::execute(transport, self.request()?).await.map_err(AuthError::from)?;

		Ok(parse_token_response(&response)?)
	}
}

/// Extracts `access_token` from a token endpoint response.
pub fn parse_token_response(response: &HttpResponse) -> Result<TokenSecret, AuthError> {
	let status = response.status();

	if !status.is_success() {
		return Err(AuthError::Status {
			status: status.as_u16(),
			body: http::body_preview(response.body()),
		});
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());
	let parsed: TokenResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthError::Parse { source })?;

	parsed
		.access_token
		.filter(|token| !token.is_empty())
		.map(TokenSecret::new)
		.ok_or(AuthError::MissingAccessToken)
}
