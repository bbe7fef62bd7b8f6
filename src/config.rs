//! Realm configuration: validated per-realm connection and credential parameters.
//!
//! Realms arrive as flat key-value property sets (see [`keys`]) from a [`RealmSource`].
//! [`RealmConfig::from_properties`] validates one set; [`RealmConfigStore`] loads every
//! realm exactly once and serves read-only lookups afterwards.

pub mod properties;
pub mod source;
pub mod store;

pub use properties::*;
pub use source::*;
pub use store::*;

// crates.io
use oauth2::ClientSecret;
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, RealmName},
	error::ConfigError,
};

/// Realm whose resource port and token set every dispatch is funneled through by default.
pub const MASTER_REALM: &str = "master";

/// Flat property set describing a single realm.
pub type RealmProperties = BTreeMap<String, String>;

/// Property keys understood by [`RealmConfig::from_properties`].
pub mod keys {
	/// Resource-server host.
	pub const RESOURCE_ENDPOINT: &str = "resource.endpoint";
	/// Resource-server port; only read from the master realm unless per-realm routing is on.
	pub const RESOURCE_PORT: &str = "resource.port";
	/// Authorization-server host.
	pub const AUTH_ENDPOINT: &str = "keycloak.endpoint";
	/// Authorization-server port.
	pub const AUTH_PORT: &str = "keycloak.port";
	/// Realm identifier used in the token endpoint path.
	pub const REALM_ID: &str = "realm.id";
	/// Semicolon-separated client identities needing their own token.
	pub const REALM_CLIENTS: &str = "realm.clients";
	/// Audience requested for every token of the realm.
	pub const TARGET_CLIENT: &str = "target.client.id";

	/// Returns the secret key for a client identity (`<client>.client.secret`).
	pub fn client_secret(client: &str) -> String {
		format!("{client}.client.secret")
	}
}

/// Validated connection and credential parameters for one realm.
#[derive(Clone, Debug)]
pub struct RealmConfig {
	/// Realm name (configuration key).
	pub name: RealmName,
	/// Resource-server host.
	pub endpoint_host: String,
	/// Resource-server port, when the realm declares one.
	pub endpoint_port: Option<u16>,
	/// Authorization-server host.
	pub auth_host: String,
	/// Authorization-server port.
	pub auth_port: u16,
	/// Realm identifier on the authorization server.
	pub realm_id: String,
	/// Client identity the obtained tokens are scoped to access.
	pub target_audience: String,
	/// Ordered client identities that each need their own token.
	pub client_identities: Vec<ClientIdentity>,
	client_secrets: BTreeMap<ClientIdentity, ClientSecret>,
}
impl RealmConfig {
	/// Validates a flat property set into a realm configuration.
	///
	/// Every listed client must have a `<client>.client.secret` entry; ports must be valid
	/// `u16` values. `resource.port` is optional here because only the routing realm's port
	/// is read at dispatch time.
	pub fn from_properties(
		name: RealmName,
		props: &RealmProperties,
	) -> Result<Self, ConfigError> {
		let endpoint_host = required(&name, props, keys::RESOURCE_ENDPOINT)?.to_owned();
		let endpoint_port = optional(props, keys::RESOURCE_PORT)
			.map(|raw| parse_port(&name, keys::RESOURCE_PORT, raw))
			.transpose()?;
		let auth_host = required(&name, props, keys::AUTH_ENDPOINT)?.to_owned();
		let auth_port =
			parse_port(&name, keys::AUTH_PORT, required(&name, props, keys::AUTH_PORT)?)?;
		let realm_id = required(&name, props, keys::REALM_ID)?.to_owned();
		let target_audience = required(&name, props, keys::TARGET_CLIENT)?.to_owned();
		let clients = props.get(keys::REALM_CLIENTS).ok_or_else(|| {
			ConfigError::MissingProperty {
				realm: name.to_string(),
				key: keys::REALM_CLIENTS.into(),
			}
		})?;
		let mut client_identities = Vec::new();
		let mut client_secrets = BTreeMap::new();

		for raw in clients.split(';').map(str::trim).filter(|raw| !raw.is_empty()) {
			let client = ClientIdentity::new(raw)?;

			if client_secrets.contains_key(&client) {
				continue;
			}

			let secret = optional(props, &keys::client_secret(raw)).ok_or_else(|| {
				ConfigError::MissingClientSecret { realm: name.to_string(), client: raw.into() }
			})?;

			client_secrets.insert(client.clone(), ClientSecret::new(secret.to_owned()));
			client_identities.push(client);
		}

		Ok(Self {
			name,
			endpoint_host,
			endpoint_port,
			auth_host,
			auth_port,
			realm_id,
			target_audience,
			client_identities,
			client_secrets,
		})
	}

	/// Returns the shared secret of a client identity declared by this realm.
	pub fn client_secret(&self, client: &str) -> Option<&ClientSecret> {
		self.client_secrets.get(client)
	}

	/// Builds the realm's OAuth 2.0 token endpoint URL.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		service_url(
			&self.name,
			&self.auth_host,
			self.auth_port,
			&["auth", "realms", self.realm_id.as_str(), "protocol", "openid-connect", "token"],
		)
	}
}

/// Builds `http://host:port/` and appends `segments` as percent-encoded path segments.
///
/// A host that smuggles in a path, query, or fragment is rejected.
pub(crate) fn service_url(
	realm: &RealmName,
	host: &str,
	port: u16,
	segments: &[&str],
) -> Result<Url, ConfigError> {
	let base = format!("http://{host}:{port}/");
	let invalid = |source| ConfigError::InvalidUrl {
		realm: realm.to_string(),
		url: base.clone(),
		source,
	};
	let mut url = Url::parse(&base).map_err(invalid)?;

	if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
		return Err(invalid(url::ParseError::InvalidDomainCharacter));
	}

	url.path_segments_mut()
		.map_err(|()| invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

fn optional<'a>(props: &'a RealmProperties, key: &str) -> Option<&'a str> {
	props.get(key).map(|value| value.trim()).filter(|value| !value.is_empty())
}

fn required<'a>(
	realm: &RealmName,
	props: &'a RealmProperties,
	key: &str,
) -> Result<&'a str, ConfigError> {
	optional(props, key)
		.ok_or_else(|| ConfigError::MissingProperty { realm: realm.to_string(), key: key.into() })
}

fn parse_port(realm: &RealmName, key: &'static str, raw: &str) -> Result<u16, ConfigError> {
	raw.parse::<u16>().map_err(|source| ConfigError::InvalidPort {
		realm: realm.to_string(),
		key,
		value: raw.into(),
		source,
	})
}
