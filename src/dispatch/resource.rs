//! Request vocabulary: logical methods, request specs, and resource naming rules.

// self
use crate::{
	_prelude::*,
	auth::{RealmName, ResourceName},
	error::{ConfigError, DispatchError},
};

/// Resource whose payload is XML; every other resource carries JSON.
pub const XML_RESOURCE: &str = "ADSData";

const DATA_SUFFIX: &str = "Data";

impl ResourceName {
	/// Client identity whose token authenticates requests for this resource.
	///
	/// `ADSData` maps to `ADS`. A name without the `Data` suffix maps to itself, and so does
	/// the bare name `Data`, since stripping it would leave an empty identity.
	pub fn token_key(&self) -> &str {
		match self.strip_suffix(DATA_SUFFIX) {
			Some(key) if !key.is_empty() => key,
			_ => self.as_ref(),
		}
	}

	/// Returns `true` when the resource expects an XML payload.
	pub fn is_xml(&self) -> bool {
		&**self == XML_RESOURCE
	}
}

/// Logical HTTP method of a dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// Body-less read.
	Get,
	/// Create.
	Post,
	/// Partial update, tunneled as `POST` with `X-HTTP-Method-Override: PATCH`.
	Patch,
}
impl HttpMethod {
	/// Canonical upper-case name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Patch => "PATCH",
		}
	}

	/// Whether the payload is written as the request body.
	pub const fn has_body(self) -> bool {
		!matches!(self, HttpMethod::Get)
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = DispatchError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"GET" => Ok(HttpMethod::Get),
			"POST" => Ok(HttpMethod::Post),
			"PATCH" => Ok(HttpMethod::Patch),
			other => Err(DispatchError::UnsupportedMethod { method: other.into() }),
		}
	}
}

/// One request handed to the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSpec {
	/// Realm whose resource host receives the request.
	pub realm: RealmName,
	/// Resource path segment; also selects the bearer token.
	pub resource: ResourceName,
	/// Opaque payload, ignored for `GET`.
	pub payload: String,
	/// Logical method.
	pub method: HttpMethod,
}
impl RequestSpec {
	/// Builds a spec from already validated parts.
	pub fn new(
		realm: RealmName,
		resource: ResourceName,
		payload: impl Into<String>,
		method: HttpMethod,
	) -> Self {
		Self { realm, resource, payload: payload.into(), method }
	}

	/// Builds a spec from raw strings, validating identifiers and the method name.
	pub fn parse(
		realm: &str,
		resource: &str,
		payload: impl Into<String>,
		method: &str,
	) -> Result<Self> {
		Ok(Self::new(
			RealmName::new(realm).map_err(ConfigError::from)?,
			ResourceName::new(resource).map_err(ConfigError::from)?,
			payload,
			method.parse()?,
		))
	}

	/// Convenience constructor for a `POST` dispatch.
	pub fn post(realm: RealmName, resource: ResourceName, payload: impl Into<String>) -> Self {
		Self::new(realm, resource, payload, HttpMethod::Post)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn resource(name: &str) -> ResourceName {
		ResourceName::new(name).expect("Resource fixture should be valid.")
	}

	#[test]
	fn token_key_strips_data_suffix() {
		assert_eq!(resource("ADSData").token_key(), "ADS");
		assert_eq!(resource("VSASData").token_key(), "VSAS");
		assert_eq!(resource("Status").token_key(), "Status");
		assert_eq!(resource("Data").token_key(), "Data");
	}

	#[test]
	fn only_ads_data_is_xml() {
		assert!(resource("ADSData").is_xml());
		assert!(!resource("VSASData").is_xml());
		assert!(!resource("ADS").is_xml());
	}

	#[test]
	fn methods_parse_and_reject_unknown() {
		assert_eq!(
			" PATCH ".parse::<HttpMethod>().expect("PATCH should parse."),
			HttpMethod::Patch
		);
		assert_eq!("GET".parse::<HttpMethod>().expect("GET should parse."), HttpMethod::Get);
		assert!(!HttpMethod::Get.has_body());
		assert!(HttpMethod::Post.has_body() && HttpMethod::Patch.has_body());
		assert!(matches!(
			"DELETE".parse::<HttpMethod>(),
			Err(DispatchError::UnsupportedMethod { method }) if method == "DELETE"
		));
	}

	#[test]
	fn parse_validates_every_part() {
		let spec = RequestSpec::parse("master", "VSASData", "{}", "POST")
			.expect("Valid parts should parse.");

		assert_eq!(spec.method, HttpMethod::Post);
		assert!(matches!(
			RequestSpec::parse("master", "VSASData", "{}", "PUT"),
			Err(Error::Dispatch(DispatchError::UnsupportedMethod { .. }))
		));
		assert!(matches!(
			RequestSpec::parse("", "VSASData", "{}", "POST"),
			Err(Error::Config(ConfigError::InvalidIdentifier(_)))
		));
	}
}
