//! Validated names for realms, client identities, and resources.
//!
//! Each name type carries its own character rules. Realm names key configuration files,
//! client identities travel inside HTTP Basic credentials, and resource names become a single
//! URL path segment under `/api/`, so only RFC 3986 unreserved characters are accepted there.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const NAME_MAX_LEN: usize = 128;

macro_rules! def_id {
	($(#[$meta:meta])* $name:ident, $kind:literal, $allows:path) => {
		$(#[$meta])*
		#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` against this name's character rules.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check($kind, &value, $allows)?;

				Ok(Self(value))
			}

			/// Wraps a compile-time constant known to satisfy the rules.
			#[allow(dead_code)]
			pub(crate) fn from_static(value: &'static str) -> Self {
				debug_assert!(check($kind, value, $allows).is_ok());

				Self(value.into())
			}

			/// Returns the name as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				self.as_str()
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				self.as_str()
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				self.as_str()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(self.as_str())
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
	};
}

/// Reason a realm, client, or resource name was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The name was empty.
	#[error("{kind} name cannot be empty.")]
	Empty {
		/// Kind of name (realm, client, resource).
		kind: &'static str,
	},
	/// The name exceeded the allowed character count.
	#[error("{kind} name exceeds {max} characters.")]
	TooLong {
		/// Kind of name (realm, client, resource).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The name contains a character its kind does not allow.
	#[error("{kind} name contains the forbidden character {ch:?}.")]
	ForbiddenChar {
		/// Kind of name (realm, client, resource).
		kind: &'static str,
		/// First offending character.
		ch: char,
	},
}

def_id! {
	/// Configuration key of a realm (tenant), e.g. `master`.
	///
	/// Realm names come from `.properties` file stems, so path separators and `.` are rejected.
	RealmName, "Realm", realm_char
}
def_id! {
	/// OAuth 2.0 client identity declared in a realm's `realm.clients` list.
	///
	/// `:` is rejected because it separates the identity from the secret in Basic
	/// credentials, and `;` because it separates entries of the client list.
	ClientIdentity, "Client", client_char
}
def_id! {
	/// Resource addressed as `/api/<resource>`; restricted to URL-unreserved characters.
	ResourceName, "Resource", resource_char
}

fn check(kind: &'static str, view: &str, allows: fn(char) -> bool) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().count() > NAME_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: NAME_MAX_LEN });
	}

	match view.chars().find(|&ch| !allows(ch)) {
		Some(ch) => Err(IdentifierError::ForbiddenChar { kind, ch }),
		None => Ok(()),
	}
}

fn realm_char(ch: char) -> bool {
	!ch.is_whitespace() && !ch.is_control() && !matches!(ch, '/' | '\\' | '.')
}

fn client_char(ch: char) -> bool {
	!ch.is_whitespace() && !ch.is_control() && !matches!(ch, ':' | ';')
}

fn resource_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '~')
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn forbidden(result: Result<impl Debug, IdentifierError>) -> char {
		match result {
			Err(IdentifierError::ForbiddenChar { ch, .. }) => ch,
			other => panic!("Expected a forbidden character, got {other:?}."),
		}
	}

	#[test]
	fn resource_names_are_single_url_segments() {
		ResourceName::new("ADSData").expect("Plain resource should be accepted.");
		ResourceName::new("VSAS-Data_v1.2~x").expect("Unreserved characters should be accepted.");

		assert_eq!(forbidden(ResourceName::new("ADS#Data")), '#');
		assert_eq!(forbidden(ResourceName::new("ADS?x=1")), '?');
		assert_eq!(forbidden(ResourceName::new("ADS%2FData")), '%');
		assert_eq!(forbidden(ResourceName::new("api/ADSData")), '/');
		assert_eq!(forbidden(ResourceName::new("Données")), 'é');
	}

	#[test]
	fn client_identities_cannot_break_basic_credentials() {
		ClientIdentity::new("vsas-client@edge").expect("Typical client id should be accepted.");

		assert_eq!(forbidden(ClientIdentity::new("ADS:admin")), ':');
		assert_eq!(forbidden(ClientIdentity::new("ADS;VSAS")), ';');
		assert_eq!(forbidden(ClientIdentity::new(" ADS")), ' ');
	}

	#[test]
	fn realm_names_match_file_stems() {
		RealmName::new("master").expect("Realm fixture should be accepted.");

		assert_eq!(forbidden(RealmName::new("master.properties")), '.');
		assert_eq!(forbidden(RealmName::new("../master")), '.');
		assert_eq!(RealmName::new(""), Err(IdentifierError::Empty { kind: "Realm" }));
		assert_eq!(
			RealmName::new("r".repeat(NAME_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "Realm", max: NAME_MAX_LEN })
		);
	}

	#[test]
	fn deserialization_applies_the_same_rules() {
		assert!(serde_json::from_str::<ResourceName>("\"ADS#Data\"").is_err());
		assert_eq!(
			serde_json::from_str::<ClientIdentity>("\"VSAS\"")
				.expect("Valid client should deserialize.")
				.as_str(),
			"VSAS"
		);
	}
}
