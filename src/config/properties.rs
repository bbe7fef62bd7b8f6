//! Minimal `.properties` reader for realm configuration files.

// self
use crate::config::RealmProperties;

/// Parses `.properties` text into a flat property set.
///
/// Supports `key=value`, `key:value` and `key value` entries, `#`/`!` comment lines, and
/// blank lines. The key ends at the first `=`, `:` or whitespace; values are trimmed and
/// later duplicates win. Line continuations and escapes are not interpreted.
pub fn parse_properties(input: &str) -> RealmProperties {
	let mut props = RealmProperties::new();

	for line in input.lines().map(str::trim) {
		if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
			continue;
		}

		let (key, rest) = match line.find(|c: char| c == '=' || c == ':' || c.is_whitespace()) {
			Some(idx) => line.split_at(idx),
			None => (line, ""),
		};
		let rest = rest.trim_start();
		let value = rest.strip_prefix(|c: char| c == '=' || c == ':').unwrap_or(rest).trim();

		if key.is_empty() {
			continue;
		}

		props.insert(key.to_owned(), value.to_owned());
	}

	props
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_separators_and_comments() {
		let props = parse_properties(
			"# realm file\n\
			 ! legacy comment\n\
			 resource.endpoint = backend.local\n\
			 resource.port:8080\n\
			 realm.id teamaware\n\
			 \n\
			 realm.clients=ADS;VSAS\n\
			 flag\n",
		);

		assert_eq!(props.get("resource.endpoint").map(String::as_str), Some("backend.local"));
		assert_eq!(props.get("resource.port").map(String::as_str), Some("8080"));
		assert_eq!(props.get("realm.id").map(String::as_str), Some("teamaware"));
		assert_eq!(props.get("realm.clients").map(String::as_str), Some("ADS;VSAS"));
		assert_eq!(props.get("flag").map(String::as_str), Some(""));
		assert_eq!(props.len(), 5);
	}

	#[test]
	fn first_separator_wins() {
		let props = parse_properties("url=http://host:8080/path");

		assert_eq!(props.get("url").map(String::as_str), Some("http://host:8080/path"));
	}
}
