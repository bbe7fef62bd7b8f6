//! Realm sources: where raw realm property sets come from.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	config::{RealmProperties, parse_properties},
	error::ConfigError,
};

/// Raw realm property sets keyed by realm name.
pub type RealmSnapshot = BTreeMap<String, RealmProperties>;

/// Boxed future returned by [`RealmSource::load`].
pub type SourceFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RealmSnapshot, ConfigError>> + 'a + Send>>;

/// Supplies raw realm property sets to a [`RealmConfigStore`](crate::config::RealmConfigStore).
pub trait RealmSource
where
	Self: Send + Sync,
{
	/// Loads every realm property set known to the source.
	fn load(&self) -> SourceFuture<'_>;
}

/// Source backed by an already-parsed in-memory snapshot.
#[derive(Clone, Debug, Default)]
pub struct StaticRealmSource(RealmSnapshot);
impl StaticRealmSource {
	/// Wraps the provided snapshot.
	pub fn new(snapshot: RealmSnapshot) -> Self {
		Self(snapshot)
	}
}
impl FromIterator<(String, RealmProperties)> for StaticRealmSource {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (String, RealmProperties)>,
	{
		Self(iter.into_iter().collect())
	}
}
impl RealmSource for StaticRealmSource {
	fn load(&self) -> SourceFuture<'_> {
		let snapshot = self.0.clone();

		Box::pin(async move { Ok(snapshot) })
	}
}

/// Source that reads every `*.properties` file in a directory.
///
/// The realm name is the file name up to its first `.`, so `master.properties` yields the
/// `master` realm.
#[derive(Clone, Debug)]
pub struct PropertiesDirSource {
	dir: PathBuf,
}
impl PropertiesDirSource {
	/// Creates a source rooted at the provided directory.
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}
}
impl RealmSource for PropertiesDirSource {
	fn load(&self) -> SourceFuture<'_> {
		let dir = self.dir.clone();

		Box::pin(async move {
			tokio::task::spawn_blocking(move || read_snapshot(&dir)).await.map_err(|e| {
				ConfigError::Source { message: format!("Realm directory reader stopped: {e}") }
			})?
		})
	}
}

fn read_snapshot(dir: &Path) -> Result<RealmSnapshot, ConfigError> {
	let entries = fs::read_dir(dir).map_err(|e| ConfigError::Source {
		message: format!("Failed to list {}: {e}", dir.display()),
	})?;
	let mut snapshot = RealmSnapshot::new();

	for entry in entries {
		let path = entry
			.map_err(|e| ConfigError::Source {
				message: format!("Failed to list {}: {e}", dir.display()),
			})?
			.path();

		if !path.is_file() || path.extension().is_none_or(|ext| ext != "properties") {
			continue;
		}

		let Some(realm) = path
			.file_name()
			.and_then(|name| name.to_str())
			.and_then(|name| name.split('.').next())
			.filter(|name| !name.is_empty())
		else {
			continue;
		};
		let text = fs::read_to_string(&path).map_err(|e| ConfigError::Source {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		tracing::info!(realm, file = %path.display(), "Loaded realm configuration file.");

		snapshot.insert(realm.to_owned(), parse_properties(&text));
	}

	Ok(snapshot)
}
