//! Synthetic observation producers feeding the dispatcher on a schedule.

pub mod ads;
pub mod vsas;

pub use ads::AdsProducer;
pub use vsas::VsasProducer;

// self
use crate::{
	_prelude::*,
	dispatch::{Dispatcher, RequestSpec},
	http::HttpTransport,
	obs::{self, TaskKind, TaskOutcome, TaskSpan},
};

/// Source of one request per scheduler tick.
pub trait PayloadProducer
where
	Self: Send + Sync,
{
	/// Stable label used in logs and task names.
	fn name(&self) -> &'static str;

	/// Renders the next observation as a ready-to-send request.
	fn produce(&self) -> Result<RequestSpec>;
}

/// Produces one observation and dispatches it, returning the response body.
pub async fn produce_and_dispatch<C>(
	producer: &dyn PayloadProducer,
	dispatcher: &Dispatcher<C>,
) -> Result<String>
where
	C: ?Sized + HttpTransport,
{
	const KIND: TaskKind = TaskKind::Produce;

	let span = TaskSpan::new(KIND, producer.name());

	obs::record_task_outcome(KIND, TaskOutcome::Attempt);

	let result = span
		.instrument(async {
			let spec = producer.produce()?;

			tracing::info!(
				producer = producer.name(),
				resource = %spec.resource,
				bytes = spec.payload.len(),
				"Observation ready."
			);

			dispatcher.send(&spec).await
		})
		.await;

	match &result {
		Ok(body) => {
			obs::record_task_outcome(KIND, TaskOutcome::Success);

			tracing::info!(producer = producer.name(), response = %body, "Observation delivered.");
		},
		Err(e) => {
			obs::record_task_outcome(KIND, TaskOutcome::Failure);

			tracing::warn!(producer = producer.name(), error = %e, "Observation not delivered.");
		},
	}

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{RecordingTransport, realm_properties, realm_store},
		auth::{ClientIdentity, RealmName, TokenSecret},
		error::DispatchError,
		store::{CachedToken, MemoryStore, StoreKey, TokenStore},
	};

	#[tokio::test]
	async fn produced_observation_is_dispatched() {
		let realms = realm_store([(
			"master",
			realm_properties(
				("backend", Some(8080)),
				("keycloak", 8180),
				"teamaware",
				"backend",
				&[("VSAS", "s1")],
			),
		)]);
		let store = Arc::new(MemoryStore::default());
		let transport = RecordingTransport::default();
		let dispatcher = Dispatcher::with_transport(realms, store.clone(), transport.clone());
		let producer = VsasProducer::default();

		assert!(matches!(
			produce_and_dispatch(&producer, &dispatcher).await,
			Err(Error::Dispatch(DispatchError::MissingToken { .. }))
		));

		store
			.save(
				StoreKey::new(
					&RealmName::new("master").expect("Realm fixture should be valid."),
					&ClientIdentity::new("VSAS").expect("Client fixture should be valid."),
				),
				CachedToken::new(TokenSecret::new("vsas-token")),
			)
			.await
			.expect("Seeding the memory store should succeed.");
		transport.respond(201, "created");

		let body = produce_and_dispatch(&producer, &dispatcher)
			.await
			.expect("Observation should be delivered.");

		assert_eq!(body, "created");

		let requests = transport.requests();

		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].uri().to_string(), "http://backend:8080/api/VSASData");
	}
}
