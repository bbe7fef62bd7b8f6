//! VSAS (responder positions) observations rendered as JSON.

// crates.io
use rand::Rng;
// self
use crate::{
	_prelude::*,
	auth::{RealmName, ResourceName},
	config::MASTER_REALM,
	dispatch::RequestSpec,
	error::ProduceError,
	producer::PayloadProducer,
};

const RESOURCE: &str = "VSASData";
const RESPONDERS: u32 = 5;

/// One VSAS observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VsasObservation {
	/// Tracked responders.
	pub responders: Vec<Responder>,
}

/// Responder id with a three-component position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Responder {
	/// Zero-based responder id.
	pub id: u32,
	/// Position components, each in `[0, 1)`.
	pub position: [f32; 3],
}

/// Builds `{"responders":[...]}` observations with five randomly placed responders.
#[derive(Clone, Debug)]
pub struct VsasProducer {
	realm: RealmName,
	resource: ResourceName,
}
impl VsasProducer {
	/// Targets `realm`.
	pub fn new(realm: RealmName) -> Self {
		Self { realm, resource: ResourceName::from_static(RESOURCE) }
	}

	/// Samples a fresh observation.
	pub fn observe(&self) -> VsasObservation {
		let mut rng = rand::rng();
		let responders = (0..RESPONDERS)
			.map(|id| Responder { id, position: [rng.random(), rng.random(), rng.random()] })
			.collect();

		VsasObservation { responders }
	}

	/// Renders a fresh observation as compact JSON.
	pub fn render(&self) -> Result<String, ProduceError> {
		Ok(serde_json::to_string(&self.observe())?)
	}
}
impl Default for VsasProducer {
	fn default() -> Self {
		Self::new(RealmName::from_static(MASTER_REALM))
	}
}
impl PayloadProducer for VsasProducer {
	fn name(&self) -> &'static str {
		"vsas"
	}

	fn produce(&self) -> Result<RequestSpec> {
		Ok(RequestSpec::post(self.realm.clone(), self.resource.clone(), self.render()?))
	}
}
