//! ADS (audio/image detection) observations rendered as XML.

// std
use std::{
	fmt::Write,
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use rand::Rng;
use time::{format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::{
	_prelude::*,
	auth::{RealmName, ResourceName},
	config::MASTER_REALM,
	dispatch::{RequestSpec, XML_RESOURCE},
	error::ProduceError,
	producer::PayloadProducer,
};

const TIMESTAMP: &[BorrowedFormatItem<'_>] =
	format_description!("[year]-[month]-[day].[hour].[minute].[second]");
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Builds `<message name="ADS">` observations with an incrementing `msgID`.
#[derive(Debug)]
pub struct AdsProducer {
	realm: RealmName,
	resource: ResourceName,
	next_id: AtomicU64,
}
impl AdsProducer {
	/// Targets `realm`; message ids start at `1`.
	pub fn new(realm: RealmName) -> Self {
		Self {
			realm,
			resource: ResourceName::from_static(XML_RESOURCE),
			next_id: AtomicU64::new(1),
		}
	}

	/// Renders the next observation body, consuming one message id.
	pub fn render(&self) -> Result<String, ProduceError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let timestamp = OffsetDateTime::now_utc().format(TIMESTAMP)?;
		let mut rng = rand::rng();
		let mut xml = String::from(XML_DECLARATION);

		xml.push_str(r#"<message name="ADS">"#);
		let _ = write!(
			xml,
			"<msgHeader><msgID>{id}</msgID><msgSender>A</msgSender>\
			 <msgReciever>B</msgReciever></msgHeader>\
			 <drone_id>1</drone_id><timestamp>{timestamp}</timestamp>"
		);
		let _ = write!(
			xml,
			"<audio_detector><detection><labels>AUDIO TEST</labels>\
			 <confidence>{}</confidence><azimuth_pred>{}</azimuth_pred>\
			 <elevation_pred>{}</elevation_pred></detection></audio_detector>",
			rng.random::<f32>(),
			rng.random::<f32>(),
			rng.random::<f32>(),
		);
		let _ = write!(
			xml,
			"<image_detector><detection><labels>IMAGE TEST</labels>\
			 <confidence>{}</confidence><latitude>{}</latitude>\
			 <longitude>{}</longitude></detection></image_detector>",
			rng.random::<f32>(),
			rng.random::<f32>() * 10.,
			rng.random::<f32>() * 10.,
		);
		let _ = write!(
			xml,
			"<late_fusion_result><detection><label>LATE FUSION TEST</label>\
			 <confidence>{}</confidence></detection></late_fusion_result>",
			rng.random::<f32>(),
		);
		xml.push_str("</message>");

		Ok(xml)
	}
}
impl Default for AdsProducer {
	fn default() -> Self {
		Self::new(RealmName::from_static(MASTER_REALM))
	}
}
impl PayloadProducer for AdsProducer {
	fn name(&self) -> &'static str {
		"ads"
	}

	fn produce(&self) -> Result<RequestSpec> {
		Ok(RequestSpec::post(self.realm.clone(), self.resource.clone(), self.render()?))
	}
}
