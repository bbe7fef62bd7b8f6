// crates.io
use httpmock::prelude::*;
// self
use realm_dispatch::{
	_preludet::*,
	auth::{ClientIdentity, RealmName, TokenSecret},
	config::RealmConfigStore,
	dispatch::{HttpMethod, RequestSpec},
	error::DispatchError,
	producer::{AdsProducer, PayloadProducer},
	store::{CachedToken, MemoryStore, StoreKey, TokenStore},
};

const TOKEN_PATH: &str = "/auth/realms/teamaware/protocol/openid-connect/token";

fn master_realm(resource_port: u16, auth: &MockServer) -> Arc<RealmConfigStore> {
	let host = auth.address().ip().to_string();

	realm_store([(
		"master",
		realm_properties(
			(&host, Some(resource_port)),
			(&host, auth.address().port()),
			"teamaware",
			"backend",
			&[("ADS", "ads-secret"), ("VSAS", "vsas-secret")],
		),
	)])
}

async fn seed(store: &MemoryStore, client: &str, token: &str) {
	store
		.save(
			StoreKey::new(
				&RealmName::new("master").expect("Realm fixture should be valid."),
				&ClientIdentity::new(client).expect("Client fixture should be valid."),
			),
			CachedToken::new(TokenSecret::new(token)),
		)
		.await
		.expect("Seeding the memory store should succeed.");
}

fn spec(resource: &str, payload: &str, method: &str) -> RequestSpec {
	RequestSpec::parse("master", resource, payload, method).expect("Spec fixture should parse.")
}

#[tokio::test]
async fn refreshed_token_authenticates_the_dispatch() {
	let server = MockServer::start_async().await;
	let (refresher, dispatcher, _) =
		build_reqwest_test_pair(master_realm(server.address().port(), &server));
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc123\"}");
		})
		.await;
	let resource = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/VSASData")
				.header("authorization", "Bearer abc123")
				.header("content-type", "application/json; charset=UTF-8")
				.header("accept", "application/json")
				.body("{\"responders\":[]}");
			then.status(200)
				.header("content-type", "application/json")
				.body("  {\"ok\":\n  true}\n");
		})
		.await;

	assert!(refresher.refresh_all().await.is_clean());

	let body = dispatcher
		.send(&spec("VSASData", "{\"responders\":[]}", "POST"))
		.await
		.expect("Dispatch should succeed.");

	token.assert_calls_async(2).await;
	resource.assert_async().await;

	assert_eq!(body, "{\"ok\":true}");
}

#[tokio::test]
async fn ads_observation_is_sent_as_xml() {
	let server = MockServer::start_async().await;
	let (_, dispatcher, store) =
		build_reqwest_test_pair(master_realm(server.address().port(), &server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/ADSData")
				.header("authorization", "Bearer ads-token")
				.header("content-type", "application/xml; charset=UTF-8");
			then.status(201).body("accepted");
		})
		.await;

	seed(&store, "ADS", "ads-token").await;

	let spec = AdsProducer::default().produce().expect("Observation should render.");

	assert!(spec.payload.contains("<message name=\"ADS\">"));

	let body = dispatcher.send(&spec).await.expect("Dispatch should succeed.");

	mock.assert_async().await;

	assert_eq!(body, "accepted");
}

#[tokio::test]
async fn get_and_patch_follow_the_wire_rules() {
	let server = MockServer::start_async().await;
	let (_, dispatcher, store) =
		build_reqwest_test_pair(master_realm(server.address().port(), &server));
	let get = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/VSASData")
				.header("user-agent", "Mozilla/5.0")
				.header("authorization", "Bearer vsas-token");
			then.status(200).body("[]");
		})
		.await;
	let patch = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/VSASData")
				.header("x-http-method-override", "PATCH")
				.body("{\"id\":1}");
			then.status(204);
		})
		.await;

	seed(&store, "VSAS", "vsas-token").await;

	let read = dispatcher
		.send(&spec("VSASData", "ignored", "GET"))
		.await
		.expect("GET dispatch should succeed.");
	let update = dispatcher
		.send(&RequestSpec::new(
			RealmName::new("master").expect("Realm fixture should be valid."),
			"VSASData".parse().expect("Resource fixture should be valid."),
			"{\"id\":1}",
			HttpMethod::Patch,
		))
		.await
		.expect("PATCH dispatch should succeed.");

	get.assert_async().await;
	patch.assert_async().await;

	assert_eq!(read, "[]");
	assert_eq!(update, "");
}

#[tokio::test]
async fn error_status_is_reported_without_retry() {
	let server = MockServer::start_async().await;
	let (_, dispatcher, store) =
		build_reqwest_test_pair(master_realm(server.address().port(), &server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/VSASData");
			then.status(500).body("boom");
		})
		.await;

	seed(&store, "VSAS", "vsas-token").await;

	let err = dispatcher
		.send(&spec("VSASData", "{}", "POST"))
		.await
		.expect_err("Server error should fail the dispatch.");

	mock.assert_calls_async(1).await;

	assert!(matches!(
		err,
		Error::Dispatch(DispatchError::Status { status: 500, ref body }) if body == "boom"
	));
}

#[tokio::test]
async fn missing_token_and_unreachable_server_fail_cleanly() {
	let server = MockServer::start_async().await;
	let (_, dispatcher, store) = build_reqwest_test_pair(master_realm(1, &server));

	assert!(matches!(
		dispatcher.send(&spec("VSASData", "{}", "POST")).await,
		Err(Error::Dispatch(DispatchError::MissingToken { .. }))
	));

	seed(&store, "VSAS", "vsas-token").await;

	assert!(matches!(
		dispatcher.send(&spec("VSASData", "{}", "POST")).await,
		Err(Error::Dispatch(DispatchError::Transport(_)))
	));
}
