//! `realm-dispatch` binary: refreshes realm tokens hourly and ships ADS/VSAS observations
//! every few seconds until interrupted.

// std
use std::{path::PathBuf, sync::Arc, time::Duration};
// crates.io
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
// self
use realm_dispatch::{
	config::{PropertiesDirSource, RealmConfigStore},
	dispatch::{Dispatcher, Routing},
	http::ReqwestHttpClient,
	producer::{AdsProducer, PayloadProducer, VsasProducer},
	refresher::TokenRefresher,
	schedule::{Schedule, Scheduler},
	store::{MemoryStore, TokenStore},
};

#[derive(Debug, Parser)]
#[command(version, about = "Keeps realm tokens fresh and dispatches scheduled observations.")]
struct Cli {
	/// Directory holding one `<realm>.properties` file per realm.
	#[arg(long, env = "REALM_DISPATCH_REALMS_DIR", default_value = "realms")]
	realms_dir: PathBuf,
	/// Seconds between token refresh cycles.
	#[arg(long, env = "REALM_DISPATCH_REFRESH_INTERVAL_SECS", default_value_t = 3_600)]
	refresh_interval_secs: u64,
	/// Seconds between observations of each producer.
	#[arg(long, env = "REALM_DISPATCH_DISPATCH_INTERVAL_SECS", default_value_t = 10)]
	dispatch_interval_secs: u64,
	/// Seconds before the first observation.
	#[arg(long, env = "REALM_DISPATCH_INITIAL_DELAY_SECS", default_value_t = 10)]
	initial_delay_secs: u64,
	/// Per-request timeout in seconds; unset means no timeout.
	#[arg(long, env = "REALM_DISPATCH_REQUEST_TIMEOUT_SECS")]
	request_timeout_secs: Option<u64>,
	/// Read the resource port and bearer token from each target realm instead of `master`.
	#[arg(long, env = "REALM_DISPATCH_PER_REALM_ROUTING")]
	per_realm_routing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(fmt::layer().with_target(false))
		.init();

	let cli = Cli::parse();

	tracing::info!(?cli, "Starting realm dispatcher.");

	let timeout = cli.request_timeout_secs.map(Duration::from_secs);
	let transport = Arc::new(ReqwestHttpClient::with_timeout(timeout)?);
	let realms = Arc::new(RealmConfigStore::new(PropertiesDirSource::new(cli.realms_dir)));
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let routing = if cli.per_realm_routing { Routing::PerRealm } else { Routing::MasterFunneled };
	let refresher = <TokenRefresher<ReqwestHttpClient>>::with_transport(
		realms.clone(),
		store.clone(),
		transport.clone(),
	);
	let dispatcher = <Dispatcher<ReqwestHttpClient>>::with_transport(realms, store, transport)
		.with_routing(routing);
	let producers: [Arc<dyn PayloadProducer>; 2] =
		[Arc::new(AdsProducer::default()), Arc::new(VsasProducer::default())];
	let mut scheduler = Scheduler::new();

	scheduler.schedule_refresher(
		Schedule::new(Duration::from_secs(cli.refresh_interval_secs), Duration::ZERO),
		refresher,
	);

	for producer in producers {
		scheduler.schedule_producer(
			Schedule::new(
				Duration::from_secs(cli.dispatch_interval_secs),
				Duration::from_secs(cli.initial_delay_secs),
			),
			producer,
			dispatcher.clone(),
		);
	}

	tokio::signal::ctrl_c().await?;
	tracing::info!("Interrupt received; shutting down.");
	scheduler.shutdown().await;

	Ok(())
}
