//! Recurring task scheduler with per-task non-overlap guards.
//!
//! Each task runs on a fixed-rate [`tokio::time::interval`] with
//! [`MissedTickBehavior::Skip`]. A tick that fires while the task's previous run is still
//! in flight is skipped and logged instead of starting a second, overlapping run.

// std
use std::time::Duration;
// crates.io
use tokio::{
	task::{JoinHandle, JoinSet},
	time::{self, Instant, MissedTickBehavior},
};
// self
use crate::{
	_prelude::*,
	dispatch::Dispatcher,
	http::HttpTransport,
	producer::{PayloadProducer, produce_and_dispatch},
	refresher::TokenRefresher,
};

/// Fixed-rate cadence of a recurring task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
	/// Time between consecutive ticks.
	pub period: Duration,
	/// Time before the first tick.
	pub initial_delay: Duration,
}
impl Schedule {
	/// Token refresh cadence: hourly, starting immediately.
	pub const REFRESHER: Self = Self::new(Duration::from_secs(3_600), Duration::ZERO);
	/// Producer cadence: every 10 seconds after a 10 second delay.
	pub const PRODUCER: Self = Self::new(Duration::from_secs(10), Duration::from_secs(10));

	/// Creates a schedule.
	pub const fn new(period: Duration, initial_delay: Duration) -> Self {
		Self { period, initial_delay }
	}
}

/// Owns the recurring tasks spawned on the current tokio runtime.
#[derive(Debug, Default)]
pub struct Scheduler {
	tasks: Vec<(&'static str, JoinHandle<()>)>,
}
impl Scheduler {
	/// Creates an empty scheduler.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of scheduled tasks.
	pub fn len(&self) -> usize {
		self.tasks.len()
	}

	/// Returns `true` when nothing is scheduled.
	pub fn is_empty(&self) -> bool {
		self.tasks.is_empty()
	}

	/// Runs `job` on `schedule` until [`shutdown`](Self::shutdown).
	///
	/// A zero period is clamped to one millisecond.
	pub fn spawn<F, Fut>(&mut self, name: &'static str, schedule: Schedule, job: F)
	where
		F: 'static + Send + Sync + Fn() -> Fut,
		Fut: 'static + Send + Future<Output = ()>,
	{
		let job = Arc::new(job);
		let in_flight = Arc::new(AsyncMutex::new(()));
		let period = schedule.period.max(Duration::from_millis(1));
		let handle = tokio::spawn(async move {
			let mut ticker = time::interval_at(Instant::now() + schedule.initial_delay, period);
			let mut runs = JoinSet::new();

			ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

			tracing::info!(task = name, period = ?period, "Recurring task scheduled.");

			loop {
				ticker.tick().await;

				while runs.try_join_next().is_some() {}

				let Some(permit) = in_flight.try_lock_arc() else {
					tracing::warn!(task = name, "Previous run still in flight; skipping tick.");

					continue;
				};
				let job = job.clone();

				runs.spawn(async move {
					job().await;

					drop(permit);
				});
			}
		});

		self.tasks.push((name, handle));
	}

	/// Schedules full token refresh cycles.
	pub fn schedule_refresher<C>(&mut self, schedule: Schedule, refresher: TokenRefresher<C>)
	where
		C: ?Sized + HttpTransport,
	{
		self.spawn("refresher", schedule, move || {
			let refresher = refresher.clone();

			async move {
				refresher.refresh_all().await;
			}
		});
	}

	/// Schedules a producer whose observations are sent through `dispatcher`.
	pub fn schedule_producer<C>(
		&mut self,
		schedule: Schedule,
		producer: Arc<dyn PayloadProducer>,
		dispatcher: Dispatcher<C>,
	) where
		C: ?Sized + HttpTransport,
	{
		let name = producer.name();

		self.spawn(name, schedule, move || {
			let producer = producer.clone();
			let dispatcher = dispatcher.clone();

			async move {
				let _ = produce_and_dispatch(producer.as_ref(), &dispatcher).await;
			}
		});
	}

	/// Stops every task, cancelling in-flight runs.
	pub async fn shutdown(self) {
		for (name, handle) in self.tasks {
			handle.abort();

			match handle.await {
				Err(e) if !e.is_cancelled() => {
					tracing::warn!(task = name, error = %e, "Recurring task ended abnormally.");
				},
				_ => (),
			}
		}

		tracing::info!("Scheduler stopped.");
	}
}
