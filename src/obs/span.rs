// crates.io
use tracing::{Instrument, Span, field::Empty, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::TaskKind};

/// Span wrapper used by every unit of work.
#[derive(Clone, Debug)]
pub struct TaskSpan {
	span: Span,
}
impl TaskSpan {
	/// Creates a new span tagged with the provided task kind + stage.
	pub fn new(kind: TaskKind, stage: &'static str) -> Self {
		let span = tracing::info_span!(
			"realm_dispatch.task",
			task = kind.as_str(),
			stage,
			realm = Empty,
			subject = Empty
		);

		Self { span }
	}

	/// Attaches a realm/client (or realm/resource) pair to the span.
	pub fn with_subject(self, realm: &str, subject: &str) -> Self {
		let span = self.span;

		span.record("realm", realm);
		span.record("subject", subject);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
