//! Purpose: Per-stage span instrumentation behind a swappable `Tracer`.
//! Exports: `Tracer`, `Stage`, `SpanHandle`, `TagValue`, `NoopTracer`, `SpanTracer`, `TracerGuard`.
//! Role: Cross-cutting observability; the pipeline calls it at stage boundaries.
//! Invariants: `finish` consumes the handle, so each span ends exactly once.
//! Invariants: Spans never alter the outcome of a run.
//! Invariants: `TracerGuard` shuts the tracer down on every exit path of its scope.
use tracing::Span;
use tracing::field::Empty;

use crate::config::AppConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Execute,
    ParseInput,
    CalculateSum,
    MarshalOutput,
}

impl Stage {
    pub fn span_name(self) -> &'static str {
        match self {
            Stage::Execute => "proc1.execute",
            Stage::ParseInput => "proc1.parse_input",
            Stage::CalculateSum => "proc1.calculate_sum",
            Stage::MarshalOutput => "proc1.marshal_output",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagValue<'a> {
    Int(i64),
    UInt(u64),
    Str(&'a str),
}

/// Opaque handle to an open span. Dropping it without `finish` also ends the span.
#[derive(Debug)]
pub struct SpanHandle {
    id: u64,
    span: Span,
}

impl SpanHandle {
    pub fn new(id: u64, span: Span) -> Self {
        Self { id, span }
    }

    pub fn disabled() -> Self {
        Self::new(0, Span::none())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run `f` with this span as the current span, so log records nest under it.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }
}

pub trait Tracer {
    fn start_span(&self, stage: Stage, parent: Option<&SpanHandle>) -> SpanHandle;
    fn tag(&self, span: &SpanHandle, key: &'static str, value: TagValue<'_>);
    fn finish(&self, span: SpanHandle);
    /// Flush whatever the tracer buffered. Called once at the end of a run.
    fn shutdown(&self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _stage: Stage, _parent: Option<&SpanHandle>) -> SpanHandle {
        SpanHandle::disabled()
    }

    fn tag(&self, _span: &SpanHandle, _key: &'static str, _value: TagValue<'_>) {}

    fn finish(&self, _span: SpanHandle) {}

    fn shutdown(&self) {}
}

/// Emits each stage as a `tracing` span; closed spans land in the log sink.
#[derive(Debug)]
pub struct SpanTracer {
    service: &'static str,
    env: &'static str,
    version: &'static str,
}

impl SpanTracer {
    pub fn start(config: &AppConfig) -> Self {
        tracing::debug!(
            service = config.service,
            env = config.env,
            version = config.version,
            "tracer started"
        );
        Self {
            service: config.service,
            env: config.env,
            version: config.version,
        }
    }
}

impl Tracer for SpanTracer {
    fn start_span(&self, stage: Stage, parent: Option<&SpanHandle>) -> SpanHandle {
        let parent = parent.and_then(|handle| handle.span.id());
        let span = match stage {
            Stage::Execute => tracing::info_span!(
                parent: parent,
                "proc1.execute",
                service = self.service,
                env = self.env,
                version = self.version,
                error = Empty,
                parent.trace_id = Empty,
                parent.span_id = Empty
            ),
            Stage::ParseInput => tracing::info_span!(
                parent: parent,
                "proc1.parse_input",
                params.count = Empty,
                error = Empty
            ),
            Stage::CalculateSum => tracing::info_span!(
                parent: parent,
                "proc1.calculate_sum",
                sum = Empty
            ),
            Stage::MarshalOutput => tracing::info_span!(
                parent: parent,
                "proc1.marshal_output",
                error = Empty
            ),
        };
        SpanHandle::new(span.id().map(|id| id.into_u64()).unwrap_or(0), span)
    }

    fn tag(&self, span: &SpanHandle, key: &'static str, value: TagValue<'_>) {
        match value {
            TagValue::Int(value) => {
                span.span.record(key, value);
            }
            TagValue::UInt(value) => {
                span.span.record(key, value);
            }
            TagValue::Str(value) => {
                span.span.record(key, value);
            }
        }
    }

    fn finish(&self, span: SpanHandle) {
        drop(span);
    }

    fn shutdown(&self) {
        tracing::debug!(service = self.service, "tracer stopped");
    }
}

/// Calls `shutdown` when dropped.
pub struct TracerGuard<'a> {
    tracer: &'a dyn Tracer,
}

impl<'a> TracerGuard<'a> {
    pub fn new(tracer: &'a dyn Tracer) -> Self {
        Self { tracer }
    }
}

impl Drop for TracerGuard<'_> {
    fn drop(&mut self) {
        self.tracer.shutdown();
    }
}
