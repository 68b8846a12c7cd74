//! Purpose: Run one read → decode → sum → encode → write pass.
//! Exports: `run_pipeline`, `read_input`.
//! Role: The whole business flow; `main` only wires config, logging, and the tracer around it.
//! Invariants: Stages run once, in order; the first failure ends the run.
//! Invariants: Nothing is written to the output unless every earlier stage succeeded.
//! Invariants: Each stage span is finished exactly once; failures tag `error` before finishing.
//! Invariants: Failures are logged once at the failing stage.
use std::io::{Read, Write};

use crate::config::AppConfig;
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{Request, Response};
use crate::json::parse;
use crate::trace::{SpanHandle, Stage, TagValue, Tracer};

pub fn run_pipeline<R, W>(
    reader: R,
    writer: W,
    tracer: &dyn Tracer,
    config: &AppConfig,
) -> Result<Response, Error>
where
    R: Read,
    W: Write,
{
    let root = tracer.start_span(Stage::Execute, None);
    let result = root.in_scope(|| run_stages(reader, writer, tracer, &root, config));
    if let Err(err) = &result {
        tracer.tag(&root, "error", TagValue::Str(&err.to_string()));
    }
    tracer.finish(root);
    result
}

fn run_stages<R, W>(
    reader: R,
    writer: W,
    tracer: &dyn Tracer,
    root: &SpanHandle,
    config: &AppConfig,
) -> Result<Response, Error>
where
    R: Read,
    W: Write,
{
    let input = read_input(reader)?;
    let request = decode_request(&input, tracer, root)?;
    link_parent_context(&request, tracer, root);
    let response = calculate(&request, tracer, root, config.version);
    let encoded = encode_response(&response, tracer, root)?;
    write_output(writer, &encoded)?;

    tracing::info!(
        input_name = %request.name,
        output_sum = response.sum,
        "processing completed"
    );
    Ok(response)
}

/// Read the reader to end-of-stream; all or nothing.
pub fn read_input<R: Read>(mut reader: R) -> Result<Vec<u8>, Error> {
    tracing::debug!("reading input from stdin");
    let mut input = Vec::new();
    reader.read_to_end(&mut input).map_err(|err| {
        log_failure(
            Error::new(ErrorKind::Io)
                .with_message("failed to read from stdin")
                .with_source(err),
        )
    })?;
    tracing::debug!(bytes = input.len(), "read input");
    Ok(input)
}

fn decode_request(input: &[u8], tracer: &dyn Tracer, root: &SpanHandle) -> Result<Request, Error> {
    let span = tracer.start_span(Stage::ParseInput, Some(root));
    match span.in_scope(|| parse::from_object_slice::<Request>(input)) {
        Ok(request) => {
            tracer.tag(&span, "params.count", TagValue::UInt(request.params.len() as u64));
            tracer.finish(span);
            tracing::info!(
                input_name = %request.name,
                params = ?request.params,
                "parsed input data"
            );
            Ok(request)
        }
        Err(source) => {
            let err = Error::new(ErrorKind::Decode)
                .with_message("failed to parse JSON")
                .with_hint(parse::hint_for_error(&source, "stdin"))
                .with_source(source);
            Err(fail_stage(tracer, span, err))
        }
    }
}

fn link_parent_context(request: &Request, tracer: &dyn Tracer, root: &SpanHandle) {
    let trace_id = request.trace_id.as_deref().filter(|id| !id.is_empty());
    let span_id = request.parent_span_id.as_deref().filter(|id| !id.is_empty());
    let (Some(trace_id), Some(span_id)) = (trace_id, span_id) else {
        return;
    };
    match (trace_id.parse::<u64>(), span_id.parse::<u64>()) {
        (Ok(parent_trace), Ok(parent_span)) => {
            tracer.tag(root, "parent.trace_id", TagValue::UInt(parent_trace));
            tracer.tag(root, "parent.span_id", TagValue::UInt(parent_span));
            tracing::debug!(trace_id, parent_span_id = span_id, "linked parent trace context");
        }
        _ => {
            tracing::warn!(
                trace_id,
                parent_span_id = span_id,
                "invalid trace context, using new trace"
            );
        }
    }
}

fn calculate(request: &Request, tracer: &dyn Tracer, root: &SpanHandle, version: &str) -> Response {
    let span = tracer.start_span(Stage::CalculateSum, Some(root));
    let response = Response::from_request(request, version);
    tracer.tag(&span, "sum", TagValue::Int(response.sum));
    span.in_scope(|| tracing::info!(sum = response.sum, "calculated sum"));
    tracer.finish(span);
    response
}

fn encode_response(
    response: &Response,
    tracer: &dyn Tracer,
    root: &SpanHandle,
) -> Result<String, Error> {
    let span = tracer.start_span(Stage::MarshalOutput, Some(root));
    match parse::to_string(response) {
        Ok(encoded) => {
            tracer.finish(span);
            Ok(encoded)
        }
        Err(source) => {
            let err = Error::new(ErrorKind::Encode)
                .with_message("failed to marshal output JSON")
                .with_source(source);
            Err(fail_stage(tracer, span, err))
        }
    }
}

fn write_output<W: Write>(mut writer: W, encoded: &str) -> Result<(), Error> {
    writeln!(writer, "{encoded}")
        .and_then(|()| writer.flush())
        .map_err(|err| {
            log_failure(
                Error::new(ErrorKind::Io)
                    .with_message("failed to write to stdout")
                    .with_source(err),
            )
        })
}

fn fail_stage(tracer: &dyn Tracer, span: SpanHandle, err: Error) -> Error {
    let err = span.in_scope(|| log_failure(err));
    tracer.tag(&span, "error", TagValue::Str(&err.to_string()));
    tracer.finish(span);
    err
}

fn log_failure(err: Error) -> Error {
    tracing::error!(
        kind = ?err.kind(),
        error = %err,
        hint = err.hint().unwrap_or_default(),
        "{}",
        err.message().unwrap_or("stage failed")
    );
    err
}
