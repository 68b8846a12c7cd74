//! Purpose: Internal JSON boundary shared by the pipeline stages.
//! Exports: `parse` module with decode/encode helpers.
//! Role: Single seam for the JSON implementation so stages avoid ad hoc serde calls.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
