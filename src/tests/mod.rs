//! Library tests and fixtures

mod parallel_execution_tests;

use crate::{Context, ExecutionError, Schema, Value, Variables};

/// Executes `query` on a runtime of its own, failing the test on fatal
/// errors.
pub(crate) fn run_query(schema: &Schema, query: &str) -> (Value, Vec<ExecutionError>) {
    schema
        .execute_sync(query, None, &Variables::new(), &Context::new())
        .unwrap_or_else(|e| panic!("query `{query}` failed: {e}"))
}

pub(crate) fn messages(errors: &[ExecutionError]) -> Vec<&str> {
    errors.iter().map(|e| e.error().message()).collect()
}
