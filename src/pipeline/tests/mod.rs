//! Unit tests for the pipeline bounded context.

mod coercion_tests;
mod status_tests;
mod todo_tests;
