// SPDX-License-Identifier: MIT

//! The retail dataset: its description, guardrail and executor

pub mod executor;
pub mod guardrail;
pub mod schema;

pub use executor::{QueryExecutor, SqliteExecutor};
pub use schema::DATA_DESCRIPTION;
