// SPDX-License-Identifier: MIT

//! Agent development kit: model clients, the LLM gateway and the agent trait

pub mod agent;
pub mod error;
pub mod gateway;
pub mod model;
