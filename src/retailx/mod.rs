// SPDX-License-Identifier: MIT

//! RetailX assistant: answers questions about the retail dataset

pub mod builder;
pub mod config;
pub mod data;
pub mod prompts;
pub mod server;
pub mod workflow;
