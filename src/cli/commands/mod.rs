//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod inbound;
pub mod init;
pub mod outbound;
pub mod validate;
