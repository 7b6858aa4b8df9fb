//! Integrations with systems outside the engine.
//!
//! - [`transport`] - outbound HTTP delivery, health probe and batch send
//! - [`handlers`] - a [`DomainHandlers`](crate::core::dispatch::DomainHandlers)
//!   implementation that only logs, used by the command line
//!
//! # Design Pattern
//!
//! Adapters sit behind traits so the engine can be tested with mock
//! implementations. The transport is an `async_trait` object:
//!
//! ```rust,no_run
//! use emr_hl7::adapters::transport::{HttpTransport, MessageTransport};
//! use emr_hl7::config::{secret_string, TransportConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TransportConfig {
//!     destination: Some("https://his.example.org/hl7".to_string()),
//!     auth_token: Some(secret_string("token".to_string())),
//!     ..Default::default()
//! };
//!
//! let transport = HttpTransport::new(&config)?;
//! let healthy = transport.check_connection("https://his.example.org/hl7").await?;
//! # Ok(())
//! # }
//! ```

pub mod handlers;
pub mod transport;
