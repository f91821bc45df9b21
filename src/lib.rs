//! Driver for the Siglent SSG3021X RF signal generator.
//!
//! The instrument is controlled with newline terminated SCPI commands over a raw
//! TCP socket (port 5025). The crate is layered as:
//!
//! - [`adapters`]: the [`Transport`](adapters::Transport) trait, the TCP transport
//!   and an in-process simulated instrument
//! - [`instrument`]: the [`Ssg3021x`](instrument::Ssg3021x) driver, identity parsing
//!   and the capability-checked function-generator front-end
//! - [`session`]: scoped sessions that always close their connection
//! - [`config`] / [`logging`]: Figment configuration and optional tracing setup
//!
//! One command is in flight at a time; nothing is cached or retried.

pub mod adapters;
pub mod config;
pub mod error;
pub mod instrument;
pub mod logging;
pub mod prelude;
pub mod session;

pub use error::{AppResult, SsgError};
