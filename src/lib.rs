//! jsonwire - typed codec for JSON 1.1 RPC services
//!
//! This is the convenience crate that re-exports the jsonwire sub-crates.
//!
//! # Architecture
//!
//! - **jsonwire-core**: scalar coercions, shape and union codecs, error types,
//!   observability bootstrap, and the `Shape` / `Union` derives
//! - **jsonwire-client**: operation dispatcher, error decoder, HTTP model and
//!   collaborator traits
//! - **jsonwire-macros**: the derive implementations
//! - **jsonwire-scheduler**: a complete sample service
//!
//! # Quick Start
//!
//! ```rust
//! use jsonwire::client::{Dispatcher, StaticEndpoint};
//! use jsonwire::scheduler::{GetSchedule, GetScheduleInput};
//!
//! let endpoint = StaticEndpoint::from_url("https://scheduler.local").unwrap();
//! let dispatcher = Dispatcher::builder(endpoint).build();
//!
//! let request = dispatcher
//!     .serialize::<GetSchedule>(&GetScheduleInput { name: "nightly".into() })
//!     .unwrap();
//!
//! assert_eq!(request.method, "POST");
//! assert_eq!(request.path, "/");
//! assert_eq!(
//!     request.headers.get("x-amz-target"),
//!     Some("JobScheduler_20240601.GetSchedule")
//! );
//! assert_eq!(request.body.as_deref(), Some(r#"{"Name":"nightly"}"#));
//! ```

pub use jsonwire_client as client;
pub use jsonwire_core as core;
pub use jsonwire_scheduler as scheduler;

pub use jsonwire_client::{Dispatcher, OperationError};
pub use jsonwire_core::{Error, Output, Result, Shape, Union};
