//! Connection-details provisioning.
//!
//! Before every connection attempt the client asks a backend endpoint for
//! a short-lived LiveKit server URL and participant token. Details are
//! never cached and never reused across reconnects.

mod details;

pub use details::{ConnectionDetails, ConnectionDetailsFetcher, ConnectionDetailsProvider};
