//! Request-routing and session layer for the time-tracking dashboard API.
//!
//! Business services call verb methods on a [`router::Router`], which picks
//! one of two request clients for each call: the `direct` client talks to the
//! remote multi-tenant API, the `local` client to the backend-for-frontend.
//! Both attach credentials and tenant headers; the direct client also writes
//! tenant and organization ids into mutating bodies. A 401 from either client
//! expires the session and either redirects or hands the response back,
//! depending on the page the user is on.
//!
//! # Modules
//!
//! - `client`: the request client wrapper and its builder
//! - `commands`: CLI command definitions
//! - `configuration`: configuration file management
//! - `credentials`: credential store trait and file/in-memory stores
//! - `desktop`: runtime server address for desktop mode
//! - `interceptor`: request/response interceptor seams
//! - `registry`: lazy, single-construction client singletons
//! - `router`: direct vs local dispatch
//! - `session`: 401 handling and path exemptions
//! - `tenancy`: tenant/organization body injection

pub mod client;
pub mod commands;
pub mod configuration;
pub mod credentials;
pub mod desktop;
pub mod error;
pub mod exit_codes;
pub mod interceptor;
#[cfg(feature = "keyring-store")]
pub mod keyring;
pub mod registry;
pub mod request;
pub mod response;
pub mod router;
pub mod session;
pub mod tenancy;
