//! HTTP plumbing and citation rendering shared by the source adapters.

pub mod cite;
mod http;

pub use http::{transport_error, HttpClient};
