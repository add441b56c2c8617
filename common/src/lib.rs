//! Types and rules shared by the document generation server and its clients.
//!
//! The formula engine, the availability rule and the download naming live here so
//! both sides of the HTTP contract agree on them.

pub mod availability;
pub mod error;
pub mod formula;
pub mod model;
pub mod naming;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod session;
