//! Million List Library
//!
//! Server-held ordering, selection and search state for a very large list
//! of integer ids, the REST API that pages through it, and a client-side
//! list view controller that loads it incrementally.

pub mod api;
pub mod application;
pub mod client;
pub mod domain;
pub mod infrastructure;
