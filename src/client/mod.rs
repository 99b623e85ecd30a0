//! Client side of the list: the transport adapter and the list view
//! controller that keeps a locally loaded window in step with the server.

pub mod controller;
pub mod transport;

pub use controller::{ListViewController, LoadStatus, Notification, Severity};
pub use transport::{ClientConfig, HttpTransport, ListTransport, LocalTransport, TransportError};
