//! Port abstraction layer for serial communication.
//!
//! Provides the adapter trait, the hardware-backed port, a mock for tests
//! and device discovery.

pub mod discovery;
pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use discovery::{list_port_details, list_ports, PortDetails, PortSelector, PLACEHOLDER};
pub use error::PortError;
pub use mock::{MockPortOpener, MockSerialPort};
pub use sync_port::{SyncSerialPort, SystemPortOpener};
pub use traits::*;
