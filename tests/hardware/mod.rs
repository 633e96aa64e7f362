//! Tests against a real serial device.

pub mod real_port_tests;
