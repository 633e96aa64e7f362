//! Tests requiring an attached radio or USB-serial adapter.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT=COM3                  # or /dev/ttyUSB0 on Linux
//! export TEST_LOOPBACK=1                 # if the port has TX-RX loopback
//!
//! cargo test --features hardware-tests -- --ignored
//! ```

use lora_messenger::port::{list_ports, PortConfiguration, SerialPortAdapter, SyncSerialPort};
use lora_messenger::{Messenger, SessionSettings, SystemPortOpener};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn test_port() -> Option<String> {
    let port = env::var("TEST_PORT").ok();
    if port.is_none() {
        println!("Skipping hardware test: TEST_PORT not set");
    }
    port
}

fn is_loopback_enabled() -> bool {
    env::var("TEST_LOOPBACK").ok().as_deref() == Some("1")
}

#[test]
#[ignore]
fn test_enumerated_ports_include_test_port() {
    let Some(port) = test_port() else { return };
    let ports = list_ports();
    println!("Found ports: {:?}", ports);
    assert!(ports.contains(&port), "{port} not enumerated");
}

#[test]
#[ignore]
fn test_open_with_default_parameters() {
    let Some(port) = test_port() else { return };
    let opened = SyncSerialPort::open(&port, PortConfiguration::default()).unwrap();
    assert_eq!(opened.name(), port);
}

#[test]
#[ignore]
fn test_loopback_chat_round_trip() {
    let Some(port) = test_port() else { return };
    if !is_loopback_enabled() {
        println!("Skipping loopback test: TEST_LOOPBACK not set");
        return;
    }

    let mut messenger =
        Messenger::new(Arc::new(SystemPortOpener), SessionSettings::default()).unwrap();
    messenger.connect_to(&port).unwrap();
    messenger.username = "hw".into();
    messenger.input = "loopback check".into();
    messenger.send().unwrap();
    messenger
        .session()
        .flush(Duration::from_secs(2))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline && messenger.poll_tick() == 0 {
        thread::sleep(Duration::from_millis(200));
    }

    let received: Vec<&str> = messenger
        .transcript()
        .entries()
        .iter()
        .filter(|e| e.direction == lora_messenger::Direction::Received)
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(received, vec!["hw: loopback check"]);
    messenger.shutdown();
}
