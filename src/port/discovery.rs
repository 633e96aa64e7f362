//! Serial device enumeration and the port selection model.

use serde::Serialize;
use serialport::SerialPortType;
use tracing::{debug, warn};

/// Label shown in the selector before a port is chosen.
pub const PLACEHOLDER: &str = "Select Port";

/// Enumerate attached serial devices by name.
///
/// Every call asks the operating system again. Enumeration failures are
/// logged and reported as "no ports".
pub fn list_ports() -> Vec<String> {
    list_port_details()
        .into_iter()
        .map(|p| p.port_name)
        .collect()
}

/// Descriptive information about one enumerated port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDetails {
    pub port_name: String,
    /// "usb", "pci", "bluetooth" or "unknown".
    pub port_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl From<serialport::SerialPortInfo> for PortDetails {
    fn from(info: serialport::SerialPortInfo) -> Self {
        let mut details = PortDetails {
            port_name: info.port_name,
            port_type: "unknown",
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
            serial_number: None,
        };
        match info.port_type {
            SerialPortType::UsbPort(usb) => {
                details.port_type = "usb";
                details.vid = Some(usb.vid);
                details.pid = Some(usb.pid);
                details.manufacturer = usb.manufacturer;
                details.product = usb.product;
                details.serial_number = usb.serial_number;
            }
            SerialPortType::PciPort => details.port_type = "pci",
            SerialPortType::BluetoothPort => details.port_type = "bluetooth",
            SerialPortType::Unknown => {}
        }
        details
    }
}

/// Enumerate attached serial devices with their USB metadata.
pub fn list_port_details() -> Vec<PortDetails> {
    match serialport::available_ports() {
        Ok(ports) => {
            debug!("Enumerated {} serial port(s)", ports.len());
            ports.into_iter().map(PortDetails::from).collect()
        }
        Err(e) => {
            warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

/// Model of the port selection control.
///
/// Index 0 is always the placeholder; indices `1..=N` map onto the
/// enumerated ports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSelector {
    ports: Vec<String>,
    selected: usize,
}

impl PortSelector {
    pub fn new(ports: Vec<String>) -> Self {
        Self { ports, selected: 0 }
    }

    /// Labels in display order, placeholder first.
    pub fn options(&self) -> Vec<&str> {
        std::iter::once(PLACEHOLDER)
            .chain(self.ports.iter().map(String::as_str))
            .collect()
    }

    /// Number of entries including the placeholder.
    pub fn len(&self) -> usize {
        self.ports.len() + 1
    }

    /// Always false; the placeholder is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Enumerated port names without the placeholder.
    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    /// Whether the entry at `index` can be chosen.
    pub fn is_selectable(&self, index: usize) -> bool {
        index > 0 && index <= self.ports.len()
    }

    /// Choose the entry at `index` and return the port it names, if any.
    ///
    /// Choosing the placeholder or an out-of-range index yields `None` and
    /// resets the selection to the placeholder.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if self.is_selectable(index) {
            self.selected = index;
            Some(self.ports[index - 1].as_str())
        } else {
            self.selected = 0;
            None
        }
    }

    /// Choose a port by name.
    pub fn select_name(&mut self, name: &str) -> Option<&str> {
        let index = self
            .ports
            .iter()
            .position(|p| p == name)
            .map_or(0, |i| i + 1);
        self.select(index)
    }

    /// Index of the current choice (0 for the placeholder).
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The currently chosen port.
    pub fn selected(&self) -> Option<&str> {
        self.selected
            .checked_sub(1)
            .and_then(|i| self.ports.get(i))
            .map(String::as_str)
    }

    /// Replace the port list, keeping the current choice if it still exists.
    pub fn refresh(&mut self, ports: Vec<String>) {
        let current = self.selected().map(str::to_owned);
        self.ports = ports;
        self.selected = match current {
            Some(name) => self.ports.iter().position(|p| *p == name).map_or(0, |i| i + 1),
            None => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_options_include_placeholder() {
        let selector = PortSelector::new(names(&["COM3", "COM4"]));
        assert_eq!(selector.options(), vec![PLACEHOLDER, "COM3", "COM4"]);
        assert_eq!(selector.len(), 3);
        assert!(!selector.is_selectable(0));
    }

    #[test]
    fn test_empty_list_still_has_placeholder() {
        let selector = PortSelector::new(Vec::new());
        assert_eq!(selector.options(), vec![PLACEHOLDER]);
        assert_eq!(selector.selected(), None);
    }

    #[test]
    fn test_select_maps_indices() {
        let mut selector = PortSelector::new(names(&["COM3", "COM4"]));
        assert_eq!(selector.select(2), Some("COM4"));
        assert_eq!(selector.selected_index(), 2);
        assert_eq!(selector.select(0), None);
        assert_eq!(selector.selected(), None);
        assert_eq!(selector.select(9), None);
    }

    #[test]
    fn test_refresh_keeps_surviving_choice() {
        let mut selector = PortSelector::new(names(&["COM3", "COM4"]));
        selector.select_name("COM4");
        selector.refresh(names(&["COM1", "COM4"]));
        assert_eq!(selector.selected(), Some("COM4"));
        assert_eq!(selector.selected_index(), 2);

        selector.refresh(names(&["COM1"]));
        assert_eq!(selector.selected(), None);
    }

    #[test]
    fn test_details_conversion() {
        let info = serialport::SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::PciPort,
        };
        let details = PortDetails::from(info);
        assert_eq!(details.port_name, "/dev/ttyS0");
        assert_eq!(details.port_type, "pci");
        assert_eq!(details.vid, None);

        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("vid").is_none());
    }
}
