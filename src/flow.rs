use std::fmt;

/// Tag applied to flow records that match no lookup table entry.
///
/// A lookup row may also map a key to this value explicitly; such a key is
/// counted under `untagged` and stays out of the combination counts.
pub const UNTAGGED: &str = "untagged";

/// Destination port and protocol of a single flow record.
///
/// The protocol is lowercased on construction so matching against the lookup
/// table is structural rather than a comparison-time concern. Ordering is by
/// port, then protocol, which is the order the combination section of the
/// report is rendered in. The port is not validated against the 16-bit range.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortProtocol {
    port: u32,
    protocol: String,
}

impl PortProtocol {
    pub fn new(port: u32, protocol: impl AsRef<str>) -> Self {
        Self {
            port,
            protocol: protocol.as_ref().to_lowercase(),
        }
    }

    pub const fn port(&self) -> u32 {
        self.port
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }
}

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_is_lowercased_on_construction() {
        assert_eq!(PortProtocol::new(25, "TCP"), PortProtocol::new(25, "tcp"));
        assert_eq!(PortProtocol::new(25, "Udp").protocol(), "udp");
    }

    #[test]
    fn orders_by_port_then_protocol() {
        let mut keys = vec![
            PortProtocol::new(443, "tcp"),
            PortProtocol::new(25, "udp"),
            PortProtocol::new(25, "tcp"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                PortProtocol::new(25, "tcp"),
                PortProtocol::new(25, "udp"),
                PortProtocol::new(443, "tcp"),
            ]
        );
    }
}
