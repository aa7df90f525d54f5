//! Client configuration.

use pinboard_client::{SessionConfig, transport::TransportConfig};

/// Where to connect and how to behave once connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// User name and auto-join behavior.
    pub session: SessionConfig,
    /// Connect timeout and frame cap.
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Config with default session and transport settings.
    pub fn new(host: impl Into<String>, port: u16, user_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            session: SessionConfig::new(user_name),
            transport: TransportConfig::default(),
        }
    }
}
