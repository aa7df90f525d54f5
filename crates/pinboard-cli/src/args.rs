//! Command-line arguments.

use std::time::Duration;

use clap::Parser;
use pinboard_app::ClientConfig;
use pinboard_client::{DEFAULT_GROUP, SessionConfig, transport::TransportConfig};

/// Pinboard bulletin-board client
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pinboard")]
#[command(about = "Line-oriented client for the pinboard bulletin-board protocol")]
#[command(version)]
pub struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(short, long)]
    pub port: u16,

    /// User name shown to other members
    #[arg(short, long)]
    pub name: String,

    /// Group joined automatically when the server lists it
    #[arg(long, default_value = DEFAULT_GROUP)]
    pub default_group: String,

    /// Do not join any group automatically
    #[arg(long)]
    pub no_auto_join: bool,

    /// Give up connecting after this many milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Drop the connection if one line exceeds this many bytes
    #[arg(long)]
    pub max_frame_len: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Client configuration these arguments describe.
    pub fn client_config(&self) -> ClientConfig {
        let auto_join_group = (!self.no_auto_join).then(|| self.default_group.clone());

        ClientConfig {
            host: self.host.clone(),
            port: self.port,
            session: SessionConfig { user_name: self.name.clone(), auto_join_group },
            transport: TransportConfig {
                connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
                max_frame_len: self.max_frame_len,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_auto_join_public_without_limits() {
        let args = Args::try_parse_from(["pinboard", "--port", "6000", "--name", "amy"]).unwrap();
        let config = args.client_config();

        assert_eq!(config, ClientConfig::new("127.0.0.1", 6000, "amy"));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn flags_map_onto_config() {
        let args = Args::try_parse_from([
            "pinboard",
            "--host",
            "board.local",
            "-p",
            "7000",
            "-n",
            "bob",
            "--no-auto-join",
            "--connect-timeout-ms",
            "250",
            "--max-frame-len",
            "4096",
        ])
        .unwrap();
        let config = args.client_config();

        assert_eq!(config.host, "board.local");
        assert_eq!(config.session.auto_join_group, None);
        assert_eq!(config.transport.connect_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.transport.max_frame_len, Some(4096));
    }

    #[test]
    fn custom_default_group() {
        let args =
            Args::try_parse_from(["pinboard", "-p", "1", "-n", "x", "--default-group", "Group3"])
                .unwrap();
        assert_eq!(args.client_config().session.auto_join_group.as_deref(), Some("Group3"));
    }

    #[test]
    fn port_and_name_are_required() {
        assert!(Args::try_parse_from(["pinboard", "--name", "amy"]).is_err());
        assert!(Args::try_parse_from(["pinboard", "--port", "1"]).is_err());
    }
}
