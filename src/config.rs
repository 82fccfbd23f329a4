use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

/// Which surface the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON over HTTP
    Http,
    /// MCP tools over stdin/stdout
    Stdio,
}

#[derive(Parser, Debug)]
#[command(
    name = "file-process-server",
    version,
    about = "List directories, run commands and report the host name over HTTP or MCP"
)]
pub struct Config {
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    pub transport: Transport,

    /// Address the HTTP server listens on
    #[arg(long, env = "FILE_PROCESS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "FILE_PROCESS_LOG", default_value = "info")]
    pub log: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["file-process-server"]).unwrap();
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log, "info");
    }

    #[test]
    fn test_stdio_transport() {
        let config = Config::try_parse_from([
            "file-process-server",
            "--transport",
            "stdio",
            "--log",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.log, "debug");
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let parsed = Config::try_parse_from(["file-process-server", "--bind", "not-an-addr"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
