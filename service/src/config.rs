use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default number of seconds between SSE keep-alive comments.
pub const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

/// Default upper bound on a request body; artifacts are whole HTML documents.
pub const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// HMAC secret used to verify bearer tokens presented by callers.
    /// Without it every authenticated endpoint rejects requests with 401.
    #[arg(long, env, hide_env_values = true)]
    jwt_signing_key: Option<String>,

    /// Seconds between keep-alive comments sent on idle SSE streams
    #[arg(long, env, default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS)]
    pub sse_keep_alive_secs: u64,

    /// Largest accepted request body in bytes
    #[arg(long, env, default_value_t = DEFAULT_MAX_REQUEST_BODY_BYTES)]
    pub max_request_body_bytes: usize,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_jwt_signing_key(mut self, jwt_signing_key: String) -> Self {
        self.jwt_signing_key = Some(jwt_signing_key);
        self
    }

    /// Returns the bearer token signing key, if configured.
    pub fn jwt_signing_key(&self) -> Option<String> {
        self.jwt_signing_key.clone()
    }

    /// Socket address string the server binds to, e.g. `127.0.0.1:4000`.
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.interface.as_deref().unwrap_or("127.0.0.1"),
            self.port
        )
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["artifact_relay"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("nope".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = parse(&[
            "--interface",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-level-filter",
            "DEBUG",
            "--runtime-env",
            "production",
            "--sse-keep-alive-secs",
            "30",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ]);

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert_eq!(config.runtime_env(), RustEnv::Production);
        assert_eq!(config.sse_keep_alive_secs, 30);
        assert_eq!(config.max_request_body_bytes, DEFAULT_MAX_REQUEST_BODY_BYTES);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn set_jwt_signing_key_overrides_value() {
        let config = parse(&["--jwt-signing-key", "old"]).set_jwt_signing_key("new".to_string());
        assert_eq!(config.jwt_signing_key().as_deref(), Some("new"));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let result = Config::try_parse_from(["artifact_relay", "--log-level-filter", "LOUD"]);
        assert!(result.is_err());
    }
}
