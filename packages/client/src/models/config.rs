use std::env;
use std::time::Duration;

use super::cli::Opt;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
// Agent decisions can take minutes, the backend keeps connections open for 30.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_TYPEWRITER_MS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    // issue speculative requests at all
    pub prefetch: bool,
    pub typewriter_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            prefetch: true,
            typewriter_delay: Duration::from_millis(DEFAULT_TYPEWRITER_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("WEREWOLF_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let request_timeout = env::var("WEREWOLF_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let prefetch = env::var("WEREWOLF_PREFETCH")
            .map(|v| v != "false")
            .unwrap_or(true);
        let typewriter_delay = env::var("WEREWOLF_TYPEWRITER_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_TYPEWRITER_MS));

        Self {
            base_url,
            request_timeout,
            prefetch,
            typewriter_delay,
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, opt: &Opt) -> Self {
        if let Some(base_url) = &opt.base_url {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = opt.timeout {
            self.request_timeout = Duration::from_secs(secs);
        }
        if opt.no_prefetch {
            self.prefetch = false;
        }
        if let Some(ms) = opt.typewriter_ms {
            self.typewriter_delay = Duration::from_millis(ms);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use structopt::StructOpt;

    const VARS: [&str; 4] = [
        "WEREWOLF_BASE_URL",
        "WEREWOLF_REQUEST_TIMEOUT_SECS",
        "WEREWOLF_PREFETCH",
        "WEREWOLF_TYPEWRITER_MS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(ClientConfig::from_env(), ClientConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variables() {
        clear_env();
        env::set_var("WEREWOLF_BASE_URL", "http://game.local:9000/");
        env::set_var("WEREWOLF_REQUEST_TIMEOUT_SECS", "12");
        env::set_var("WEREWOLF_PREFETCH", "false");
        env::set_var("WEREWOLF_TYPEWRITER_MS", "bogus");

        let config = ClientConfig::from_env();
        assert_eq!(config.base_url, "http://game.local:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert!(!config.prefetch);
        assert_eq!(
            config.typewriter_delay,
            Duration::from_millis(DEFAULT_TYPEWRITER_MS)
        );
        clear_env();
    }

    #[test]
    fn test_cli_overrides() {
        let opt = Opt::from_iter(&[
            "werewolf-client",
            "--base-url",
            "http://other:1/",
            "--timeout",
            "5",
            "--no-prefetch",
        ]);
        let config = ClientConfig::default().with_overrides(&opt);
        assert_eq!(config.base_url, "http://other:1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.prefetch);
    }
}
