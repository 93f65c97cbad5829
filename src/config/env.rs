//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use super::AppConfig;
use crate::http::AuthMode;
use crate::results::ReportFormat;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SPORTMONKS_PROBE";

/// Variable holding the API token
pub const TOKEN_VAR: &str = "SPORTMONKS_API_TOKEN";

/// Configuration overrides read from the environment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// SPORTMONKS_PROBE_BASE_URL
    pub base_url: Option<String>,
    /// SPORTMONKS_PROBE_RATE_LIMIT_MS
    pub rate_limit_ms: Option<u64>,
    /// SPORTMONKS_PROBE_TIMEOUT
    pub timeout: Option<u64>,
    /// SPORTMONKS_PROBE_FORMAT
    pub format: Option<String>,
    /// SPORTMONKS_PROBE_OUTPUT_DIR
    pub output_dir: Option<String>,
    /// SPORTMONKS_PROBE_AUTH
    pub auth: Option<String>,
    /// SPORTMONKS_PROBE_CONFIG
    pub config_file: Option<String>,
    /// SPORTMONKS_API_TOKEN
    pub token: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: get_env("BASE_URL"),
            rate_limit_ms: get_env_parse("RATE_LIMIT_MS"),
            timeout: get_env_parse("TIMEOUT"),
            format: get_env("FORMAT"),
            output_dir: get_env("OUTPUT_DIR"),
            auth: get_env("AUTH"),
            config_file: get_env("CONFIG"),
            token: env::var(TOKEN_VAR).ok().filter(|t| !t.is_empty()),
        }
    }

    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.rate_limit_ms.is_some()
            || self.timeout.is_some()
            || self.format.is_some()
            || self.output_dir.is_some()
            || self.auth.is_some()
            || self.config_file.is_some()
    }

    /// Overlay the set variables onto `config`.
    ///
    /// Unknown report formats or auth modes are ignored with a warning.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = self.rate_limit_ms {
            config.rate_limit_interval_ms = ms;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(format) = &self.format {
            match ReportFormat::from_str(format) {
                Some(format) => config.report_format = format,
                None => tracing::warn!("Ignoring unknown {ENV_PREFIX}_FORMAT '{format}'"),
            }
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(auth) = &self.auth {
            match AuthMode::from_str(auth) {
                Some(auth) => config.auth = auth,
                None => tracing::warn!("Ignoring unknown {ENV_PREFIX}_AUTH '{auth}'"),
            }
        }
    }

    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_BASE_URL:      {:?}", ENV_PREFIX, self.base_url);
        println!("  {}_RATE_LIMIT_MS: {:?}", ENV_PREFIX, self.rate_limit_ms);
        println!("  {}_TIMEOUT:       {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_FORMAT:        {:?}", ENV_PREFIX, self.format);
        println!("  {}_OUTPUT_DIR:    {:?}", ENV_PREFIX, self.output_dir);
        println!("  {}_AUTH:          {:?}", ENV_PREFIX, self.auth);
        println!("  {}_CONFIG:        {:?}", ENV_PREFIX, self.config_file);
        println!(
            "  {}:          {}",
            TOKEN_VAR,
            if self.token.is_some() { "<set>" } else { "<unset>" }
        );
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {TOKEN_VAR}             API token");
    println!("  {ENV_PREFIX}_BASE_URL       API base URL");
    println!("  {ENV_PREFIX}_RATE_LIMIT_MS  Minimum milliseconds between requests");
    println!("  {ENV_PREFIX}_TIMEOUT        Request timeout in seconds");
    println!("  {ENV_PREFIX}_FORMAT         Report format (json, csv, markdown, text)");
    println!("  {ENV_PREFIX}_OUTPUT_DIR     Directory for saved reports");
    println!("  {ENV_PREFIX}_AUTH           Token placement (query, header, both)");
    println!("  {ENV_PREFIX}_CONFIG         Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {TOKEN_VAR}=your-token");
    println!("  export {ENV_PREFIX}_FORMAT=markdown");
    println!("  sportmonks-probe run --category odds");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets variables for the guard's lifetime and restores them on drop
    struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let previous = vars
                .iter()
                .map(|(k, v)| {
                    let old = env::var(k).ok();
                    env::set_var(k, v);
                    (k.to_string(), old)
                })
                .collect();
            Self { previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(!config.has_any());
        let mut app = AppConfig::default();
        config.apply_to(&mut app);
        assert_eq!(app, AppConfig::default());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = EnvGuard::set(&[
            ("SPORTMONKS_PROBE_BASE_URL", "http://localhost:8080/v3/"),
            ("SPORTMONKS_PROBE_RATE_LIMIT_MS", "250"),
            ("SPORTMONKS_PROBE_TIMEOUT", "not-a-number"),
        ]);

        let config = EnvConfig::load();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v3/"));
        assert_eq!(config.rate_limit_ms, Some(250));
        assert_eq!(config.timeout, None);
        assert!(config.has_any());
    }

    #[test]
    fn test_apply_to() {
        let overrides = EnvConfig {
            base_url: Some("http://localhost:8080/v3/".to_string()),
            rate_limit_ms: Some(250),
            format: Some("markdown".to_string()),
            output_dir: Some("/tmp/reports".to_string()),
            auth: Some("header".to_string()),
            ..Default::default()
        };
        let mut config = AppConfig::default();
        overrides.apply_to(&mut config);

        assert_eq!(config.base_url, "http://localhost:8080/v3");
        assert_eq!(config.rate_limit_interval_ms, 250);
        assert_eq!(config.report_format, ReportFormat::Markdown);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(config.auth, AuthMode::Header);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_values_ignored() {
        let overrides = EnvConfig {
            format: Some("xml".to_string()),
            auth: Some("cookie".to_string()),
            ..Default::default()
        };
        let mut config = AppConfig::default();
        overrides.apply_to(&mut config);
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.auth, AuthMode::Both);
    }
}
