use std::time::Duration;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Connection settings for the hosted store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project base URL, without a trailing slash.
    pub supabase_url: String,
    /// Public anonymous key sent with every request.
    pub anon_key: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                           | Default  |
    /// |-----------------------------------|----------|
    /// | `SUPABASE_URL`                    | required |
    /// | `SUPABASE_ANON_KEY`               | required |
    /// | `LAZYTINTS_REQUEST_TIMEOUT_SECS`  | `30`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        if !(supabase_url.starts_with("https://") || supabase_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                var: "SUPABASE_URL",
                reason: format!("expected an http(s) URL, got {supabase_url:?}"),
            });
        }

        let anon_key = required("SUPABASE_ANON_KEY")?;

        let request_timeout_secs = match lookup("LAZYTINTS_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "LAZYTINTS_REQUEST_TIMEOUT_SECS",
                    reason: format!("expected a positive number of seconds, got {raw:?}"),
                })?,
        };

        Ok(Self {
            supabase_url,
            anon_key,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_required_values_with_default_timeout() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();
        assert_eq!(config.supabase_url, "https://abc.supabase.co");
        assert_eq!(config.anon_key, "anon");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_values_are_named() {
        assert_eq!(
            Config::from_lookup(lookup(&[("SUPABASE_ANON_KEY", "anon")])).unwrap_err(),
            ConfigError::Missing("SUPABASE_URL")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[
                ("SUPABASE_URL", "https://abc.supabase.co"),
                ("SUPABASE_ANON_KEY", "   "),
            ]))
            .unwrap_err(),
            ConfigError::Missing("SUPABASE_ANON_KEY")
        );
    }

    #[test]
    fn rejects_non_http_url() {
        let err = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SUPABASE_URL", .. }));
    }

    #[test]
    fn timeout_override() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("LAZYTINTS_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        for bad in ["0", "soon"] {
            let err = Config::from_lookup(lookup(&[
                ("SUPABASE_URL", "http://localhost:54321"),
                ("SUPABASE_ANON_KEY", "anon"),
                ("LAZYTINTS_REQUEST_TIMEOUT_SECS", bad),
            ]))
            .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { var: "LAZYTINTS_REQUEST_TIMEOUT_SECS", .. }
            ));
        }
    }
}
