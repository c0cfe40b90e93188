use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_MINHA_URL: &str = "https://minha.anem.dz/pre_inscription";

/// Typed configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_token: String,
    pub minha_url: String,
    pub subscribers_file: PathBuf,

    // Health endpoint
    pub port: u16,

    // Timing
    pub check_interval: Duration,
    pub fetch_timeout: Duration,
    pub poll_timeout: Duration,
    pub retry_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = lookup("TELEGRAM_TOKEN").unwrap_or_default();
        if telegram_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_TOKEN environment variable is required".to_string(),
            ));
        }

        let minha_url = lookup("MINHA_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_MINHA_URL.to_string());
        let subscribers_file = PathBuf::from(
            lookup("SUBSCRIBERS_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| "subscribers.json".to_string()),
        );

        let port = parse_num::<u16>(lookup("PORT")).unwrap_or(8000);

        // A zero interval would spin the monitor; clamp to one second.
        let check_interval = Duration::from_secs(
            parse_num::<u64>(lookup("CHECK_INTERVAL_SECONDS"))
                .unwrap_or(60)
                .max(1),
        );
        let fetch_timeout =
            Duration::from_secs(parse_num::<u64>(lookup("FETCH_TIMEOUT_SECONDS")).unwrap_or(15));
        let poll_timeout =
            Duration::from_secs(parse_num::<u64>(lookup("POLL_TIMEOUT_SECONDS")).unwrap_or(30));
        let retry_delay =
            Duration::from_secs(parse_num::<u64>(lookup("RETRY_DELAY_SECONDS")).unwrap_or(2));

        Ok(Self {
            telegram_token,
            minha_url,
            subscribers_file,
            port,
            check_interval,
            fetch_timeout,
            poll_timeout,
            retry_delay,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_num<T: std::str::FromStr>(v: Option<String>) -> Option<T> {
    v.and_then(|s| s.trim().parse::<T>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("TELEGRAM_TOKEN", "   ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let cfg = Config::from_lookup(lookup_from(&[("TELEGRAM_TOKEN", "123:abc")])).unwrap();
        assert_eq!(cfg.telegram_token, "123:abc");
        assert_eq!(cfg.minha_url, DEFAULT_MINHA_URL);
        assert_eq!(cfg.subscribers_file, PathBuf::from("subscribers.json"));
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.check_interval, Duration::from_secs(60));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(15));
        assert_eq!(cfg.poll_timeout, Duration::from_secs(30));
        assert_eq!(cfg.retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_TOKEN", "t"),
            ("MINHA_URL", "https://example.test/page"),
            ("CHECK_INTERVAL_SECONDS", "0"),
            ("PORT", "not-a-port"),
            ("SUBSCRIBERS_FILE", "/var/lib/minha/subs.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.minha_url, "https://example.test/page");
        assert_eq!(cfg.check_interval, Duration::from_secs(1));
        assert_eq!(cfg.port, 8000);
        assert_eq!(
            cfg.subscribers_file,
            PathBuf::from("/var/lib/minha/subs.json")
        );
    }

    #[test]
    fn dotenv_values_lose_their_quotes() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("abc"), "abc");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
