//! Service configuration.
//!
//! Flags win over environment variables, which win over defaults.
//!
//! | Flag               | Environment             | Default          |
//! |--------------------|-------------------------|------------------|
//! | `--bind`           | `VERSE_BIND`            | `127.0.0.1:7070` |
//! | `--corpus-url`     | `VERSE_CORPUS_URL`      | none             |
//! | `--corpus-file`    | `VERSE_CORPUS_FILE`     | none             |
//! | `--corpus-version` | `VERSE_CORPUS_VERSION`  | `v1`             |
//! | `--storage-dir`    | `VERSE_STORAGE_DIR`     | in-memory        |
//! | `--storage-prefix` | `VERSE_STORAGE_PREFIX`  | `verse`          |
//! | `--limit`          | `VERSE_SEARCH_LIMIT`    | `40`             |
//! | `--log-level`      | `VERSE_LOG`             | `info`           |

use crate::ingestion::types::CorpusSource;
use crate::search::types::DEFAULT_LIMIT;
use crate::storage::annotations::DEFAULT_PREFIX;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:7070";
pub const DEFAULT_CORPUS_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub corpus_url: Option<String>,
    pub corpus_file: Option<PathBuf>,
    pub corpus_version: String,
    pub storage_dir: Option<PathBuf>,
    pub storage_prefix: String,
    pub search_limit: usize,
    pub log_level: tracing::Level,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown flag {0}")]
    UnknownFlag(String),
    #[error("invalid bind address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid search limit {value:?}: {source}")]
    InvalidLimit {
        value: String,
        source: std::num::ParseIntError,
    },
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}

const FLAGS: &[(&str, &str)] = &[
    ("--bind", "VERSE_BIND"),
    ("--corpus-url", "VERSE_CORPUS_URL"),
    ("--corpus-file", "VERSE_CORPUS_FILE"),
    ("--corpus-version", "VERSE_CORPUS_VERSION"),
    ("--storage-dir", "VERSE_STORAGE_DIR"),
    ("--storage-prefix", "VERSE_STORAGE_PREFIX"),
    ("--limit", "VERSE_SEARCH_LIMIT"),
    ("--log-level", "VERSE_LOG"),
];

impl Config {
    /// Reads `std::env::args()` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args, |name| std::env::var(name).ok())
    }

    /// Parses flags (without the program name), consulting `env` for anything unset.
    pub fn parse<F>(args: &[String], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values: HashMap<&str, String> = HashMap::new();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let Some((name, _)) = FLAGS.iter().find(|(name, _)| *name == flag) else {
                return Err(ConfigError::UnknownFlag(flag.to_string()));
            };
            let value = args
                .get(i + 1)
                .filter(|value| !value.starts_with("--"))
                .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
            values.insert(*name, value.clone());
            i += 2;
        }

        for (name, var) in FLAGS {
            if !values.contains_key(name) {
                if let Some(value) = env(var).filter(|value| !value.is_empty()) {
                    values.insert(*name, value);
                }
            }
        }

        let bind = values
            .remove("--bind")
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr: SocketAddr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                value: bind.clone(),
                source,
            })?;

        let search_limit = match values.remove("--limit") {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidLimit { value, source })?,
            None => DEFAULT_LIMIT,
        };

        let log_level = match values.remove("--log-level") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidLogLevel(value))?,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            bind_addr,
            corpus_url: values.remove("--corpus-url"),
            corpus_file: values.remove("--corpus-file").map(PathBuf::from),
            corpus_version: values
                .remove("--corpus-version")
                .unwrap_or_else(|| DEFAULT_CORPUS_VERSION.to_string()),
            storage_dir: values.remove("--storage-dir").map(PathBuf::from),
            storage_prefix: values
                .remove("--storage-prefix")
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            search_limit,
            log_level,
        })
    }

    /// URL first, then file, then the bundled sample.
    pub fn corpus_source(&self) -> CorpusSource {
        if let Some(url) = &self.corpus_url {
            CorpusSource::Url(url.clone())
        } else if let Some(path) = &self.corpus_file {
            CorpusSource::File(path.clone())
        } else {
            CorpusSource::Bundled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse(&[], no_env).unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.corpus_version, "v1");
        assert_eq!(config.storage_prefix, "verse");
        assert_eq!(config.search_limit, 40);
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert_eq!(config.corpus_source(), CorpusSource::Bundled);
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_flags_override_env() {
        let env = |name: &str| match name {
            "VERSE_BIND" => Some("0.0.0.0:9000".to_string()),
            "VERSE_SEARCH_LIMIT" => Some("5".to_string()),
            _ => None,
        };
        let config = Config::parse(&args(&["--bind", "127.0.0.1:8000"]), env).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.search_limit, 5);
    }

    #[test]
    fn test_corpus_source_precedence() {
        let config = Config::parse(
            &args(&[
                "--corpus-file",
                "/tmp/corpus.json",
                "--corpus-url",
                "https://cdn.example.org/{version}/corpus.json",
            ]),
            no_env,
        )
        .unwrap();
        assert_eq!(
            config.corpus_source(),
            CorpusSource::Url("https://cdn.example.org/{version}/corpus.json".to_string())
        );

        let config = Config::parse(&args(&["--corpus-file", "/tmp/corpus.json"]), no_env).unwrap();
        assert_eq!(
            config.corpus_source(),
            CorpusSource::File(PathBuf::from("/tmp/corpus.json"))
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::parse(&args(&["--bind", "nowhere"]), no_env),
            Err(ConfigError::InvalidAddress { .. })
        ));
        assert!(matches!(
            Config::parse(&args(&["--limit", "many"]), no_env),
            Err(ConfigError::InvalidLimit { .. })
        ));
        assert!(matches!(
            Config::parse(&args(&["--log-level", "chatty"]), no_env),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            Config::parse(&args(&["--limit"]), no_env),
            Err(ConfigError::MissingValue(_))
        ));
        assert!(matches!(
            Config::parse(&args(&["--seed", "x"]), no_env),
            Err(ConfigError::UnknownFlag(_))
        ));
    }
}
