//! Process configuration read from the environment.

use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://teamcollab.db?mode=rwc";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Rows rendered by `list_tasks` before the remaining count
    pub page_size: usize,
    /// Rows rendered by `my_tasks` before "...and N more"
    pub my_tasks_page_size: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            page_size: 15,
            my_tasks_page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub assistant: AssistantConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            assistant: AssistantConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take defaults; unparsable numbers
    /// are logged and take defaults too.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", non_empty("PORT"), defaults.port),
            assistant: AssistantConfig {
                page_size: parse_or(
                    "ASSISTANT_PAGE_SIZE",
                    non_empty("ASSISTANT_PAGE_SIZE"),
                    defaults.assistant.page_size,
                ),
                my_tasks_page_size: parse_or(
                    "ASSISTANT_MY_TASKS_PAGE_SIZE",
                    non_empty("ASSISTANT_MY_TASKS_PAGE_SIZE"),
                    defaults.assistant.my_tasks_page_size,
                ),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Invalid value {value:?} for {key}, using default {default}");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.assistant.page_size, 15);
        assert_eq!(config.assistant.my_tasks_page_size, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("ASSISTANT_PAGE_SIZE", "5"),
        ]));
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.assistant.page_size, 5);
        assert_eq!(config.assistant.my_tasks_page_size, 10);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("ASSISTANT_MY_TASKS_PAGE_SIZE", "-3"),
            ("HOST", "  "),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.assistant.my_tasks_page_size, 10);
        assert_eq!(config.host, DEFAULT_HOST);
    }
}
