use std::path::PathBuf;

use anyhow::{Context, bail};

use bbgraph_types::models::Role;
use bbgraph_types::settings::{ForumSettings, TotalCountDisplay};

const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

const DEV_SECRET: &str = "dev-secret-change-me";

/// Everything the server reads from the environment, parsed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Forums created when the database holds none.
    pub bootstrap_forums: Vec<String>,
    pub forum: ForumSettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        check_secret(&config.jwt_secret, cfg!(debug_assertions))?;
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = ForumSettings::default();

        let port = match var("BBGRAPH_PORT") {
            Some(raw) => raw.trim().parse().with_context(|| format!("BBGRAPH_PORT is not a port: {raw}"))?,
            None => 3000,
        };

        let total_counts = TotalCountDisplay {
            enabled: flag(var("BBGRAPH_TOTAL_COUNTS"), "BBGRAPH_TOTAL_COUNTS", false)?,
            // the label keeps its spacing, so read it unfiltered
            label: lookup("BBGRAPH_TOTAL_COUNT_LABEL").unwrap_or_else(|| TotalCountDisplay::default().label),
            hidden_roles: match var("BBGRAPH_TOTAL_COUNT_HIDDEN_ROLES") {
                Some(raw) => parse_roles(&raw)?,
                None => Vec::new(),
            },
        };

        Ok(Self {
            jwt_secret: var("BBGRAPH_JWT_SECRET").unwrap_or_else(|| DEV_SECRET.into()),
            db_path: var("BBGRAPH_DB_PATH").unwrap_or_else(|| "bbgraph.db".into()).into(),
            host: var("BBGRAPH_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            bootstrap_forums: var("BBGRAPH_BOOTSTRAP_FORUMS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            forum: ForumSettings {
                site_url: var("BBGRAPH_SITE_URL")
                    .map(|url| url.trim().trim_end_matches('/').to_string())
                    .unwrap_or(defaults.site_url),
                allow_topic_tags: flag(var("BBGRAPH_ALLOW_TOPIC_TAGS"), "BBGRAPH_ALLOW_TOPIC_TAGS", defaults.allow_topic_tags)?,
                subscriptions_enabled: flag(var("BBGRAPH_SUBSCRIPTIONS"), "BBGRAPH_SUBSCRIPTIONS", defaults.subscriptions_enabled)?,
                total_counts,
            },
        })
    }
}

/// Refuses an unset or placeholder signing secret unless `allow_placeholder`.
pub fn check_secret(secret: &str, allow_placeholder: bool) -> anyhow::Result<()> {
    if secret.is_empty() || PLACEHOLDER_SECRETS.contains(&secret) {
        if allow_placeholder {
            tracing::warn!("BBGRAPH_JWT_SECRET is unset or a placeholder; tokens are forgeable");
            return Ok(());
        }
        bail!("BBGRAPH_JWT_SECRET is unset or still a placeholder. Set it in your .env file and restart.");
    }
    Ok(())
}

fn flag(raw: Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}

fn parse_roles(raw: &str) -> anyhow::Result<Vec<Role>> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Role::parse(name).with_context(|| format!("unknown role in BBGRAPH_TOTAL_COUNT_HIDDEN_ROLES: {name}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("bbgraph.db"));
        assert!(config.forum.allow_topic_tags);
        assert!(config.forum.subscriptions_enabled);
        assert!(!config.forum.total_counts.enabled);
        assert!(config.bootstrap_forums.is_empty());
    }

    #[test]
    fn reads_forum_switches() {
        let config = config(&[
            ("BBGRAPH_PORT", "8080"),
            ("BBGRAPH_SITE_URL", "https://forum.example.org/"),
            ("BBGRAPH_ALLOW_TOPIC_TAGS", "off"),
            ("BBGRAPH_SUBSCRIPTIONS", "0"),
            ("BBGRAPH_TOTAL_COUNTS", "yes"),
            ("BBGRAPH_TOTAL_COUNT_LABEL", "Posts: "),
            ("BBGRAPH_TOTAL_COUNT_HIDDEN_ROLES", "Keymaster, blocked"),
            ("BBGRAPH_BOOTSTRAP_FORUMS", "General, ,Announcements"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.forum.site_url, "https://forum.example.org");
        assert!(!config.forum.allow_topic_tags);
        assert!(!config.forum.subscriptions_enabled);
        assert!(config.forum.total_counts.enabled);
        assert_eq!(config.forum.total_counts.label, "Posts: ");
        assert_eq!(config.forum.total_counts.hidden_roles, vec![Role::Keymaster, Role::Blocked]);
        assert_eq!(config.bootstrap_forums, vec!["General", "Announcements"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("BBGRAPH_PORT", "http")]).is_err());
        assert!(config(&[("BBGRAPH_SUBSCRIPTIONS", "maybe")]).is_err());
        assert!(config(&[("BBGRAPH_TOTAL_COUNT_HIDDEN_ROLES", "admin")]).is_err());
    }

    #[test]
    fn placeholder_secret_only_in_development() {
        assert!(check_secret("dev-secret-change-me", true).is_ok());
        assert!(check_secret("dev-secret-change-me", false).is_err());
        assert!(check_secret("", false).is_err());
        assert!(check_secret("b1f0c4e7a9", false).is_ok());
    }
}
