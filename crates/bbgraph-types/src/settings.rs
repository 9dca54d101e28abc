use crate::models::Role;

/// Site-wide forum switches, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ForumSettings {
    /// Base URL used to build freshness links, without trailing slash.
    pub site_url: String,
    pub allow_topic_tags: bool,
    pub subscriptions_enabled: bool,
    pub total_counts: TotalCountDisplay,
}

impl Default for ForumSettings {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:3000".into(),
            allow_topic_tags: true,
            subscriptions_enabled: true,
            total_counts: TotalCountDisplay::default(),
        }
    }
}

/// Controls the "total posts" badge shown next to authors.
#[derive(Debug, Clone)]
pub struct TotalCountDisplay {
    pub enabled: bool,
    pub label: String,
    pub hidden_roles: Vec<Role>,
}

impl Default for TotalCountDisplay {
    fn default() -> Self {
        Self {
            enabled: false,
            label: "Total: ".into(),
            hidden_roles: Vec::new(),
        }
    }
}
