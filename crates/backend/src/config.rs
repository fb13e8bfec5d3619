use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_FEED_TOPIC: &str = "NoraPublish";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub assets_dir: PathBuf,
    /// Topic publishers post position batches to, without a leading slash.
    pub feed_topic: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let port = match var("PORT") {
            Some(p) => p
                .parse()
                .map_err(|e| format!("Invalid PORT {:?}: {}", p, e))?,
            None => DEFAULT_PORT,
        };
        let assets_dir = PathBuf::from(var("ASSETS_DIR").unwrap_or_else(|| DEFAULT_ASSETS_DIR.to_string()));
        let feed_topic = normalize_topic(&var("FEED_TOPIC").unwrap_or_else(|| DEFAULT_FEED_TOPIC.to_string()));
        if feed_topic.is_empty() {
            return Err("FEED_TOPIC must not be empty".to_string());
        }
        Ok(Config {
            port,
            assets_dir,
            feed_topic,
        })
    }
}

/// Topics are compared without surrounding slashes, so `/NoraPublish` and
/// `NoraPublish` name the same feed.
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().trim_matches('/').to_string()
}
