use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.twitch.tv/kraken/";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// `TOP_GAMES_BASE_URL`, `TOP_GAMES_CLIENT_ID` and `TOP_GAMES_PAGE_SIZE`
    /// replace the matching fields when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("TOP_GAMES_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("TOP_GAMES_CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Ok(v) = std::env::var("TOP_GAMES_PAGE_SIZE") {
            if let Ok(n) = v.parse::<u32>() {
                self.page_size = n;
            }
        }
        self
    }
}
