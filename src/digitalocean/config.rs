pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/v2";

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    /// Bearer token, or `@path` to read it from a file.
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_api_url")]
    pub api_url: url::Url,

    #[serde(default = "default_per_page")]
    pub per_page: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log every request and response body.
    #[serde(default)]
    pub debug_http: bool,
}

impl Config {
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_url: default_api_url(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
            debug_http: false,
        }
    }
}

fn default_api_url() -> url::Url {
    url::Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}

// The API clamps larger values to 200.
fn default_per_page() -> usize {
    200
}

fn default_timeout_secs() -> u64 {
    30
}
