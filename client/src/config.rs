use crate::error::ClientError;
use url::Url;

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: Url,
}

impl ClientSettings {
    /// Reads `DOCGEN_URL`, after loading an optional `.env` file.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenv::dotenv().ok();
        Self::from_value(std::env::var("DOCGEN_URL").ok())
    }

    pub fn from_value(raw: Option<String>) -> Result<Self, ClientError> {
        let raw = raw
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        Ok(ClientSettings {
            base_url: Url::parse(raw.trim())?,
        })
    }
}
