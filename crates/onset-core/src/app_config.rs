use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How search requests reach the upstream provider.
///
/// `Relay` posts to a same-origin relay that holds the credential itself;
/// `Direct` talks to the upstream API with the key from the environment.
#[derive(Clone, PartialEq, Eq)]
pub enum ApolloMode {
    Relay { url: String },
    Direct { api_key: String, base_url: String },
}

impl std::fmt::Debug for ApolloMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApolloMode::Relay { url } => f.debug_struct("Relay").field("url", url).finish(),
            ApolloMode::Direct { base_url, .. } => f
                .debug_struct("Direct")
                .field("api_key", &"[redacted]")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// `None` when neither a relay URL nor an API key is set.
    pub apollo: Option<ApolloMode>,
    pub apollo_request_timeout_secs: u64,
    pub apollo_page_size: u32,
    pub user_agent: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub enrich_min_interval_ms: u64,
    pub enrich_cooldown_secs: u64,
    pub export_dir: PathBuf,
    pub presets_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("apollo", &self.apollo)
            .field(
                "apollo_request_timeout_secs",
                &self.apollo_request_timeout_secs,
            )
            .field("apollo_page_size", &self.apollo_page_size)
            .field("user_agent", &self.user_agent)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("enrich_min_interval_ms", &self.enrich_min_interval_ms)
            .field("enrich_cooldown_secs", &self.enrich_cooldown_secs)
            .field("export_dir", &self.export_dir)
            .field("presets_path", &self.presets_path)
            .finish()
    }
}
