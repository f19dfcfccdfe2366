use super::*;

fn direct(base_url: &str) -> ApolloClient {
    ApolloClient::with_base_url("test-key", base_url, 5).expect("client construction should not fail")
}

#[test]
fn direct_url_appends_search_endpoint() {
    let client = direct("https://api.apollo.io/v1");
    assert_eq!(
        client.search_url().as_str(),
        "https://api.apollo.io/v1/mixed_companies/search"
    );
}

#[test]
fn direct_url_strips_trailing_slash() {
    let client = direct("https://api.apollo.io/v1/");
    assert_eq!(
        client.search_url().as_str(),
        "https://api.apollo.io/v1/mixed_companies/search"
    );
}

#[test]
fn relay_url_carries_endpoint_query() {
    let client = ApolloClient::relay("https://leads.example.com/.netlify/functions/apollo-proxy", 5)
        .expect("client construction should not fail");
    assert_eq!(
        client.search_url().as_str(),
        "https://leads.example.com/.netlify/functions/apollo-proxy?endpoint=%2Fmixed_companies%2Fsearch"
    );
}

#[test]
fn invalid_relay_url_is_rejected() {
    let err = ApolloClient::relay("not a url", 5).unwrap_err();
    assert!(matches!(err, ApolloError::InvalidUrl { .. }));
}

#[test]
fn debug_output_redacts_api_key() {
    let client = direct("https://api.apollo.io/v1");
    let debug = format!("{client:?}");
    assert!(!debug.contains("test-key"), "api key leaked: {debug}");
    assert!(debug.contains("[redacted]"));
}

#[tokio::test]
async fn page_zero_is_rejected_before_any_request() {
    let client = direct("http://127.0.0.1:9");
    let err = client
        .search_companies(&SearchFilters::default(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ApolloError::InvalidPage));
}

fn config_with(apollo: Option<ApolloMode>) -> AppConfig {
    AppConfig {
        env: onset_core::Environment::Test,
        log_level: "info".to_string(),
        apollo,
        apollo_request_timeout_secs: 5,
        apollo_page_size: 25,
        user_agent: "onset-test".to_string(),
        openai_api_key: None,
        openai_base_url: "https://api.openai.com/v1".to_string(),
        openai_model: "gpt-4o".to_string(),
        enrich_min_interval_ms: 1100,
        enrich_cooldown_secs: 65,
        export_dir: std::path::PathBuf::from("."),
        presets_path: std::path::PathBuf::from("./config/presets.yaml"),
    }
}

#[test]
fn from_config_requires_a_search_credential() {
    let err = ApolloClient::from_config(&config_with(None)).unwrap_err();
    assert!(matches!(err, ApolloError::MissingCredential), "got {err:?}");
    assert!(err.to_string().contains("APOLLO_API_KEY"));
}

#[test]
fn from_config_builds_relay_client() {
    let client = ApolloClient::from_config(&config_with(Some(ApolloMode::Relay {
        url: "http://localhost:8888/relay".to_string(),
    })))
    .unwrap();
    assert_eq!(
        client.search_url().as_str(),
        "http://localhost:8888/relay?endpoint=%2Fmixed_companies%2Fsearch"
    );
}
