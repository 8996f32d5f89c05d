use super::*;

fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_owned())
    }
}

// =============================================================
// SocketConfig
// =============================================================

#[test]
fn socket_config_accepts_ws_and_wss() {
    assert_eq!(SocketConfig::new("ws://localhost:3000/ws").unwrap().target(), "ws://localhost:3000/ws");
    assert_eq!(
        SocketConfig::new("wss://echo.example/socket").unwrap().target(),
        "wss://echo.example/socket"
    );
}

#[test]
fn socket_config_rejects_other_schemes() {
    assert_eq!(
        SocketConfig::new("https://echo.example/socket"),
        Err(ConfigError::InvalidTarget("https://echo.example/socket".into()))
    );
    assert!(SocketConfig::new("echo.example").is_err());
}

#[test]
fn socket_config_rejects_missing_host() {
    assert!(SocketConfig::new("ws://").is_err());
    assert!(SocketConfig::new("wss:///socket").is_err());
}

#[test]
fn socket_config_from_lookup_reads_target() {
    let cfg = SocketConfig::from_lookup(lookup_from(&[(SOCKET_URL_VAR, " ws://127.0.0.1:9000/ ")])).unwrap();
    assert_eq!(cfg.target(), "ws://127.0.0.1:9000/");
}

#[test]
fn socket_config_from_lookup_requires_target() {
    assert_eq!(
        SocketConfig::from_lookup(lookup_from(&[])),
        Err(ConfigError::Missing { var: SOCKET_URL_VAR })
    );
}

// =============================================================
// RequestConfig
// =============================================================

#[test]
fn request_config_default_has_no_base() {
    let cfg = RequestConfig::default();
    assert!(cfg.base_url.is_none());
    assert!(cfg.default_headers.is_empty());
}

#[test]
fn request_config_trims_trailing_slash() {
    let cfg = RequestConfig::default().with_base_url("https://api.example/").unwrap();
    assert_eq!(cfg.base_url.as_deref(), Some("https://api.example"));
}

#[test]
fn request_config_rejects_non_http_base() {
    assert_eq!(
        RequestConfig::default().with_base_url("ws://api.example"),
        Err(ConfigError::InvalidBaseUrl("ws://api.example".into()))
    );
}

#[test]
fn resolve_passes_absolute_urls_through() {
    let cfg = RequestConfig::default().with_base_url("https://api.example").unwrap();
    assert_eq!(
        cfg.resolve("http://other.example/items"),
        Ok("http://other.example/items".to_owned())
    );
}

#[test]
fn resolve_joins_relative_paths() {
    let cfg = RequestConfig::default().with_base_url("https://api.example/").unwrap();
    assert_eq!(cfg.resolve("/items"), Ok("https://api.example/items".to_owned()));
    assert_eq!(cfg.resolve("items/1"), Ok("https://api.example/items/1".to_owned()));
}

#[test]
fn resolve_ignores_trailing_slash_on_literal_base() {
    let cfg = RequestConfig { base_url: Some("http://x/".into()), ..RequestConfig::default() };
    assert_eq!(cfg.resolve("/items"), Ok("http://x/items".to_owned()));
    assert_eq!(cfg.resolve("items"), Ok("http://x/items".to_owned()));
}

#[test]
fn resolve_without_base_rejects_relative() {
    assert_eq!(
        RequestConfig::default().resolve("/items"),
        Err(ConfigError::RelativeUrl("/items".into()))
    );
}

#[test]
fn resolve_rejects_other_schemes() {
    let unsupported = Err(ConfigError::UnsupportedScheme("ftp".into()));
    assert_eq!(RequestConfig::default().resolve("ftp://host/x"), unsupported);

    let cfg = RequestConfig::default().with_base_url("https://api.example").unwrap();
    assert_eq!(cfg.resolve("ftp://host/x"), unsupported);
    assert_eq!(
        cfg.resolve("wss://host/socket"),
        Err(ConfigError::UnsupportedScheme("wss".into()))
    );
}

#[test]
fn resolve_treats_embedded_scheme_text_as_path() {
    let cfg = RequestConfig::default().with_base_url("https://api.example").unwrap();
    assert_eq!(
        cfg.resolve("/redirect?to=http://elsewhere"),
        Ok("https://api.example/redirect?to=http://elsewhere".to_owned())
    );
}

#[test]
fn request_config_from_lookup_optional_base() {
    assert_eq!(RequestConfig::from_lookup(lookup_from(&[])).unwrap(), RequestConfig::default());
    let cfg = RequestConfig::from_lookup(lookup_from(&[(HTTP_BASE_URL_VAR, "http://127.0.0.1:8080/")])).unwrap();
    assert_eq!(cfg.base_url.as_deref(), Some("http://127.0.0.1:8080"));
}

#[test]
fn request_config_default_headers_accumulate() {
    let cfg = RequestConfig::default()
        .with_default_header("Authorization", "Bearer t")
        .with_default_header("X-Trace", "1");
    assert_eq!(cfg.default_headers.len(), 2);
    assert_eq!(cfg.default_headers["X-Trace"], "1");
}
