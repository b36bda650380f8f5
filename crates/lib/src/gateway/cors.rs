//! CORS layer for browser clients.

use crate::config::CorsConfig;
use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

fn is_wildcard(list: &[String]) -> bool {
    list.iter().any(|s| s.trim() == "*")
}

/// Build the CORS layer from config.
///
/// With credentials enabled, a `"*"` method or header list mirrors the preflight request
/// (browsers reject literal `*` alongside credentials). A `"*"` origin with credentials is a
/// configuration error.
pub fn build_cors_layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    let any_origin = is_wildcard(&cfg.allowed_origins);
    if any_origin && cfg.allow_credentials {
        anyhow::bail!(
            "CORS misconfiguration: allowedOrigins [\"*\"] cannot be combined with allowCredentials; list explicit origins"
        );
    }

    let origin = if any_origin {
        log::warn!("CORS allows any origin");
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|s| match HeaderValue::from_str(s.trim()) {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("ignoring invalid CORS origin: {}", s);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    let methods = if is_wildcard(&cfg.allowed_methods) {
        if cfg.allow_credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        let methods: Vec<Method> = cfg
            .allowed_methods
            .iter()
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        AllowMethods::list(methods)
    };

    let headers = if is_wildcard(&cfg.allowed_headers) {
        if cfg.allow_credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        let headers: Vec<HeaderName> = cfg
            .allowed_headers
            .iter()
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        AllowHeaders::list(headers)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(cfg.allow_credentials);
    if cfg.max_age_seconds > 0 {
        layer = layer.max_age(Duration::from_secs(cfg.max_age_seconds));
    }
    Ok(layer)
}
