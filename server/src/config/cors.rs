use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// CORS for the mobile apps and the staff scanner web view.
///
/// Credentials are only allowed together with an explicit origin list;
/// browsers refuse `*` with credentials.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    match allowed_origins(origins) {
        Some(list) => layer.allow_origin(list).allow_credentials(true),
        None => {
            tracing::warn!(
                "CORS: No valid origins configured, using permissive settings for development"
            );
            layer.allow_origin(AllowOrigin::any())
        }
    }
}

fn allowed_origins(origins: &[String]) -> Option<AllowOrigin> {
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if values.is_empty() {
        None
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", values.len());
        Some(AllowOrigin::list(values))
    }
}
