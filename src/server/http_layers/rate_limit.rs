//! Per client IP rate limiting of the login endpoint, using tower-governor.

use crate::server::metrics::record_rate_limit_hit;
use anyhow::{anyhow, Result};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};
use tracing::{info, warn};

/// Keys requests by the IP of the connection, so that every connection
/// from the same host shares one bucket.
#[derive(Clone)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Limits `router` to `requests_per_minute` requests per IP, refilled
/// evenly over the minute.
pub fn with_login_rate_limit<S>(router: Router<S>, requests_per_minute: u32) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let requests_per_minute = requests_per_minute.max(1);
    let replenish = Duration::from_millis(60_000 / requests_per_minute as u64);
    let config = GovernorConfigBuilder::default()
        .period(replenish)
        .burst_size(requests_per_minute)
        .key_extractor(IpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("Invalid login rate limit: {}/minute", requests_per_minute))?;
    info!(
        "Login rate limit: {} requests/minute per IP",
        requests_per_minute
    );
    Ok(router
        .layer(GovernorLayer::new(Arc::new(config)))
        .layer(middleware::from_fn(record_rate_limited)))
}

/// Counts responses the rate limiter rejected.
async fn record_rate_limited(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        warn!("Rate limit exceeded on {}", path);
        record_rate_limit_hit(&path, "ip");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_key_ignores_port() {
        let extractor = IpKeyExtractor;
        let mut a = Request::builder().uri("/").body(()).unwrap();
        a.extensions_mut()
            .insert(ConnectInfo("127.0.0.1:1000".parse::<SocketAddr>().unwrap()));
        let mut b = Request::builder().uri("/").body(()).unwrap();
        b.extensions_mut()
            .insert(ConnectInfo("127.0.0.1:2000".parse::<SocketAddr>().unwrap()));

        assert_eq!(extractor.extract(&a).unwrap(), extractor.extract(&b).unwrap());
    }

    #[test]
    fn missing_connect_info_is_an_error() {
        let req = Request::builder().uri("/").body(()).unwrap();
        assert!(IpKeyExtractor.extract(&req).is_err());
    }
}
