use std::net::SocketAddr;

/// Client metadata recorded with a play.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl ClientContext {
    /// The first `X-Forwarded-For` entry wins over the connection address.
    /// A missing user agent becomes the empty string.
    pub fn new(
        forwarded_for: Option<&str>,
        remote_addr: Option<SocketAddr>,
        user_agent: Option<&str>,
    ) -> Self {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);
        Self {
            ip_address: forwarded.or_else(|| remote_addr.map(|addr| addr.ip().to_string())),
            user_agent: user_agent.unwrap_or_default().to_string(),
        }
    }
}
