mod rate_limit;
mod requests_logging;

pub use rate_limit::{with_login_rate_limit, IpKeyExtractor};
pub use requests_logging::{log_requests, RequestsLoggingLevel};
