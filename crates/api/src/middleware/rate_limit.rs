//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use newsroom_common::errors::AppError;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter keyed by client IP, using the governor crate
pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Create a new rate limiter; zero config values fall back to a minimal quota
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Arc<IpRateLimiter> {
    let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst).unwrap_or(per_second);
    let quota = Quota::per_second(per_second).allow_burst(burst);

    Arc::new(RateLimiter::keyed(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<IpRateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match limiter.check_key(&addr.ip()) {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(client = %addr.ip(), "Rate limit exceeded");
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_within_quota() {
        let limiter = create_rate_limiter(100, 200);
        let client: IpAddr = "127.0.0.1".parse().unwrap();
        assert!(limiter.check_key(&client).is_ok());
    }

    #[test]
    fn test_rate_limiter_blocks_after_burst() {
        let limiter = create_rate_limiter(1, 2);
        let client: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.check_key(&client).is_ok());
        assert!(limiter.check_key(&client).is_ok());
        assert!(limiter.check_key(&client).is_err());
    }

    #[test]
    fn test_rate_limiter_keys_clients_separately() {
        let limiter = create_rate_limiter(1, 1);
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check_key(&first).is_ok());
        assert!(limiter.check_key(&first).is_err());
        assert!(limiter.check_key(&second).is_ok());
    }

    #[test]
    fn test_zero_config_degrades_to_minimal_quota() {
        let limiter = create_rate_limiter(0, 0);
        let client: IpAddr = "10.0.0.3".parse().unwrap();
        assert!(limiter.check_key(&client).is_ok());
    }
}
