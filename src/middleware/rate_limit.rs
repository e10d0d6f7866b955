use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::ChatError;
use crate::security::{SecurityEventKind, SLOW_REQUEST_THRESHOLD};
use crate::AppState;

/// Sliding-log request limiter: at most `max_requests` per client within any
/// `window_duration` span.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    clients: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    max_requests: u32,
    window_duration: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window_duration,
        }
    }

    pub fn admit(&self, client_id: &str) -> Result<(), ChatError> {
        self.admit_at(client_id, Instant::now())
    }

    pub fn admit_at(&self, client_id: &str, now: Instant) -> Result<(), ChatError> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        let log = clients.entry(client_id.to_string()).or_default();
        drop_expired(log, now, self.window_duration);

        if log.len() >= self.max_requests as usize {
            // The oldest request in the log is the next one to leave the window
            let remaining = match log.front() {
                Some(&oldest) => self
                    .window_duration
                    .saturating_sub(now.saturating_duration_since(oldest)),
                None => self.window_duration,
            };
            return Err(ChatError::RateLimited {
                retry_after_secs: remaining.as_secs_f64().ceil().max(1.0) as u64,
            });
        }

        log.push_back(now);
        Ok(())
    }

    // Clean up old entries periodically
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    pub fn cleanup_expired_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        let before = clients.len();
        clients.retain(|_, log| {
            drop_expired(log, now, self.window_duration);
            !log.is_empty()
        });
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }
}

fn drop_expired(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = log.front() {
        if now.saturating_duration_since(oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }
}

/// Client IP. Proxy headers are only honored when `trust_proxy` is set,
/// otherwise the socket peer is used.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }
        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return real_ip.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Per-IP guard in front of the chat routes: rejects banned addresses, bans
/// an address when it breaks the per-IP limit, and reports slow requests.
pub async fn ip_rate_limit_middleware(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ChatError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let ip = client_ip(request.headers(), peer, state.settings().trust_proxy_headers);
    let path = request.uri().path().to_owned();

    if state.security.is_banned(&ip) {
        state
            .security
            .record(SecurityEventKind::BlockedRequest, &ip, &path, Some("banned_ip".to_string()));
        return Err(ChatError::Forbidden("Access denied".to_string()));
    }

    if let Err(e) = state.ip_limiter.admit(&ip) {
        tracing::warn!("Rate limit exceeded for IP: {}", ip);
        state
            .security
            .record(SecurityEventKind::RateLimitExceeded, &ip, &path, None);
        state.security.ban(&ip);
        return Err(e);
    }

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();
    if elapsed >= SLOW_REQUEST_THRESHOLD {
        state.security.record(
            SecurityEventKind::SlowRequest,
            &ip,
            &path,
            Some(format!("{:.2}s", elapsed.as_secs_f64())),
        );
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_allows_exactly_max_requests_per_window() {
        let limiter = RateLimiter::new(100, Duration::from_secs(60));
        let now = Instant::now();
        let admitted = (0..101)
            .filter(|_| limiter.admit_at("user1", now).is_ok())
            .count();
        assert_eq!(admitted, 100);
        assert!(matches!(
            limiter.admit_at("user1", now),
            Err(ChatError::RateLimited { retry_after_secs: 60 })
        ));
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.admit_at("a", now).is_ok());
        assert!(limiter.admit_at("b", now).is_ok());
        assert!(limiter.admit_at("a", now).is_err());
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.admit_at("a", start).is_ok());
        assert!(limiter.admit_at("a", start).is_ok());
        match limiter.admit_at("a", start + Duration::from_secs(45)) {
            Err(ChatError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 15),
            other => panic!("expected rate limit, got {:?}", other),
        }
        assert!(limiter.admit_at("a", start + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_burst_across_window_edge_is_limited() {
        let limiter = RateLimiter::new(100, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(limiter.admit_at("u", t0).is_ok());

        let late = t0 + Duration::from_secs(59);
        let before_edge = (0..99).filter(|_| limiter.admit_at("u", late).is_ok()).count();
        assert_eq!(before_edge, 99);

        // only the request made at t0 has left the window
        let edge = t0 + Duration::from_secs(60);
        let after_edge = (0..100).filter(|_| limiter.admit_at("u", edge).is_ok()).count();
        assert_eq!(after_edge, 1);

        match limiter.admit_at("u", edge) {
            Err(ChatError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 59),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_cleanup_drops_only_expired_entries() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();
        limiter.admit_at("old", start).unwrap();
        limiter.admit_at("new", start + Duration::from_secs(30)).unwrap();
        assert_eq!(limiter.cleanup_expired_at(start + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_client_ip_prefers_proxy_headers_when_trusted() {
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer), true), "10.0.0.9");
        assert_eq!(client_ip(&headers, None, true), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.2"));
        assert_eq!(client_ip(&headers, Some(peer), true), "172.16.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer), true), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_ignores_proxy_headers_by_default() {
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.2"));
        assert_eq!(client_ip(&headers, Some(peer), false), "10.0.0.9");
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }
}
