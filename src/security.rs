// src/security.rs - IP bans and the security event buffer behind the chat routes
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub use crate::models::{SecurityEvent, SecurityEventKind, SecurityStats};

/// Requests slower than this are reported as `slow_request` events.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(5);
pub const MAX_SECURITY_EVENTS: usize = 1000;
/// Above this many banned addresses `/health` reports `warning`.
pub const BANNED_IPS_WARNING: usize = 100;
const LISTED_BANS_LIMIT: usize = 50;
const LATEST_EVENTS_LIMIT: usize = 20;

#[derive(Debug)]
pub struct SecurityMonitor {
    banned: Mutex<HashMap<String, Instant>>,
    events: Mutex<VecDeque<SecurityEvent>>,
    ban_duration: Duration,
    max_events: usize,
}

impl SecurityMonitor {
    pub fn new(ban_duration: Duration) -> Self {
        Self::with_capacity(ban_duration, MAX_SECURITY_EVENTS)
    }

    pub fn with_capacity(ban_duration: Duration, max_events: usize) -> Self {
        Self {
            banned: Mutex::new(HashMap::new()),
            events: Mutex::new(VecDeque::with_capacity(max_events.min(MAX_SECURITY_EVENTS))),
            ban_duration,
            max_events,
        }
    }

    pub fn is_banned(&self, ip: &str) -> bool {
        self.is_banned_at(ip, Instant::now())
    }

    pub fn is_banned_at(&self, ip: &str, now: Instant) -> bool {
        let mut banned = self.banned.lock().unwrap_or_else(|e| e.into_inner());
        match banned.get(ip) {
            Some(&until) if now < until => true,
            Some(_) => {
                banned.remove(ip);
                false
            }
            None => false,
        }
    }

    pub fn ban(&self, ip: &str) {
        self.ban_at(ip, Instant::now())
    }

    pub fn ban_at(&self, ip: &str, now: Instant) {
        let until = now + self.ban_duration;
        self.banned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(ip.to_string(), until);
        tracing::warn!(target: "security", ip, ban_secs = self.ban_duration.as_secs(), "IP banned");
    }

    pub fn banned_count(&self) -> usize {
        self.banned.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Lifts every ban and returns how many were lifted.
    pub fn clear_bans(&self) -> usize {
        let mut banned = self.banned.lock().unwrap_or_else(|e| e.into_inner());
        let cleared = banned.len();
        banned.clear();
        cleared
    }

    pub fn sweep_bans(&self) -> usize {
        self.sweep_bans_at(Instant::now())
    }

    pub fn sweep_bans_at(&self, now: Instant) -> usize {
        let mut banned = self.banned.lock().unwrap_or_else(|e| e.into_inner());
        let before = banned.len();
        banned.retain(|_, until| now < *until);
        before - banned.len()
    }

    /// Logs the event under the `security` target and keeps it in a bounded buffer.
    pub fn record(&self, kind: SecurityEventKind, ip: &str, path: &str, detail: Option<String>) {
        tracing::warn!(
            target: "security",
            event_type = kind.as_str(),
            ip,
            path,
            detail = detail.as_deref().unwrap_or(""),
            "Security event"
        );

        let event = SecurityEvent {
            timestamp: chrono::Utc::now(),
            event_type: kind,
            ip: ip.to_string(),
            path: path.to_string(),
            detail,
        };
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        while events.len() >= self.max_events {
            events.pop_front();
        }
        if self.max_events > 0 {
            events.push_back(event);
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn status(&self) -> &'static str {
        if self.banned_count() > BANNED_IPS_WARNING {
            "warning"
        } else {
            "healthy"
        }
    }

    pub fn stats(&self, active_rate_limits: usize) -> SecurityStats {
        let (banned_ips_count, banned_ips) = {
            let banned = self.banned.lock().unwrap_or_else(|e| e.into_inner());
            let mut listed: Vec<String> = if banned.len() < LISTED_BANS_LIMIT {
                banned.keys().cloned().collect()
            } else {
                Vec::new()
            };
            listed.sort();
            (banned.len(), listed)
        };

        SecurityStats {
            status: self.status().to_string(),
            banned_ips_count,
            active_rate_limits,
            recent_events: self.event_count(),
            banned_ips,
            latest_events: self.recent_events(LATEST_EVENTS_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_expires_after_duration() {
        let monitor = SecurityMonitor::new(Duration::from_secs(900));
        let now = Instant::now();
        monitor.ban_at("203.0.113.7", now);

        assert!(monitor.is_banned_at("203.0.113.7", now + Duration::from_secs(899)));
        assert!(!monitor.is_banned_at("198.51.100.1", now));
        assert!(!monitor.is_banned_at("203.0.113.7", now + Duration::from_secs(900)));
        assert_eq!(monitor.banned_count(), 0);
    }

    #[test]
    fn test_clear_and_sweep_bans() {
        let monitor = SecurityMonitor::new(Duration::from_secs(60));
        let now = Instant::now();
        monitor.ban_at("a", now);
        monitor.ban_at("b", now + Duration::from_secs(30));

        assert_eq!(monitor.sweep_bans_at(now + Duration::from_secs(60)), 1);
        assert_eq!(monitor.banned_count(), 1);
        assert_eq!(monitor.clear_bans(), 1);
        assert_eq!(monitor.banned_count(), 0);
    }

    #[test]
    fn test_event_buffer_is_bounded() {
        let monitor = SecurityMonitor::with_capacity(Duration::from_secs(60), 3);
        for i in 0..5 {
            monitor.record(
                SecurityEventKind::RateLimitExceeded,
                &format!("10.0.0.{}", i),
                "/chat",
                None,
            );
        }

        assert_eq!(monitor.event_count(), 3);
        let latest = monitor.recent_events(10);
        assert_eq!(latest[0].ip, "10.0.0.4");
        assert_eq!(latest[2].ip, "10.0.0.2");
    }

    #[test]
    fn test_status_warns_on_many_bans() {
        let monitor = SecurityMonitor::new(Duration::from_secs(60));
        let now = Instant::now();
        for i in 0..=BANNED_IPS_WARNING {
            monitor.ban_at(&format!("10.0.{}.{}", i / 256, i % 256), now);
        }
        assert_eq!(monitor.status(), "warning");

        let stats = monitor.stats(0);
        assert_eq!(stats.banned_ips_count, BANNED_IPS_WARNING + 1);
        assert!(stats.banned_ips.is_empty());

        monitor.clear_bans();
        assert_eq!(monitor.status(), "healthy");
    }

    #[test]
    fn test_stats_lists_short_ban_list() {
        let monitor = SecurityMonitor::new(Duration::from_secs(60));
        monitor.ban("10.0.0.2");
        monitor.ban("10.0.0.1");
        monitor.record(SecurityEventKind::BlockedRequest, "10.0.0.1", "/chat", None);

        let stats = monitor.stats(4);
        assert_eq!(stats.status, "healthy");
        assert_eq!(stats.banned_ips, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(stats.active_rate_limits, 4);
        assert_eq!(stats.recent_events, 1);
        assert_eq!(stats.latest_events[0].event_type, SecurityEventKind::BlockedRequest);
    }
}
