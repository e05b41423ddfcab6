//! Runner registrations of one machine: pause with drain, resume.
//!
//! Per registration the client drives
//! `ACTIVE → PAUSING → DRAINING → PAUSED | TIMED-OUT → ACTIVE`. Nothing is
//! persisted; every run infers state from live API answers.

use std::net::IpAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::address::{resolve_machine, same_machine};
use crate::error::FleetError;
use crate::http::{HttpClient, HttpRequest};

/// Page size used when listing registrations. A full page means the listing
/// may be truncated.
pub const PAGE_LIMIT: usize = 100;

const TOKEN_PARAM: &str = "access_token";

/// One runner record as returned by the fleet API.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub id: u64,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Timing of the pause drain and the resume loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPolicy {
    /// Give up waiting for running jobs after this long.
    pub ceiling: Duration,
    pub poll_interval: Duration,
    /// Delay between consecutive resume calls.
    pub resume_spacing: Duration,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            ceiling: Duration::from_secs(15 * 60),
            poll_interval: Duration::from_secs(10),
            resume_spacing: Duration::from_millis(500),
        }
    }
}

/// What a pause achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOutcome {
    pub paused: usize,
    /// `false` when the ceiling elapsed with jobs still running.
    pub drained: bool,
    pub running_jobs: usize,
    pub elapsed: Duration,
}

pub struct FleetClient {
    machine: String,
    token: String,
    base_url: String,
    http: Arc<dyn HttpClient>,
    policy: DrainPolicy,
    /// Resolved once, then reused for the life of the client.
    registrations: Option<Vec<u64>>,
}

impl FleetClient {
    /// No network I/O happens until registrations are first needed.
    pub fn new(
        machine: impl Into<String>,
        token: impl Into<String>,
        base_url: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            machine: machine.into(),
            token: token.into(),
            base_url: base_url.into(),
            http,
            policy: DrainPolicy::default(),
            registrations: None,
        }
    }

    pub fn with_policy(mut self, policy: DrainPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Address as configured; empty when none was given.
    pub fn machine(&self) -> &str {
        &self.machine
    }

    /// Registration ids bound to this machine. Queried once, then cached.
    pub fn registrations(&mut self) -> Result<&[u64], FleetError> {
        if self.registrations.is_none() {
            let machine = resolve_machine(&self.machine)?;
            tracing::info!("Working with machine: {}", machine);
            let ids = self.query_registrations(machine)?;
            tracing::info!("Existing runners {:?}", ids);
            self.registrations = Some(ids);
        }
        Ok(self.registrations.as_deref().unwrap_or_default())
    }

    /// Deactivate every registration, then wait for running jobs to drain or
    /// for the policy ceiling to pass. Timing out is not an error.
    pub fn pause(&mut self) -> Result<DrainOutcome, FleetError> {
        let ids = self.registrations()?.to_vec();
        for id in &ids {
            tracing::info!("Stopping runner {}", id);
            self.set_active(*id, false)?;
        }

        let start = Instant::now();
        loop {
            let mut running = 0;
            for id in &ids {
                running += self.running_jobs(*id)?;
            }
            tracing::info!("Jobs still running: {}", running);

            let elapsed = start.elapsed();
            if running == 0 || elapsed >= self.policy.ceiling {
                if running > 0 {
                    tracing::warn!(
                        "Gave up waiting for {} running job(s) after {:?}",
                        running,
                        elapsed
                    );
                }
                return Ok(DrainOutcome {
                    paused: ids.len(),
                    drained: running == 0,
                    running_jobs: running,
                    elapsed,
                });
            }
            thread::sleep(self.policy.poll_interval.min(self.policy.ceiling - elapsed));
        }
    }

    /// Reactivate every registration, spacing the calls out. Returns how many
    /// were resumed.
    pub fn resume(&mut self) -> Result<usize, FleetError> {
        let ids = self.registrations()?.to_vec();
        for id in &ids {
            tracing::info!("Starting runner {}", id);
            self.set_active(*id, true)?;
            thread::sleep(self.policy.resume_spacing);
        }
        Ok(ids.len())
    }

    fn query_registrations(&self, machine: IpAddr) -> Result<Vec<u64>, FleetError> {
        let endpoint = self.endpoint("all");
        let request = self
            .authorized(HttpRequest::get(&endpoint))
            .query("per_page", PAGE_LIMIT.to_string());
        let body = self.http.send(&request)?;
        let registrations: Vec<Registration> =
            serde_json::from_str(&body).map_err(|source| FleetError::Decode { endpoint, source })?;
        if registrations.len() >= PAGE_LIMIT {
            return Err(FleetError::PageLimitExceeded {
                count: registrations.len(),
                limit: PAGE_LIMIT,
            });
        }
        Ok(registrations
            .iter()
            .filter(|r| {
                r.ip_address
                    .as_deref()
                    .is_some_and(|ip| same_machine(ip, machine))
            })
            .map(|r| r.id)
            .collect())
    }

    fn set_active(&self, id: u64, active: bool) -> Result<(), FleetError> {
        let request = self
            .authorized(HttpRequest::put(self.endpoint(&id.to_string())))
            .form("active", active.to_string());
        self.http.send(&request)?;
        Ok(())
    }

    fn running_jobs(&self, id: u64) -> Result<usize, FleetError> {
        let endpoint = self.endpoint(&format!("{}/jobs", id));
        let request = self
            .authorized(HttpRequest::get(&endpoint))
            .query("status", "running");
        let body = self.http.send(&request)?;
        let jobs: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|source| FleetError::Decode { endpoint, source })?;
        Ok(jobs.len())
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request.query(TOKEN_PARAM, &self.token)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::http::Method;
    use std::sync::Mutex;

    const BASE: &str = "https://fleet.test/api/v4/runners";

    /// Answers the three fleet endpoints from canned data and records requests.
    struct FakeFleet {
        listing: String,
        jobs_per_runner: usize,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl FakeFleet {
        fn new(listing: String, jobs_per_runner: usize) -> Arc<Self> {
            Arc::new(Self {
                listing,
                jobs_per_runner,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }

        fn puts(&self) -> Vec<(String, String)> {
            self.sent()
                .into_iter()
                .filter(|r| r.method == Method::Put)
                .map(|r| (r.url.clone(), r.form[0].1.clone()))
                .collect()
        }
    }

    impl HttpClient for FakeFleet {
        fn send(&self, request: &HttpRequest) -> Result<String, HttpError> {
            self.sent.lock().unwrap().push(request.clone());
            if request.url.ends_with("/all") {
                return Ok(self.listing.clone());
            }
            if request.url.ends_with("/jobs") {
                let jobs: Vec<serde_json::Value> = (0..self.jobs_per_runner)
                    .map(|i| serde_json::json!({ "id": i, "status": "running" }))
                    .collect();
                return Ok(serde_json::to_string(&jobs).unwrap());
            }
            Ok("{}".to_string())
        }
    }

    fn listing(entries: &[(u64, &str)]) -> String {
        let records: Vec<serde_json::Value> = entries
            .iter()
            .map(|(id, ip)| serde_json::json!({ "id": id, "ip_address": ip, "active": true }))
            .collect();
        serde_json::to_string(&records).unwrap()
    }

    fn quick_policy() -> DrainPolicy {
        DrainPolicy {
            ceiling: Duration::from_millis(60),
            poll_interval: Duration::from_millis(10),
            resume_spacing: Duration::ZERO,
        }
    }

    fn client(fake: &Arc<FakeFleet>, machine: &str) -> FleetClient {
        FleetClient::new(machine, "s3cret", BASE, fake.clone()).with_policy(quick_policy())
    }

    #[test]
    fn test_construction_does_no_io() {
        let fake = FakeFleet::new(listing(&[]), 0);
        let _client = client(&fake, "10.0.0.5");
        assert!(fake.sent().is_empty());
    }

    #[test]
    fn test_registrations_filter_by_machine_and_cache() {
        let fake = FakeFleet::new(
            listing(&[(1, "10.0.0.5"), (2, "10.0.0.6"), (3, "10.0.0.5")]),
            0,
        );
        let mut client = client(&fake, "10.0.0.5");
        assert_eq!(client.registrations().unwrap(), &[1, 3]);
        assert_eq!(client.registrations().unwrap(), &[1, 3]);

        let sent = fake.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, format!("{}/all", BASE));
        assert_eq!(sent[0].query_value("access_token"), Some("s3cret"));
        assert_eq!(sent[0].query_value("per_page"), Some("100"));
    }

    #[test]
    fn test_full_page_is_rejected() {
        let entries: Vec<(u64, &str)> = (0..100).map(|i| (i, "10.9.9.9")).collect();
        let fake = FakeFleet::new(listing(&entries), 0);
        let mut client = client(&fake, "10.0.0.5");
        match client.registrations() {
            Err(FleetError::PageLimitExceeded { count, limit }) => {
                assert_eq!((count, limit), (100, 100))
            }
            other => panic!("expected PageLimitExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_ninety_nine_registrations_are_fine() {
        let entries: Vec<(u64, &str)> = (0..99).map(|i| (i, "10.9.9.9")).collect();
        let fake = FakeFleet::new(listing(&entries), 0);
        let mut client = client(&fake, "10.0.0.5");
        assert!(client.registrations().unwrap().is_empty());
    }

    #[test]
    fn test_registrations_without_address_are_skipped() {
        let fake = FakeFleet::new(r#"[{"id": 4}, {"id": 5, "ip_address": "10.0.0.5"}]"#.into(), 0);
        let mut client = client(&fake, "10.0.0.5");
        assert_eq!(client.registrations().unwrap(), &[5]);
    }

    #[test]
    fn test_pause_and_resume_are_noops_without_registrations() {
        let fake = FakeFleet::new(listing(&[(9, "10.0.0.9")]), 3);
        let mut client = client(&fake, "10.0.0.5");

        let outcome = client.pause().unwrap();
        assert_eq!(outcome.paused, 0);
        assert!(outcome.drained);
        assert_eq!(client.resume().unwrap(), 0);

        assert!(fake.puts().is_empty());
        assert_eq!(fake.sent().len(), 1);
    }

    #[test]
    fn test_pause_deactivates_then_drains() {
        let fake = FakeFleet::new(listing(&[(7, "10.0.0.5"), (8, "10.0.0.5")]), 0);
        let mut client = client(&fake, "10.0.0.5");
        let outcome = client.pause().unwrap();
        assert_eq!(outcome.paused, 2);
        assert!(outcome.drained);
        assert_eq!(
            fake.puts(),
            vec![
                (format!("{}/7", BASE), "false".to_string()),
                (format!("{}/8", BASE), "false".to_string()),
            ]
        );
        let job_queries: Vec<HttpRequest> = fake
            .sent()
            .into_iter()
            .filter(|r| r.url.ends_with("/jobs"))
            .collect();
        assert_eq!(job_queries.len(), 2);
        assert!(job_queries
            .iter()
            .all(|r| r.query_value("status") == Some("running")
                && r.query_value("access_token") == Some("s3cret")));
    }

    #[test]
    fn test_drain_gives_up_at_ceiling() {
        let fake = FakeFleet::new(listing(&[(7, "10.0.0.5")]), 2);
        let mut client = client(&fake, "10.0.0.5");
        let started = Instant::now();
        let outcome = client.pause().unwrap();
        assert!(!outcome.drained);
        assert_eq!(outcome.running_jobs, 2);
        assert!(outcome.elapsed >= quick_policy().ceiling);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_resume_reactivates_cached_registrations() {
        let fake = FakeFleet::new(listing(&[(7, "10.0.0.5")]), 0);
        let mut client = client(&fake, "10.0.0.5");
        client.pause().unwrap();
        assert_eq!(client.resume().unwrap(), 1);
        assert_eq!(
            fake.puts().last().cloned(),
            Some((format!("{}/7", BASE), "true".to_string()))
        );
        let listings = fake.sent().iter().filter(|r| r.url.ends_with("/all")).count();
        assert_eq!(listings, 1);
    }

    #[test]
    fn test_malformed_listing_is_a_decode_error() {
        let fake = FakeFleet::new(r#"{"message":"401 Unauthorized"}"#.into(), 0);
        let mut client = client(&fake, "10.0.0.5");
        assert!(matches!(
            client.registrations(),
            Err(FleetError::Decode { .. })
        ));
    }
}
