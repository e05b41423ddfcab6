//! Fakes shared by the update scenarios: a python that lays out venvs on
//! disk, and a fleet API / file server. Both append to one journal so tests
//! can assert ordering across processes and HTTP calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use buri::Coordinator;
use buri_core::log::RunLog;
use buri_fleet::{DrainPolicy, FleetClient, HttpClient, HttpError, HttpRequest, Method};
use buri_sandbox::{CommandOutput, CommandRunner, Environment, Invocation};

pub const FLEET_URL: &str = "https://fleet.test/api/v4/runners";

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub struct FakePython {
    journal: Journal,
}

impl FakePython {
    pub fn new(journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
        })
    }
}

impl CommandRunner for FakePython {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let argv = invocation.argv();
        self.journal
            .lock()
            .unwrap()
            .push(format!("run {}", argv[1..].join(" ")));
        if argv.len() == 4 && argv[1] == "-m" && argv[2] == "venv" {
            let bin = Path::new(&argv[3]).join("bin");
            std::fs::create_dir_all(&bin)?;
            std::fs::write(bin.join("python"), b"")?;
        }
        Ok(CommandOutput {
            status: 0,
            output: if argv.get(1).map(String::as_str) == Some("--version") {
                "Python 3.11.4".to_string()
            } else {
                String::new()
            },
        })
    }
}

/// Fleet API for one machine plus arbitrary static files.
pub struct FakeHttp {
    journal: Journal,
    runners: Vec<(u64, String)>,
    files: HashMap<String, String>,
}

impl FakeHttp {
    pub fn new(journal: &Journal, runners: &[(u64, &str)]) -> Self {
        Self {
            journal: journal.clone(),
            runners: runners.iter().map(|(id, ip)| (*id, ip.to_string())).collect(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, url: &str, content: &str) -> Self {
        self.files.insert(url.to_string(), content.to_string());
        self
    }
}

impl HttpClient for FakeHttp {
    fn send(&self, request: &HttpRequest) -> Result<String, HttpError> {
        let path = request.url.strip_prefix(FLEET_URL).unwrap_or(&request.url);
        let entry = match request.method {
            Method::Put => format!("PUT {} active={}", path, request.form[0].1),
            m => format!("{} {}", m.as_str(), path),
        };
        self.journal.lock().unwrap().push(entry);

        if let Some(content) = self.files.get(&request.url) {
            return Ok(content.clone());
        }
        if path == "/all" {
            let records: Vec<serde_json::Value> = self
                .runners
                .iter()
                .map(|(id, ip)| serde_json::json!({ "id": id, "ip_address": ip }))
                .collect();
            return Ok(serde_json::to_string(&records).unwrap());
        }
        if path.ends_with("/jobs") {
            return Ok("[]".to_string());
        }
        if request.method == Method::Put {
            return Ok("{}".to_string());
        }
        Err(HttpError::Status {
            url: request.url.clone(),
            code: 404,
            body: "not found".to_string(),
        })
    }
}

/// Lay out an environment as `python -m venv` would.
pub fn seed_environment(dir: &Path) {
    std::fs::create_dir_all(dir.join("bin")).unwrap();
    std::fs::write(dir.join("bin").join("python"), b"").unwrap();
}

pub fn coordinator(dir: &Path, machine: &str, journal: &Journal, http: FakeHttp) -> Coordinator {
    let http: Arc<dyn HttpClient> = Arc::new(http);
    let env = Environment::with_log(
        dir,
        &["python3"],
        FakePython::new(journal),
        RunLog::open(dir, "buri"),
    )
    .unwrap();
    let fleet = FleetClient::new(machine, "s3cret", FLEET_URL, http.clone()).with_policy(
        DrainPolicy {
            ceiling: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
            resume_spacing: Duration::ZERO,
        },
    );
    journal.lock().unwrap().clear();
    Coordinator::new(env, fleet, http)
}

pub fn position(entries: &[String], needle: &str) -> usize {
    entries
        .iter()
        .position(|e| e.contains(needle))
        .unwrap_or_else(|| panic!("`{}` not in {:#?}", needle, entries))
}
