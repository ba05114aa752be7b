//! In-memory doubles for the Marathon API and the reconfigure hook.

use async_trait::async_trait;
use common::{ApiError, ApiResponse, AppInstance, BackendRecord, EndpointsBody, MarathonApi};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::WatcherConfig;
use crate::reconciler::{NotifyError, Reconfigure};
use crate::state::WatcherState;

#[derive(Debug, Clone)]
pub enum Reply {
    Instances(Vec<AppInstance>),
    Status(u16),
    Broken,
}

/// Plays back scripted replies; the last one repeats once the script runs out.
pub struct FakeApi {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Reply>,
    pub list_ok: AtomicBool,
    pub endpoint_calls: AtomicUsize,
    pub delay: Mutex<Option<Duration>>,
}

impl FakeApi {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(Reply::Instances(vec![])),
            list_ok: AtomicBool::new(true),
            endpoint_calls: AtomicUsize::new(0),
            delay: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.endpoint_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarathonApi for FakeApi {
    async fn list(&self) -> Result<ApiResponse<()>, ApiError> {
        if self.list_ok.load(Ordering::SeqCst) {
            Ok(ApiResponse::Success(()))
        } else {
            Ok(ApiResponse::Failure {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    async fn endpoints(&self, _app_id: &str) -> Result<ApiResponse<EndpointsBody>, ApiError> {
        self.endpoint_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let next = self.replies.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = next {
                *last = next;
            }
            last.clone()
        };

        match reply {
            Reply::Instances(instances) => Ok(ApiResponse::Success(EndpointsBody { instances })),
            Reply::Status(status) => Ok(ApiResponse::Failure {
                status,
                message: "scripted failure".to_string(),
            }),
            Reply::Broken => Err(ApiError::Transport("connection refused".to_string())),
        }
    }
}

/// Records the backend list visible at each notification.
#[derive(Default)]
pub struct RecordingNotifier {
    pub state: Mutex<Option<Arc<WatcherState>>>,
    pub seen: Mutex<Vec<Vec<BackendRecord>>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn watch(&self, state: Arc<WatcherState>) {
        *self.state.lock().unwrap() = Some(state);
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Reconfigure for RecordingNotifier {
    fn reconfigure(&self) -> Result<(), NotifyError> {
        let visible = match self.state.lock().unwrap().as_ref() {
            Some(state) => state.backends.load().to_vec(),
            None => vec![],
        };
        self.seen.lock().unwrap().push(visible);
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::new("config writer unavailable"));
        }
        Ok(())
    }
}

pub fn instance(id: &str, host: &str, ports: &[u16]) -> AppInstance {
    AppInstance {
        id: id.to_string(),
        host: host.to_string(),
        ports: ports.to_vec(),
    }
}

pub fn record(name: &str, host: &str, port: u16) -> BackendRecord {
    BackendRecord {
        name: name.to_string(),
        host: host.to_string(),
        port,
    }
}

pub fn watcher_config(default_servers: Vec<BackendRecord>) -> WatcherConfig {
    WatcherConfig {
        name: "web".to_string(),
        app_id: "/web".to_string(),
        host: "http://marathon:8080".to_string(),
        user: None,
        pass: None,
        check_interval: Duration::from_secs(30),
        request_timeout: None,
        default_servers,
    }
}
