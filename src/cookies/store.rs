use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use super::diff::{CAUSE_EXPLICIT, diff_cookie_sets};
use super::{
    Cookie, CookieChangeEvent, CookieHost, DeleteOutcome, HostError, Subscription,
    SubscriptionId,
};

/// Cookie host backed by a JSON file (an array of cookie records) that the
/// browsing session keeps up to date.
#[derive(Clone)]
pub struct JsonCookieStore {
    shared: Arc<Shared>,
}

struct Shared {
    path: PathBuf,
    state: Mutex<StoreState>,
}

struct StoreState {
    cookies: Vec<Cookie>,
    modified: Option<SystemTime>,
    subscribers: HashMap<SubscriptionId, Sender<CookieChangeEvent>>,
    next_subscription: SubscriptionId,
    content_visible: bool,
}

fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn read_cookie_file(path: &Path) -> Result<Vec<Cookie>, HostError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(HostError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).map_err(|source| HostError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_cookie_file(path: &Path, cookies: &[Cookie]) -> Result<(), HostError> {
    let write_error = |source| HostError::Write {
        path: path.to_path_buf(),
        source,
    };
    let raw = serde_json::to_string_pretty(cookies)
        .map_err(|error| write_error(std::io::Error::other(error)))?;
    fs::write(path, raw).map_err(write_error)
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn broadcast(state: &mut StoreState, events: &[CookieChangeEvent]) {
        if events.is_empty() {
            return;
        }

        state.subscribers.retain(|id, sender| {
            let delivered = events.iter().all(|event| sender.send(event.clone()).is_ok());
            if !delivered {
                debug!(subscription = id, "dropping disconnected cookie subscriber");
            }
            delivered
        });
    }

    /// Reads under the lock so a delete cannot land between the read and
    /// the diff.
    fn refresh_from_disk(&self) -> Result<usize, HostError> {
        let mut state = self.lock();
        let modified = modified_time(&self.path);
        let next = read_cookie_file(&self.path)?;
        state.modified = modified;
        let events = diff_cookie_sets(&state.cookies, &next, now_epoch_secs());
        if !events.is_empty() {
            debug!(changes = events.len(), "cookie store changed on disk");
            state.cookies = next;
            Self::broadcast(&mut state, &events);
        }
        Ok(events.len())
    }

    fn delete_where(&self, matches: impl Fn(&Cookie) -> bool) -> Result<DeleteOutcome, HostError> {
        let mut state = self.lock();
        let (removed, kept): (Vec<_>, Vec<_>) =
            state.cookies.iter().cloned().partition(|cookie| matches(cookie));

        if removed.is_empty() {
            return Ok(DeleteOutcome {
                success: true,
                count: 0,
            });
        }

        write_cookie_file(&self.path, &kept)?;
        state.modified = modified_time(&self.path);
        state.cookies = kept;

        let events = removed
            .iter()
            .map(|cookie| CookieChangeEvent {
                cookie: cookie.clone(),
                cause: CAUSE_EXPLICIT.to_owned(),
                removed: true,
            })
            .collect::<Vec<_>>();
        Self::broadcast(&mut state, &events);

        Ok(DeleteOutcome {
            success: true,
            count: removed.len(),
        })
    }
}

impl JsonCookieStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();
        let cookies = read_cookie_file(&path)?;
        info!(path = %path.display(), cookies = cookies.len(), "opened cookie store");

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    cookies,
                    modified: modified_time(&path),
                    subscribers: HashMap::new(),
                    next_subscription: 1,
                    content_visible: true,
                }),
                path,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn content_visible(&self) -> bool {
        self.shared.lock().content_visible
    }

    /// Re-reads the backing file and notifies subscribers of any difference.
    pub fn refresh_from_disk(&self) -> Result<usize, HostError> {
        self.shared.refresh_from_disk()
    }

    /// Polls the backing file for modification until the last handle to
    /// this store is dropped.
    pub fn spawn_watcher(&self, interval: Duration) {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);

        thread::spawn(move || {
            loop {
                thread::sleep(interval);
                let Some(shared) = weak.upgrade() else {
                    debug!("cookie store dropped; watcher exiting");
                    return;
                };

                let current = modified_time(&shared.path);
                if current == shared.lock().modified {
                    continue;
                }

                if let Err(error) = shared.refresh_from_disk() {
                    warn!(%error, "failed to reload cookie store");
                }
            }
        });
    }

    fn spawn_request<T, F>(&self, work: F) -> Receiver<Result<T, HostError>>
    where
        T: Send + 'static,
        F: FnOnce(&Shared) -> Result<T, HostError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);

        thread::spawn(move || {
            let _ = tx.send(work(&shared));
        });

        rx
    }
}

impl CookieHost for JsonCookieStore {
    fn request_snapshot(&self) -> Receiver<Result<Vec<Cookie>, HostError>> {
        self.spawn_request(|shared| Ok(shared.lock().cookies.clone()))
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut state = self.shared.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.subscribers.insert(id, tx);
        debug!(subscription = id, "cookie change subscription opened");

        Subscription { id, events: rx }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if self.shared.lock().subscribers.remove(&id).is_some() {
            debug!(subscription = id, "cookie change subscription closed");
        }
    }

    fn delete_all(&self) -> Receiver<Result<DeleteOutcome, HostError>> {
        self.spawn_request(|shared| shared.delete_where(|_| true))
    }

    fn delete_by_domain(&self, domain: &str) -> Receiver<Result<DeleteOutcome, HostError>> {
        let domain = domain.to_owned();
        self.spawn_request(move |shared| shared.delete_where(|cookie| cookie.domain == domain))
    }

    fn set_content_visible(&self, visible: bool) {
        self.shared.lock().content_visible = visible;
        info!(visible, "browsed content visibility changed");
    }
}
