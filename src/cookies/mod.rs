mod diff;
mod store;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::JsonCookieStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    #[serde(default)]
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_owned()
}

impl Cookie {
    /// Identity of a cookie inside a store: two records with the same key
    /// are the same cookie, possibly with different values.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.domain, &self.path, &self.name)
    }

    pub fn is_expired_at(&self, now_epoch_secs: f64) -> bool {
        self.expiration_date
            .is_some_and(|expires| expires <= now_epoch_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CookieChangeEvent {
    pub cookie: Cookie,
    pub cause: String,
    pub removed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read cookie store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie store {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write cookie store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie host unavailable: {0}")]
    Unavailable(String),
}

pub type SubscriptionId = u64;

/// One live registration on a host's change stream.
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: Receiver<CookieChangeEvent>,
}

/// The process that owns session cookie storage.
///
/// Request methods return immediately; the answer arrives later on the
/// returned channel so the caller can keep servicing input meanwhile.
/// Dropping the receiver abandons the request.
pub trait CookieHost {
    fn request_snapshot(&self) -> Receiver<Result<Vec<Cookie>, HostError>>;

    fn subscribe(&self) -> Subscription;

    fn unsubscribe(&self, id: SubscriptionId);

    fn delete_all(&self) -> Receiver<Result<DeleteOutcome, HostError>>;

    fn delete_by_domain(&self, domain: &str) -> Receiver<Result<DeleteOutcome, HostError>>;

    /// The browsed page and the graph share screen space; the graph view
    /// hides the page while it is active.
    fn set_content_visible(&self, visible: bool);
}

#[cfg(test)]
pub(crate) fn test_cookie(name: &str, domain: &str) -> Cookie {
    Cookie {
        name: name.to_owned(),
        value: format!("{name}-value"),
        domain: domain.to_owned(),
        path: "/".to_owned(),
        secure: false,
        http_only: false,
        expiration_date: None,
        same_site: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_wire_shape() {
        let raw = r#"{
            "name": "sid",
            "value": "abc",
            "domain": ".example.com",
            "path": "/app",
            "secure": true,
            "httpOnly": true,
            "expirationDate": 1893456000.5,
            "sameSite": "lax"
        }"#;

        let cookie: Cookie = serde_json::from_str(raw).unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.path, "/app");
        assert!(cookie.http_only);
        assert_eq!(cookie.expiration_date, Some(1893456000.5));
        assert_eq!(cookie.same_site.as_deref(), Some("lax"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let cookie: Cookie = serde_json::from_str(r#"{"name":"a","domain":"x.com"}"#).unwrap();
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.value, "");
        assert!(!cookie.secure);
        assert!(cookie.expiration_date.is_none());
    }

    #[test]
    fn session_cookies_never_expire() {
        let mut cookie = test_cookie("a", "x.com");
        assert!(!cookie.is_expired_at(f64::MAX));
        cookie.expiration_date = Some(100.0);
        assert!(cookie.is_expired_at(100.0));
        assert!(!cookie.is_expired_at(99.0));
    }
}
