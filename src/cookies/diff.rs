use std::collections::HashMap;

use super::{Cookie, CookieChangeEvent};

pub(super) const CAUSE_EXPLICIT: &str = "explicit";
pub(super) const CAUSE_OVERWRITE: &str = "overwrite";
pub(super) const CAUSE_EXPIRED: &str = "expired";

fn event(cookie: &Cookie, cause: &str, removed: bool) -> CookieChangeEvent {
    CookieChangeEvent {
        cookie: cookie.clone(),
        cause: cause.to_owned(),
        removed,
    }
}

/// Change events that turn `previous` into `next`, one per underlying change.
/// An updated cookie is reported as its old record removed followed by the
/// new record added.
pub(super) fn diff_cookie_sets(
    previous: &[Cookie],
    next: &[Cookie],
    now_epoch_secs: f64,
) -> Vec<CookieChangeEvent> {
    let previous_by_key = previous
        .iter()
        .map(|cookie| (cookie.key(), cookie))
        .collect::<HashMap<_, _>>();
    let next_by_key = next
        .iter()
        .map(|cookie| (cookie.key(), cookie))
        .collect::<HashMap<_, _>>();

    let mut events = Vec::new();

    for cookie in previous {
        if !next_by_key.contains_key(&cookie.key()) {
            let cause = if cookie.is_expired_at(now_epoch_secs) {
                CAUSE_EXPIRED
            } else {
                CAUSE_EXPLICIT
            };
            events.push(event(cookie, cause, true));
        }
    }

    for cookie in next {
        match previous_by_key.get(&cookie.key()) {
            None => events.push(event(cookie, CAUSE_EXPLICIT, false)),
            Some(old) if *old != cookie => {
                events.push(event(old, CAUSE_OVERWRITE, true));
                events.push(event(cookie, CAUSE_EXPLICIT, false));
            }
            Some(_) => {}
        }
    }

    events
}
