//! Engine-facing request interception adapter
//!
//! The rendering engine calls [`RequestInterceptor::notify_current_url`]
//! once per top-level navigation start, then
//! [`RequestInterceptor::should_intercept_request`] for every resource
//! belonging to that navigation, on a single callback thread per session.
//! Each session owns its own first-party context; the matcher behind it is
//! shared between sessions.

use std::sync::Arc;

use crate::matcher::UrlMatcher;

/// Empty response served in place of a blocked resource.
///
/// The engine treats it as "resource not available" rather than a network
/// error, so a blocked sub-resource never surfaces as a broken-image icon -
/// the page renders as if the resource simply doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedResource {
    pub content_type: &'static str,
    pub body: &'static [u8],
}

impl BlockedResource {
    pub fn empty() -> Self {
        Self {
            content_type: "text/plain",
            body: b"",
        }
    }
}

/// The two callbacks a renderer backend must wire up.
///
/// Backends differ in how they deliver interception callbacks; each variant
/// implements this trait once and is selected at startup, so the matcher
/// never branches on the engine flavor per call. The contract: context
/// first, then the requests belonging to that navigation, on one thread per
/// session.
pub trait RequestInterceptor {
    /// Record the new first-party context. Must be called before any
    /// resource requests for the new navigation are intercepted; otherwise
    /// party classification is stale.
    fn notify_current_url(&mut self, url: &str);

    /// Decide a single resource request. `Some` means serve the returned
    /// empty response instead of fetching; `None` means load normally.
    fn should_intercept_request(&mut self, url: &str, is_main_frame: bool)
        -> Option<BlockedResource>;
}

/// Per-tab interception session backed by a shared [`UrlMatcher`].
pub struct TrackingSession {
    matcher: Arc<UrlMatcher>,
    current_url: Option<String>,
    blocked_count: u64,
}

impl TrackingSession {
    pub fn new(matcher: Arc<UrlMatcher>) -> Self {
        Self {
            matcher,
            current_url: None,
            blocked_count: 0,
        }
    }

    /// Trackers blocked since the current navigation started.
    pub fn blocked_count(&self) -> u64 {
        self.blocked_count
    }

    /// The first-party context last reported by the engine, if any.
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }
}

impl RequestInterceptor for TrackingSession {
    fn notify_current_url(&mut self, url: &str) {
        self.current_url = Some(url.to_owned());
        self.blocked_count = 0;
    }

    fn should_intercept_request(
        &mut self,
        url: &str,
        is_main_frame: bool,
    ) -> Option<BlockedResource> {
        let verdict =
            self.matcher
                .should_intercept(url, is_main_frame, self.current_url.as_deref());
        if verdict.blocked {
            self.blocked_count += 1;
            Some(BlockedResource::empty())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockList, Entity};

    fn matcher_with(patterns: &[&str]) -> Arc<UrlMatcher> {
        let matcher = UrlMatcher::new();
        matcher.load_patterns(BlockList {
            source: "test".to_owned(),
            entities: vec![Entity {
                name: "Tracker".to_owned(),
                category: "Advertising".to_owned(),
                patterns: patterns.iter().map(|p| (*p).to_owned()).collect(),
            }],
        });
        Arc::new(matcher)
    }

    #[test]
    fn blocked_requests_get_an_empty_response() {
        let mut session = TrackingSession::new(matcher_with(&["trackersimulator.org"]));

        session.notify_current_url("http://www.mozilla.org");
        let response = session
            .should_intercept_request("http://trackersimulator.org/foobar", false)
            .expect("third-party tracker should be intercepted");
        assert!(response.body.is_empty());
        assert_eq!(1, session.blocked_count());
    }

    #[test]
    fn allowed_requests_pass_through() {
        let mut session = TrackingSession::new(matcher_with(&["trackersimulator.org"]));

        session.notify_current_url("http://www.mozilla.org");
        assert!(session
            .should_intercept_request("http://mozilla.org/about", false)
            .is_none());
        assert_eq!(0, session.blocked_count());
    }

    #[test]
    fn requests_before_navigation_fail_open() {
        let mut session = TrackingSession::new(matcher_with(&["trackersimulator.org"]));

        // No notify_current_url yet: conservatively allow.
        assert!(session
            .should_intercept_request("http://trackersimulator.org/foobar", false)
            .is_none());
    }

    #[test]
    fn main_frame_requests_pass_through() {
        let mut session = TrackingSession::new(matcher_with(&["trackersimulator.org"]));

        session.notify_current_url("http://www.mozilla.org");
        assert!(session
            .should_intercept_request("http://trackersimulator.org/", true)
            .is_none());
    }

    #[test]
    fn navigation_resets_blocked_count() {
        let mut session = TrackingSession::new(matcher_with(&["trackersimulator.org"]));

        session.notify_current_url("http://www.mozilla.org");
        session.should_intercept_request("http://trackersimulator.org/a", false);
        session.should_intercept_request("http://trackersimulator.org/b", false);
        assert_eq!(2, session.blocked_count());

        session.notify_current_url("http://example.com");
        assert_eq!(0, session.blocked_count());
        assert_eq!(Some("http://example.com"), session.current_url());
    }

    #[test]
    fn sessions_do_not_share_navigation_state() {
        let matcher = matcher_with(&["trackersimulator.org"]);
        let mut first = TrackingSession::new(Arc::clone(&matcher));
        let mut second = TrackingSession::new(Arc::clone(&matcher));

        first.notify_current_url("http://trackersimulator.org");
        second.notify_current_url("http://www.mozilla.org");

        // First-party for session one, blocked for session two.
        assert!(first
            .should_intercept_request("http://trackersimulator.org/app.js", false)
            .is_none());
        assert!(second
            .should_intercept_request("http://trackersimulator.org/app.js", false)
            .is_some());
    }
}
