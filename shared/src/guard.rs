//! Last-issued-wins bookkeeping for overlapping requests.

use serde::{Deserialize, Serialize};

/// Identity of one issued request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter. Every completion handler checks its token with
/// [`RequestGuard::is_current`] before touching visible state, so a slow
/// superseded response can never overwrite a newer one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestGuard {
    latest: u64,
}

impl RequestGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest && self.latest != 0
    }

    /// Makes every outstanding token stale without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fresh_guard_has_no_current_token() {
        let guard = RequestGuard::new();
        assert!(!guard.is_current(RequestToken(0)));
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut guard = RequestGuard::new();
        let first = guard.begin();
        let second = guard.begin();

        assert!(first < second);
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn test_invalidate_stales_everything() {
        let mut guard = RequestGuard::new();
        let token = guard.begin();
        guard.invalidate();
        assert!(!guard.is_current(token));

        let next = guard.begin();
        assert!(guard.is_current(next));
    }

    proptest! {
        #[test]
        fn only_the_last_issued_token_is_current(issued in 1usize..64) {
            let mut guard = RequestGuard::new();
            let tokens: Vec<_> = (0..issued).map(|_| guard.begin()).collect();

            let current: Vec<_> = tokens.iter().filter(|t| guard.is_current(**t)).collect();
            prop_assert_eq!(current.len(), 1);
            prop_assert_eq!(*current[0], tokens[issued - 1]);
        }
    }
}
