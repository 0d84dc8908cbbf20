//! Forced logout when the session expires mid-use.

use payloads::ClientError;
use std::cell::Cell;
use std::rc::Rc;

/// Watches API results and starts the logout flow the first time one of
/// them fails with 401.
///
/// Clones share the latch, so a burst of failing requests logs out once.
#[derive(Clone)]
pub struct SessionGuard {
    on_expired: Rc<dyn Fn()>,
    expired: Rc<Cell<bool>>,
}

impl SessionGuard {
    pub fn new(on_expired: impl Fn() + 'static) -> Self {
        Self {
            on_expired: Rc::new(on_expired),
            expired: Rc::default(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    /// Start the logout flow unless it already ran.
    pub fn expire(&self) {
        if self.expired.replace(true) {
            return;
        }
        tracing::info!("session expired, logging out");
        (self.on_expired)();
    }

    pub fn report(&self, error: &ClientError) {
        if error.is_auth_error() {
            self.expire();
        }
    }

    /// Pass `result` through unchanged, reporting a 401 on the way.
    pub fn check<T>(
        &self,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if let Err(error) = &result {
            self.report(error);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payloads::StatusCode;

    fn counting_guard() -> (SessionGuard, Rc<Cell<u32>>) {
        let logouts = Rc::new(Cell::new(0));
        let counter = logouts.clone();
        let guard = SessionGuard::new(move || counter.set(counter.get() + 1));
        (guard, logouts)
    }

    #[test]
    fn unauthorized_write_logs_out() {
        let (guard, logouts) = counting_guard();
        let deleted: Result<(), ClientError> = Err(ClientError::Unauthorized);

        let result = guard.check(deleted);

        assert!(matches!(result, Err(ClientError::Unauthorized)));
        assert_eq!(logouts.get(), 1);
        assert!(guard.is_expired());
    }

    #[test]
    fn other_failures_leave_the_session_alone() {
        let (guard, logouts) = counting_guard();
        let _ = guard.check::<()>(Err(ClientError::Forbidden));
        let _ = guard.check::<()>(Err(ClientError::APIError(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database offline".into(),
        )));
        let _ = guard.check(Ok::<_, ClientError>(3));

        assert_eq!(logouts.get(), 0);
        assert!(!guard.is_expired());
    }

    #[test]
    fn a_burst_of_401s_logs_out_once() {
        let (guard, logouts) = counting_guard();
        let other = guard.clone();

        guard.report(&ClientError::Unauthorized);
        other.report(&ClientError::Unauthorized);
        guard.expire();

        assert_eq!(logouts.get(), 1);
    }
}
