//! Last-issued-wins data fetching.
//!
//! A [`FetchCoordinator`] owns the state of one remote resource. Each call
//! to [`FetchCoordinator::run`] aborts whatever request is still in flight
//! and tags the new one with a fresh generation; a result is only committed
//! if its generation is still current when it arrives.

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};
use jiff::Timestamp;
use payloads::ClientError;
use payloads::api_client::GENERIC_ERROR_MESSAGE;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use crate::time::TimeSource;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    /// Set while a request that asked for a loading indicator is current.
    pub is_updating: bool,
    pub last_updated: Option<Timestamp>,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_updating: false,
            last_updated: None,
            error: None,
        }
    }
}

/// User-facing text for a failed request. Server-supplied messages win over
/// `fallback`.
pub fn error_message(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Unauthorized
        | ClientError::Forbidden
        | ClientError::Validation { .. } => error.to_string(),
        ClientError::APIError(_, message)
            if message != GENERIC_ERROR_MESSAGE =>
        {
            message.clone()
        }
        ClientError::APIError(..) | ClientError::Network(_) => {
            fallback.to_string()
        }
    }
}

type Fetcher<T> = Box<dyn Fn() -> LocalBoxFuture<'static, Result<T, ClientError>>>;
type Listener<T> = Rc<dyn Fn(&FetchState<T>)>;

struct Inner<T> {
    fetcher: Fetcher<T>,
    clock: TimeSource,
    fallback_message: String,
    state: RefCell<FetchState<T>>,
    generation: Cell<u64>,
    in_flight: RefCell<Option<AbortHandle>>,
    on_auth_error: RefCell<Option<Rc<dyn Fn()>>>,
    listener: RefCell<Option<Listener<T>>>,
}

/// Cheap to clone; clones share state.
pub struct FetchCoordinator<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for FetchCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> FetchCoordinator<T> {
    /// `fallback_message` is shown for failures that carry no message of
    /// their own, e.g. "Failed to fetch users".
    pub fn new<F>(
        fetcher: F,
        clock: TimeSource,
        fallback_message: impl Into<String>,
    ) -> Self
    where
        F: Fn() -> LocalBoxFuture<'static, Result<T, ClientError>> + 'static,
    {
        Self {
            inner: Rc::new(Inner {
                fetcher: Box::new(fetcher),
                clock,
                fallback_message: fallback_message.into(),
                state: RefCell::new(FetchState::default()),
                generation: Cell::new(0),
                in_flight: RefCell::new(None),
                on_auth_error: RefCell::new(None),
                listener: RefCell::new(None),
            }),
        }
    }

    /// Called once per request that fails with 401.
    pub fn on_auth_error(&self, callback: impl Fn() + 'static) {
        *self.inner.on_auth_error.borrow_mut() = Some(Rc::new(callback));
    }

    /// Receives a snapshot after every committed change.
    pub fn subscribe(&self, listener: impl Fn(&FetchState<T>) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn unsubscribe(&self) {
        self.inner.listener.borrow_mut().take();
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Abort any request in flight and issue a new one.
    ///
    /// The request starts immediately; the returned future resolves once its
    /// result has been committed or discarded. Polling passes
    /// `show_loading = false` so the table doesn't flicker.
    pub fn run(&self, show_loading: bool) -> impl Future<Output = ()> + 'static {
        let committed = self.request(show_loading);
        async move {
            committed.await;
        }
    }

    /// Same as [`FetchCoordinator::run`], resolving to whether this request's
    /// result was committed. It is not when the request was superseded or
    /// cancelled.
    pub fn request(
        &self,
        show_loading: bool,
    ) -> impl Future<Output = bool> + 'static {
        let inner = self.inner.clone();
        let generation = inner.begin(show_loading);
        let (abort_handle, registration) = AbortHandle::new_pair();
        *inner.in_flight.borrow_mut() = Some(abort_handle);
        let request = Abortable::new((inner.fetcher)(), registration);

        async move {
            match request.await {
                Ok(result) => inner.complete(generation, result),
                Err(_aborted) => {
                    tracing::debug!(generation, "request aborted");
                    false
                }
            }
        }
    }

    /// Abort the request in flight, if any, and ignore its result. Used on
    /// teardown; listeners are not notified.
    pub fn cancel(&self) {
        self.inner.invalidate();
        self.inner.state.borrow_mut().is_updating = false;
    }

    pub fn dismiss_error(&self) {
        self.inner.state.borrow_mut().error = None;
        self.inner.notify();
    }

    /// Edit the current data in place, e.g. for an optimistic update.
    /// Does nothing if no data has been loaded yet.
    pub fn update_data(&self, update: impl FnOnce(&mut T)) {
        {
            let mut state = self.inner.state.borrow_mut();
            match state.data.as_mut() {
                Some(data) => update(data),
                None => return,
            }
        }
        self.inner.notify();
    }
}

impl<T: Clone + 'static> Inner<T> {
    fn invalidate(&self) -> u64 {
        if let Some(previous) = self.in_flight.borrow_mut().take() {
            previous.abort();
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn begin(&self, show_loading: bool) -> u64 {
        let generation = self.invalidate();
        self.state.borrow_mut().is_updating = show_loading;
        self.notify();
        generation
    }

    fn complete(&self, generation: u64, result: Result<T, ClientError>) -> bool {
        if generation != self.generation.get() {
            tracing::debug!(generation, "discarding stale response");
            return false;
        }
        self.in_flight.borrow_mut().take();

        let mut auth_error = false;
        {
            let mut state = self.state.borrow_mut();
            state.is_updating = false;
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.last_updated = Some(self.clock.now());
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!("Fetch failed: {e}");
                    auth_error = e.is_auth_error();
                    state.error = Some(error_message(&e, &self.fallback_message));
                }
            }
        }

        if auth_error {
            let callback = self.on_auth_error.borrow().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
        self.notify();
        true
    }

    fn notify(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            let snapshot = self.state.borrow().clone();
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::channel::oneshot;
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;
    use payloads::StatusCode;
    use std::collections::VecDeque;

    type Reply = oneshot::Sender<Result<Vec<u32>, ClientError>>;

    /// Each request waits for the test to answer it through a channel.
    fn controlled() -> (FetchCoordinator<Vec<u32>>, Rc<RefCell<VecDeque<Reply>>>) {
        let pending: Rc<RefCell<VecDeque<Reply>>> = Rc::default();
        let queue = pending.clone();
        let clock = TimeSource::mock("2025-01-01T12:00:00Z".parse().unwrap());
        let coordinator = FetchCoordinator::new(
            move || {
                let (reply, response) = oneshot::channel();
                queue.borrow_mut().push_back(reply);
                async move {
                    response.await.unwrap_or_else(|_| {
                        Err(ClientError::APIError(
                            StatusCode::GATEWAY_TIMEOUT,
                            "dropped".into(),
                        ))
                    })
                }
                .boxed_local()
            },
            clock,
            "Failed to fetch users",
        );
        (coordinator, pending)
    }

    fn answer(pending: &Rc<RefCell<VecDeque<Reply>>>, result: Result<Vec<u32>, ClientError>) {
        let reply = pending.borrow_mut().pop_front().expect("a pending request");
        let _ = reply.send(result);
    }

    fn immediate(
        result: impl Fn() -> Result<Vec<u32>, ClientError> + 'static,
    ) -> FetchCoordinator<Vec<u32>> {
        FetchCoordinator::new(
            move || futures::future::ready(result()).boxed_local(),
            TimeSource::mock("2025-01-01T12:00:00Z".parse().unwrap()),
            "Failed to fetch users",
        )
    }

    #[test]
    fn success_replaces_data_and_stamps_time() {
        let coordinator = immediate(|| Ok(vec![1, 2]));
        block_on(coordinator.run(true));

        let state = coordinator.snapshot();
        assert_eq!(state.data, Some(vec![1, 2]));
        assert!(!state.is_updating);
        assert_eq!(
            state.last_updated.map(|t| t.to_string()).as_deref(),
            Some("2025-01-01T12:00:00Z")
        );
        assert_eq!(state.error, None);
    }

    #[test]
    fn only_the_latest_request_commits() {
        let (coordinator, pending) = controlled();
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();

        spawner.spawn_local(coordinator.run(true)).unwrap();
        spawner.spawn_local(coordinator.run(false)).unwrap();
        pool.run_until_stalled();
        assert_eq!(pending.borrow().len(), 2);

        // the first answer arrives after it was superseded
        answer(&pending, Ok(vec![1]));
        pool.run_until_stalled();
        assert_eq!(coordinator.snapshot().data, None);

        answer(&pending, Ok(vec![2]));
        pool.run_until_stalled();
        assert_eq!(coordinator.snapshot().data, Some(vec![2]));
    }

    #[test]
    fn stale_results_are_discarded_even_out_of_order() {
        let (coordinator, pending) = controlled();
        let first = coordinator.run(true);
        let second = coordinator.run(true);

        let mut replies = std::mem::take(&mut *pending.borrow_mut());
        let _ = replies.pop_back().unwrap().send(Ok(vec![2]));
        block_on(second);
        let _ = replies.pop_front().unwrap().send(Ok(vec![1]));
        block_on(first);

        assert_eq!(coordinator.snapshot().data, Some(vec![2]));
    }

    #[test]
    fn loading_flag_follows_the_current_request() {
        let (coordinator, pending) = controlled();
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();

        spawner.spawn_local(coordinator.run(true)).unwrap();
        pool.run_until_stalled();
        assert!(coordinator.snapshot().is_updating);

        // a polling tick supersedes the manual refresh
        spawner.spawn_local(coordinator.run(false)).unwrap();
        pool.run_until_stalled();
        assert!(!coordinator.snapshot().is_updating);

        answer(&pending, Ok(vec![]));
        answer(&pending, Ok(vec![3]));
        pool.run_until_stalled();
        assert!(!coordinator.snapshot().is_updating);
        assert_eq!(coordinator.snapshot().data, Some(vec![3]));
    }

    #[test]
    fn unauthorized_calls_back_exactly_once() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let coordinator = immediate(move || {
            counter.set(counter.get() + 1);
            Err(ClientError::Unauthorized)
        });
        let auth_errors = Rc::new(Cell::new(0));
        let calls = auth_errors.clone();
        coordinator.on_auth_error(move || calls.set(calls.get() + 1));

        block_on(coordinator.run(false));

        assert_eq!(auth_errors.get(), 1);
        assert_eq!(attempts.get(), 1);
        assert_eq!(
            coordinator.snapshot().error.as_deref(),
            Some("Session expired. Please log in again.")
        );
    }

    #[test]
    fn failures_keep_existing_data() {
        let fail = Rc::new(Cell::new(false));
        let should_fail = fail.clone();
        let coordinator = immediate(move || {
            if should_fail.get() {
                Err(ClientError::APIError(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database offline".into(),
                ))
            } else {
                Ok(vec![7])
            }
        });
        block_on(coordinator.run(true));
        let loaded_at = coordinator.snapshot().last_updated;

        fail.set(true);
        block_on(coordinator.run(false));
        let state = coordinator.snapshot();
        assert_eq!(state.data, Some(vec![7]));
        assert_eq!(state.last_updated, loaded_at);
        assert_eq!(state.error.as_deref(), Some("Database offline"));

        coordinator.dismiss_error();
        assert_eq!(coordinator.snapshot().error, None);
    }

    #[test]
    fn error_messages_by_kind() {
        let fallback = "Failed to fetch users";
        assert_eq!(
            error_message(&ClientError::Forbidden, fallback),
            "You do not have permission to perform this action."
        );
        assert_eq!(
            error_message(
                &ClientError::APIError(StatusCode::BAD_GATEWAY, GENERIC_ERROR_MESSAGE.into()),
                fallback
            ),
            fallback
        );
        let validation = ClientError::Validation {
            message: "invalid email".into(),
            details: serde_json::Value::Null,
        };
        assert_eq!(error_message(&validation, fallback), "invalid email");
    }

    #[test]
    fn cancel_discards_the_in_flight_result() {
        let (coordinator, pending) = controlled();
        let mut pool = LocalPool::new();
        pool.spawner().spawn_local(coordinator.run(true)).unwrap();
        pool.run_until_stalled();

        coordinator.cancel();
        assert!(!coordinator.snapshot().is_updating);
        answer(&pending, Ok(vec![1]));
        pool.run_until_stalled();
        assert_eq!(coordinator.snapshot().data, None);
    }

    #[test]
    fn listeners_see_every_commit() {
        let coordinator = immediate(|| Ok(vec![1]));
        let seen: Rc<RefCell<Vec<(bool, Option<Vec<u32>>)>>> = Rc::default();
        let log = seen.clone();
        coordinator.subscribe(move |state| {
            log.borrow_mut().push((state.is_updating, state.data.clone()))
        });

        block_on(coordinator.run(true));
        coordinator.update_data(|data| data.push(2));

        assert_eq!(
            *seen.borrow(),
            vec![
                (true, None),
                (false, Some(vec![1])),
                (false, Some(vec![1, 2])),
            ]
        );
    }

    #[test]
    fn unmount_during_manual_refresh_leaves_nothing_running() {
        use crate::polling::{ManualScheduler, PollingState, PollingTimer};
        use crate::settings::RefreshSettings;
        use std::time::Duration;

        let (coordinator, pending) = controlled();
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let scheduler = ManualScheduler::new();
        let timer = {
            let coordinator = coordinator.clone();
            let spawner = spawner.clone();
            let every_minute = RefreshSettings {
                enabled: true,
                interval: 1,
            };
            Rc::new(PollingTimer::new(scheduler.clone(), every_minute, move || {
                let _ = spawner.spawn_local(coordinator.run(false));
            }))
        };
        timer.start();

        // manual refresh: reset the countdown once the data is in
        {
            let coordinator = coordinator.clone();
            let timer = timer.clone();
            spawner
                .spawn_local(async move {
                    if coordinator.request(true).await {
                        timer.reset();
                    }
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(pending.borrow().len(), 1);

        // unmount while the refresh is in flight
        timer.dispose();
        coordinator.cancel();
        pool.run_until_stalled();
        scheduler.advance(Duration::from_secs(5 * 60));
        pool.run_until_stalled();

        assert_eq!(timer.state(), PollingState::Idle);
        assert_eq!(scheduler.active_timers(), 0);
        assert_eq!(pending.borrow().len(), 1);
    }

    #[test]
    fn request_reports_whether_it_committed() {
        let (coordinator, pending) = controlled();
        let first = coordinator.request(true);
        let second = coordinator.request(false);
        answer(&pending, Ok(vec![1]));
        answer(&pending, Ok(vec![2]));

        assert!(!block_on(first));
        assert!(block_on(second));
    }
}
