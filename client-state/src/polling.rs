use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::settings::RefreshSettings;

/// Source of repeating timers.
///
/// Dropping the returned handle cancels the timer.
pub trait Scheduler {
    type Handle;

    fn schedule_repeating(&self, period: Duration, tick: Rc<dyn Fn()>)
    -> Self::Handle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingState {
    Idle,
    Polling,
}

/// Invokes `on_tick` every `interval` minutes while polling is enabled.
///
/// At most one timer is installed at a time: starting again replaces it.
pub struct PollingTimer<S: Scheduler> {
    scheduler: S,
    settings: Cell<RefreshSettings>,
    on_tick: Rc<dyn Fn()>,
    handle: RefCell<Option<S::Handle>>,
    disposed: Cell<bool>,
}

impl<S: Scheduler> PollingTimer<S> {
    /// Created idle; call [`PollingTimer::start`] to begin.
    pub fn new(
        scheduler: S,
        settings: RefreshSettings,
        on_tick: impl Fn() + 'static,
    ) -> Self {
        Self {
            scheduler,
            settings: Cell::new(settings),
            on_tick: Rc::new(on_tick),
            handle: RefCell::new(None),
            disposed: Cell::new(false),
        }
    }

    pub fn settings(&self) -> RefreshSettings {
        self.settings.get()
    }

    pub fn state(&self) -> PollingState {
        if self.handle.borrow().is_some() {
            PollingState::Polling
        } else {
            PollingState::Idle
        }
    }

    /// Install a fresh timer using the current interval. Does nothing beyond
    /// clearing the old timer if polling is disabled.
    pub fn start(&self) {
        self.stop();
        let settings = self.settings.get();
        if !settings.enabled || self.disposed.get() {
            return;
        }
        tracing::debug!(interval = settings.interval, "polling started");
        let handle = self
            .scheduler
            .schedule_repeating(settings.period(), self.on_tick.clone());
        *self.handle.borrow_mut() = Some(handle);
    }

    pub fn stop(&self) {
        // released before the handle's drop runs
        let handle = self.handle.borrow_mut().take();
        if handle.is_some() {
            tracing::debug!("polling stopped");
        }
        drop(handle);
    }

    /// Stop for good. Later calls to start, reset or update install nothing,
    /// so a task finishing after the owner is gone cannot revive the timer.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.stop();
    }

    /// Restart the countdown, e.g. after a manual refresh.
    pub fn reset(&self) {
        self.start();
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.update(RefreshSettings {
            enabled,
            ..self.settings.get()
        });
    }

    /// Apply new settings: disabling stops, enabling starts, and an interval
    /// change while polling replaces the timer.
    pub fn update(&self, settings: RefreshSettings) {
        let previous = self.settings.replace(settings);
        match (settings.enabled, self.state()) {
            (false, _) => self.stop(),
            (true, PollingState::Idle) => self.start(),
            (true, PollingState::Polling)
                if previous.interval != settings.interval =>
            {
                self.start()
            }
            (true, PollingState::Polling) => {}
        }
    }
}

struct ManualTimer {
    period: Duration,
    next_due: Duration,
    tick: Rc<dyn Fn()>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<u64, ManualTimer>,
}

/// A scheduler driven by hand, for tests. Time only moves on
/// [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

pub struct ManualHandle {
    id: u64,
    clock: Weak<RefCell<ManualClock>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.upgrade() {
            clock.borrow_mut().timers.remove(&self.id);
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule_repeating(
        &self,
        period: Duration,
        tick: Rc<dyn Fn()>,
    ) -> ManualHandle {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let id = clock.next_id;
        let next_due = clock.now + period;
        clock.timers.insert(
            id,
            ManualTimer {
                period,
                next_due,
                tick,
            },
        );
        ManualHandle {
            id,
            clock: Rc::downgrade(&self.clock),
        }
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    pub fn active_timers(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Move time forward, firing every tick that falls due in order. Ticks
    /// may start or stop timers.
    pub fn advance(&self, duration: Duration) {
        let target = self.now() + duration;
        loop {
            let due = {
                let mut clock = self.clock.borrow_mut();
                let next = clock
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.next_due <= target)
                    .min_by_key(|(id, timer)| (timer.next_due, **id))
                    .map(|(id, _)| *id);
                next.and_then(|id| {
                    let timer = clock.timers.get_mut(&id)?;
                    let fired_at = timer.next_due;
                    timer.next_due += timer.period.max(Duration::from_millis(1));
                    let tick = timer.tick.clone();
                    clock.now = fired_at;
                    Some(tick)
                })
            };
            match due {
                Some(tick) => tick(),
                None => break,
            }
        }
        self.clock.borrow_mut().now = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn counting_timer(
        settings: RefreshSettings,
    ) -> (ManualScheduler, PollingTimer<ManualScheduler>, Rc<Cell<u32>>) {
        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let timer = PollingTimer::new(scheduler.clone(), settings, move || {
            counter.set(counter.get() + 1)
        });
        (scheduler, timer, ticks)
    }

    fn every(minutes: u32) -> RefreshSettings {
        RefreshSettings {
            enabled: true,
            interval: minutes,
        }
    }

    #[test]
    fn ticks_once_per_interval() {
        let (scheduler, timer, ticks) = counting_timer(every(5));
        timer.start();
        assert_eq!(timer.state(), PollingState::Polling);

        scheduler.advance(MINUTE * 4);
        assert_eq!(ticks.get(), 0);
        scheduler.advance(MINUTE);
        assert_eq!(ticks.get(), 1);
        scheduler.advance(MINUTE * 10);
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn start_is_a_no_op_when_disabled() {
        let (scheduler, timer, ticks) = counting_timer(RefreshSettings {
            enabled: false,
            interval: 1,
        });
        timer.start();
        assert_eq!(timer.state(), PollingState::Idle);
        assert_eq!(scheduler.active_timers(), 0);
        scheduler.advance(MINUTE * 10);
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn disabling_stops_ticks() {
        let (scheduler, timer, ticks) = counting_timer(every(1));
        timer.start();
        scheduler.advance(MINUTE);
        assert_eq!(ticks.get(), 1);

        timer.set_enabled(false);
        assert_eq!(timer.state(), PollingState::Idle);
        scheduler.advance(MINUTE * 5);
        assert_eq!(ticks.get(), 1);
    }

    #[test]
    fn re_enabling_does_not_double_schedule() {
        let (scheduler, timer, ticks) = counting_timer(every(1));
        timer.start();
        timer.set_enabled(false);
        timer.set_enabled(true);
        timer.set_enabled(true);
        timer.start();
        assert_eq!(scheduler.active_timers(), 1);

        scheduler.advance(MINUTE);
        assert_eq!(ticks.get(), 1);
    }

    #[test]
    fn reset_restarts_the_countdown() {
        let (scheduler, timer, ticks) = counting_timer(every(5));
        timer.start();
        scheduler.advance(MINUTE * 4);

        // manual refresh
        timer.reset();
        scheduler.advance(MINUTE * 4);
        assert_eq!(ticks.get(), 0);
        scheduler.advance(MINUTE);
        assert_eq!(ticks.get(), 1);
    }

    #[test]
    fn interval_change_replaces_timer() {
        let (scheduler, timer, ticks) = counting_timer(every(10));
        timer.start();
        scheduler.advance(MINUTE * 9);

        timer.update(every(1));
        assert_eq!(scheduler.active_timers(), 1);
        scheduler.advance(MINUTE);
        assert_eq!(ticks.get(), 1);
        scheduler.advance(MINUTE);
        assert_eq!(ticks.get(), 2);
    }

    #[test]
    fn unchanged_settings_keep_the_countdown() {
        let (scheduler, timer, ticks) = counting_timer(every(5));
        timer.start();
        scheduler.advance(MINUTE * 3);
        timer.update(every(5));
        scheduler.advance(MINUTE * 2);
        assert_eq!(ticks.get(), 1);
    }

    #[test]
    fn dropping_the_timer_cancels_it() {
        let (scheduler, timer, ticks) = counting_timer(every(1));
        timer.start();
        drop(timer);
        assert_eq!(scheduler.active_timers(), 0);
        scheduler.advance(MINUTE * 3);
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn disposed_timer_stays_idle() {
        let (scheduler, timer, ticks) = counting_timer(every(1));
        timer.start();
        timer.dispose();

        timer.reset();
        timer.update(every(2));
        timer.set_enabled(true);
        assert_eq!(timer.state(), PollingState::Idle);
        assert_eq!(scheduler.active_timers(), 0);
        scheduler.advance(MINUTE * 5);
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn zero_interval_polls_every_minute() {
        let (scheduler, timer, ticks) = counting_timer(every(0));
        timer.start();
        scheduler.advance(MINUTE * 2);
        assert_eq!(ticks.get(), 2);
    }

    #[test]
    fn a_tick_may_stop_its_own_timer() {
        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<ManualHandle>>> = Rc::default();
        let (counter, own) = (ticks.clone(), slot.clone());
        let handle = scheduler.schedule_repeating(
            MINUTE,
            Rc::new(move || {
                counter.set(counter.get() + 1);
                own.borrow_mut().take();
            }),
        );
        *slot.borrow_mut() = Some(handle);

        scheduler.advance(MINUTE * 5);
        assert_eq!(ticks.get(), 1);
        assert_eq!(scheduler.active_timers(), 0);
    }
}
