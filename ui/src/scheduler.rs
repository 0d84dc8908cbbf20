use client_state::Scheduler;
use gloo_timers::callback::Interval;
use std::rc::Rc;
use std::time::Duration;

/// Repeating timers on the browser event loop. Dropping the returned
/// [`Interval`] clears it.
#[derive(Clone, Copy, Default)]
pub struct IntervalScheduler;

impl Scheduler for IntervalScheduler {
    type Handle = Interval;

    fn schedule_repeating(&self, period: Duration, tick: Rc<dyn Fn()>) -> Interval {
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        Interval::new(millis, move || tick())
    }
}
