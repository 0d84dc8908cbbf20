use jiff::{SignedDuration, Timestamp};
use std::cell::Cell;
use std::rc::Rc;

/// Wall clock that tests can freeze and move by hand.
#[derive(Clone, Default)]
pub struct TimeSource {
    mock: Option<Rc<Cell<Timestamp>>>,
}

impl TimeSource {
    pub fn new() -> Self {
        Self { mock: None }
    }

    pub fn mock(initial_time: Timestamp) -> Self {
        Self {
            mock: Some(Rc::new(Cell::new(initial_time))),
        }
    }

    pub fn now(&self) -> Timestamp {
        match &self.mock {
            Some(time) => time.get(),
            None => Timestamp::now(),
        }
    }

    /// No effect on a real clock.
    pub fn advance(&self, duration: SignedDuration) {
        if let Some(time) = &self.mock {
            time.set(time.get() + duration);
        }
    }

    /// No effect on a real clock.
    pub fn set(&self, time: Timestamp) {
        if let Some(mock) = &self.mock {
            mock.set(time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mocked_clones_share_time() {
        let time = TimeSource::mock("2025-01-01T00:00:00Z".parse().unwrap());
        let other = time.clone();
        time.advance(SignedDuration::from_secs(90));
        assert_eq!(other.now().to_string(), "2025-01-01T00:01:30Z");
    }
}
