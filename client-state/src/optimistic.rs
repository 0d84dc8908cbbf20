use std::future::Future;

/// Apply a local change before the server confirms it.
///
/// `apply` makes the change and returns whatever `revert` needs to undo it.
/// If `remote` fails the change is reverted and the error returned.
pub async fn apply_optimistically<S, T, E, Fut>(
    apply: impl FnOnce() -> S,
    revert: impl FnOnce(S),
    remote: impl FnOnce() -> Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let snapshot = apply();
    match remote().await {
        Ok(value) => Ok(value),
        Err(e) => {
            revert(snapshot);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[test]
    fn success_keeps_the_change() {
        let dark_mode = Cell::new(false);
        let result: Result<(), ()> = block_on(apply_optimistically(
            || dark_mode.replace(true),
            |previous| dark_mode.set(previous),
            || async { Ok(()) },
        ));
        assert!(result.is_ok());
        assert!(dark_mode.get());
    }

    #[test]
    fn failure_rolls_back() {
        let dark_mode = Cell::new(false);
        let result: Result<(), &str> = block_on(apply_optimistically(
            || dark_mode.replace(true),
            |previous| dark_mode.set(previous),
            || async {
                // the change is visible while the request is in flight
                assert!(dark_mode.get());
                Err("Failed to update preferences")
            },
        ));
        assert_eq!(result, Err("Failed to update preferences"));
        assert!(!dark_mode.get());
    }
}
