use super::api::GraphicsApi;

/// Drains pending GPU errors and logs each one.
///
/// Returns `true` when at least one error was pending. With `always_log`
/// set, a clean poll is also reported at trace level. Errors never change
/// control flow here; callers decide whether to assert on the result.
pub fn check_and_log_error(gpu: &(impl GraphicsApi + ?Sized), always_log: bool) -> bool {
    let mut found = false;
    while let Some(err) = gpu.take_error() {
        log::error!("gpu error: {err}");
        found = true;
    }

    if !found && always_log {
        log::trace!("gpu error check: clean");
    }
    found
}
