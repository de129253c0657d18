//! Routes panic backtraces through tracing so they reach the same sinks as
//! every other log line.

use std::{backtrace::Backtrace, panic};

use tracing::*;

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

/// Sets a panic hook that logs the backtrace and then calls the previous hook.
pub fn set_panic_hook() {
    let old_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let bt = Backtrace::force_capture();
        let location = info.location().map(|l| l.to_string());
        match panic_reason(info.payload()) {
            Some(reason) => error!(%reason, ?location, "thread panicking\n{bt}"),
            None => error!(?location, "thread panicking\n{bt}"),
        }
        old_hook(info);
    }));
}
