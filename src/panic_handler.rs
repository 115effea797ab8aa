use log::error;
use std::any::Any;
use std::cell::Cell;
use std::panic;

thread_local! {
    static SUPPRESS_EXIT: Cell<bool> = const { Cell::new(false) };
}

pub fn initialize_panic_handler() {
    #[cfg(not(debug_assertions))]
    human_panic::setup_panic!();
    #[cfg(debug_assertions)]
    better_panic::install();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let suppress = SUPPRESS_EXIT.with(|flag| flag.get());
        if suppress {
            error!("Suppressed panic: {}", payload_message(panic_info.payload()));
            // Leave it to catch_unwind in the caller.
            return;
        }

        default_hook(panic_info);
        std::process::exit(1);
    }));
}

/// Runs `f` with the process-exiting panic hook turned off on this thread.
///
/// Pair it with `catch_unwind` to survive a panic in `f`.
pub fn with_panic_exit_suppressed<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    struct ExitGuard(bool);
    impl Drop for ExitGuard {
        fn drop(&mut self) {
            SUPPRESS_EXIT.with(|flag| flag.set(self.0));
        }
    }

    let previous = SUPPRESS_EXIT.with(|flag| {
        let prev = flag.get();
        flag.set(true);
        prev
    });
    let guard = ExitGuard(previous);
    let result = f();
    drop(guard);
    result
}

/// Best-effort text of a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
