use once_cell::sync::Lazy;
use std::{io, sync::Mutex};
use tracing_core::Dispatch;
use tracing_subscriber::{fmt::MakeWriter, util::SubscriberInitExt};

lazy_static! {
    /// Everything logged by the test process since `init_tracing`.
    pub static ref CAPTURED_LOGS: Mutex<Vec<u8>> = Mutex::new(Vec::new());
}

static SUBSCRIBER_INIT: Lazy<()> = Lazy::new(|| {
    let subscriber: Dispatch = tracing_subscriber::fmt()
        .with_writer(LogCapture)
        .with_max_level(::tracing::Level::DEBUG)
        .with_level(true)
        .into();
    // another test in this binary may have installed a subscriber already
    let _ = subscriber.try_init();
});

pub fn init_tracing() {
    Lazy::force(&SUBSCRIBER_INIT);
}

/// Echoes formatted log lines to stdout and appends them to `CAPTURED_LOGS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCapture;

impl io::Write for LogCapture {
    fn write(&mut self, line: &[u8]) -> io::Result<usize> {
        print!("{}", String::from_utf8_lossy(line));
        CAPTURED_LOGS
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log capture poisoned"))?
            .extend_from_slice(line);
        Ok(line.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MakeWriter for LogCapture {
    type Writer = Self;

    fn make_writer(&self) -> Self::Writer {
        *self
    }
}

/// Panics on a poisoned buffer, test code only.
pub fn logs_contain(needle: &str) -> bool {
    let logs = CAPTURED_LOGS.lock().unwrap();
    String::from_utf8_lossy(&logs)
        .lines()
        .any(|line| line.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_events_after_init() {
        init_tracing();
        ::tracing::info!("capture check {}", 7);
        assert!(logs_contain("capture check 7"));
        assert!(!logs_contain("never logged"));
    }
}
