use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Services never read the system clock directly, so tests can control time.
pub trait InstantProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`InstantProvider`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcInstantProvider;

impl InstantProvider for UtcInstantProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> InstantProvider for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}
