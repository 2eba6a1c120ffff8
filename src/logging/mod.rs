//! Episode and step statistics logging
pub mod cli;

pub use cli::CLILogger;

use enum_map::Enum;
use thiserror::Error;

/// Points in a run at which logged values are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Event {
    /// One environment step.
    Step,
    /// One complete episode.
    Episode,
}

/// A loggable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loggable {
    /// No data; still registers the name.
    Nothing,
    /// A number, summarized by mean, min and max.
    Scalar(f64),
    /// One draw of an index in `0 .. size`, summarized as a distribution.
    IndexSample { value: usize, size: usize },
}

impl From<f64> for Loggable {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

/// Receives values produced while running episodes.
pub trait Logger {
    /// Log a value.
    ///
    /// # Args
    /// * `event` - Groups the value with others from the same step or episode.
    /// * `name` - Key under which values are aggregated.
    /// * `value` - Value recorded for the current event.
    ///
    /// # Returns
    /// An error if `value` has a different kind (or index range) than earlier values
    /// logged under `name`.
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError>;

    /// Close the current `event`; values logged since the last call belong to it.
    fn done(&mut self, event: Event);

    /// Log a value, discarding any [`LogError`].
    fn log_or_skip(&mut self, event: Event, name: &str, value: Loggable) {
        let _ = self.log(event, name, value);
    }
}

/// Discards everything.
impl Logger for () {
    fn log(&mut self, _: Event, _: &str, _: Loggable) -> Result<(), LogError> {
        Ok(())
    }

    fn done(&mut self, _: Event) {}
}

impl<T: Logger + ?Sized> Logger for &mut T {
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError> {
        T::log(self, event, name, value)
    }

    fn done(&mut self, event: Event) {
        T::done(self, event)
    }
}

/// A logged value is incompatible with earlier values of the same name.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("\"{name}\": incompatible value {value:?}, expected {expected}")]
pub struct LogError {
    name: String,
    value: Loggable,
    expected: String,
}

impl LogError {
    pub fn new(name: impl Into<String>, value: Loggable, expected: String) -> Self {
        Self {
            name: name.into(),
            value,
            expected,
        }
    }
}
