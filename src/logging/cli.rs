//! Logger printing periodic summaries to the terminal
use super::{Event, LogError, Loggable, Logger};
use enum_map::{enum_map, EnumMap};
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that writes periodic summaries to stdout.
///
/// Values are aggregated per [`Event`] and name; a summary of everything aggregated since the
/// previous summary is displayed once `display_period` has elapsed and when the logger is dropped.
#[derive(Debug)]
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,
}

impl CLILogger {
    pub fn new(display_period: Duration) -> Self {
        Self {
            events: enum_map! { _ => EventLog::new() },
            display_period,
            last_display_time: Instant::now(),
        }
    }

    /// Summary of the values aggregated since the last display.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (event, event_log) in &self.events {
            // Writing to a String cannot fail
            let _ = event_log.write_summary(&mut out, event);
        }
        out
    }

    /// Display the summary and clear all aggregated data.
    pub fn display(&mut self) {
        let summary = self.summary();
        if !summary.is_empty() {
            println!();
            print!("{}", summary);
        }
        for event_log in self.events.values_mut() {
            event_log.clear();
        }
        self.last_display_time = Instant::now();
    }
}

impl Default for CLILogger {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Logger for CLILogger {
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError> {
        // Separate get() / insert() since the entry API requires an owned key.
        // Aggregators are never removed so the insert happens once per name.
        let aggregators = &mut self.events[event].aggregators;
        if let Some(aggregator) = aggregators.get_mut(name) {
            if let Err((value, expected)) = aggregator.update(value) {
                return Err(LogError::new(name, value, expected));
            }
        } else {
            aggregators.insert(name.into(), Aggregator::new(value));
        }
        Ok(())
    }

    fn done(&mut self, event: Event) {
        let event_log = &mut self.events[event];
        event_log.index += 1;
        for aggregator in event_log.aggregators.values_mut() {
            aggregator.commit()
        }

        if self.last_display_time.elapsed() >= self.display_period {
            self.display();
        }
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Flush anything not yet displayed
        self.display();
    }
}

#[derive(Debug)]
struct EventLog {
    /// Number of completed events
    index: u64,
    /// `index` when the current summary period began
    summary_start_index: u64,
    /// Aggregator per logged name.
    aggregators: BTreeMap<String, Aggregator>,
}

impl EventLog {
    #[allow(clippy::missing_const_for_fn)] // BTreeMap const new not stabilized
    fn new() -> Self {
        Self {
            index: 0,
            summary_start_index: 0,
            aggregators: BTreeMap::new(),
        }
    }

    fn write_summary<W: Write>(&self, out: &mut W, event: Event) -> fmt::Result {
        if self.index == self.summary_start_index {
            return Ok(());
        }
        writeln!(
            out,
            "==== {:?}s {} - {} ====",
            event,
            self.summary_start_index,
            self.index - 1
        )?;
        for (name, aggregator) in &self.aggregators {
            writeln!(out, "{:<16} {}", Paint::fixed(35, name), aggregator)?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        for aggregator in self.aggregators.values_mut() {
            aggregator.clear();
        }
        self.summary_start_index = self.index;
    }
}

#[derive(Debug)]
enum Aggregator {
    /// Only records that the name was logged
    Nothing,
    Scalar {
        stats: ScalarStats,
        pending: Option<f64>,
    },
    IndexDistribution {
        counts: Vec<u64>,
        pending: Option<usize>,
    },
}

impl Aggregator {
    /// Create a new aggregator from a logged value.
    fn new(value: Loggable) -> Self {
        match value {
            Loggable::Nothing => Self::Nothing,
            Loggable::Scalar(x) => Self::Scalar {
                stats: ScalarStats::default(),
                pending: Some(x),
            },
            Loggable::IndexSample { value, size } => Self::IndexDistribution {
                counts: vec![0; size],
                pending: Some(value),
            },
        }
    }

    /// Stage a value logged during the current event.
    ///
    /// Returns `Err((value, expected))` if the value is incompatible with this aggregator.
    fn update(&mut self, value: Loggable) -> Result<(), (Loggable, String)> {
        match (self, value) {
            (Self::Nothing, Loggable::Nothing) => {}
            (Self::Scalar { pending, .. }, Loggable::Scalar(x)) => *pending = Some(x),
            (Self::IndexDistribution { counts, pending }, Loggable::IndexSample { value, size })
                if counts.len() == size && value < size =>
            {
                *pending = Some(value)
            }
            (aggregator, value) => return Err((value, aggregator.expected())),
        }
        Ok(())
    }

    fn expected(&self) -> String {
        match self {
            Self::Nothing => "Nothing".into(),
            Self::Scalar { .. } => "Scalar".into(),
            Self::IndexDistribution { counts, .. } => {
                format!("IndexSample{{size: {}}}", counts.len())
            }
        }
    }

    /// Commit the pending value into the aggregate.
    fn commit(&mut self) {
        match self {
            Self::Nothing => {}
            Self::Scalar { stats, pending } => {
                if let Some(x) = pending.take() {
                    stats.insert(x)
                }
            }
            Self::IndexDistribution { counts, pending } => {
                if let Some(i) = pending.take() {
                    if let Some(count) = counts.get_mut(i) {
                        *count += 1;
                    }
                }
            }
        }
    }

    /// Reset the committed aggregate; a pending value is kept.
    fn clear(&mut self) {
        match self {
            Self::Nothing => {}
            Self::Scalar { stats, .. } => *stats = ScalarStats::default(),
            Self::IndexDistribution { counts, .. } => counts.iter_mut().for_each(|c| *c = 0),
        }
    }
}

/// Display the committed aggregated value.
impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::Scalar { stats, .. } => stats.fmt(f),
            Self::IndexDistribution { counts, .. } => {
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return write!(f, "None");
                }
                write!(f, "(n {})  [", total)?;
                for (i, c) in counts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", c * 100 / total)?;
                }
                write!(f, "]%")
            }
        }
    }
}

/// Running mean, minimum and maximum.
#[derive(Debug, Clone, Copy)]
struct ScalarStats {
    sum: f64,
    count: u64,
    min: f64,
    max: f64,
}

impl Default for ScalarStats {
    fn default() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl ScalarStats {
    fn insert(&mut self, x: f64) {
        self.sum += x;
        self.count += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }
}

impl fmt::Display for ScalarStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "None");
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.sum / self.count as f64;
        write!(
            f,
            "{:.3} {}",
            mean,
            Paint::fixed(8, format!("[{:.3}, {:.3}]", self.min, self.max))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> CLILogger {
        // Long period so that nothing is displayed during the test
        CLILogger::new(Duration::from_secs(3600))
    }

    #[test]
    fn scalar_mean() {
        let mut logger = logger();
        for reward in [10.0, 20.0, 30.0] {
            logger.log(Event::Episode, "reward", reward.into()).unwrap();
            logger.done(Event::Episode);
        }
        let summary = logger.summary();
        assert!(summary.contains("Episodes 0 - 2"), "{}", summary);
        assert!(summary.contains("20.000"), "{}", summary);
        assert!(summary.contains("[10.000, 30.000]"), "{}", summary);
    }

    #[test]
    fn last_value_within_event_wins() {
        let mut logger = logger();
        logger.log(Event::Step, "x", 1.0.into()).unwrap();
        logger.log(Event::Step, "x", 3.0.into()).unwrap();
        logger.done(Event::Step);
        assert!(logger.summary().contains("3.000"));
    }

    #[test]
    fn index_distribution() {
        let mut logger = logger();
        for value in [0, 1, 1, 1] {
            logger
                .log(Event::Step, "action", Loggable::IndexSample { value, size: 2 })
                .unwrap();
            logger.done(Event::Step);
        }
        assert!(logger.summary().contains("(n 4)  [25 75]%"));
    }

    #[test]
    fn incompatible_value() {
        let mut logger = logger();
        logger.log(Event::Step, "x", 1.0.into()).unwrap();
        let err = logger
            .log(Event::Step, "x", Loggable::IndexSample { value: 0, size: 2 })
            .unwrap_err();
        assert_eq!(
            err,
            LogError::new(
                "x",
                Loggable::IndexSample { value: 0, size: 2 },
                "Scalar".into()
            )
        );
    }

    #[test]
    fn display_clears() {
        let mut logger = logger();
        logger.log(Event::Episode, "steps", 5.0.into()).unwrap();
        logger.done(Event::Episode);
        logger.display();
        assert!(logger.summary().is_empty());

        logger.log(Event::Episode, "steps", 7.0.into()).unwrap();
        logger.done(Event::Episode);
        assert!(logger.summary().contains("Episodes 1 - 1"));
    }
}
