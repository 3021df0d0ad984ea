//! Stage timings for a build run

use std::fmt::Write as _;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    duration: Duration,
    /// Set once a stop has been recorded for this entry
    stopped: bool,
}

/// A sequence of named stages and how long each took
///
/// `start` opens a stage and `stop` closes the most recent one. A stage that
/// is started but never stopped keeps a zero duration in the summary.
#[derive(Debug)]
pub struct Stopwatch {
    entries: Vec<Entry>,
    started: Instant,
    echo: bool,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// A stopwatch that prints `=> NAME` when a stage starts
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            started: Instant::now(),
            echo: true,
        }
    }

    /// A stopwatch that prints nothing
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    pub fn start(&mut self, name: &str) {
        if self.echo {
            if !self.entries.is_empty() {
                println!();
            }
            println!("=> {name}");
        }
        self.entries.push(Entry {
            name: name.to_string(),
            duration: Duration::ZERO,
            stopped: false,
        });
        self.started = Instant::now();
    }

    /// Close the most recent stage
    ///
    /// When that stage was already stopped, a copy of it is appended and
    /// timed instead.
    pub fn stop(&mut self) {
        let Some(last) = self.entries.last() else {
            return;
        };
        if last.stopped {
            let copy = last.clone();
            self.entries.push(copy);
        }
        let elapsed = self.started.elapsed();
        if let Some(entry) = self.entries.last_mut() {
            entry.stopped = true;
            entry.duration = elapsed;
        }
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[cfg(test)]
    pub fn durations(&self) -> Vec<Duration> {
        self.entries.iter().map(|e| e.duration).collect()
    }

    pub fn total(&self) -> Duration {
        self.entries.iter().map(|e| e.duration).sum()
    }

    /// `TIMINGS`, one padded line per stage, then `TOTAL:`
    ///
    /// Empty when no stage was ever started.
    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let width = self.entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
        let mut out = String::from("\nTIMINGS\n");
        for entry in &self.entries {
            let _ = writeln!(
                out,
                "  {:<width$} {:?}",
                entry.name,
                truncate_ms(entry.duration)
            );
        }
        let _ = writeln!(out, "TOTAL: {:?}", truncate_ms(self.total()));
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.summary());
    }
}

fn truncate_ms(duration: Duration) -> Duration {
    Duration::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
