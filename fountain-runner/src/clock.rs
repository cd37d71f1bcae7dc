//! Fixed-rate frame pacing and frame-time statistics.

use crate::error::RunnerError;
use hdrhistogram::Histogram;
use log::warn;
use std::time::{Duration, Instant};

/// Highest frame time tracked by the histogram: one minute, in microseconds.
const MAX_TRACKED_MICROS: u64 = 60_000_000;

/// Summary of the frames measured by a [`FrameClock`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub mean_micros: f64,
    pub p50_micros: u64,
    pub p99_micros: u64,
    pub max_micros: u64,
    pub overruns: u64,
}

/// Paces the host loop to a fixed frame rate and records how long each
/// frame's work took.
pub struct FrameClock {
    frame_duration: Duration,
    paced: bool,
    frame_start: Instant,
    histogram: Histogram<u64>,
    overruns: u64,
}

impl FrameClock {
    /// A clock that sleeps off whatever is left of each frame.
    pub fn new(framerate: u32) -> Result<Self, RunnerError> {
        Ok(Self {
            frame_duration: Duration::from_secs_f64(1.0 / f64::from(framerate.max(1))),
            paced: true,
            frame_start: Instant::now(),
            histogram: Histogram::new_with_bounds(1, MAX_TRACKED_MICROS, 3)?,
            overruns: 0,
        })
    }

    /// A clock that measures frames but never sleeps.
    pub fn unpaced(framerate: u32) -> Result<Self, RunnerError> {
        let mut clock = Self::new(framerate)?;
        clock.paced = false;
        Ok(clock)
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Records the frame and, when paced, sleeps until the frame budget is used up.
    ///
    /// Returns the time the frame's work took.
    pub fn end_frame(&mut self) -> Duration {
        let elapsed = self.frame_start.elapsed();
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX).max(1);
        self.histogram.saturating_record(micros);

        if elapsed < self.frame_duration {
            if self.paced {
                spin_sleep::sleep(self.frame_duration - elapsed);
            }
        } else {
            self.overruns += 1;
            if self.paced {
                warn!(
                    "Frame time exceeded budget: {:?} > {:?}",
                    elapsed, self.frame_duration
                );
            }
        }
        elapsed
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frames: self.histogram.len(),
            mean_micros: self.histogram.mean(),
            p50_micros: self.histogram.value_at_quantile(0.5),
            p99_micros: self.histogram.value_at_quantile(0.99),
            max_micros: self.histogram.max(),
            overruns: self.overruns,
        }
    }
}
