//! Stepped measurement sweeps.
//!
//! A sweep puts the load under remote control in one regulation mode,
//! walks the level from `start` to `stop` (inclusive) in `step`
//! increments, and takes one measurement per level after `dwell`.

use std::thread;
use std::time::Duration;

use bkload_catalog::{LimitMode, Measure};
use bkload_transport::Transport;
use serde::Serialize;
use tracing::{debug, info};

use crate::device::Device;
use crate::error::{DeviceError, Result};

/// Slack when comparing the last point against `stop`, in steps.
const STEP_TOLERANCE: f64 = 1e-9;

/// Most levels a single sweep may visit.
pub const MAX_POINTS: usize = u32::MAX as usize;

/// Parameters of a sweep. Build with [`Sweep::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sweep {
    mode: LimitMode,
    start: f64,
    stop: f64,
    step: f64,
    dwell: Duration,
    points: usize,
}

/// One measurement taken during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Level requested from the load, in the mode's unit.
    pub requested: f64,
    pub volts: f64,
    pub amps: f64,
    pub watts: f64,
}

impl Sample {
    fn new(requested: f64, measure: &Measure) -> Self {
        Self {
            requested,
            volts: measure.volts,
            amps: measure.amps,
            watts: measure.watts,
        }
    }
}

impl Sweep {
    /// Validate the range. `step` must be nonzero and point from `start`
    /// toward `stop`, and the range may hold at most [`MAX_POINTS`] levels.
    pub fn new(mode: LimitMode, start: f64, stop: f64, step: f64, dwell: Duration) -> Result<Self> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(DeviceError::InvalidSweep(
                "start, stop and step must be finite".to_string(),
            ));
        }
        if step == 0.0 {
            return Err(DeviceError::InvalidSweep("step cannot be zero".to_string()));
        }
        if (stop - start) * step < 0.0 {
            return Err(DeviceError::InvalidSweep(format!(
                "step {step} never reaches {stop} from {start}"
            )));
        }
        let steps = ((stop - start) / step + STEP_TOLERANCE).floor();
        if !steps.is_finite() || steps >= MAX_POINTS as f64 {
            return Err(DeviceError::InvalidSweep(format!(
                "{start} to {stop} in steps of {step} exceeds {MAX_POINTS} points"
            )));
        }
        Ok(Self {
            mode,
            start,
            stop,
            step,
            dwell,
            points: steps as usize + 1,
        })
    }

    pub fn mode(&self) -> LimitMode {
        self.mode
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// Number of levels visited.
    pub fn point_count(&self) -> usize {
        self.points
    }

    /// The `index`-th level. Computed from `start`, so error does not accumulate.
    pub fn point(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.point_count()).map(|i| self.point(i))
    }

    /// Prepare the load and return an iterator over the measurements.
    ///
    /// Preparation: remote on, load off, select mode, set the start level,
    /// load on. Call [`SweepRun::finish`] afterwards to switch the load off.
    pub fn run<'a, T: Transport>(&self, device: &'a mut Device<T>) -> Result<SweepRun<'a, T>> {
        info!(
            mode = %self.mode,
            start = self.start,
            stop = self.stop,
            step = self.step,
            points = self.point_count(),
            "starting sweep"
        );
        device.enable_remote(true)?;
        device.enable_load(false)?;
        device.set_mode(self.mode)?;
        device.set_level(self.mode, self.start)?;
        device.enable_load(true)?;

        Ok(SweepRun {
            device,
            sweep: *self,
            index: 0,
            max_watts: None,
        })
    }
}

/// A sweep in progress. Yields one [`Sample`] per level.
#[derive(Debug)]
pub struct SweepRun<'a, T> {
    device: &'a mut Device<T>,
    sweep: Sweep,
    index: usize,
    max_watts: Option<f64>,
}

impl<T: Transport> SweepRun<'_, T> {
    /// Levels visited so far and the total.
    pub fn progress(&self) -> (usize, usize) {
        (self.index, self.sweep.point_count())
    }

    /// Highest power measured so far.
    pub fn max_watts(&self) -> Option<f64> {
        self.max_watts
    }

    /// Switch the load input off.
    pub fn finish(self) -> Result<()> {
        info!(samples = self.index, "sweep finished");
        self.device.enable_load(false)
    }

    fn sample(&mut self, requested: f64) -> Result<Sample> {
        self.device.set_level(self.sweep.mode, requested)?;
        if !self.sweep.dwell.is_zero() {
            thread::sleep(self.sweep.dwell);
        }
        let measure = self.device.measure()?;
        debug!(requested, %measure, "sweep sample");
        Ok(Sample::new(requested, &measure))
    }
}

impl<T: Transport> Iterator for SweepRun<'_, T> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.sweep.point_count() {
            return None;
        }
        let requested = self.sweep.point(self.index);
        self.index += 1;

        let sample = self.sample(requested);
        if let Ok(sample) = &sample {
            self.max_watts = Some(self.max_watts.map_or(sample.watts, |m| m.max(sample.watts)));
        }
        Some(sample)
    }
}
