//! Landmark sources and the estimator thread.
//!
//! A [`LandmarkSource`] stands in for the camera + hand-landmark model: each
//! call yields the hands found in one analysed frame. [`TrackingWorker`]
//! polls a source on its own thread, runs the [`TensionEstimator`] and fans
//! the result out to its [`TensionSink`]s. Consumers never learn whether the
//! hands came from a real device or the simulator.

use std::f32::consts::TAU;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glam::Vec3;

use crate::constants::{CLOSED_HAND_RATIO, FINGERTIPS, HAND_LANDMARK_COUNT, OPEN_HAND_RATIO};
use crate::signal::TensionSink;
use crate::status::{CaptureError, TensionStatus};
use crate::tension::{HandLandmarks, TensionEstimator};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver per-frame hand landmarks.
pub trait LandmarkSource: Send + 'static {
    fn next_frame(&mut self) -> Result<Vec<HandLandmarks>, CaptureError>;
}

/// A source whose device could not be opened. Every poll fails with the
/// same category.
pub struct UnavailableCamera(pub CaptureError);

impl LandmarkSource for UnavailableCamera {
    fn next_frame(&mut self) -> Result<Vec<HandLandmarks>, CaptureError> {
        Err(self.0.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimulatedHands
// ════════════════════════════════════════════════════════════════════════════

/// Scripted hands for running without a camera.
///
/// Hands slowly open and close on a cosine. The number of visible hands
/// cycles through none, one and two so the absent path is exercised too.
pub struct SimulatedHands {
    frame: u64,
    frames_per_sec: f32,
    /// Seconds per full open → closed → open cycle.
    pub grip_period: f32,
    /// Seconds spent in each of the 0/1/2-hand phases, in that order.
    pub phase_secs: [f32; 3],
}

impl SimulatedHands {
    pub fn new(frames_per_sec: f32) -> Self {
        Self {
            frame: 0,
            frames_per_sec: frames_per_sec.max(1.0),
            grip_period: 6.0,
            phase_secs: [2.0, 10.0, 6.0],
        }
    }

    fn elapsed_secs(&self) -> f32 {
        self.frame as f32 / self.frames_per_sec
    }

    fn hand_count_at(&self, t: f32) -> usize {
        let cycle: f32 = self.phase_secs.iter().sum();
        if cycle <= 0.0 {
            return 1;
        }
        let mut local = t % cycle;
        for (count, span) in self.phase_secs.iter().enumerate() {
            if local < *span {
                return count;
            }
            local -= span;
        }
        1
    }

    /// Openness ratio at time `t`, sweeping from the fully open to the fully
    /// closed calibration point and back.
    fn ratio_at(&self, t: f32) -> f32 {
        let phase = (t / self.grip_period.max(f32::EPSILON)) * TAU;
        let open = 0.5 + 0.5 * phase.cos();
        CLOSED_HAND_RATIO + (OPEN_HAND_RATIO - CLOSED_HAND_RATIO) * open
    }
}

impl LandmarkSource for SimulatedHands {
    fn next_frame(&mut self) -> Result<Vec<HandLandmarks>, CaptureError> {
        let t = self.elapsed_secs();
        self.frame += 1;
        let ratio = self.ratio_at(t);
        (0..self.hand_count_at(t))
            .map(|i| {
                let wrist = Vec3::new(0.3 + 0.4 * i as f32, 0.8, 0.0);
                synthetic_hand(wrist, 0.12, ratio)
                    .map_err(|e| CaptureError::Unknown(e.to_string()))
            })
            .collect()
    }
}

/// Build a plausible 21-point hand whose fingertips all sit `ratio * scale`
/// from the wrist and whose middle knuckle sits `scale` above it.
pub fn synthetic_hand(
    wrist: Vec3,
    scale: f32,
    ratio: f32,
) -> Result<HandLandmarks, crate::error::MorphError> {
    let mut points = [wrist; HAND_LANDMARK_COUNT];
    // Fan the five fingers across the upper half plane (image y grows down).
    for (finger, &tip) in FINGERTIPS.iter().enumerate() {
        let angle = -std::f32::consts::FRAC_PI_2 + (finger as f32 - 2.0) * 0.3;
        let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
        let base = tip - 3;
        for joint in 0..4 {
            let along = (joint + 1) as f32 / 4.0;
            points[base + joint] = wrist + dir * (scale * ratio * along);
        }
    }
    points[crate::constants::MIDDLE_MCP] = wrist + Vec3::new(0.0, -scale, 0.0);
    HandLandmarks::new(&points)
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingWorker
// ════════════════════════════════════════════════════════════════════════════

pub struct TrackingWorker<S: LandmarkSource> {
    source: S,
    estimator: TensionEstimator,
    sinks: Vec<Box<dyn TensionSink>>,
    frame_interval: Duration,
}

impl<S: LandmarkSource> TrackingWorker<S> {
    pub fn new(source: S, estimator: TensionEstimator, frame_interval: Duration) -> Self {
        Self {
            source,
            estimator,
            sinks: Vec::new(),
            frame_interval,
        }
    }

    pub fn with_sink(mut self, sink: impl TensionSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    fn publish(&mut self, status: &TensionStatus) {
        for sink in self.sinks.iter_mut() {
            sink.publish(status);
        }
    }

    /// Poll the source once and publish the outcome. A capture failure is
    /// published as an absent signal with a failed tracking state.
    pub fn step(&mut self) -> Result<TensionStatus, CaptureError> {
        match self.source.next_frame() {
            Ok(hands) => {
                let status = TensionStatus::from_interaction(self.estimator.estimate(&hands));
                self.publish(&status);
                Ok(status)
            }
            Err(err) => {
                self.publish(&TensionStatus::failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Poll until `stop` is raised or the source fails. Failure is terminal:
    /// the engine carries on with the absent signal.
    pub fn run(mut self, stop: Arc<AtomicBool>) {
        while !stop.load(Ordering::Relaxed) {
            if let Err(err) = self.step() {
                log::warn!("[tracking] {err}; continuing without hand input");
                return;
            }
            thread::sleep(self.frame_interval);
        }
        log::debug!("[tracking] stopped");
    }

    pub fn spawn(self) -> io::Result<TrackingHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_worker = Arc::clone(&stop);
        let join = thread::Builder::new()
            .name("hand-tracking".into())
            .spawn(move || self.run(stop_worker))?;
        Ok(TrackingHandle {
            stop,
            join: Some(join),
        })
    }
}

/// Owner of a running tracking thread; stops it on drop.
pub struct TrackingHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl TrackingHandle {
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            _ = join.join();
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
