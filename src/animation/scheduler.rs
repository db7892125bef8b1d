use crate::config::SchedulerParams;

/// Whether the host should request another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Halt,
}

/// Converts host frame timestamps into simulation deltas
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    params: SchedulerParams,
    /// Last host timestamp in milliseconds
    last_timestamp: Option<f64>,
    running: bool,
}

impl FrameScheduler {
    pub fn new(params: SchedulerParams) -> Self {
        Self {
            params,
            last_timestamp: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Mark the loop as active. Returns false if it already was.
    pub fn wake(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Seconds elapsed since the previous frame. The first frame after a halt
    /// yields zero; long gaps are clamped.
    pub fn delta(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.last_timestamp {
            Some(last) => ((timestamp_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        (dt as f32).min(self.params.max_delta)
    }

    /// Decide whether to keep looping. Halting forgets the last timestamp so the
    /// next wake does not see the idle gap as one huge frame.
    pub fn settle(&mut self, keep_running: bool) -> LoopControl {
        if keep_running {
            LoopControl::Continue
        } else {
            self.running = false;
            self.last_timestamp = None;
            LoopControl::Halt
        }
    }
}
