//! Frame cadence control
//!
//! A single animation-frame callback drives the game, but simulation, menu
//! input and socket heartbeats each run at their own rate. Each rate is an
//! independent [`Throttle`] fed with the frame's high-resolution timestamp
//! (milliseconds).

use crate::consts::{HEARTBEAT_INTERVAL_MS, MENU_INPUT_INTERVAL_MS, SIM_INTERVAL_MS};

/// Fires at most once per interval without accumulating drift.
///
/// After firing, the reference time is moved back by the overshoot
/// (`elapsed % interval`) so late frames do not push the schedule later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    interval: f64,
    last: f64,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval: interval_ms,
            last: 0.0,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Scheduled time of the most recent firing
    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn ready(&mut self, timestamp: f64) -> bool {
        let elapsed = timestamp - self.last;
        if elapsed > self.interval {
            // A zero interval fires every frame
            self.last = if self.interval > 0.0 {
                timestamp - elapsed % self.interval
            } else {
                timestamp
            };
            return true;
        }
        false
    }

    /// Restart the schedule from `timestamp`
    pub fn reset(&mut self, timestamp: f64) {
        self.last = timestamp;
    }
}

/// Independent cadences for one cooperative loop
#[derive(Debug, Clone)]
pub struct TickScheduler {
    simulation: Throttle,
    menu_input: Throttle,
    heartbeat: Throttle,
    start_time: f64,
    // FPS counter
    frame_count: u32,
    fps_window_start: f64,
    fps: u32,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(SIM_INTERVAL_MS, MENU_INPUT_INTERVAL_MS, HEARTBEAT_INTERVAL_MS)
    }
}

impl TickScheduler {
    pub fn new(simulation_ms: f64, menu_input_ms: f64, heartbeat_ms: f64) -> Self {
        Self {
            simulation: Throttle::new(simulation_ms),
            menu_input: Throttle::new(menu_input_ms),
            heartbeat: Throttle::new(heartbeat_ms),
            start_time: 0.0,
            frame_count: 0,
            fps_window_start: 0.0,
            fps: 0,
        }
    }

    pub fn should_advance_simulation(&mut self, timestamp: f64) -> bool {
        self.simulation.ready(timestamp)
    }

    pub fn should_process_menu_input(&mut self, timestamp: f64) -> bool {
        self.menu_input.ready(timestamp)
    }

    pub fn should_heartbeat(&mut self, timestamp: f64) -> bool {
        self.heartbeat.ready(timestamp)
    }

    /// Mark the start of a run for in-game time
    pub fn start_run(&mut self, timestamp: f64) {
        self.start_time = timestamp;
        self.simulation.reset(timestamp);
    }

    /// Time between the run start and the latest simulation tick
    pub fn in_game_time(&self) -> f64 {
        (self.simulation.last() - self.start_time).max(0.0)
    }

    pub fn simulation(&self) -> &Throttle {
        &self.simulation
    }

    /// Count a rendered frame; the counter restarts every second
    pub fn count_frame(&mut self, timestamp: f64) {
        if timestamp - self.fps_window_start > 1000.0 {
            self.fps = self.frame_count;
            self.frame_count = 0;
            self.fps_window_start = timestamp;
        }
        self.frame_count += 1;
    }

    /// Frames counted in the last complete one-second window
    pub fn frames_per_second(&self) -> u32 {
        self.fps
    }

    /// Frames counted so far in the current window
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_fires_after_interval() {
        let mut t = Throttle::new(100.0);
        assert!(!t.ready(50.0));
        assert!(!t.ready(100.0));
        assert!(t.ready(101.0));
        assert!(!t.ready(150.0));
        assert!(t.ready(205.0));
    }

    #[test]
    fn test_zero_interval_keeps_firing() {
        let mut throttle = Throttle::new(0.0);
        assert!(throttle.ready(1.0));
        assert!(throttle.ready(2.0));
        assert_eq!(throttle.last(), 2.0);
    }

    #[test]
    fn test_throttle_corrects_overshoot() {
        let mut t = Throttle::new(100.0);
        assert!(t.ready(130.0));
        // Overshoot of 30 ms is kept, so the reference is 100, not 130
        assert_eq!(t.last(), 100.0);
    }

    #[test]
    fn test_simulation_60hz_without_drift() {
        let mut scheduler = TickScheduler::default();
        let interval = SIM_INTERVAL_MS;

        // 16 ms frames, offset so no frame lands exactly on a tick boundary
        let mut ticks: u64 = 0;
        let mut timestamp = 0.0;
        for i in 0..10_000u64 {
            timestamp = 0.25 + 16.0 * i as f64;
            if scheduler.should_advance_simulation(timestamp) {
                ticks += 1;
            }
        }

        let scheduled = ticks as f64 * interval;
        assert!((scheduler.simulation().last() - scheduled).abs() < 1e-3);
        let error = timestamp - scheduled;
        assert!(error >= 0.0 && error < interval, "drift {} ms", error);
    }

    #[test]
    fn test_cadences_are_independent() {
        let mut scheduler = TickScheduler::new(10.0, 100.0, 1000.0);
        let mut sim = 0;
        let mut menu = 0;
        let mut heartbeat = 0;
        for ms in 1..=2000 {
            let ts = ms as f64;
            if scheduler.should_advance_simulation(ts) {
                sim += 1;
            }
            if scheduler.should_process_menu_input(ts) {
                menu += 1;
            }
            if scheduler.should_heartbeat(ts) {
                heartbeat += 1;
            }
        }
        assert_eq!(sim, 199);
        assert_eq!(menu, 19);
        assert_eq!(heartbeat, 1);
    }

    #[test]
    fn test_fps_window() {
        let mut scheduler = TickScheduler::default();
        for i in 0..=60 {
            scheduler.count_frame(i as f64 * 1000.0 / 60.0);
        }
        // Window rolls over on the frame after 1000 ms
        scheduler.count_frame(1001.0);
        assert_eq!(scheduler.frames_per_second(), 61);
        assert_eq!(scheduler.frame_count(), 1);
    }

    #[test]
    fn test_in_game_time() {
        let mut scheduler = TickScheduler::new(10.0, 100.0, 1000.0);
        scheduler.start_run(1000.0);
        assert!(scheduler.should_advance_simulation(1015.0));
        assert_eq!(scheduler.in_game_time(), 10.0);
    }
}
