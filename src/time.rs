//! Frame clock.
//!
//! Supplies the elapsed time the motion step is driven by. While paused the
//! clock stands still, so a backgrounded window resumes exactly where it
//! stopped instead of jumping ahead.
//!
//! ```ignore
//! let mut clock = Clock::new();
//! animator.on_frame(clock.tick());
//! ```

use std::time::{Duration, Instant};

/// Wall clock with pause support.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
    elapsed_secs: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
            elapsed_secs: 0.0,
        }
    }

    /// Advance to now and return seconds since start, excluding paused
    /// spans. Call once per frame. While paused the elapsed time is frozen.
    pub fn tick(&mut self) -> f32 {
        if self.paused_at.is_none() {
            let running = Instant::now().duration_since(self.start) - self.paused_total;
            self.elapsed_secs = running.as_secs_f32();
        }
        self.elapsed_secs
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += Instant::now().duration_since(paused_at);
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = Clock::new();
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_tick_advances() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = clock.tick();

        assert!(elapsed > 0.0);
        assert_eq!(clock.elapsed(), elapsed);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut clock = Clock::new();
        clock.tick();

        clock.pause();
        let frozen = clock.elapsed();
        thread::sleep(Duration::from_millis(10));

        assert_eq!(clock.tick(), frozen);
    }

    #[test]
    fn test_resume_excludes_paused_span() {
        let mut clock = Clock::new();
        clock.pause();
        thread::sleep(Duration::from_millis(50));
        clock.resume();
        let elapsed = clock.tick();
        assert!(elapsed < 0.04, "paused time leaked: {}", elapsed);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut clock = Clock::new();
        clock.pause();
        clock.pause();
        assert!(clock.is_paused());
        clock.resume();
        clock.resume();
        assert!(!clock.is_paused());
    }
}
