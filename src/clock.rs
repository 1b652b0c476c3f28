//! Fixed-rate update ticks driven by a variable-rate redraw loop.

use instant::Duration;

/// Turns wall-clock time between redraws into a whole number of fixed ticks.
///
/// Leftover time carries over to the next redraw. After a long stall (window
/// dragged, debugger break) at most `max_ticks_per_frame` ticks are replayed
/// and the rest of the backlog is dropped.
#[derive(Debug, Clone)]
pub struct TickClock {
    step: Duration,
    accumulator: Duration,
    max_ticks_per_frame: u32,
}

impl TickClock {
    pub fn new(updates_per_second: f64, max_ticks_per_frame: u32) -> Self {
        let rate = if updates_per_second.is_finite() && updates_per_second > 0.0 {
            updates_per_second
        } else {
            log::warn!(
                "invalid update rate {}, falling back to 60 updates/s",
                updates_per_second
            );
            60.0
        };
        Self {
            step: Duration::from_secs_f64(1.0 / rate),
            accumulator: Duration::ZERO,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
        }
    }

    /// Length of one tick, the `dt` handed to `on_update`.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Adds `elapsed` and returns how many ticks are due now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
            if ticks == self.max_ticks_per_frame {
                if self.accumulator >= self.step {
                    log::debug!("dropping {:?} of update backlog", self.accumulator);
                }
                self.accumulator = Duration::from_nanos(
                    (self.accumulator.as_nanos() % self.step.as_nanos()) as u64,
                );
                break;
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_tick_per_step() {
        let mut clock = TickClock::new(50.0, 5);
        assert_eq!(clock.step(), Duration::from_millis(20));
        assert_eq!(clock.advance(Duration::from_millis(20)), 1);
        assert_eq!(clock.advance(Duration::from_millis(45)), 2);
    }

    #[test]
    fn remainder_carries_over() {
        let mut clock = TickClock::new(50.0, 5);
        assert_eq!(clock.advance(Duration::from_millis(15)), 0);
        assert_eq!(clock.advance(Duration::from_millis(15)), 1);
    }

    #[test]
    fn catch_up_is_capped() {
        let mut clock = TickClock::new(50.0, 3);
        assert_eq!(clock.advance(Duration::from_secs(2)), 3);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn nonsense_rate_falls_back_to_sixty() {
        let clock = TickClock::new(0.0, 1);
        assert_eq!(clock.step(), Duration::from_secs_f64(1.0 / 60.0));
    }
}
