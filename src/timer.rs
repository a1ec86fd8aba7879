use crate::state::MachineState;
use std::time::Duration;

/// the conventional rate for the delay and sound timers
pub const DEFAULT_TIMER_HZ: u32 = 60;

/// one 60Hz tick: both timers count down independently, stopping at zero
pub fn tick(state: &mut MachineState) {
    state.delay_timer = state.delay_timer.saturating_sub(1);
    state.sound_timer = state.sound_timer.saturating_sub(1);
}

/// Converts logical elapsed time into a whole number of timer ticks, carrying
/// the remainder forward. this keeps the timer rate independent of how many
/// instructions run per second and how often frames are drawn.
#[derive(Debug, Clone)]
pub struct TimerClock {
    period: Duration,
    pending: Duration,
}

impl TimerClock {
    /// a clock at 0Hz never ticks; rates above 1GHz are held to a 1ns period
    pub fn new(hz: u32) -> Self {
        let period = Duration::from_secs(1)
            .checked_div(hz)
            .unwrap_or(Duration::MAX)
            .max(Duration::from_nanos(1));
        TimerClock {
            period,
            pending: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// let `elapsed` pass; returns how many ticks fell due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.pending = self.pending.saturating_add(elapsed);
        let mut ticks = 0;
        while self.pending >= self.period {
            self.pending -= self.period;
            ticks += 1;
        }
        ticks
    }
}

impl Default for TimerClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_decrements_both() {
        let mut s = MachineState::new();
        s.delay_timer = 3;
        s.sound_timer = 1;
        tick(&mut s);
        assert_eq!(s.delay_timer(), 2);
        assert_eq!(s.sound_timer(), 0);
        tick(&mut s);
        tick(&mut s);
        tick(&mut s);
        assert_eq!(s.delay_timer(), 0);
        assert_eq!(s.sound_timer(), 0);
    }

    #[test]
    fn test_clock_ticks_at_rate() {
        let mut c = TimerClock::new(60);
        // 700 instructions per second for one second
        let step = Duration::from_secs(1) / 700;
        let ticks: u32 = (0..700).map(|_| c.advance(step)).sum();
        // a nanosecond or two of rounding may hold the last tick back
        assert!((59..=60).contains(&ticks), "got {} ticks", ticks);
    }

    #[test]
    fn test_clock_carries_remainder() {
        let mut c = TimerClock::new(50); // 20ms
        assert_eq!(c.advance(Duration::from_millis(15)), 0);
        assert_eq!(c.advance(Duration::from_millis(15)), 1);
        assert_eq!(c.advance(Duration::from_millis(10)), 1);
        assert_eq!(c.advance(Duration::from_millis(100)), 5);
        assert_eq!(c.advance(Duration::from_millis(19)), 0);
    }

    #[test]
    fn test_clock_period_never_zero() {
        let mut c = TimerClock::new(2_000_000_000);
        assert_eq!(c.period(), Duration::from_nanos(1));
        assert_eq!(c.advance(Duration::from_micros(1)), 1000);

        let mut c = TimerClock::new(0);
        assert_eq!(c.advance(Duration::from_secs(3600)), 0);
    }

    #[test]
    fn test_clock_independent_of_step_size() {
        let mut coarse = TimerClock::new(60);
        let mut fine = TimerClock::new(60);
        let a = coarse.advance(Duration::from_millis(500));
        let b: u32 = (0..500).map(|_| fine.advance(Duration::from_millis(1))).sum();
        assert_eq!(a, 30);
        assert_eq!(b, 30);
    }
}
