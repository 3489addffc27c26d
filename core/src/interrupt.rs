//! Frame pacing and interrupt delivery.
//!
//! The board raises two restart interrupts per video frame: one when the
//! beam reaches mid-screen (RST 1) and one at vertical blank (RST 2). There
//! is no dedicated timer; the loop samples a monotonic clock every iteration
//! and [`Scheduler::tick`] treats every crossing of a fixed threshold as the
//! next interrupt point. Crossings alternate between the two vectors, so one
//! full frame spans two thresholds.
//!
//! The threshold is deliberately coarse and decoupled from the real
//! 60 Hz beam timing: what the game logic depends on is the strict
//! alternation of the two vectors, not their absolute spacing.

use std::time::Duration;

/// Default pacing threshold between interrupt points.
pub const DEFAULT_FRAME_THRESHOLD: Duration = Duration::from_millis(10);

/// One of the two hardware interrupt vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptVector {
    /// Mid-screen interrupt, RST 1 (jumps to 0x0008).
    Rst1,
    /// End-of-frame (vertical blank) interrupt, RST 2 (jumps to 0x0010).
    Rst2,
}

impl InterruptVector {
    /// The restart opcode the engine executes to service this vector.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Rst1 => 0xCF,
            Self::Rst2 => 0xD7,
        }
    }

    /// Whether this vector marks the end of a visible frame.
    pub const fn ends_frame(self) -> bool {
        matches!(self, Self::Rst2)
    }

    /// The other vector of the pair.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Rst1 => Self::Rst2,
            Self::Rst2 => Self::Rst1,
        }
    }
}

/// What a call to [`Scheduler::tick`] decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// The threshold has not elapsed; nothing changed.
    Idle,
    /// A mid-frame interrupt was requested.
    Interrupt,
    /// An end-of-frame interrupt was requested and the display is due a refresh.
    Frame,
}

/// Interrupt and pacing state for the scheduling loop.
///
/// `next_vector` always holds exactly one of the two vectors and flips on
/// every threshold crossing. `pending` carries the vector captured at the
/// last crossing until the engine accepts it.
#[derive(Debug, Clone)]
pub struct Scheduler {
    threshold: Duration,
    last_tick: Duration,
    next_vector: InterruptVector,
    pending: Option<InterruptVector>,
}

impl Scheduler {
    /// Create a scheduler whose first frame boundary is measured from `start`.
    ///
    /// `next_vector` starts at RST 2 so the first crossing requests RST 1 and
    /// the second requests RST 2 together with the first render.
    pub fn new(threshold: Duration, start: Duration) -> Self {
        Self {
            threshold,
            last_tick: start,
            next_vector: InterruptVector::Rst2,
            pending: None,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Timestamp of the last threshold crossing.
    pub fn last_tick(&self) -> Duration {
        self.last_tick
    }

    pub fn next_vector(&self) -> InterruptVector {
        self.next_vector
    }

    /// The requested vector not yet accepted by the engine, if any.
    pub fn pending(&self) -> Option<InterruptVector> {
        self.pending
    }

    /// Advance pacing to `now`.
    ///
    /// If at least `threshold` has elapsed since the last crossing, records
    /// `now`, flips the next vector and marks it pending. A crossing onto the
    /// end-of-frame vector returns [`Tick::Frame`]; the caller renders.
    /// Samples older than the last crossing count as no elapsed time, so the
    /// recorded timestamp never moves backwards.
    pub fn tick(&mut self, now: Duration) -> Tick {
        if now.saturating_sub(self.last_tick) < self.threshold {
            return Tick::Idle;
        }

        self.last_tick = now;
        self.next_vector = self.next_vector.toggled();
        self.pending = Some(self.next_vector);

        if self.next_vector.ends_frame() {
            Tick::Frame
        } else {
            Tick::Interrupt
        }
    }

    /// Hand the pending interrupt to the engine if it currently accepts one.
    ///
    /// With interrupts masked the request stays pending and is retried on the
    /// next call rather than dropped.
    pub fn deliver(&mut self, interrupt_enabled: bool) -> Option<InterruptVector> {
        if !interrupt_enabled {
            return None;
        }
        self.pending.take()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_THRESHOLD, Duration::ZERO)
    }
}
