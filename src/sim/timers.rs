//! Timed effects and deferred actions
//!
//! Timed effects run on frame-scaled seconds. Deferred actions run on the
//! wall clock handed in with each frame and are tied to a session generation,
//! so a restart can invalidate anything still pending.

use serde::{Deserialize, Serialize};

/// An effect that lasts a fixed number of seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TimedEffect {
    #[default]
    Inactive,
    Active { elapsed: f32, duration: f32 },
}

impl TimedEffect {
    pub fn start(duration: f32) -> Self {
        TimedEffect::Active {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TimedEffect::Active { .. })
    }

    /// Seconds since the effect started (0 when inactive)
    pub fn elapsed(&self) -> f32 {
        match self {
            TimedEffect::Active { elapsed, .. } => *elapsed,
            TimedEffect::Inactive => 0.0,
        }
    }

    /// Advance by `secs`; returns true on the frame the effect ends
    pub fn advance(&mut self, secs: f32) -> bool {
        if let TimedEffect::Active { elapsed, duration } = self {
            *elapsed += secs;
            if *elapsed > *duration {
                *self = TimedEffect::Inactive;
                return true;
            }
        }
        false
    }

    pub fn cancel(&mut self) {
        *self = TimedEffect::Inactive;
    }
}

/// An action scheduled for a wall-clock time
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred<T> {
    pending: Option<Scheduled<T>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Scheduled<T> {
    action: T,
    due_at: f64,
    generation: u64,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Deferred<T> {
    /// Schedule `action`, replacing anything already pending
    pub fn schedule(&mut self, action: T, due_at: f64, generation: u64) {
        self.pending = Some(Scheduled {
            action,
            due_at,
            generation,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Take the action once it is due
    ///
    /// An action scheduled under another generation is dropped instead.
    pub fn poll(&mut self, now: f64, generation: u64) -> Option<T> {
        let scheduled = self.pending.as_ref()?;
        if scheduled.generation != generation {
            log::debug!(
                "Dropping deferred action from generation {} (now {generation})",
                scheduled.generation
            );
            self.pending = None;
            return None;
        }
        if now < scheduled.due_at {
            return None;
        }
        self.pending.take().map(|s| s.action)
    }
}
