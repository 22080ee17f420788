//! The mode button.
//!
//! A press is only classified when the button is let go: held for at
//! least the long-press threshold it switches layouts, anything shorter
//! fires the emergency action.

use std::time::{Duration, Instant};

/// Default hold time that makes a press "long".
pub const LONG_PRESS: Duration = Duration::from_secs(3);

/// A completed press, reported on release.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Press {
    Short(Duration),
    Long(Duration),
}

/// Idle while `pressed_at` is `None`, pressed otherwise.
pub struct ModeButton {
    pressed_at: Option<Instant>,
    long_press: Duration,
}

impl ModeButton {
    pub fn new(long_press: Duration) -> Self {
        Self { pressed_at: None, long_press }
    }

    pub fn is_held(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Feed one sample of the button line (`asserted` = line low).
    ///
    /// Returns the classified press on the sample where the release is
    /// first seen, `None` otherwise.
    pub fn sample(&mut self, asserted: bool, now: Instant) -> Option<Press> {
        match (asserted, self.pressed_at) {
            (true, None) => {
                self.pressed_at = Some(now);
                None
            }
            (true, Some(_)) | (false, None) => None,
            (false, Some(start)) => {
                self.pressed_at = None;
                let held = now.saturating_duration_since(start);
                if held >= self.long_press {
                    Some(Press::Long(held))
                } else {
                    Some(Press::Short(held))
                }
            }
        }
    }
}

impl Default for ModeButton {
    fn default() -> Self {
        Self::new(LONG_PRESS)
    }
}
