//! Pawn movement tasks.
//!
//! A pawn either follows player input, plays out a timed travel to a
//! location (used when a move request resolves), or tracks a target such as
//! a tower being built. Tracking overrides travel; a non-cancellable travel
//! ignores player input until it arrives.
//!
//! The component only produces velocities. Integrating them into a position
//! is left to whoever owns the pawn.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::EntityId;

/// Speed multiplier while catching up with a distant tracked target.
const TRACKING_DILATION: f32 = 3.0;

/// Timed travel to a location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelRequest {
    pub destination: Vec3,
    /// Seconds the travel takes.
    pub duration: f32,
    /// Whether player input may interrupt the travel.
    pub cancellable: bool,
}

impl TravelRequest {
    #[must_use]
    pub fn new(destination: Vec3, duration: f32) -> Self {
        Self {
            destination,
            duration,
            cancellable: false,
        }
    }

    #[must_use]
    pub fn cancellable(mut self) -> Self {
        self.cancellable = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TravelTask {
    from: Vec3,
    request: TravelRequest,
    /// Progress in `[0, 1]`.
    alpha: f32,
}

/// Velocity for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementUpdate {
    pub velocity: Vec3,
    /// The travel task reached its destination this frame.
    pub travel_finished: bool,
}

/// Travel and tracking state for one pawn.
#[derive(Clone, Debug)]
pub struct PawnMovement {
    max_speed: f32,
    travel: Option<TravelTask>,
    tracked: Option<EntityId>,
    velocity: Vec3,
}

/// Sine in-out easing over `[0, 1]`.
fn ease_sin_in_out(alpha: f32) -> f32 {
    -0.5 * ((PI * alpha).cos() - 1.0)
}

impl PawnMovement {
    #[must_use]
    pub fn new(max_speed: f32) -> Self {
        Self {
            max_speed,
            travel: None,
            tracked: None,
            velocity: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[must_use]
    pub fn is_travelling(&self) -> bool {
        self.travel.is_some()
    }

    #[must_use]
    pub fn tracked_target(&self) -> Option<EntityId> {
        self.tracked
    }

    /// Start travelling from `from`. Ignored while tracking or while a
    /// non-cancellable travel is still running. Returns whether it started.
    pub fn travel_to(&mut self, request: TravelRequest, from: Vec3) -> bool {
        if self.tracked.is_some() {
            return false;
        }
        if self.travel.is_some_and(|task| !task.request.cancellable) {
            return false;
        }
        debug!(destination = ?request.destination, duration = request.duration, "travel started");
        self.travel = Some(TravelTask {
            from,
            request,
            alpha: 0.0,
        });
        true
    }

    /// Lock onto `target`, cancelling any travel. Static targets are skipped
    /// when `ignore_if_static` is set. Returns whether tracking started.
    pub fn track(&mut self, target: EntityId, is_static: bool, ignore_if_static: bool) -> bool {
        if self.tracked != Some(target) && self.tracked.is_some() {
            self.velocity = Vec3::ZERO;
        }
        self.tracked = None;
        if ignore_if_static && is_static {
            return false;
        }
        self.tracked = Some(target);
        self.travel = None;
        true
    }

    pub fn stop_tracking(&mut self) {
        if self.tracked.take().is_some() {
            self.velocity = Vec3::ZERO;
        }
    }

    /// Player input is ignored while tracking or during a non-cancellable
    /// travel.
    #[must_use]
    pub fn is_move_input_ignored(&self) -> bool {
        self.tracked.is_some() || self.travel.is_some_and(|task| !task.request.cancellable)
    }

    /// Consume this frame's player input. Non-zero input cancels a
    /// cancellable travel.
    pub fn consume_input(&mut self, non_zero: bool) {
        if non_zero && self.travel.is_some_and(|task| task.request.cancellable) {
            debug!("travel cancelled by input");
            self.travel = None;
        }
    }

    /// Compute this frame's velocity.
    ///
    /// `location` is the pawn's current location; `tracked_location` is where
    /// the tracked target currently is, if tracking.
    pub fn update(&mut self, delta: f32, location: Vec3, tracked_location: Option<Vec3>) -> MovementUpdate {
        let mut travel_finished = false;

        if self.tracked.is_some() {
            if let Some(target) = tracked_location {
                self.velocity = self.tracking_velocity(delta, target - location);
            }
        } else if let Some(task) = self.travel.as_mut() {
            let step = if task.request.duration > 0.0 {
                delta / task.request.duration
            } else {
                1.0
            };
            task.alpha = (task.alpha + step).clamp(0.0, 1.0);

            let next = task.from.lerp(task.request.destination, ease_sin_in_out(task.alpha));
            self.velocity = if delta > 0.0 { (next - location) / delta } else { Vec3::ZERO };

            if task.alpha >= 1.0 {
                travel_finished = true;
                self.travel = None;
                debug!("travel finished");
            }
        }

        MovementUpdate {
            velocity: self.velocity,
            travel_finished,
        }
    }

    fn tracking_velocity(&self, delta: f32, displacement: Vec3) -> Vec3 {
        let distance = displacement.length();
        let speed = if distance > self.max_speed / 4.0 {
            self.max_speed * TRACKING_DILATION
        } else if delta > 0.0 {
            distance / delta
        } else {
            0.0
        };
        displacement.normalize_or_zero() * speed
    }
}
