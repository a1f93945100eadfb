//! Motor safety controller for the lift's H-bridge.
//!
//! The controller owns the two direction outputs and the PWM magnitude output
//! and is the only writer to them. Every speed command carries a grace window;
//! once it elapses without renewal, [`MotorController::tick_safety`] brakes the
//! motor (dead-man switch).
//!
//! Output encoding (L298N style):
//!
//! | speed | forward | reverse | duty            |
//! |-------|---------|---------|-----------------|
//! | > 0   | high    | low     | `speed`         |
//! | < 0   | low     | high    | `-speed`        |
//! | 0     | low     | low     | 255 (hard brake)|
//!
//! The pin being released is always written before the pin being asserted, so
//! both direction outputs are never high at the same time.

use embedded_hal::{digital::OutputPin, pwm::SetDutyCycle};

use crate::utils::{connection::protocol::Confirmation, time::Tick};

/// Largest speed magnitude; also the 8-bit PWM full scale.
pub const MAX_SPEED: i32 = 255;

/// Direction currently driven onto the H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    /// Both outputs low.
    Brake,
}

impl Direction {
    fn of(speed: i32) -> Self {
        match speed {
            s if s > 0 => Direction::Forward,
            s if s < 0 => Direction::Reverse,
            _ => Direction::Brake,
        }
    }
}

/// Errors from the motor outputs.
#[derive(Debug)]
pub enum MotorError<DE: core::fmt::Debug, PE: core::fmt::Debug> {
    Direction(DE),
    Pwm(PE),
}

/// Dead-man motor controller over a direction pin pair and a PWM channel.
pub struct MotorController<Pin, Pwm> {
    forward: Pin,
    reverse: Pin,
    pwm: Pwm,
    speed: i32,
    direction: Direction,
    timeout_ms: i32,
    deadline: Tick,
}

impl<Pin, Pwm, DE, PE> MotorController<Pin, Pwm>
where
    Pin: OutputPin<Error = DE>,
    Pwm: SetDutyCycle<Error = PE>,
    DE: core::fmt::Debug,
    PE: core::fmt::Debug,
{
    /// Take ownership of the outputs and brake immediately.
    pub fn new(
        forward: Pin,
        reverse: Pin,
        pwm: Pwm,
        timeout_ms: i32,
        now: Tick,
    ) -> Result<Self, MotorError<DE, PE>> {
        let mut motor = Self {
            forward,
            reverse,
            pwm,
            speed: 0,
            direction: Direction::Brake,
            timeout_ms,
            deadline: now,
        };
        motor.set_speed(now, 0, timeout_ms)?;
        tracing::info!(timeout_ms, "motor controller ready, brake applied");
        Ok(motor)
    }

    /// Drive at `speed` (clamped to ±255) and arm the dead-man deadline
    /// `grace_ms` from `now`. A negative grace arms a deadline that has already
    /// passed, so the next [`tick_safety`](Self::tick_safety) stops the motor.
    ///
    /// Returns a confirmation only when the applied speed differs from the
    /// previous one.
    pub fn set_speed(
        &mut self,
        now: Tick,
        speed: i32,
        grace_ms: i32,
    ) -> Result<Option<Confirmation>, MotorError<DE, PE>> {
        let speed = speed.clamp(-MAX_SPEED, MAX_SPEED);
        let changed = speed != self.speed;

        self.deadline = now.offset(grace_ms);
        self.write_outputs(speed)?;
        self.speed = speed;

        if changed {
            tracing::info!(speed, grace_ms, "speed set");
            Ok(Some(Confirmation::Speed(speed)))
        } else {
            tracing::trace!(speed, grace_ms, "speed renewed");
            Ok(None)
        }
    }

    /// Store the grace window used by later network speed commands. The
    /// deadline already armed is left alone.
    pub fn set_timeout_window(
        &mut self,
        ms: i32,
    ) -> Confirmation {
        if ms < 0 {
            tracing::warn!(ms, "negative timeout window, speed commands expire at once");
        }
        tracing::info!(ms, "timeout window set");
        self.timeout_ms = ms;
        Confirmation::Timeout(ms)
    }

    /// Brake if the deadline has passed while the motor is driven.
    pub fn tick_safety(
        &mut self,
        now: Tick,
    ) -> Result<Option<Confirmation>, MotorError<DE, PE>> {
        if now.is_after(self.deadline) && self.is_moving() {
            tracing::warn!(
                speed = self.speed,
                overdue_ms = now.since(self.deadline),
                "deadline expired, stopping motor"
            );
            return self.set_speed(now, 0, 0);
        }
        Ok(None)
    }

    fn write_outputs(
        &mut self,
        speed: i32,
    ) -> Result<(), MotorError<DE, PE>> {
        let magnitude = (if speed == 0 { MAX_SPEED } else { speed.abs() }) as u32;
        let max = u32::from(self.pwm.max_duty_cycle());
        let duty = (magnitude * max / MAX_SPEED as u32) as u16;
        self.pwm.set_duty_cycle(duty).map_err(MotorError::Pwm)?;

        let direction = Direction::of(speed);
        match direction {
            Direction::Forward => {
                self.reverse.set_low().map_err(MotorError::Direction)?;
                self.forward.set_high().map_err(MotorError::Direction)?;
            }
            Direction::Reverse => {
                self.forward.set_low().map_err(MotorError::Direction)?;
                self.reverse.set_high().map_err(MotorError::Direction)?;
            }
            Direction::Brake => {
                self.forward.set_low().map_err(MotorError::Direction)?;
                self.reverse.set_low().map_err(MotorError::Direction)?;
            }
        }
        self.direction = direction;
        Ok(())
    }

    /// Applied speed, in `-255..=255`.
    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// True while either direction output is asserted.
    pub fn is_moving(&self) -> bool {
        self.direction != Direction::Brake
    }

    /// Configured grace window for network speed commands (ms).
    pub fn timeout_ms(&self) -> i32 {
        self.timeout_ms
    }

    /// Instant after which a moving motor is stopped.
    pub fn deadline(&self) -> Tick {
        self.deadline
    }

    /// Release the outputs.
    pub fn release(self) -> (Pin, Pin, Pwm) {
        (self.forward, self.reverse, self.pwm)
    }
}
