//! Control loop of the lift.
//!
//! The loop itself lives with the platform (it owns the clock, the pins and
//! the sleep); this module is the part that decides. One call to
//! [`Scheduler::step`] is one cycle:
//!
//! 1. a held button overrides everything and skips the network for the cycle,
//! 2. otherwise at most one pending datagram is parsed and applied,
//! 3. the dead-man deadline is checked,
//! 4. a status snapshot is produced if the refresh interval has elapsed.
//!
//! The returned [`Effects`] tell the caller whether the cycle was idle and
//! should be followed by a short sleep.

use embedded_hal::{digital::OutputPin, pwm::SetDutyCycle};

use crate::utils::{
    config::LiftConfig,
    connection::{
        protocol::{self, Command, Confirmation},
        transport::{DatagramTransport, Received, TransportFault},
    },
    controllers::{ButtonState, MotorController, MotorError},
    display::LiftStatus,
    time::Tick,
};

/// Receive buffer size; longer datagrams are rejected.
pub const RX_BUFFER: usize = 128;

/// What a cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Effects {
    /// A button override was applied.
    pub button: bool,
    /// A datagram was consumed.
    pub datagram: bool,
    /// Status snapshot due for the display.
    pub status: Option<LiftStatus>,
}

impl Effects {
    /// Neither a button nor a datagram was handled.
    pub fn is_idle(&self) -> bool {
        !self.button && !self.datagram
    }
}

/// Failure of a cycle.
#[derive(Debug)]
pub enum Fault<DE: core::fmt::Debug, PE: core::fmt::Debug> {
    /// Writing the motor outputs failed.
    Motor(MotorError<DE, PE>),
    /// The transport is stuck; only a restart clears it.
    Transport(TransportFault),
}

impl<DE: core::fmt::Debug, PE: core::fmt::Debug> From<MotorError<DE, PE>> for Fault<DE, PE> {
    fn from(error: MotorError<DE, PE>) -> Self {
        Fault::Motor(error)
    }
}

impl<DE: core::fmt::Debug, PE: core::fmt::Debug> From<TransportFault> for Fault<DE, PE> {
    fn from(fault: TransportFault) -> Self {
        Fault::Transport(fault)
    }
}

/// Owner of the controller state for the lifetime of the firmware.
pub struct Scheduler<Pin, Pwm, E> {
    motor: MotorController<Pin, Pwm>,
    last_sender: Option<E>,
    button_grace_ms: i32,
    status_interval_ms: u32,
    last_status: Option<Tick>,
    rx_buffer: [u8; RX_BUFFER],
}

impl<Pin, Pwm, E, DE, PE> Scheduler<Pin, Pwm, E>
where
    Pin: OutputPin<Error = DE>,
    Pwm: SetDutyCycle<Error = PE>,
    DE: core::fmt::Debug,
    PE: core::fmt::Debug,
    E: Copy + core::fmt::Debug,
{
    pub fn new(
        motor: MotorController<Pin, Pwm>,
        config: &LiftConfig,
    ) -> Self {
        Self {
            motor,
            last_sender: None,
            button_grace_ms: i32::try_from(config.button_grace_ms).unwrap_or(i32::MAX),
            status_interval_ms: config.status_interval_ms,
            last_status: None,
            rx_buffer: [0; RX_BUFFER],
        }
    }

    /// Run one cycle at time `now` with the sampled `buttons`.
    pub fn step<T>(
        &mut self,
        now: Tick,
        buttons: ButtonState,
        transport: &mut T,
    ) -> Result<Effects, Fault<DE, PE>>
    where
        T: DatagramTransport<Endpoint = E>,
    {
        let mut effects = Effects::default();

        if let Some(speed) = buttons.override_speed() {
            tracing::debug!(?buttons, "button override");
            effects.button = true;
            let confirmation = self.motor.set_speed(now, speed, self.button_grace_ms)?;
            self.confirm(transport, confirmation);
        } else if let Some(received) = transport.poll_recv(&mut self.rx_buffer)? {
            effects.datagram = true;
            self.handle_datagram(now, received, transport)?;
        }

        let stopped = self.motor.tick_safety(now)?;
        self.confirm(transport, stopped);

        effects.status = self.refresh_status(now, transport);
        Ok(effects)
    }

    fn handle_datagram<T>(
        &mut self,
        now: Tick,
        received: Received<E>,
        transport: &mut T,
    ) -> Result<(), Fault<DE, PE>>
    where
        T: DatagramTransport<Endpoint = E>,
    {
        if received.truncated || received.len > RX_BUFFER {
            tracing::warn!(from = ?received.from, "datagram exceeds receive buffer, dropped");
            return Ok(());
        }

        self.last_sender = Some(received.from);

        let payload = &self.rx_buffer[..received.len];
        tracing::info!(
            len = received.len,
            from = ?received.from,
            text = core::str::from_utf8(payload).unwrap_or("<binary>").trim_end(),
            "datagram received"
        );

        let command = match protocol::parse(payload) {
            Ok(command) => command,
            Err(error) => {
                tracing::warn!(%error, "command ignored");
                return Ok(());
            }
        };

        let confirmation = match command {
            Command::Speed(speed) => {
                let grace_ms = self.motor.timeout_ms();
                self.motor.set_speed(now, speed, grace_ms)?
            }
            Command::Timeout(ms) => Some(self.motor.set_timeout_window(ms)),
        };
        self.confirm(transport, confirmation);
        Ok(())
    }

    /// Send a confirmation to the last sender, if there is one of each.
    fn confirm<T>(
        &self,
        transport: &mut T,
        confirmation: Option<Confirmation>,
    ) where
        T: DatagramTransport<Endpoint = E>,
    {
        let Some(confirmation) = confirmation else {
            return;
        };
        match self.last_sender {
            Some(to) => {
                tracing::debug!(%confirmation, ?to, "sending confirmation");
                transport.send_to(confirmation.encode().as_bytes(), to);
            }
            None => tracing::debug!(%confirmation, "no sender to confirm to"),
        }
    }

    fn refresh_status<T>(
        &mut self,
        now: Tick,
        transport: &T,
    ) -> Option<LiftStatus>
    where
        T: DatagramTransport<Endpoint = E>,
    {
        let due = match self.last_status {
            Some(last) => now.since(last) >= self.status_interval_ms as i32,
            None => true,
        };
        if !due {
            return None;
        }

        self.last_status = Some(now);
        Some(LiftStatus {
            station_count: transport.station_count(),
            speed: self.motor.speed(),
            seconds_since_deadline: now.since(self.motor.deadline()) as f32 / 1000.0,
        })
    }

    pub fn motor(&self) -> &MotorController<Pin, Pwm> {
        &self.motor
    }

    /// Sender that confirmations currently go to.
    pub fn last_sender(&self) -> Option<E> {
        self.last_sender
    }
}
