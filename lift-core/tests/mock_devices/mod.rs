//! Hand-written fakes shared by the integration tests.
#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, convert::Infallible, rc::Rc};

use embedded_hal::{
    digital::{self, ErrorType as PinErrorType, InputPin, OutputPin},
    pwm::{ErrorType as PwmErrorType, SetDutyCycle},
};
use lift_core::utils::{
    config::LiftConfig,
    connection::{DatagramTransport, Received, TransportFault},
    controllers::MotorController,
    scheduler::Scheduler,
    time::Tick,
};

/// Observed state of the H-bridge outputs.
#[derive(Debug, Default)]
pub struct Bridge {
    pub forward: bool,
    pub reverse: bool,
    pub duty: u16,
    /// Set if both direction outputs were ever high at once.
    pub overlap: bool,
    pub writes: usize,
}

pub type SharedBridge = Rc<RefCell<Bridge>>;

#[derive(Debug, Clone, Copy)]
enum Side {
    Forward,
    Reverse,
}

/// Direction output writing into a shared [`Bridge`].
pub struct BridgePin {
    side: Side,
    bridge: SharedBridge,
}

impl BridgePin {
    fn write(
        &mut self,
        level: bool,
    ) {
        let mut bridge = self.bridge.borrow_mut();
        match self.side {
            Side::Forward => bridge.forward = level,
            Side::Reverse => bridge.reverse = level,
        }
        bridge.overlap |= bridge.forward && bridge.reverse;
        bridge.writes += 1;
    }
}

impl PinErrorType for BridgePin {
    type Error = Infallible;
}

impl OutputPin for BridgePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// PWM channel writing its duty into a shared [`Bridge`].
pub struct FakePwm {
    max: u16,
    bridge: SharedBridge,
}

impl PwmErrorType for FakePwm {
    type Error = Infallible;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(
        &mut self,
        duty: u16,
    ) -> Result<(), Self::Error> {
        self.bridge.borrow_mut().duty = duty;
        Ok(())
    }
}

/// Outputs of an 8-bit H-bridge plus the shared view onto them.
pub fn bridge() -> (BridgePin, BridgePin, FakePwm, SharedBridge) {
    bridge_with_resolution(255)
}

pub fn bridge_with_resolution(max: u16) -> (BridgePin, BridgePin, FakePwm, SharedBridge) {
    let shared = SharedBridge::default();
    (
        BridgePin {
            side: Side::Forward,
            bridge: shared.clone(),
        },
        BridgePin {
            side: Side::Reverse,
            bridge: shared.clone(),
        },
        FakePwm {
            max,
            bridge: shared.clone(),
        },
        shared,
    )
}

pub type Motor = MotorController<BridgePin, FakePwm>;

/// Motor created at `now` with the given timeout window.
pub fn motor_at(
    now: Tick,
    timeout_ms: i32,
) -> (Motor, SharedBridge) {
    let (forward, reverse, pwm, shared) = bridge();
    let motor = MotorController::new(forward, reverse, pwm, timeout_ms, now).unwrap();
    (motor, shared)
}

/// Remote controller, identified by its source port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer(pub u16);

/// Scripted datagram transport.
#[derive(Debug, Default)]
pub struct FakeTransport {
    pub inbox: VecDeque<(Vec<u8>, Peer)>,
    pub sent: Vec<(String, Peer)>,
    pub fault: Option<TransportFault>,
    pub stations: Option<u16>,
    pub polls: usize,
}

impl FakeTransport {
    pub fn push(
        &mut self,
        payload: &str,
        from: Peer,
    ) {
        self.inbox.push_back((payload.as_bytes().to_vec(), from));
    }

    pub fn replies(&self) -> Vec<&str> {
        self.sent.iter().map(|(line, _)| line.as_str()).collect()
    }
}

impl DatagramTransport for FakeTransport {
    type Endpoint = Peer;

    fn poll_recv(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<Received<Peer>>, TransportFault> {
        self.polls += 1;
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        Ok(self.inbox.pop_front().map(|(payload, from)| {
            let len = payload.len().min(buf.len());
            buf[..len].copy_from_slice(&payload[..len]);
            Received {
                len,
                from,
                truncated: payload.len() > buf.len(),
            }
        }))
    }

    fn send_to(
        &mut self,
        payload: &[u8],
        to: Peer,
    ) {
        let line = String::from_utf8(payload.to_vec()).unwrap();
        self.sent.push((line, to));
    }

    fn station_count(&self) -> Option<u16> {
        self.stations
    }
}

pub type TestScheduler = Scheduler<BridgePin, FakePwm, Peer>;

/// Scheduler with default configuration, booted at tick 0.
pub fn rig() -> (TestScheduler, FakeTransport, SharedBridge) {
    let config = LiftConfig::default();
    let (motor, shared) = motor_at(Tick(0), config.default_timeout_ms);
    (Scheduler::new(motor, &config), FakeTransport::default(), shared)
}

/// Input pin whose reads always fail.
pub struct BrokenButton;

#[derive(Debug)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl PinErrorType for BrokenButton {
    type Error = PinFault;
}

impl InputPin for BrokenButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(PinFault)
    }
}
