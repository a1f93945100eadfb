use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_net::{Config, Ipv4Address, Ipv4Cidr, Stack, StackResources, udp::PacketMetadata};
use embassy_net_tuntap::TunTapDevice;
use embedded_hal::{
    digital::{ErrorType as PinErrorType, InputPin, OutputPin},
    pwm::{ErrorType as PwmErrorType, SetDutyCycle},
};
use lift_core::mk_static;
use lift_core::utils::{
    ButtonInterlock, LiftConfig, MotorController, Scheduler, Tick, Timer,
    connection::{
        TransportFault, UdpTransport,
        identity::{SSID_CAPACITY, ssid_for_chip, ssid_suffix},
        udp::{META_SLOTS, SOCKET_BUFFER},
    },
    display::{LiftStatus, StatusDisplay},
    scheduler::Fault,
};
use rand_core::{OsRng, TryRngCore};
use static_cell::StaticCell;
use std::{
    convert::Infallible,
    io::BufRead,
    os::unix::process::CommandExt,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// TAP device name
    #[clap(long, default_value = "tap0")]
    tap: String,
    /// use DHCP instead of the configured static address
    #[clap(long)]
    dhcp: bool,
    /// JSON file overriding the board defaults
    #[clap(long)]
    config: Option<PathBuf>,
    /// hardware identity the SSID is derived from
    #[clap(long, default_value_t = 0x0000_4C1F_0000_0000)]
    chip_id: u64,
}

/// Simulated button levels, driven from stdin.
static BUTTON_UP: AtomicBool = AtomicBool::new(false);
static BUTTON_DOWN: AtomicBool = AtomicBool::new(false);

/// Direction output that logs level changes.
struct ConsolePin {
    name: &'static str,
    high: bool,
}

impl ConsolePin {
    fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    fn write(&mut self, high: bool) {
        if self.high != high {
            debug!(pin = self.name, high, "direction output");
        }
        self.high = high;
    }
}

impl PinErrorType for ConsolePin {
    type Error = Infallible;
}

impl OutputPin for ConsolePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// 8-bit PWM channel that logs duty changes.
struct ConsolePwm {
    duty: Option<u16>,
}

impl PwmErrorType for ConsolePwm {
    type Error = Infallible;
}

impl SetDutyCycle for ConsolePwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if self.duty != Some(duty) {
            debug!(duty, "PWM duty");
        }
        self.duty = Some(duty);
        Ok(())
    }
}

/// Button input backed by one of the stdin-driven levels.
struct SimButton(&'static AtomicBool);

impl PinErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.load(Ordering::Relaxed))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.load(Ordering::Relaxed))
    }
}

/// Status display that writes to the log instead of an OLED.
struct LogDisplay {
    ssid_suffix: heapless::String<SSID_CAPACITY>,
}

impl StatusDisplay for LogDisplay {
    type Error = Infallible;

    fn show(&mut self, status: &LiftStatus) -> Result<(), Self::Error> {
        let stations = status
            .station_count
            .map_or_else(|| "unknown".to_string(), |count| count.to_string());
        debug!(
            ssid = %self.ssid_suffix,
            %stations,
            speed = status.speed,
            last_movement_s = status.seconds_since_deadline,
            "status"
        );
        Ok(())
    }
}

/// Read `up`, `down`, `both` or `none` lines from stdin into the button levels.
fn spawn_button_console() {
    std::thread::spawn(|| {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let (up, down) = match line.trim() {
                "up" => (true, false),
                "down" => (false, true),
                "both" => (true, true),
                "none" | "" => (false, false),
                other => {
                    warn!(input = other, "expected up, down, both or none");
                    continue;
                }
            };
            BUTTON_UP.store(up, Ordering::Relaxed);
            BUTTON_DOWN.store(down, Ordering::Relaxed);
            info!(up, down, "buttons");
        }
    });
}

fn load_config(path: Option<&Path>) -> Result<LiftConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(LiftConfig::default()),
    }
}

/// Crash-only recovery: replace this process with a fresh copy of itself.
fn restart(fault: TransportFault) -> ! {
    error!(?fault, "transport stuck, restarting");
    match std::env::current_exe() {
        Ok(exe) => {
            let error = std::process::Command::new(exe)
                .args(std::env::args_os().skip(1))
                .exec();
            error!(%error, "re-exec failed");
        }
        Err(error) => error!(%error, "cannot locate own executable"),
    }
    std::process::exit(70)
}

fn net_config(dhcp: bool, config: &LiftConfig) -> Config {
    if dhcp {
        return Config::dhcpv4(Default::default());
    }
    let [a, b, c, d] = config.address;
    let [ga, gb, gc, gd] = config.gateway;
    Config::ipv4_static(embassy_net::StaticConfigV4 {
        address: Ipv4Cidr::new(Ipv4Address::new(a, b, c, d), config.prefix_len),
        dns_servers: heapless::Vec::new(),
        gateway: Some(Ipv4Address::new(ga, gb, gc, gd)),
    })
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, TunTapDevice>) -> ! {
    runner.run().await
}

async fn wait_for_network(stack: Stack<'static>) {
    while !stack.is_link_up() {
        Timer::after_millis(500).await;
    }

    info!("Waiting to get IP address...");
    loop {
        if let Some(config) = stack.config_v4() {
            info!("Got IP: {}", config.address);
            break;
        }
        Timer::after_millis(500).await;
    }
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();
    let config = match load_config(opts.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "invalid configuration");
            std::process::exit(2);
        }
    };
    let ssid = ssid_for_chip(&config.ssid_prefix, opts.chip_id);

    // Network bring-up
    let device = TunTapDevice::new(&opts.tap).unwrap();
    let net_config = net_config(opts.dhcp, &config);

    let mut seed_buf = [0; 8];
    if let Err(error) = OsRng.try_fill_bytes(&mut seed_buf) {
        warn!(%error, "no OS entropy, using fixed network seed");
    }
    let seed = u64::from_le_bytes(seed_buf);

    let (stack, runner) = embassy_net::new(
        device,
        net_config,
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();

    wait_for_network(stack).await;

    info!(%ssid, "SSID");
    if let Some(v4) = stack.config_v4() {
        info!("IP: {}", v4.address);
    }
    info!(port = config.port, "Port");

    let mut transport = match UdpTransport::bind(
        stack,
        config.port,
        mk_static!([PacketMetadata; META_SLOTS], [PacketMetadata::EMPTY; META_SLOTS]),
        mk_static!([u8; SOCKET_BUFFER], [0; SOCKET_BUFFER]),
        mk_static!([PacketMetadata; META_SLOTS], [PacketMetadata::EMPTY; META_SLOTS]),
        mk_static!([u8; SOCKET_BUFFER], [0; SOCKET_BUFFER]),
    ) {
        Ok(transport) => transport,
        Err(error) => {
            error!(?error, "Failed to start UDP server");
            loop {
                Timer::after_millis(1000).await;
            }
        }
    };

    // Motor and buttons
    let motor = MotorController::new(
        ConsolePin::new("forward"),
        ConsolePin::new("reverse"),
        ConsolePwm { duty: None },
        config.default_timeout_ms,
        Tick::now(),
    )
    .expect("console outputs are infallible");
    let mut scheduler = Scheduler::new(motor, &config);
    let mut buttons = ButtonInterlock::new(SimButton(&BUTTON_UP), SimButton(&BUTTON_DOWN));
    let mut display = LogDisplay {
        ssid_suffix: ssid_suffix(&ssid, &config.ssid_prefix).try_into().unwrap_or_default(),
    };
    spawn_button_console();

    info!("lift ready");
    loop {
        let pressed = buttons.read_or_stop();
        match scheduler.step(Tick::now(), pressed, &mut transport) {
            Ok(effects) => {
                if let Some(status) = effects.status {
                    if let Err(error) = display.show(&status) {
                        warn!(?error, "status display failed");
                    }
                }
                if effects.is_idle() {
                    Timer::after_millis(u64::from(config.idle_sleep_ms)).await;
                } else {
                    // keep draining, but let the network runner in
                    embassy_futures::yield_now().await;
                }
            }
            Err(Fault::Transport(fault)) => restart(fault),
            Err(Fault::Motor(error)) => {
                error!(?error, "motor output failed");
                Timer::after_millis(u64::from(config.idle_sleep_ms)).await;
            }
        }
    }
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
