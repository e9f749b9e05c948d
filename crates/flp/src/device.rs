//! A simulated device: an LED, a motor and an uptime counter.
//!
//! | Command | Arguments |
//! |---------|-----------|
//! | `led.set` | `on=<0\|1>` `level=<0..255>` |
//! | `motor.set` | `rpm=<real>` required, `\|rpm\| <= 6000` |
//! | `device.tick` | none, increments `uptime.ticks` |
//! | `device.echo` | anything, echoed back on an `R` line |

use std::rc::Rc;

use flp_engine::{CommandSpec, Label, LineProtocol, StateCell};
use flp_registry::Result;
use tracing::debug;

/// Largest accepted motor speed magnitude.
pub const MAX_RPM: f64 = 6000.0;

pub const LED_ON: &str = "led.on";
pub const LED_LEVEL: &str = "led.level";
pub const MOTOR_RPM: &str = "motor.rpm";
pub const UPTIME_TICKS: &str = "uptime.ticks";

/// State cells of the simulated device. Dropping the device unregisters
/// them.
pub struct DemoDevice {
    led_on: StateCell<bool>,
    led_level: StateCell<u8>,
    motor_rpm: StateCell<f32>,
    ticks: Rc<StateCell<u32>>,
}

impl DemoDevice {
    /// Register the device's states and commands with `protocol`.
    pub fn attach(protocol: &mut LineProtocol) -> Result<Self> {
        let led_on = protocol.state::<bool>(LED_ON)?;
        let led_level = protocol.state::<u8>(LED_LEVEL)?;
        let motor_rpm = protocol.state::<f32>(MOTOR_RPM)?.with_precision(1);
        let ticks = Rc::new(protocol.state::<u32>(UPTIME_TICKS)?);

        protocol.register_command(
            "led.set",
            CommandSpec::new()
                .argument("on", led_on.argument())
                .argument("level", led_level.argument()),
        )?;

        protocol.register_command(
            "motor.set",
            CommandSpec::new().argument(
                "rpm",
                motor_rpm
                    .argument()
                    .required()
                    .with_validator(|rpm| rpm.abs() <= MAX_RPM),
            ),
        )?;

        let counter = Rc::downgrade(&ticks);
        protocol.register_command(
            "device.tick",
            CommandSpec::new().with_callback(move |_, _| {
                if let Some(ticks) = counter.upgrade() {
                    ticks.set(ticks.get().wrapping_add(1));
                }
            }),
        )?;

        let responder = protocol.responder();
        protocol.register_command(
            "device.echo",
            CommandSpec::new().with_callback(move |_, unmatched| {
                let payload = unmatched
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                responder.respond(Label::Report, "device.echo", &payload);
            }),
        )?;

        debug!("demo device attached");
        Ok(Self {
            led_on,
            led_level,
            motor_rpm,
            ticks,
        })
    }

    pub fn led_on(&self) -> bool {
        self.led_on.get()
    }

    pub fn led_level(&self) -> u8 {
        self.led_level.get()
    }

    pub fn motor_rpm(&self) -> f32 {
        self.motor_rpm.get()
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.get()
    }

    /// Report every state, as after a device reset.
    pub fn report_all(&self) {
        self.led_on.report();
        self.led_level.report();
        self.motor_rpm.report();
        self.ticks.report();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Write;

    use flp_engine::ProtocolError;
    use flp_line::FixedClock;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Capture {
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.borrow_mut())).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn device() -> (LineProtocol, DemoDevice, Capture) {
        let capture = Capture::default();
        let mut protocol = LineProtocol::new(capture.clone());
        protocol.set_clock(Box::new(FixedClock::new(0)));
        let device = DemoDevice::attach(&mut protocol).expect("device should attach");
        (protocol, device, capture)
    }

    #[test]
    fn led_set_reports_both_states() {
        let (mut protocol, device, capture) = device();
        protocol.feed("led.set on=1 level=200\n");
        assert_eq!(protocol.process(), Ok(true));
        assert!(device.led_on());
        assert_eq!(device.led_level(), 200);
        assert_eq!(
            capture.take(),
            "R(0) led.level: 200\nR(0) led.on: 1\n_(0) led.set: OK\n"
        );
    }

    #[test]
    fn led_level_range_enforced() {
        let (mut protocol, device, _capture) = device();
        protocol.feed("led.set level=256\n");
        assert!(matches!(
            protocol.process(),
            Err(ProtocolError::ValidatorFailure(_))
        ));
        protocol.feed("led.set on=2\n");
        assert!(protocol.process().is_err());
        assert_eq!(device.led_level(), 0);
    }

    #[test]
    fn motor_set_requires_rpm_within_limit() {
        let (mut protocol, device, capture) = device();
        protocol.feed("motor.set\nmotor.set rpm=7000\nmotor.set rpm=-1234.56\n");
        assert_eq!(protocol.drain(), 3);
        assert_eq!(device.motor_rpm(), -1234.56);

        let out = capture.take();
        assert!(out.contains("_(0) motor.set: ERR invalid argument: rpm is required\n"));
        assert!(out.contains("_(0) motor.set: ERR validation failed: rpm=7000\n"));
        assert!(out.ends_with("R(0) motor.rpm: -1234.6\n_(0) motor.set: OK\n"));
    }

    #[test]
    fn tick_and_echo() {
        let (mut protocol, device, capture) = device();
        protocol.feed("device.tick\ndevice.tick\ndevice.echo b=2 a=1.5\n");
        assert_eq!(protocol.drain(), 3);
        assert_eq!(device.ticks(), 2);
        assert_eq!(
            capture.take(),
            "R(0) uptime.ticks: 1\n_(0) device.tick: OK\n\
             R(0) uptime.ticks: 2\n_(0) device.tick: OK\n\
             R(0) device.echo: a=1.5 b=2\n_(0) device.echo: OK\n"
        );
    }

    #[test]
    fn report_all_and_detach() {
        let (protocol, device, capture) = device();
        device.report_all();
        assert_eq!(
            capture.take(),
            "R(0) led.on: 0\nR(0) led.level: 0\nR(0) motor.rpm: 0.0\nR(0) uptime.ticks: 0\n"
        );
        assert_eq!(protocol.state_count(), 4);
        drop(device);
        assert_eq!(protocol.state_count(), 0);
    }
}
