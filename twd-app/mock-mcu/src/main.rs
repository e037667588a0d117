mod sim;

use std::{path::PathBuf, process::ExitCode, thread, time::Duration};

use clap::Parser;
use tracing::{error, info, warn};
use twd_core::utils::{MotorConfig, MotorPair, MotorPins};

use sim::{Plant, SimEncoders, SimServos};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// Pins in wiring order: left-steer, right-steer, left-drive, right-drive, left-encoder, right-encoder
    #[clap(long, value_delimiter = ',', default_value = "9,10,11,12,13,14")]
    pins: Vec<u8>,
    /// JSON file overriding the default actuation/feedback domains
    #[clap(long)]
    config: Option<PathBuf>,
    /// Commanded absolute steering angle, left
    #[clap(long, default_value_t = 90, allow_hyphen_values = true)]
    left_angle: i32,
    /// Commanded absolute steering angle, right
    #[clap(long, default_value_t = 90, allow_hyphen_values = true)]
    right_angle: i32,
    /// Steering change per tick, in degrees
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    sweep: i32,
    /// Commanded speed, left
    #[clap(long, default_value_t = 50, allow_hyphen_values = true)]
    left_speed: i32,
    /// Commanded speed, right
    #[clap(long, default_value_t = 50, allow_hyphen_values = true)]
    right_speed: i32,
    /// Encoder counts per tick per unit of throttle
    #[clap(long, default_value_t = 2)]
    gain: i64,
    /// Number of control loop iterations
    #[clap(long, default_value_t = 50)]
    ticks: u32,
    /// Control loop period in milliseconds
    #[clap(long, default_value_t = 20)]
    interval_ms: u64,
}

fn load_config(path: Option<&PathBuf>) -> Result<MotorConfig, String> {
    let Some(path) = path else {
        return Ok(MotorConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = match load_config(opts.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let p = &opts.pins;
    if p.len() != 6 {
        error!("expected six pins, got {}", p.len());
        return ExitCode::FAILURE;
    }
    let pins = MotorPins::new(p[0], p[1], p[2], p[3], p[4], p[5]);

    let plant = Plant::new(&pins, &config, opts.gain);
    let mut motors = MotorPair::new(
        pins,
        SimServos(plant.clone()),
        SimEncoders(plant.clone()),
        config,
    );

    if let Err(e) = motors.attach() {
        error!("attach failed: {:?}", e);
        return ExitCode::FAILURE;
    }
    info!(?pins, "motors attached, running {} ticks", opts.ticks);

    let period = Duration::from_millis(opts.interval_ms);
    for tick in 0..opts.ticks {
        let left_angle = swept_angle(opts.left_angle, tick, opts.sweep);
        let right_angle = swept_angle(opts.right_angle, tick, opts.sweep);
        match motors.write_motors(left_angle, right_angle, opts.left_speed, opts.right_speed) {
            Ok(report) if report.any_clamped() => warn!(tick, ?report, "command clamped"),
            Ok(_) => {}
            Err(e) => error!(tick, "write failed: {:?}", e),
        }

        plant.borrow_mut().step();

        match (motors.get_y1(), motors.get_y2()) {
            (Ok(y1), Ok(y2)) => info!(tick, y1, y2, "encoders"),
            (y1, y2) => error!(tick, "encoder read failed: {:?} {:?}", y1, y2),
        }
        thread::sleep(period);
    }

    if let Err(e) = motors.stop() {
        error!("stop failed: {:?}", e);
        return ExitCode::FAILURE;
    }
    info!("done");
    ExitCode::SUCCESS
}

/// Steering command after `tick` steps of `sweep`, saturating at the `i32` bounds.
fn swept_angle(
    start: i32,
    tick: u32,
    sweep: i32,
) -> i32 {
    let swept = i32::try_from(tick)
        .unwrap_or(i32::MAX)
        .saturating_mul(sweep);
    start.saturating_add(swept)
}
