use std::process::ExitCode;

use anyhow::{Context, Result};

use tickcheck::Harness;
use tickcheck_engine::logging::{init_logging, LoggingConfig};
use tickcheck_engine::time::FrameRate;

/// Overrides the tick rate (frames per second) when set.
const FPS_ENV_VAR: &str = "TICKCHECK_FPS";

fn main() -> Result<ExitCode> {
    init_logging(LoggingConfig::default());

    let rate = frame_rate_from_env()?;
    log::info!("driving tests at {rate}");

    let harness = Harness::new().rate(rate);
    let (check1, check2) = (harness.checker(), harness.checker());

    let mut count = 0;
    let result = harness
        .single_frame("test1", move || {
            check1.check(1 == 1);
            check1.check(1 == 0);
            log::info!("finished test1");
        })
        .multi_frame("test2", move || {
            count += 1;
            check2.check(true);
            if count >= 3 {
                log::info!("finished test2, count: {count}");
                true
            } else {
                log::info!("running test2, count: {count}");
                false
            }
        })
        .run()?;

    println!("Test completed. Result: {result}");

    Ok(if result.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn frame_rate_from_env() -> Result<FrameRate> {
    match std::env::var(FPS_ENV_VAR) {
        Ok(raw) => raw
            .parse::<FrameRate>()
            .with_context(|| format!("{FPS_ENV_VAR} must be a positive integer")),
        Err(_) => Ok(FrameRate::DEFAULT),
    }
}
