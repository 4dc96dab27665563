use std::env;
use std::process::ExitCode;

use chip8vm::chip_core::{Core, StopReason};
use chip8vm::config::RunConfig;

fn main() -> ExitCode {
    env_logger::init();

    let config = match RunConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: chip8vm <rom> [--hz N] [--cycles N] [--no-render]");
            return ExitCode::from(2);
        }
    };

    let mut core = Core::new(config);
    let outcome = core.load_configured_rom().and_then(|_| core.run());

    match outcome {
        Ok(StopReason::AwaitingKey) => {
            println!("\nProgram is waiting for a key; this runner has no keyboard. Exiting.");
            ExitCode::SUCCESS
        }
        Ok(reason) => {
            println!("\nProgram stopped ({reason:?}) after {} cycles.", core.cycles());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\nExecution error: {e}");
            ExitCode::FAILURE
        }
    }
}
