use std::thread::sleep;
use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::display::CLIDisplay;
use crate::interpreter::{self, Command, Commands, StepResult};
use crate::state::State;
use crate::{Error, Result};

/// Why [`Core::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The program jumped to its own address.
    Finished,
    /// The program wants a key and this runner has no keyboard.
    AwaitingKey,
    /// The program counter left memory.
    ProgramCounterOutOfBounds,
    /// `max_cycles` were executed.
    CycleLimit,
}

enum StepOutcome {
    Continue,
    Halt(StopReason),
}

/// Terminal host: owns the machine and paces cycles.
pub struct Core {
    state: State,
    display: CLIDisplay,
    commands: Commands,
    config: RunConfig,
    cycles: u64,
}

impl Core {
    pub fn new(config: RunConfig) -> Self {
        Core {
            state: State::new(),
            display: CLIDisplay::new(),
            commands: Commands::new(),
            config,
            cycles: 0,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        self.state.load_program(rom)
    }

    /// Loads the ROM named in the configuration.
    pub fn load_configured_rom(&mut self) -> Result<usize> {
        let path = self.config.rom_path.clone();
        self.state.load_program_file(path)
    }

    /// Runs cycles at `cycle_hz` until the program stops or faults.
    pub fn run(&mut self) -> Result<StopReason> {
        if self.config.cycle_hz == 0 {
            return Err(Error::Usage("cycle rate must be greater than zero".into()));
        }
        let cycle_duration = Duration::from_secs_f64(1.0 / self.config.cycle_hz as f64);
        log::info!(
            "running at {} Hz, cycle limit {:?}",
            self.config.cycle_hz,
            self.config.max_cycles
        );

        let reason = loop {
            if self.config.max_cycles.is_some_and(|max| self.cycles >= max) {
                break StopReason::CycleLimit;
            }

            let cycle_start = Instant::now();

            if let StepOutcome::Halt(reason) = self.step()? {
                break reason;
            }

            if let Some(sleep_time) = cycle_duration.checked_sub(cycle_start.elapsed()) {
                sleep(sleep_time);
            }
        };

        log::info!("stopped after {} cycles: {:?}", self.cycles, reason);
        Ok(reason)
    }

    /// Runs without pacing or rendering; for tests and batch use.
    pub fn run_unpaced(&mut self, max_cycles: u64) -> Result<StopReason> {
        for _ in 0..max_cycles {
            if let StepOutcome::Halt(reason) = self.step_with(false)? {
                return Ok(reason);
            }
        }
        Ok(StopReason::CycleLimit)
    }

    fn step(&mut self) -> Result<StepOutcome> {
        self.step_with(self.config.render)
    }

    fn step_with(&mut self, render: bool) -> Result<StepOutcome> {
        let instruction_address = self.state.pc;
        let result = interpreter::tick_cycle(&mut self.state, &mut self.commands)?;
        self.cycles += 1;

        if let StepResult::Diagnosed(Error::ProgramCounterOutOfBounds { .. }) = result {
            return Ok(StepOutcome::Halt(StopReason::ProgramCounterOutOfBounds));
        }

        for &command in self.commands.as_slice() {
            match command {
                Command::ClearDisplay if render => self.display.clear()?,
                Command::ClearDisplay => {}
                Command::AwaitKey => return Ok(StepOutcome::Halt(StopReason::AwaitingKey)),
            }
        }

        if render && self.state.is_draw_flag_set() {
            self.display.show(&self.state.gfx)?;
        }

        let jumped_to_self = self.state.opcode & 0xF000 == 0x1000
            && self.state.pc == instruction_address
            && matches!(result, StepResult::Executed);
        if jumped_to_self {
            return Ok(StepOutcome::Halt(StopReason::Finished));
        }

        Ok(StepOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(program: &[u8]) -> Core {
        let mut core = Core::new(RunConfig::new("unused.ch8"));
        core.load_rom(program).unwrap();
        core
    }

    #[test]
    fn test_self_jump_finishes() {
        // 6005; 7001; 1204
        let mut core = core(&[0x60, 0x05, 0x70, 0x01, 0x12, 0x04]);
        assert_eq!(core.run_unpaced(100).unwrap(), StopReason::Finished);
        assert_eq!(core.cycles(), 3);
        assert_eq!(core.state().registers[0], 6);
    }

    #[test]
    fn test_await_key_stops_runner() {
        let mut core = core(&[0xF0, 0x0A]);
        assert_eq!(core.run_unpaced(100).unwrap(), StopReason::AwaitingKey);
        assert_eq!(core.state().pc, 0x200);
    }

    #[test]
    fn test_pressed_key_does_not_stop_runner() {
        let mut core = core(&[0xF0, 0x0A, 0x12, 0x02]);
        core.state_mut().set_key(7, true).unwrap();
        assert_eq!(core.run_unpaced(100).unwrap(), StopReason::Finished);
        assert_eq!(core.state().registers[0], 7);
    }

    #[test]
    fn test_cycle_limit() {
        // 1200: loop via 1202 <-> 1200
        let mut core = core(&[0x12, 0x02, 0x12, 0x00]);
        assert_eq!(core.run_unpaced(10).unwrap(), StopReason::CycleLimit);
        assert_eq!(core.cycles(), 10);
    }

    #[test]
    fn test_run_honours_configured_limit() {
        let mut config = RunConfig::new("unused.ch8");
        config.cycle_hz = 10_000;
        config.max_cycles = Some(5);
        config.render = false;
        let mut core = Core::new(config);
        core.load_rom(&[0x12, 0x02, 0x12, 0x00]).unwrap();
        assert_eq!(core.run().unwrap(), StopReason::CycleLimit);
        assert_eq!(core.cycles(), 5);
    }

    #[test]
    fn test_run_rejects_zero_cycle_rate() {
        let mut config = RunConfig::new("unused.ch8");
        config.cycle_hz = 0;
        config.max_cycles = Some(1);
        config.render = false;
        let mut core = Core::new(config);
        core.load_rom(&[0x12, 0x00]).unwrap();
        assert!(matches!(core.run(), Err(Error::Usage(_))));
        assert_eq!(core.cycles(), 0);
        assert_eq!(core.state().pc, 0x200);
    }

    #[test]
    fn test_runaway_program_counter_halts() {
        let mut core = core(&[0x1F, 0xFF]);
        assert_eq!(
            core.run_unpaced(10).unwrap(),
            StopReason::ProgramCounterOutOfBounds
        );
        assert_eq!(core.cycles(), 2);
    }

    #[test]
    fn test_fault_propagates() {
        let mut core = core(&[0x00, 0xEE]);
        assert!(matches!(core.run_unpaced(10), Err(Error::StackUnderflow)));
    }
}
