//! Command-line configuration for the terminal runner.
//!
//! ```text
//! chip8vm <rom> [--hz N] [--cycles N] [--no-render]
//! ```

use std::path::PathBuf;

use crate::consts::TIMER_HZ;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub rom_path: PathBuf,
    /// Cycles per second. Timers tick once per cycle, so anything other than
    /// 60 changes how fast timers run.
    pub cycle_hz: u32,
    /// Stop after this many cycles; run until the program blocks otherwise.
    pub max_cycles: Option<u64>,
    pub render: bool,
}

impl RunConfig {
    pub fn new(rom_path: impl Into<PathBuf>) -> Self {
        RunConfig {
            rom_path: rom_path.into(),
            cycle_hz: TIMER_HZ,
            max_cycles: None,
            render: true,
        }
    }

    /// Parses arguments, program name excluded.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut rom_path = None;
        let mut cycle_hz = TIMER_HZ;
        let mut max_cycles = None;
        let mut render = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--hz" => {
                    cycle_hz = parse_number(&mut args, "--hz")?;
                    if cycle_hz == 0 {
                        return Err(Error::Usage("--hz must be greater than zero".into()));
                    }
                }
                "--cycles" => max_cycles = Some(parse_number(&mut args, "--cycles")?),
                "--no-render" => render = false,
                flag if flag.starts_with('-') => {
                    return Err(Error::Usage(format!("unknown option '{flag}'")));
                }
                path => {
                    if rom_path.is_some() {
                        return Err(Error::Usage(format!("unexpected argument '{path}'")));
                    }
                    rom_path = Some(PathBuf::from(path));
                }
            }
        }

        let rom_path = rom_path.ok_or_else(|| Error::Usage("missing ROM path".into()))?;
        Ok(RunConfig {
            rom_path,
            cycle_hz,
            max_cycles,
            render,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T> {
    let value = args
        .next()
        .ok_or_else(|| Error::Usage(format!("{flag} needs a value")))?;
    value
        .parse()
        .map_err(|_| Error::Usage(format!("invalid value '{value}' for {flag}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RunConfig> {
        RunConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["pong.ch8"]).unwrap();
        assert_eq!(config, RunConfig::new("pong.ch8"));
        assert_eq!(config.cycle_hz, 60);
        assert!(config.render);
    }

    #[test]
    fn test_all_options() {
        let config = parse(&["--hz", "500", "pong.ch8", "--cycles", "1000", "--no-render"]).unwrap();
        assert_eq!(config.rom_path, PathBuf::from("pong.ch8"));
        assert_eq!(config.cycle_hz, 500);
        assert_eq!(config.max_cycles, Some(1000));
        assert!(!config.render);
    }

    #[test]
    fn test_usage_errors() {
        for args in [
            &[][..],
            &["--hz"][..],
            &["rom", "--hz", "fast"][..],
            &["rom", "--hz", "0"][..],
            &["rom", "--turbo"][..],
            &["a.ch8", "b.ch8"][..],
        ] {
            assert!(matches!(parse(args), Err(Error::Usage(_))), "{args:?}");
        }
    }
}
