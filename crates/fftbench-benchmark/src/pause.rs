//! Interactive pause between repetitions.

use std::io::{self, BufRead, Write};

use fftbench_core::Pause;

/// Prompt printed before blocking.
pub const PAUSE_PROMPT: &str = "Pausing at end of loop; CR to continue: ";

/// Prompts on stdout and waits for one line on stdin.
#[derive(Debug, Default)]
pub struct StdinPause;

impl Pause for StdinPause {
    fn pause(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(PAUSE_PROMPT.as_bytes())?;
        stdout.flush()?;
        drop(stdout);

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Never blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

impl Pause for NoPause {
    fn pause(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Pause for the interactive flag.
pub fn pause_for(enabled: bool) -> Box<dyn Pause> {
    if enabled {
        Box::new(StdinPause)
    } else {
        Box::new(NoPause)
    }
}
