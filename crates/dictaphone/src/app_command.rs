/// Operator commands accepted by the terminal shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start recording, or stop the take in progress.
    Record,
    /// Pause or resume the take in progress.
    Pause,
    /// Load the stopped take and toggle playback.
    Play,
    /// Cycle the playback rate.
    Rate,
    /// Delete the stopped take after confirmation.
    Delete,
    /// Print the command reference.
    Help,
    /// Leave the application.
    Quit,
}

impl Command {
    /// Parse an operator line. Case-insensitive, surrounding whitespace
    /// ignored. Returns `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "record" => Some(Command::Record),
            "p" | "pause" | "resume" => Some(Command::Pause),
            "play" => Some(Command::Play),
            "x" | "rate" => Some(Command::Rate),
            "d" | "delete" => Some(Command::Delete),
            "h" | "?" | "help" => Some(Command::Help),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }

    /// Command reference printed by `help` and at startup.
    pub fn reference() -> &'static str {
        "commands:\n\
         \x20 r, record   start recording, or stop the take in progress\n\
         \x20 p, pause    pause or resume the take in progress\n\
         \x20 play        play or pause the stopped take\n\
         \x20 x, rate     cycle the playback rate (0.5x, 1x, 2x)\n\
         \x20 d, delete   delete the stopped take\n\
         \x20 h, help     show this reference\n\
         \x20 q, quit     exit"
    }
}
