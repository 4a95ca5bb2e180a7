//! Fixed escape-coded notices written to the terminal
//!
//! Cyan for mode/progress, yellow for dismissals, red for errors, green for
//! a found command. `\r\n` line endings because the sink is a raw terminal.

pub const MODE_ENABLED: &str =
    "\r\n\x1b[36m[AI mode on, describe the command you need]\x1b[0m\r\n";
pub const MODE_DISABLED: &str = "\r\n\x1b[33m[AI mode off]\x1b[0m\r\n";
pub const PROCESSING: &str = "\r\n\x1b[36m[AI thinking...]\x1b[0m\r\n";
pub const PROMPT: &str = "\r\n\x1b[36mWhat would you like to do: \x1b[0m";
pub const CONFIRM: &str = "\r\n\x1b[33mRun this command? (y/n): \x1b[0m";
pub const CANCELLED: &str = "\r\n\x1b[33mCommand cancelled\x1b[0m\r\n";
pub const ERROR_PREFIX: &str = "\r\n\x1b[31m[AI error]: ";
pub const ERROR_SUFFIX: &str = "\x1b[0m\r\n";
pub const REPLY_PREFIX: &str = "\r\n\x1b[33m[AI reply]:\r\n";
pub const REPLY_SUFFIX: &str = "\x1b[0m\r\n";

/// Banner for an extracted command awaiting confirmation
pub fn command_found(command: &str) -> String {
    format!("\r\n\x1b[42m\x1b[30m Command \x1b[0m \x1b[32m{command}\x1b[0m")
}

/// Line echoed when a confirmed command is handed over for execution
pub fn executing(command: &str) -> String {
    format!("\r\n\x1b[32mRunning: {command}\x1b[0m\r\n")
}
