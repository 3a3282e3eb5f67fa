use std::time::Duration;

/// Terminals only report presses, a key counts as held for this long.
pub(crate) const KEY_HOLD: Duration = Duration::from_millis(100);

/// The longest the loop blocks on input before it looks at the machine again.
pub(crate) const MAX_IDLE: Duration = Duration::from_millis(10);

pub(crate) mod field {
    pub const TITLE: &str = "CHIP-8";
    pub const BELL: &str = "BEEP";
    pub const QUIET: &str = "    ";
    pub const HELP: &str = "Esc quits";
}
