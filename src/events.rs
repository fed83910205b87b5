use crate::carousel::Point;
use std::time::Duration;

/// Everything the host event loop reacts to. Produced by the socket server, the frame
/// clock and the config watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Press(Point),
    Move(Point),
    Release(Point),
    Cancel,
    /// Jump back to the resting rotation.
    Reset,
    Halt,
    /// One display refresh elapsed.
    Frame(Duration),
    ConfigReload,
}
