/// Commands sent from the console to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Begin a new take.
    StartRecording,
    /// End the current take.
    StopRecording,
    /// Save the unsaved clip.
    Save,
    /// Throw away the unsaved clip.
    Discard,
    /// Log the current session and library state.
    Status,
    /// Request application shutdown.
    Shutdown,
}

impl AppCommand {
    /// Parse one console line. Unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" | "record" | "r" => Some(Self::StartRecording),
            "stop" | "s" => Some(Self::StopRecording),
            "save" => Some(Self::Save),
            "discard" | "d" => Some(Self::Discard),
            "status" | "?" => Some(Self::Status),
            "quit" | "exit" | "q" => Some(Self::Shutdown),
            _ => None,
        }
    }
}
