//! User intents.

/// What the user asked for.
///
/// Decouples the session from any particular input device so simulations
/// can script a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Choose a display name.
    SetDisplayName(String),
    /// Join a room.
    JoinRoom(String),
    /// Create a room (joins it).
    CreateRoom(String),
    /// Leave the current room.
    LeaveRoom,
    /// Send a message.
    SendMessage(String),
    /// Replace the compose buffer.
    EditDraft(String),
    /// Send the compose buffer.
    SubmitDraft,
    /// Quit the application.
    Quit,
}
