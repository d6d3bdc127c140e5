/// Everything the user can ask the TUI to do, already decoded from raw
/// terminal input by [`crate::input::map_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoTop,
    GoBottom,
    /// Enter in normal mode: select document / open directory / start composing.
    DrillIn,
    /// Esc in normal mode: dismiss banner, close overlay, leave picker.
    NavigateBack,
    CycleFocus,

    // Documents
    AddFiles,
    ToggleSelect,
    FetchByKey,

    // Chat
    Compose,
    NewChat,
    CopyLastAnswer,
    Export,

    // Text input
    TextInput(char),
    Paste(String),
    Backspace,
    DeleteForward,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    InputConfirm,
    InputCancel,

    // Global
    ToggleHelp,
    CycleTheme,
    SaveConfig,
    Quit,
    ForceQuit,
    Resize(u16, u16),
    Tick,
    None,
}
