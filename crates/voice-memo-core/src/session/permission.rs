/// Microphone authorization as last reported by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Authorization has not resolved yet.
    #[default]
    Unknown,
    /// Recording is allowed.
    Granted,
    /// Recording was refused.
    Denied,
}

impl Permission {
    /// Whether recording commands may proceed.
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

impl From<bool> for Permission {
    fn from(authorized: bool) -> Self {
        if authorized {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }
}
