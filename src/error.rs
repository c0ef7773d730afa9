use core::fmt;

/// Errors surfaced by the simulation core.
///
/// None of these are raised during a normal tick. They come back from setters,
/// phase switches and config validation, and the rejected change is never applied.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// A phase was requested that is not registered (or not a known phase name).
    UnknownScene(String),
    /// A setter received a value it cannot accept; the previous value is kept.
    InvalidArgument { name: &'static str, value: f32 },
    /// A color string that is not `#rrggbb`.
    InvalidColor(String),
    /// A configuration value that would break a simulation invariant.
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScene(name) => write!(f, "unknown scene: {name}"),
            Self::InvalidArgument { name, value } => {
                write!(f, "invalid value for {name}: {value}")
            }
            Self::InvalidColor(color) => write!(f, "invalid color {color:?}, expected #rrggbb"),
            Self::InvalidConfig(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Accepts finite, strictly positive values.
pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<f32, SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidArgument { name, value })
    }
}
