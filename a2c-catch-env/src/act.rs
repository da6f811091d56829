//! Action for [`CatchEnv`](crate::CatchEnv).
use a2c_core::Act;

/// Movement of the paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchAct {
    /// Moves one cell to the left.
    Left,

    /// Keeps the position.
    Stay,

    /// Moves one cell to the right.
    Right,

    /// An index out of the action space. Stepping with it fails.
    Invalid(usize),
}

impl CatchAct {
    /// The number of valid actions.
    pub const N: usize = 3;

    pub(crate) fn dx(&self) -> Option<isize> {
        match self {
            Self::Left => Some(-1),
            Self::Stay => Some(0),
            Self::Right => Some(1),
            Self::Invalid(_) => None,
        }
    }
}

impl Act for CatchAct {}

impl From<usize> for CatchAct {
    fn from(ix: usize) -> Self {
        match ix {
            0 => Self::Left,
            1 => Self::Stay,
            2 => Self::Right,
            n => Self::Invalid(n),
        }
    }
}

impl From<CatchAct> for usize {
    fn from(act: CatchAct) -> usize {
        match act {
            CatchAct::Left => 0,
            CatchAct::Stay => 1,
            CatchAct::Right => 2,
            CatchAct::Invalid(n) => n,
        }
    }
}
