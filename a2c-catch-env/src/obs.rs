use a2c_core::Obs;

/// Height and width of a frame in pixels.
pub const FRAME_SIZE: usize = 84;

/// Observation of [`CatchEnv`](crate::CatchEnv), a grayscale frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchObs {
    // FRAME_SIZE * FRAME_SIZE, row-major
    frame: Vec<u8>,
}

impl CatchObs {
    pub(crate) fn new(frame: Vec<u8>) -> Self {
        debug_assert_eq!(frame.len(), FRAME_SIZE * FRAME_SIZE);
        Self { frame }
    }

    /// Returns pixel values in row-major order.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Returns the pixel value at the given row and column.
    pub fn pixel(&self, row: usize, col: usize) -> u8 {
        self.frame[row * FRAME_SIZE + col]
    }
}

impl Obs for CatchObs {}

#[cfg(feature = "candle")]
impl TryFrom<CatchObs> for candle_core::Tensor {
    type Error = candle_core::Error;

    /// Converts to a `u8` tensor of shape `[1, 1, 84, 84]`.
    fn try_from(obs: CatchObs) -> Result<Self, Self::Error> {
        candle_core::Tensor::from_vec(
            obs.frame,
            (1, 1, FRAME_SIZE, FRAME_SIZE),
            &candle_core::Device::Cpu,
        )
    }
}
