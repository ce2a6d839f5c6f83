use crate::{CoreResult, PcmBuffer};

/// A microphone that can record one bounded take at a time.
///
/// Starting a take hands back an [`ActiveCapture`] that owns the running
/// stream. The stream is released when the capture is finished or dropped,
/// so every exit path out of recording gives the device back.
pub trait CaptureDevice {
    /// Handle for one in-flight take.
    type Capture: ActiveCapture;

    /// Begin capturing into a buffer that holds at most `max_samples`
    /// interleaved samples. Once full, further input is discarded.
    fn begin(&mut self, max_samples: usize) -> CoreResult<Self::Capture>;

    /// Number of interleaved channels each take is recorded with.
    fn channels(&self) -> u16;
}

/// An in-flight take. Dropping it stops the stream without collecting samples.
pub trait ActiveCapture {
    /// Stop the stream and return what was captured.
    fn finish(self) -> CoreResult<PcmBuffer>;
}
