use std::sync::mpsc;
use std::thread;

use log::warn;

use docrect_core::GeometryError;

use crate::session::RectifiedImage;

/// Handle to a resample running on a worker thread.
///
/// The worker owns everything it reads (the source raster is shared via
/// `Arc`), so the handle can be polled, waited on, or simply dropped to
/// discard the result.
pub struct PendingCommit {
    rx: mpsc::Receiver<Result<RectifiedImage, GeometryError>>,
}

impl PendingCommit {
    pub(crate) fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<RectifiedImage, GeometryError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // the receiver may already be gone (discarded session); that
            // just drops the result
            let _ = tx.send(job());
        });
        Self { rx }
    }

    /// Non-blocking poll: `None` while the resample is still running.
    pub fn try_result(&self) -> Option<Result<RectifiedImage, GeometryError>> {
        self.rx.try_recv().ok()
    }

    /// Block until the worker finishes and take its result.
    pub fn wait(self) -> Result<RectifiedImage, GeometryError> {
        // the worker always sends exactly once; disconnection without a
        // message means it panicked, which we propagate
        self.rx.recv().expect("resample worker disconnected")
    }

    /// Drop the in-flight work. The worker runs to completion on its own
    /// thread and its result is discarded.
    pub fn discard(self) {
        warn!("discarding in-flight resample");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrect_core::{Homography, RgbaRaster};

    fn dummy_image() -> RectifiedImage {
        RectifiedImage {
            raster: RgbaRaster::new(2, 2),
            homography: Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
            jpeg_quality: 90,
        }
    }

    #[test]
    fn wait_returns_the_worker_result() {
        let pending = PendingCommit::spawn(|| Ok(dummy_image()));
        let img = pending.wait().expect("ok result");
        assert_eq!(img.raster.width, 2);
    }

    #[test]
    fn errors_cross_the_channel_unchanged() {
        let pending = PendingCommit::spawn(|| Err(GeometryError::DegenerateCorners));
        assert_eq!(pending.wait().err(), Some(GeometryError::DegenerateCorners));
    }

    #[test]
    fn try_result_eventually_sees_the_value() {
        let pending = PendingCommit::spawn(|| Ok(dummy_image()));
        // bounded spin; the worker only has to send one message
        for _ in 0..1000 {
            if let Some(r) = pending.try_result() {
                assert!(r.is_ok());
                return;
            }
            thread::sleep(std::time::Duration::from_millis(1));
        }
        panic!("worker never delivered a result");
    }
}
