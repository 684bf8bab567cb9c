//! The repeating frame task.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::Engine;

/// Shared stop flag of a render loop. Clones refer to the same loop.
#[derive(Debug, Clone, Default)]
pub struct RenderHandle {
    stopped: Arc<AtomicBool>,
}

impl RenderHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to end after the frame in progress.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Drives an [`Engine`] once per display frame until stopped.
#[derive(Debug)]
pub struct RenderLoop {
    frame_interval: Duration,
    handle: RenderHandle,
    frames: u64,
}

impl RenderLoop {
    /// Create a loop ticking at `fps` frames per second (at least one).
    pub fn new(fps: u32, handle: RenderHandle) -> Self {
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            handle,
            frames: 0,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run frames until `present` breaks or the handle is stopped.
    ///
    /// Each frame advances the engine's tweens by the measured frame time,
    /// redraws the surface, then hands the engine to `present` so the host
    /// can display the frame and fire triggers. The loop then sleeps until
    /// the next frame is due. Returns the number of frames run.
    pub fn run<F, E>(&mut self, engine: &mut Engine, mut present: F) -> Result<u64, E>
    where
        F: FnMut(&mut Engine) -> Result<ControlFlow<()>, E>,
    {
        let mut last = Instant::now();
        while !self.handle.is_stopped() {
            let frame_start = Instant::now();
            engine.advance(frame_start.duration_since(last));
            engine.redraw();
            last = frame_start;
            self.frames += 1;

            if present(engine)?.is_break() {
                self.handle.stop();
                break;
            }

            let spent = frame_start.elapsed();
            if spent < self.frame_interval {
                thread::sleep(self.frame_interval - spent);
            }
        }
        Ok(self.frames)
    }
}
