use std::{
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    thread,
};

use log::{info, warn};
use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    camera::Camera,
    error::{RenderError, Result},
    frame::FrameBuffer,
    integrator::radiance,
    progressive::Progressive,
    queue::{self, TaskQueue},
    scene::Scene,
};

const FALLBACK_THREADS: usize = 4;

pub fn default_threads() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(FALLBACK_THREADS)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Schedule {
    /// Split row ranges on demand, render every row once at full sample count.
    Queue,
    /// Fixed row partitions, one sample per pixel per pass, averaged forever.
    #[default]
    Progressive,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    /// Samples per pixel for the queue schedule.
    pub samples: usize,
    /// Pass limit for the progressive schedule, 0 runs until cancelled.
    pub passes: u64,
    pub threads: usize,
    pub seed: Option<u64>,
    pub schedule: Schedule,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 720,
            samples: 100,
            passes: 0,
            threads: default_threads(),
            seed: None,
            schedule: Schedule::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSettings(format!(
                "image must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples == 0 {
            return Err(RenderError::InvalidSettings(
                "samples per pixel must be at least 1".to_owned(),
            ));
        }
        if self.threads == 0 {
            return Err(RenderError::InvalidSettings(
                "thread count must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Everything the workers and the display share for one render.
pub struct Session {
    scene: Scene,
    camera: Camera,
    settings: Settings,
    frame: Mutex<FrameBuffer>,
    pub(crate) queue: TaskQueue,
    pub(crate) lines_done: AtomicUsize,
    pub(crate) passes_done: AtomicU64,
    cancelled: AtomicBool,
}

impl Session {
    pub fn new(scene: Scene, camera: Camera, settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            frame: Mutex::new(FrameBuffer::new(settings.width, settings.height)),
            scene,
            camera,
            settings,
            queue: TaskQueue::default(),
            lines_done: AtomicUsize::new(0),
            passes_done: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Locks the display buffer. Workers hold it only while writing a row.
    pub fn frame(&self) -> MutexGuard<'_, FrameBuffer> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.frame().pixel_data().to_vec()
    }

    pub fn lines_done(&self) -> usize {
        self.lines_done.load(Ordering::SeqCst)
    }

    pub fn passes_done(&self) -> u64 {
        self.passes_done.load(Ordering::SeqCst)
    }

    /// Stops handing out work. Rows and passes already running still finish.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            warn!("render cancelled");
        }
        self.queue.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> String {
        match self.settings.schedule {
            Schedule::Queue => {
                format!("Lines done: {}/{}", self.lines_done(), self.settings.height)
            }
            Schedule::Progressive => format!("Samples: {}", self.passes_done()),
        }
    }

    pub fn worker_rng(&self, index: usize) -> StdRng {
        match self.settings.seed {
            Some(seed) => {
                StdRng::seed_from_u64(seed ^ (index as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15))
            }
            None => StdRng::from_entropy(),
        }
    }

    /// One jittered camera sample for pixel (`row` from the bottom, `col`).
    pub fn sample<R: Rng + ?Sized>(&self, row: usize, col: usize, rng: &mut R) -> Vector3<f64> {
        let u = (col as f64 + rng.gen::<f64>()) / self.settings.width as f64;
        let v = (row as f64 + rng.gen::<f64>()) / self.settings.height as f64;
        radiance(&self.camera.ray(u, v), &self.scene, 0, rng)
    }

    /// Blocks until the configured schedule finishes or is cancelled.
    pub fn render(&self) -> Result<()> {
        info!(
            "rendering {}x{} with {} threads ({:?})",
            self.settings.width, self.settings.height, self.settings.threads, self.settings.schedule
        );
        match self.settings.schedule {
            Schedule::Queue => queue::render(self),
            Schedule::Progressive => Progressive::new(self)?.run(),
        }
    }
}
