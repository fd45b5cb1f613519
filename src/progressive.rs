//! Progressive accumulation: every pass adds one sample to each pixel and
//! republishes the running average.

use std::{ops::Range, sync::atomic::Ordering};

use log::{debug, info};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{error::Result, frame::display_index, session::Session};

/// Radiance sums for every pixel, stored top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulator {
    width: usize,
    height: usize,
    sums: Box<[Vector3<f64>]>,
    samples: u64,
}

impl Accumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sums: vec![Vector3::zeros(); width * height].into_boxed_slice(),
            samples: 0,
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Running average of pixel (`row` from the bottom, `col`).
    pub fn average(&self, row: usize, col: usize) -> Vector3<f64> {
        self.sums[display_index(self.width, self.height, row, col)] / self.samples.max(1) as f64
    }
}

/// Splits `rows` evenly over `workers`; the last one also takes the remainder.
pub fn partition(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let per_worker = rows / workers;
    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i + 1 == workers {
                rows
            } else {
                start + per_worker
            };
            start..end
        })
        .filter(|range| !range.is_empty())
        .collect()
}

pub struct Progressive<'a> {
    session: &'a Session,
    pool: ThreadPool,
    accumulator: Accumulator,
    partitions: Vec<Range<usize>>,
    rngs: Vec<StdRng>,
}

impl<'a> Progressive<'a> {
    pub fn new(session: &'a Session) -> Result<Self> {
        let settings = session.settings();
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .thread_name(|index| format!("render-{index}"))
            .build()?;
        let partitions = partition(settings.height, settings.threads);
        let rngs = (0..partitions.len())
            .map(|index| session.worker_rng(index))
            .collect();
        Ok(Self {
            session,
            pool,
            accumulator: Accumulator::new(settings.width, settings.height),
            partitions,
            rngs,
        })
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn pass(&mut self) -> u64 {
        let Self {
            session,
            pool,
            accumulator,
            partitions,
            rngs,
        } = self;
        let session: &Session = *session;
        let width = accumulator.width;
        let divisor = (accumulator.samples + 1) as f64;

        // Hand each partition its own disjoint slice of the sums.
        let mut rest: &mut [Vector3<f64>] = &mut accumulator.sums;
        let mut jobs = Vec::with_capacity(partitions.len());
        for (rows, rng) in partitions.iter().zip(rngs.iter_mut()) {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(rows.len() * width);
            rest = tail;
            jobs.push((rows.clone(), chunk, rng));
        }
        pool.scope(|scope| {
            for (rows, chunk, rng) in jobs {
                scope.spawn(move |_| accumulate(session, rows, chunk, rng, divisor));
            }
        });

        accumulator.samples += 1;
        session.passes_done.fetch_add(1, Ordering::SeqCst);
        debug!("pass {} complete", accumulator.samples);
        accumulator.samples
    }

    /// Keeps passing until the configured limit or cancellation.
    pub fn run(&mut self) -> Result<()> {
        let limit = self.session.settings().passes;
        while !self.session.is_cancelled() && (limit == 0 || self.accumulator.samples < limit) {
            self.pass();
        }
        info!("{}", self.session.status());
        Ok(())
    }
}

/// Adds one sample per pixel for the display rows `rows`, whose sums are `chunk`.
fn accumulate(
    session: &Session,
    rows: Range<usize>,
    chunk: &mut [Vector3<f64>],
    rng: &mut StdRng,
    divisor: f64,
) {
    let settings = session.settings();
    for (y, sums) in rows.zip(chunk.chunks_exact_mut(settings.width)) {
        let row = settings.height - 1 - y;
        for (col, sum) in sums.iter_mut().enumerate() {
            *sum += session.sample(row, col, rng);
        }
        session
            .frame()
            .set_row(y, sums.iter().map(|sum| sum / divisor));
    }
}
