//! Adaptive row splitting: the whole image starts as one task and idle
//! workers keep halving ranges until each task is a single row.

use std::{
    collections::VecDeque,
    sync::{atomic::Ordering, Condvar, Mutex, MutexGuard, PoisonError},
    thread,
};

use log::{debug, info};
use nalgebra::Vector3;

use crate::{
    error::{RenderError, Result},
    session::Session,
};

/// Half-open range of image rows, counted from the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rows {
    pub start: usize,
    pub end: usize,
}

impl Rows {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn split(self) -> Option<(Rows, Rows)> {
        if self.len() <= 1 {
            return None;
        }
        let mid = (self.start + self.end) / 2;
        Some((
            Rows {
                start: self.start,
                end: mid,
            },
            Rows {
                start: mid,
                end: self.end,
            },
        ))
    }
}

#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Rows>,
    all_done: bool,
    cancelled: bool,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl TaskQueue {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces whatever was queued with a single task. A cancelled queue stays
    /// closed.
    pub fn reset(&self, rows: Rows) {
        let mut state = self.lock();
        state.tasks.clear();
        if state.cancelled {
            return;
        }
        state.tasks.push_back(rows);
        state.all_done = false;
        drop(state);
        self.ready.notify_all();
    }

    /// Blocks until a task is available. `None` once the queue is drained and done.
    pub fn pop(&self) -> Option<Rows> {
        let mut state = self.lock();
        loop {
            if let Some(rows) = state.tasks.pop_front() {
                return Some(rows);
            }
            if state.all_done {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn push_halves(&self, first: Rows, second: Rows) {
        let mut state = self.lock();
        state.tasks.push_back(second);
        state.tasks.push_back(first);
        drop(state);
        self.ready.notify_all();
    }

    /// Lets waiting workers exit once nothing is left.
    pub fn finish(&self) {
        self.lock().all_done = true;
        self.ready.notify_all();
    }

    /// Drops pending tasks and releases every waiter.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.tasks.clear();
        state.all_done = true;
        state.cancelled = true;
        drop(state);
        self.ready.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A panicking worker would leave its row unfinished and everyone else waiting.
struct CancelOnPanic<'a>(&'a TaskQueue);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// Renders every row once with the full sample count, then returns.
pub fn render(session: &Session) -> Result<()> {
    let settings = session.settings();
    if session.is_cancelled() {
        return Ok(());
    }
    session.lines_done.store(0, Ordering::SeqCst);
    session.queue.reset(Rows {
        start: 0,
        end: settings.height,
    });

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(settings.threads);
        for index in 0..settings.threads {
            let spawned = thread::Builder::new()
                .name(format!("render-{index}"))
                .spawn_scoped(scope, move || worker(session, index));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    session.queue.cancel();
                    return Err(RenderError::Spawn(err));
                }
            }
        }

        let mut panicked = false;
        for handle in handles {
            panicked |= handle.join().is_err();
        }
        if panicked {
            return Err(RenderError::WorkerPanicked);
        }
        Ok(())
    })?;

    info!("{}", session.status());
    Ok(())
}

fn worker(session: &Session, index: usize) {
    let _guard = CancelOnPanic(&session.queue);
    let mut rng = session.worker_rng(index);
    let height = session.settings().height;
    debug!("queue worker {index} started");

    while let Some(rows) = session.queue.pop() {
        if let Some((first, second)) = rows.split() {
            session.queue.push_halves(first, second);
            continue;
        }
        if rows.is_empty() {
            continue;
        }
        render_row(session, rows.start, &mut rng);
        if session.lines_done.fetch_add(1, Ordering::SeqCst) + 1 == height {
            session.queue.finish();
        }
    }
    debug!("queue worker {index} exiting");
}

fn render_row(session: &Session, row: usize, rng: &mut impl rand::Rng) {
    let settings = session.settings();
    let colors: Vec<Vector3<f64>> = (0..settings.width)
        .map(|col| {
            (0..settings.samples)
                .map(|_| session.sample(row, col, rng))
                .sum::<Vector3<f64>>()
                / settings.samples as f64
        })
        .collect();
    session
        .frame()
        .set_row(settings.height - 1 - row, colors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::Camera,
        scene::Scene,
        session::{Schedule, Settings},
    };

    fn settings() -> Settings {
        Settings {
            width: 6,
            height: 5,
            samples: 2,
            passes: 1,
            threads: 3,
            seed: Some(5),
            schedule: Schedule::Queue,
        }
    }

    #[test]
    fn split_halves_cover_the_range() {
        let (a, b) = Rows { start: 0, end: 5 }.split().unwrap();
        assert_eq!(a, Rows { start: 0, end: 2 });
        assert_eq!(b, Rows { start: 2, end: 5 });
        assert!(Rows { start: 3, end: 4 }.split().is_none());
    }

    #[test]
    fn pop_returns_none_when_done_and_drained() {
        let queue = TaskQueue::default();
        queue.reset(Rows { start: 0, end: 2 });
        let rows = queue.pop().unwrap();
        let (a, b) = rows.split().unwrap();
        queue.push_halves(a, b);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(b));
        assert_eq!(queue.pop(), Some(a));
        queue.finish();
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn cancel_drops_pending_tasks() {
        let queue = TaskQueue::default();
        queue.reset(Rows { start: 0, end: 10 });
        queue.cancel();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn reset_after_cancel_hands_out_nothing() {
        let queue = TaskQueue::default();
        queue.cancel();
        queue.reset(Rows { start: 0, end: 4 });
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn cancel_between_check_and_reset_renders_nothing() {
        let session = Session::new(Scene::demo(), Camera::default(), settings()).unwrap();
        session.queue.cancel();
        render(&session).unwrap();
        assert_eq!(session.lines_done(), 0);
        assert_eq!(session.frame().get_pixel(0, 0), (0, 0, 0, 255));
    }

    #[test]
    fn finish_wakes_blocked_workers() {
        let queue = TaskQueue::default();
        thread::scope(|scope| {
            let waiters: Vec<_> = (0..3).map(|_| scope.spawn(|| queue.pop())).collect();
            queue.finish();
            for waiter in waiters {
                assert_eq!(waiter.join().unwrap(), None);
            }
        });
    }

    #[test]
    fn renders_every_row_once() {
        let session = Session::new(Scene::single_sphere(), Camera::default(), settings()).unwrap();
        render(&session).unwrap();
        assert_eq!(session.lines_done(), 5);
        assert_eq!(session.status(), "Lines done: 5/5");
        assert!(session.queue.is_empty());

        let frame = session.frame();
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let (r, g, b, a) = frame.get_pixel(x, y);
                assert_eq!(a, 255);
                assert!(r > 0 || g > 0 || b > 0, "pixel {x},{y} left black");
            }
        }
    }

    #[test]
    fn more_threads_than_rows() {
        let session = Session::new(
            Scene::single_sphere(),
            Camera::default(),
            Settings {
                height: 2,
                threads: 8,
                ..settings()
            },
        )
        .unwrap();
        render(&session).unwrap();
        assert_eq!(session.lines_done(), 2);
    }

    #[test]
    fn top_row_shows_sky() {
        let session = Session::new(Scene::single_sphere(), Camera::default(), settings()).unwrap();
        render(&session).unwrap();
        // The top-left pixel sees only sky, which is bluish white.
        let (r, _, b, _) = session.frame().get_pixel(0, 0);
        assert!(b >= r);
        assert!(r > 180);
    }

    #[test]
    fn cancelled_session_renders_nothing() {
        let session = Session::new(Scene::demo(), Camera::default(), settings()).unwrap();
        session.cancel();
        render(&session).unwrap();
        assert_eq!(session.lines_done(), 0);
    }
}
