use std::{thread, time::Duration};

use log::info;

use crate::{error::Result, session::Session};

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Something that shows the RGBA8 frame (top row first) and a progress line.
pub trait Display {
    /// Returns `false` once the viewer wants to stop.
    fn present(&mut self, pixels: &[u8], status: &str) -> Result<bool>;

    fn keep_open(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct Headless {
    last_status: String,
}

impl Display for Headless {
    fn present(&mut self, _pixels: &[u8], status: &str) -> Result<bool> {
        if status != self.last_status {
            info!("{status}");
            self.last_status = status.to_owned();
        }
        Ok(true)
    }
}

/// Refreshes `display` from the session until `finished` reports true (or,
/// for displays that stay open, until the viewer quits). Quitting cancels the
/// session.
pub fn drive<D: Display + ?Sized>(
    session: &Session,
    display: &mut D,
    finished: impl Fn() -> bool,
) -> Result<()> {
    loop {
        let done = finished();
        let pixels = session.snapshot();
        if !display.present(&pixels, &session.status())? {
            session.cancel();
            return Ok(());
        }
        if done && !display.keep_open() {
            return Ok(());
        }
        thread::sleep(FRAME_INTERVAL);
    }
}
