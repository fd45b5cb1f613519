use std::{path::PathBuf, thread};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use nalgebra::Vector3;

use pathtrace::{display, session::default_threads, Camera, Scene, Schedule, Session, Settings};

const HEADLESS_PASSES: u64 = 64;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SceneChoice {
    Demo,
    Sphere,
}

#[derive(Parser, Debug)]
#[command(version, about = "Progressive CPU path tracer")]
struct Args {
    #[arg(long, default_value_t = 1440)]
    width: usize,
    #[arg(long, default_value_t = 720)]
    height: usize,
    /// Samples per pixel (queue schedule)
    #[arg(long, default_value_t = 100)]
    samples: usize,
    /// Pass limit (progressive schedule), 0 runs until the window closes
    #[arg(long, default_value_t = 0)]
    passes: u64,
    /// Worker threads, defaults to the available parallelism
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, value_enum, default_value_t = Schedule::Progressive)]
    schedule: Schedule,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = SceneChoice::Demo)]
    scene: SceneChoice,
    /// Vertical field of view in degrees; switches to a look-at camera
    #[arg(long)]
    fov: Option<f64>,
    #[arg(long, value_parser = parse_vector, default_value = "0,0,0")]
    eye: Vector3<f64>,
    #[arg(long, value_parser = parse_vector, default_value = "0,0,-1")]
    target: Vector3<f64>,
    /// Save the final frame as PNG
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_vector(s: &str) -> Result<Vector3<f64>, String> {
    let parts = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|err| format!("{part:?}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {s:?}")),
    }
}

impl Args {
    fn settings(&self) -> Settings {
        let mut passes = self.passes;
        if passes == 0 && !cfg!(feature = "window") {
            info!("no window to close, stopping after {HEADLESS_PASSES} passes");
            passes = HEADLESS_PASSES;
        }
        Settings {
            width: self.width,
            height: self.height,
            samples: self.samples,
            passes,
            threads: self.threads.unwrap_or_else(default_threads),
            seed: self.seed,
            schedule: self.schedule,
        }
    }

    fn camera(&self) -> Result<Camera> {
        let Some(fov) = self.fov else {
            return Ok(Camera::default());
        };
        Camera::look_at(
            self.eye,
            self.target,
            Vector3::new(0.0, 1.0, 0.0),
            fov,
            self.width as f64 / self.height as f64,
        )
        .ok_or_else(|| {
            anyhow!(
                "cannot look from {:?} at {:?}: view direction is empty or vertical",
                self.eye.as_slice(),
                self.target.as_slice()
            )
        })
    }

    fn scene(&self) -> Scene {
        match self.scene {
            SceneChoice::Demo => Scene::demo(),
            SceneChoice::Sphere => Scene::single_sphere(),
        }
    }
}

#[cfg(feature = "window")]
fn present(session: &Session, finished: impl Fn() -> bool) -> pathtrace::Result<()> {
    let settings = session.settings();
    let mut window = pathtrace::window::Window::open("pathtrace", settings.width, settings.height)?;
    display::drive(session, &mut window.display()?, finished)
}

#[cfg(not(feature = "window"))]
fn present(session: &Session, finished: impl Fn() -> bool) -> pathtrace::Result<()> {
    display::drive(session, &mut display::Headless::default(), finished)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let session = Session::new(args.scene(), args.camera()?, args.settings())
        .context("invalid render settings")?;

    thread::scope(|scope| -> Result<()> {
        let render = thread::Builder::new()
            .name("render".to_owned())
            .spawn_scoped(scope, || session.render())
            .context("failed to start render thread")?;

        let shown = present(&session, || render.is_finished());
        if shown.is_err() {
            session.cancel();
        }
        render
            .join()
            .map_err(|_| anyhow!("render thread panicked"))?
            .context("render failed")?;
        shown.context("display failed")
    })?;

    if let Some(path) = &args.output {
        session
            .frame()
            .save_png(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        info!("saved {}", path.display());
    }
    Ok(())
}
