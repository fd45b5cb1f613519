use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("a render worker panicked")]
    WorkerPanicked,

    #[error("display error: {0}")]
    Display(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
