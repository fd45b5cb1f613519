use sdl2::{
    event::Event,
    pixels::PixelFormatEnum,
    render::{Texture, TextureCreator, WindowCanvas},
    video::WindowContext,
    EventPump, Sdl,
};

use crate::{
    display::Display,
    error::{RenderError, Result},
};

fn sdl_error(err: impl ToString) -> RenderError {
    RenderError::Display(err.to_string())
}

pub struct Window {
    _context: Sdl,
    canvas: WindowCanvas,
    events: EventPump,
    texture_creator: TextureCreator<WindowContext>,
    width: u32,
    height: u32,
}

impl Window {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self> {
        let (width, height) = (width as u32, height as u32);
        let context = sdl2::init().map_err(sdl_error)?;
        let canvas = context
            .video()
            .map_err(sdl_error)?
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(sdl_error)?
            .into_canvas()
            .build()
            .map_err(sdl_error)?;
        let texture_creator = canvas.texture_creator();
        let events = context.event_pump().map_err(sdl_error)?;
        Ok(Self {
            _context: context,
            canvas,
            events,
            texture_creator,
            width,
            height,
        })
    }

    pub fn display(&mut self) -> Result<WindowDisplay<'_>> {
        let Self {
            canvas,
            events,
            texture_creator,
            width,
            height,
            ..
        } = self;
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA32, *width, *height)
            .map_err(sdl_error)?;
        Ok(WindowDisplay {
            canvas,
            events,
            texture,
            pitch: *width as usize * 4,
        })
    }
}

pub struct WindowDisplay<'a> {
    canvas: &'a mut WindowCanvas,
    events: &'a mut EventPump,
    texture: Texture<'a>,
    pitch: usize,
}

impl Display for WindowDisplay<'_> {
    fn present(&mut self, pixels: &[u8], status: &str) -> Result<bool> {
        if self
            .events
            .poll_iter()
            .any(|event| matches!(event, Event::Quit { .. }))
        {
            return Ok(false);
        }
        self.texture
            .update(None, pixels, self.pitch)
            .map_err(sdl_error)?;
        self.canvas.copy(&self.texture, None, None).map_err(sdl_error)?;
        self.canvas.present();
        self.canvas
            .window_mut()
            .set_title(&format!("pathtrace - {status}"))
            .map_err(sdl_error)?;
        Ok(true)
    }

    fn keep_open(&self) -> bool {
        true
    }
}
