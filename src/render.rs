use std::io::{self, Stdout, Write};

use crate::error::RenderError;
use crate::types::{RenderMode, State};

pub trait Renderer {
    fn supports(&self, mode: RenderMode) -> bool;

    fn render(&mut self, state: &State, mode: RenderMode) -> Result<(), RenderError>;

    fn close(&mut self) {}
}

pub fn format_frame(state: &State) -> String {
    let mut out = format!(
        "Lives: {}\n Step: {}\nScore: {}\n\n",
        state.lives_remaining, state.tick_index, state.score
    );
    for row in &state.grid {
        out.push_str(row);
        out.push('\n');
    }
    out
}

#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    out: W,
}

impl TextRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn supports(&self, mode: RenderMode) -> bool {
        matches!(mode, RenderMode::Text | RenderMode::None)
    }

    fn render(&mut self, state: &State, mode: RenderMode) -> Result<(), RenderError> {
        match mode {
            RenderMode::None => Ok(()),
            RenderMode::Text => {
                self.out.write_all(format_frame(state).as_bytes())?;
                self.out.flush()?;
                Ok(())
            }
            RenderMode::Graphical => Err(RenderError::Unsupported(mode)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn supports(&self, mode: RenderMode) -> bool {
        mode == RenderMode::None
    }

    fn render(&mut self, _state: &State, mode: RenderMode) -> Result<(), RenderError> {
        if mode == RenderMode::None {
            Ok(())
        } else {
            Err(RenderError::Unsupported(mode))
        }
    }
}
