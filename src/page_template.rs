use crate::frame::Frame;
use crate::types::{Margins, Rect, Size};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSpec {
    pub rect: Rect,
}

#[derive(Clone, Debug)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    frames: Vec<FrameSpec>,
}

impl PageTemplate {
    pub fn new(name: impl Into<String>, page_size: Size) -> Self {
        Self {
            name: name.into(),
            page_size,
            frames: Vec::new(),
        }
    }

    /// A template with a single frame covering the page inside `margins`.
    pub fn single_frame(name: impl Into<String>, page_size: Size, margins: Margins) -> Self {
        Self::new(name, page_size).with_frame(margins.content_rect(page_size))
    }

    pub fn with_frame(mut self, rect: Rect) -> Self {
        self.frames.push(FrameSpec { rect });
        self
    }

    pub fn frames(&self) -> &[FrameSpec] {
        &self.frames
    }

    pub fn instantiate_frames(&self) -> Vec<Frame> {
        self.frames
            .iter()
            .map(|spec| Frame::new(spec.rect))
            .collect()
    }
}
