use crate::canvas::Canvas;
use crate::flowable::{BreakInside, Flowable};
use crate::types::{Pt, Rect};

pub enum AddResult {
    Placed,
    Split(Box<dyn Flowable>),
    Overflow(Box<dyn Flowable>),
}

pub struct Frame {
    rect: Rect,
    cursor_y: Pt,
}

impl Frame {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_y: Pt::ZERO,
        }
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_empty(&self) -> bool {
        self.cursor_y <= Pt::ZERO
    }

    pub fn add(&mut self, flowable: Box<dyn Flowable>, canvas: &mut Canvas) -> AddResult {
        let avail_width = self.rect.width;
        let avail_height = self.remaining_height();
        if avail_height <= Pt::ZERO {
            return AddResult::Overflow(flowable);
        }

        let pagination = flowable.pagination();
        let size = flowable.wrap(avail_width, avail_height);
        if matches!(pagination.break_inside, BreakInside::Avoid)
            && size.height > avail_height
            && size.height <= self.rect.height
            && !self.is_empty()
        {
            return AddResult::Overflow(flowable);
        }

        if size.height <= avail_height {
            flowable.draw(
                canvas,
                self.rect.x,
                self.rect.y + self.cursor_y,
                avail_width,
                avail_height,
            );
            self.cursor_y += size.height;
            return AddResult::Placed;
        }

        if let Some((first, second)) = flowable.split(avail_width, avail_height) {
            let first_size = first.wrap(avail_width, avail_height);
            if first_size.height > Pt::ZERO && first_size.height <= avail_height {
                first.draw(
                    canvas,
                    self.rect.x,
                    self.rect.y + self.cursor_y,
                    avail_width,
                    avail_height,
                );
                self.cursor_y += first_size.height;
                return AddResult::Split(second);
            }
        }

        // Taller than a whole frame and unsplittable: place it overfull rather
        // than fail, so pagination keeps moving forward.
        if self.is_empty() {
            flowable.draw(
                canvas,
                self.rect.x,
                self.rect.y + self.cursor_y,
                avail_width,
                avail_height,
            );
            self.cursor_y = self.rect.height;
            return AddResult::Placed;
        }

        AddResult::Overflow(flowable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::{Paragraph, Spacer, TextStyle};
    use crate::types::Size;

    fn frame(height: f32) -> Frame {
        Frame::new(Rect {
            x: Pt::from_f32(10.0),
            y: Pt::from_f32(20.0),
            width: Pt::from_f32(200.0),
            height: Pt::from_f32(height),
        })
    }

    #[test]
    fn places_flowables_top_down() {
        let mut canvas = Canvas::new(Size::letter());
        let mut frame = frame(100.0);
        assert!(matches!(
            frame.add(Box::new(Spacer::new(30.0)), &mut canvas),
            AddResult::Placed
        ));
        assert_eq!(frame.remaining_height(), Pt::from_f32(70.0));
        assert!(!frame.is_empty());
    }

    #[test]
    fn splits_paragraphs_that_overflow() {
        let mut canvas = Canvas::new(Size::letter());
        let mut frame = frame(30.0);
        let paragraph = Paragraph::new("a\nb\nc\nd").with_style(TextStyle::sized(10.0));
        match frame.add(Box::new(paragraph), &mut canvas) {
            AddResult::Split(rest) => {
                let size = rest.wrap(Pt::from_f32(200.0), Pt::from_f32(100.0));
                assert_eq!(size.height, Pt::from_f32(24.0));
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn full_frame_overflows() {
        let mut canvas = Canvas::new(Size::letter());
        let mut frame = frame(10.0);
        frame.add(Box::new(Spacer::new(10.0)), &mut canvas);
        assert!(matches!(
            frame.add(Box::new(Spacer::new(1.0)), &mut canvas),
            AddResult::Overflow(_)
        ));
    }

    #[test]
    fn oversized_flowable_is_placed_in_an_empty_frame() {
        let mut canvas = Canvas::new(Size::letter());
        let mut frame = frame(10.0);
        assert!(matches!(
            frame.add(Box::new(Spacer::new(50.0)), &mut canvas),
            AddResult::Placed
        ));
        assert_eq!(frame.remaining_height(), Pt::ZERO);
    }
}
