use crate::canvas::{Canvas, Document};
use crate::error::ReportError;
use crate::flowable::Flowable;
use crate::frame::{AddResult, Frame};
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::page_template::PageTemplate;
use std::collections::VecDeque;
use tracing::debug;

pub struct DocTemplate {
    page_templates: Vec<PageTemplate>,
    story: Vec<Box<dyn Flowable>>,
}

// Selection rule: page n uses templates[min(n-1, len-1)], so the last template repeats.
fn select_template(page_templates: &[PageTemplate], page_number: usize) -> &PageTemplate {
    let idx = page_number.saturating_sub(1);
    let idx = idx.min(page_templates.len() - 1);
    &page_templates[idx]
}

struct PageCursor<'a> {
    templates: &'a [PageTemplate],
    canvas: Canvas,
    page_number: usize,
    frames: Vec<Frame>,
    frame_index: usize,
    placed_on_page: bool,
    page_flowables: usize,
    metrics: DocumentMetrics,
}

impl<'a> PageCursor<'a> {
    fn new(templates: &'a [PageTemplate]) -> Self {
        let template = select_template(templates, 1);
        Self {
            templates,
            canvas: Canvas::new(template.page_size),
            page_number: 1,
            frames: template.instantiate_frames(),
            frame_index: 0,
            placed_on_page: false,
            page_flowables: 0,
            metrics: DocumentMetrics::default(),
        }
    }

    fn finish_page(&mut self) {
        self.metrics.pages.push(PageMetrics {
            page_number: self.page_number,
            command_count: self.canvas.current_command_count(),
            flowable_count: self.page_flowables,
            content_bytes: 0,
        });
        self.canvas.show_page();
        self.page_flowables = 0;
    }

    fn next_page(&mut self, reason: &str, flowable: &str) {
        debug!(
            from_page = self.page_number,
            to_page = self.page_number + 1,
            frame_index = self.frame_index,
            reason,
            flowable,
            "page break"
        );
        self.finish_page();
        self.page_number += 1;
        let template = select_template(self.templates, self.page_number);
        self.frames = template.instantiate_frames();
        self.frame_index = 0;
        self.placed_on_page = false;
    }

    fn finish(mut self) -> (Document, DocumentMetrics) {
        if self.placed_on_page
            || !self.canvas.is_current_empty()
            || self.metrics.pages.is_empty()
        {
            self.finish_page();
        }
        (self.canvas.finish(), self.metrics)
    }
}

impl DocTemplate {
    pub fn new(page_templates: Vec<PageTemplate>) -> Self {
        Self {
            page_templates,
            story: Vec::new(),
        }
    }

    pub fn add_flowable(&mut self, flowable: Box<dyn Flowable>) {
        self.story.push(flowable);
    }

    pub fn extend<I>(&mut self, flowables: I)
    where
        I: IntoIterator<Item = Box<dyn Flowable>>,
    {
        self.story.extend(flowables);
    }

    pub fn build(self) -> Result<Document, ReportError> {
        Ok(self.build_with_metrics()?.0)
    }

    pub fn build_with_metrics(self) -> Result<(Document, DocumentMetrics), ReportError> {
        if self.page_templates.is_empty() {
            return Err(ReportError::MissingPageTemplate);
        }
        if self
            .page_templates
            .iter()
            .any(|template| template.frames().is_empty())
        {
            return Err(ReportError::MissingPageTemplate);
        }

        let mut cursor = PageCursor::new(&self.page_templates);
        let mut story: VecDeque<Box<dyn Flowable>> = self.story.into();

        while let Some(flowable) = story.pop_front() {
            let mut current = flowable;
            loop {
                let current_name = current.debug_name();
                if cursor.frame_index >= cursor.frames.len() {
                    cursor.next_page("frame_exhausted", current_name);
                }

                let is_last_frame = cursor.frame_index + 1 >= cursor.frames.len();
                let frame_index = cursor.frame_index;
                let frame_rect = cursor.frames[frame_index].rect();
                match cursor.frames[frame_index].add(current, &mut cursor.canvas) {
                    AddResult::Placed => {
                        cursor.placed_on_page = true;
                        cursor.page_flowables += 1;
                        break;
                    }
                    AddResult::Split(remaining) => {
                        cursor.placed_on_page = true;
                        cursor.page_flowables += 1;
                        debug!(
                            page = cursor.page_number,
                            flowable = current_name,
                            "flowable split across frames"
                        );
                        current = remaining;
                        cursor.frame_index += 1;
                    }
                    AddResult::Overflow(remaining) => {
                        if !cursor.placed_on_page && is_last_frame {
                            let size = remaining.wrap(frame_rect.width, frame_rect.height);
                            return Err(ReportError::UnplaceableFlowable(format!(
                                "{} size={}x{}pt frame={}x{}pt",
                                current_name,
                                size.width.to_f32(),
                                size.height.to_f32(),
                                frame_rect.width.to_f32(),
                                frame_rect.height.to_f32(),
                            )));
                        }
                        current = remaining;
                        cursor.frame_index += 1;
                    }
                }
            }
        }

        Ok(cursor.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::{KeepTogether, Paragraph, Spacer, TextStyle};
    use crate::types::{Margins, Size};

    fn small_template() -> PageTemplate {
        // 100pt tall frame.
        PageTemplate::single_frame("test", Size::from_inches(3.0, 3.0), Margins::all(58.0))
    }

    #[test]
    fn empty_story_still_produces_a_page() {
        let (document, metrics) = DocTemplate::new(vec![small_template()])
            .build_with_metrics()
            .expect("build");
        assert_eq!(document.page_count(), 1);
        assert_eq!(metrics.page_count(), 1);
    }

    #[test]
    fn missing_templates_are_rejected() {
        let err = DocTemplate::new(Vec::new()).build().expect_err("no templates");
        assert!(matches!(err, ReportError::MissingPageTemplate));

        let frameless = PageTemplate::new("blank", Size::letter());
        let err = DocTemplate::new(vec![frameless])
            .build()
            .expect_err("no frames");
        assert!(matches!(err, ReportError::MissingPageTemplate));
    }

    #[test]
    fn overflowing_story_continues_on_new_pages() {
        let mut doc = DocTemplate::new(vec![small_template()]);
        for _ in 0..5 {
            doc.add_flowable(Box::new(Spacer::new(40.0)));
        }
        let (document, metrics) = doc.build_with_metrics().expect("build");
        // Two spacers fit per 100pt frame.
        assert_eq!(metrics.page_count(), 3);
        assert_eq!(document.page_count(), 3);
        assert_eq!(metrics.flowable_count(), 5);
    }

    #[test]
    fn keep_together_moves_to_the_next_page_whole() {
        let style = TextStyle::sized(10.0);
        let mut doc = DocTemplate::new(vec![small_template()]);
        doc.add_flowable(Box::new(Spacer::new(70.0)));
        doc.add_flowable(Box::new(KeepTogether::new(vec![
            Box::new(Paragraph::new("heading").with_style(style.clone())),
            Box::new(Paragraph::new("body one\nbody two").with_style(style)),
        ])));
        let document = doc.build().expect("build");
        assert_eq!(document.page_count(), 2);
        assert!(!document.pages[0].text_runs().any(|text| text == "heading"));
        assert!(document.pages[1].text_runs().any(|text| text == "heading"));
    }

    #[test]
    fn long_paragraph_flows_across_pages() {
        let text = (1..=20)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut doc = DocTemplate::new(vec![small_template()]);
        doc.add_flowable(Box::new(
            Paragraph::new(text).with_style(TextStyle::sized(10.0)),
        ));
        let document = doc.build().expect("build");
        // 8 lines of 12pt per 100pt frame.
        assert_eq!(document.page_count(), 3);
        assert!(document.pages[2].text_runs().any(|text| text == "line 20"));
    }
}
