use crate::canvas::Canvas;
use crate::font::Base14Font;
use crate::types::{Color, EdgeSizes, Pt, Size};
use std::sync::Arc;

fn huge_pt() -> Pt {
    Pt::from_f32(1.0e6)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakInside {
    Auto,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub break_inside: BreakInside,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            break_inside: BreakInside::Auto,
        }
    }
}

impl Pagination {
    pub fn avoid_break() -> Self {
        Self {
            break_inside: BreakInside::Avoid,
        }
    }
}

pub trait Flowable: FlowableClone + Send + Sync {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size;
    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)>;
    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt);

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub trait FlowableClone {
    fn clone_box(&self) -> Box<dyn Flowable>;
}

impl<T> FlowableClone for T
where
    T: 'static + Flowable + Clone,
{
    fn clone_box(&self) -> Box<dyn Flowable> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Flowable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyleMode {
    Normal,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: Pt,
    pub line_height: Pt,
    pub color: Color,
    pub font_weight: u16,
    pub font_style: FontStyleMode,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::sized(12.0)
    }
}

impl TextStyle {
    pub fn sized(font_size: f32) -> Self {
        let font_size = Pt::from_f32(font_size);
        Self {
            font_size,
            line_height: Base14Font::line_height(font_size),
            color: Color::BLACK,
            font_weight: 400,
            font_style: FontStyleMode::Normal,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = 700;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font_style = FontStyleMode::Italic;
        self
    }

    pub fn font(&self) -> Base14Font {
        Base14Font::variant(
            self.font_weight >= 600,
            matches!(self.font_style, FontStyleMode::Italic),
        )
    }

    pub fn measure(&self, text: &str) -> Pt {
        self.font().measure_text_width(self.font_size, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
struct LineLayout {
    text: String,
    width: Pt,
}

#[derive(Debug, Clone)]
pub struct Paragraph {
    text: String,
    style: TextStyle,
    align: TextAlign,
    pagination: Pagination,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            align: TextAlign::Left,
            pagination: Pagination::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    fn intrinsic_width(&self) -> Pt {
        self.text
            .split('\n')
            .map(|line| self.style.measure(line))
            .fold(Pt::ZERO, Pt::max)
    }

    // Greedy word wrap; explicit newlines always break. Words wider than the
    // line stay whole and overhang.
    fn layout_lines(&self, avail_width: Pt) -> Vec<LineLayout> {
        let max_width = avail_width.max(Pt::from_f32(1.0));
        let space_width = self.style.measure(" ");
        let mut lines = Vec::new();
        for segment in self.text.split('\n') {
            let mut current = String::new();
            let mut current_width = Pt::ZERO;
            for word in segment.split_whitespace() {
                let word_width = self.style.measure(word);
                if current.is_empty() {
                    current.push_str(word);
                    current_width = word_width;
                    continue;
                }
                let next_width = current_width + space_width + word_width;
                if next_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width = next_width;
                } else {
                    lines.push(LineLayout {
                        text: std::mem::take(&mut current),
                        width: current_width,
                    });
                    current.push_str(word);
                    current_width = word_width;
                }
            }
            lines.push(LineLayout {
                text: current,
                width: current_width,
            });
        }
        lines
    }

    fn with_text(&self, text: String) -> Paragraph {
        Paragraph {
            text,
            style: self.style.clone(),
            align: self.align,
            pagination: self.pagination,
        }
    }
}

impl Flowable for Paragraph {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let lines = self.layout_lines(avail_width);
        let height = self.style.line_height * (lines.len() as i32);
        let width = lines
            .iter()
            .fold(Pt::ZERO, |acc, line| acc.max(line.width))
            .min(avail_width);
        Size { width, height }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        if matches!(self.pagination.break_inside, BreakInside::Avoid) {
            return None;
        }
        let lines = self.layout_lines(avail_width);
        let lh = self.style.line_height.to_milli_i64();
        let ah = avail_height.to_milli_i64();
        if lh <= 0 || ah <= 0 {
            return None;
        }
        let split_at = (ah / lh) as usize;
        if split_at == 0 || split_at >= lines.len() {
            return None;
        }
        let join = |slice: &[LineLayout]| {
            slice
                .iter()
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };
        let first = self.with_text(join(&lines[..split_at]));
        let second = self.with_text(join(&lines[split_at..]));
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let lines = self.layout_lines(avail_width);
        canvas.set_fill_color(self.style.color);
        canvas.set_font_name(self.style.font().pdf_name());
        canvas.set_font_size(self.style.font_size);

        let line_height = self.style.line_height;
        // Center the glyph box inside the line box.
        let text_offset = (line_height - self.style.font_size).mul_ratio(1, 2)
            - self.style.font_size.mul_ratio(1, 10);
        let mut cursor_y = y;
        for line in &lines {
            if !line.text.is_empty() {
                let offset = match self.align {
                    TextAlign::Left => Pt::ZERO,
                    TextAlign::Center => (avail_width - line.width).max(Pt::ZERO).mul_ratio(1, 2),
                    TextAlign::Right => (avail_width - line.width).max(Pt::ZERO),
                };
                canvas.draw_string(x + offset, cursor_y + text_offset, line.text.clone());
            }
            cursor_y += line_height;
        }
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }
}

/// A numbered or bulleted entry: the label hangs to the left of the wrapped body.
#[derive(Debug, Clone)]
pub struct ListItem {
    label: Paragraph,
    body: Paragraph,
    gap: Pt,
    indent: Pt,
}

impl ListItem {
    pub fn new(label: Paragraph, body: Paragraph, gap: Pt) -> Self {
        Self {
            label,
            body,
            gap,
            indent: Pt::ZERO,
        }
    }

    pub fn with_indent(mut self, indent: Pt) -> Self {
        self.indent = indent;
        self
    }

    fn body_width(&self, avail_width: Pt) -> (Pt, Pt) {
        let label_width = self.label.intrinsic_width();
        let body_width =
            (avail_width - self.indent - label_width - self.gap).max(Pt::from_f32(1.0));
        (label_width, body_width)
    }
}

impl Flowable for ListItem {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size {
        let (label_width, body_width) = self.body_width(avail_width);
        let label_size = self.label.wrap(label_width, huge_pt());
        let body_size = self.body.wrap(body_width, avail_height);
        Size {
            width: avail_width,
            height: label_size.height.max(body_size.height),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt) {
        let (label_width, body_width) = self.body_width(avail_width);
        let label_x = x + self.indent;
        self.label
            .draw(canvas, label_x, y, label_width, avail_height);
        self.body.draw(
            canvas,
            label_x + label_width + self.gap,
            y,
            body_width,
            avail_height,
        );
    }

    fn pagination(&self) -> Pagination {
        Pagination::avoid_break()
    }
}

#[derive(Debug, Clone)]
pub struct Spacer {
    height: Pt,
}

impl Spacer {
    pub fn new(height: f32) -> Self {
        Self::new_pt(Pt::from_f32(height))
    }

    pub fn new_pt(height: Pt) -> Self {
        Self { height }
    }
}

impl Flowable for Spacer {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height.max(Pt::ZERO),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, _canvas: &mut Canvas, _x: Pt, _y: Pt, _avail_width: Pt, _avail_height: Pt) {}
}

/// Full-width horizontal line with vertical breathing room on both sides.
#[derive(Debug, Clone)]
pub struct HorizontalRule {
    thickness: Pt,
    color: Color,
    space_before: Pt,
    space_after: Pt,
}

impl HorizontalRule {
    pub fn new(thickness: f32, color: Color) -> Self {
        Self {
            thickness: Pt::from_f32(thickness),
            color,
            space_before: Pt::ZERO,
            space_after: Pt::ZERO,
        }
    }

    pub fn with_spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = Pt::from_f32(before);
        self.space_after = Pt::from_f32(after);
        self
    }
}

impl Flowable for HorizontalRule {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.space_before + self.thickness + self.space_after,
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let line_y = y + self.space_before + self.thickness.mul_ratio(1, 2);
        canvas.set_stroke_color(self.color);
        canvas.set_line_width(self.thickness);
        canvas.move_to(x, line_y);
        canvas.line_to(x + avail_width, line_y);
        canvas.stroke();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSpec {
    pub width: Pt,
    pub color: Color,
}

impl BorderSpec {
    pub fn new(width: f32, color: Color) -> Self {
        Self {
            width: Pt::from_f32(width),
            color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableCell {
    content: Paragraph,
    background: Option<Color>,
    padding: EdgeSizes,
    col_span: usize,
}

impl TableCell {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: Paragraph::new(text).with_style(style),
            background: None,
            padding: EdgeSizes::symmetric(3.0, 6.0),
            col_span: 1,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.content = self.content.with_align(align);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_padding(mut self, padding: EdgeSizes) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_col_span(mut self, span: usize) -> Self {
        self.col_span = span.max(1);
        self
    }

    pub fn text(&self) -> &str {
        self.content.text()
    }

    pub fn style(&self) -> &TextStyle {
        self.content.style()
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    fn content_height(&self, width: Pt) -> Pt {
        let inner = (width - self.padding.horizontal()).max(Pt::from_f32(1.0));
        self.content.wrap(inner, huge_pt()).height
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt, row_height: Pt) {
        if let Some(background) = self.background {
            canvas.set_fill_color(background);
            canvas.draw_rect(x, y, width, row_height);
        }
        let inner_width = (width - self.padding.horizontal()).max(Pt::from_f32(1.0));
        let content_height = self.content.wrap(inner_width, huge_pt()).height;
        let free = (row_height - self.padding.vertical() - content_height).max(Pt::ZERO);
        // Content is centered vertically in the row.
        let offset = free.mul_ratio(1, 2);
        self.content.draw(
            canvas,
            x + self.padding.left,
            y + self.padding.top + offset,
            inner_width,
            content_height,
        );
    }
}

#[derive(Debug, Clone)]
struct TableData {
    header_rows: Vec<Vec<TableCell>>,
    body_rows: Vec<Vec<TableCell>>,
    column_widths: Vec<Pt>,
    grid: Option<BorderSpec>,
    outline: Option<BorderSpec>,
}

impl TableData {
    fn table_width(&self) -> Pt {
        self.column_widths.iter().sum()
    }

    fn cell_widths(&self, row: &[TableCell]) -> Vec<Pt> {
        let mut widths = Vec::with_capacity(row.len());
        let mut column = 0usize;
        for cell in row {
            let end = (column + cell.col_span).min(self.column_widths.len());
            let width: Pt = self.column_widths[column.min(end)..end].iter().sum();
            widths.push(width);
            column = end;
        }
        widths
    }

    fn row_height(&self, row: &[TableCell]) -> Pt {
        row.iter()
            .zip(self.cell_widths(row))
            .map(|(cell, width)| cell.content_height(width) + cell.padding.vertical())
            .fold(Pt::ZERO, Pt::max)
    }
}

/// Grid of text cells with fixed column widths, centered in the frame.
#[derive(Debug, Clone)]
pub struct Table {
    data: Arc<TableData>,
    body_range: std::ops::Range<usize>,
    include_header: bool,
    repeat_header: bool,
    pagination: Pagination,
}

impl Table {
    pub fn new(rows: Vec<Vec<TableCell>>, column_widths: Vec<Pt>) -> Self {
        let len = rows.len();
        Self {
            data: Arc::new(TableData {
                header_rows: Vec::new(),
                body_rows: rows,
                column_widths,
                grid: None,
                outline: None,
            }),
            body_range: 0..len,
            include_header: true,
            repeat_header: false,
            pagination: Pagination::default(),
        }
    }

    fn data_mut(&mut self) -> &mut TableData {
        Arc::make_mut(&mut self.data)
    }

    pub fn with_header(mut self, header_rows: Vec<Vec<TableCell>>) -> Self {
        self.data_mut().header_rows = header_rows;
        self
    }

    pub fn repeat_header(mut self, repeat: bool) -> Self {
        self.repeat_header = repeat;
        self
    }

    pub fn with_grid(mut self, grid: BorderSpec) -> Self {
        self.data_mut().grid = Some(grid);
        self
    }

    pub fn with_outline(mut self, outline: BorderSpec) -> Self {
        self.data_mut().outline = Some(outline);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Header rows followed by the body rows this fragment covers.
    pub fn rows(&self) -> impl Iterator<Item = &[TableCell]> {
        let header: &[Vec<TableCell>] = if self.include_header {
            &self.data.header_rows
        } else {
            &[]
        };
        header
            .iter()
            .chain(self.data.body_rows[self.body_range.clone()].iter())
            .map(Vec::as_slice)
    }

    fn fragment(&self, body_range: std::ops::Range<usize>, include_header: bool) -> Table {
        Table {
            data: self.data.clone(),
            body_range,
            include_header,
            repeat_header: self.repeat_header,
            pagination: self.pagination,
        }
    }

    fn x_offset(&self, avail_width: Pt) -> Pt {
        (avail_width - self.data.table_width())
            .max(Pt::ZERO)
            .mul_ratio(1, 2)
    }
}

impl Flowable for Table {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let height = self.rows().map(|row| self.data.row_height(row)).sum();
        Size {
            width: self.data.table_width().min(avail_width),
            height,
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        if matches!(self.pagination.break_inside, BreakInside::Avoid) {
            return None;
        }
        let mut used: Pt = if self.include_header {
            self.data
                .header_rows
                .iter()
                .map(|row| self.data.row_height(row))
                .sum()
        } else {
            Pt::ZERO
        };
        let mut fitting = 0usize;
        for row in &self.data.body_rows[self.body_range.clone()] {
            let height = self.data.row_height(row);
            if used + height > avail_height {
                break;
            }
            used += height;
            fitting += 1;
        }
        if fitting == 0 || fitting >= self.body_range.len() {
            return None;
        }
        let mid = self.body_range.start + fitting;
        let first = self.fragment(self.body_range.start..mid, self.include_header);
        let second = self.fragment(mid..self.body_range.end, self.repeat_header);
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let left = x + self.x_offset(avail_width);
        let table_width = self.data.table_width();
        let mut cursor_y = y;
        for row in self.rows() {
            let row_height = self.data.row_height(row);
            let mut cursor_x = left;
            for (cell, width) in row.iter().zip(self.data.cell_widths(row)) {
                cell.draw(canvas, cursor_x, cursor_y, width, row_height);
                if let Some(grid) = self.data.grid {
                    canvas.set_stroke_color(grid.color);
                    canvas.set_line_width(grid.width);
                    canvas.stroke_rect(cursor_x, cursor_y, width, row_height);
                }
                cursor_x += width;
            }
            cursor_y += row_height;
        }
        if let Some(outline) = self.data.outline {
            canvas.set_stroke_color(outline.color);
            canvas.set_line_width(outline.width);
            canvas.stroke_rect(left, y, table_width, cursor_y - y);
        }
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }
}

/// Stacks its children and moves them to the next page as a unit when they do
/// not fit in the space that is left.
#[derive(Clone)]
pub struct KeepTogether {
    children: Vec<Box<dyn Flowable>>,
}

impl KeepTogether {
    pub fn new(children: Vec<Box<dyn Flowable>>) -> Self {
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Flowable for KeepTogether {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size {
        let height = self
            .children
            .iter()
            .map(|child| child.wrap(avail_width, avail_height).height)
            .sum();
        Size {
            width: avail_width,
            height,
        }
    }

    // Only reached when the group is taller than a whole frame.
    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let mut used = Pt::ZERO;
        for (index, child) in self.children.iter().enumerate() {
            let remaining = avail_height - used;
            let height = child.wrap(avail_width, remaining).height;
            if used + height <= avail_height {
                used += height;
                continue;
            }
            let mut head: Vec<Box<dyn Flowable>> = self.children[..index].to_vec();
            let mut tail: Vec<Box<dyn Flowable>> = Vec::new();
            if let Some((first, second)) = child.split(avail_width, remaining) {
                head.push(first);
                tail.push(second);
            } else {
                tail.push(child.clone());
            }
            tail.extend(self.children[index + 1..].iter().cloned());
            if head.is_empty() {
                return None;
            }
            return Some((
                Box::new(KeepTogether::new(head)),
                Box::new(KeepTogether::new(tail)),
            ));
        }
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt) {
        let mut cursor_y = y;
        for child in &self.children {
            let remaining = (avail_height - (cursor_y - y)).max(Pt::ZERO);
            let size = child.wrap(avail_width, remaining);
            child.draw(canvas, x, cursor_y, avail_width, remaining);
            cursor_y += size.height;
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::avoid_break()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::types::Size;

    fn body_style() -> TextStyle {
        TextStyle::sized(10.0)
    }

    fn draw_strings(flowable: &dyn Flowable, width: Pt) -> Vec<(Pt, Pt, String)> {
        let mut canvas = Canvas::new(Size::letter());
        flowable.draw(&mut canvas, Pt::ZERO, Pt::ZERO, width, huge_pt());
        canvas
            .finish()
            .pages
            .remove(0)
            .commands
            .into_iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { x, y, text } => Some((x, y, text)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn paragraph_wraps_on_word_boundaries() {
        let paragraph = Paragraph::new("alpha beta gamma").with_style(body_style());
        let narrow = body_style().measure("alpha beta") + Pt::from_f32(1.0);
        let lines = paragraph.layout_lines(narrow);
        let texts: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma"]);

        let size = paragraph.wrap(narrow, huge_pt());
        assert_eq!(size.height, body_style().line_height * 2);
    }

    #[test]
    fn paragraph_honors_explicit_line_breaks() {
        let paragraph = Paragraph::new("first line\nsecond line").with_style(body_style());
        let strings = draw_strings(&paragraph, Pt::from_f32(500.0));
        assert_eq!(strings.len(), 2);
        assert_eq!(strings[0].2, "first line");
        assert_eq!(strings[1].1 - strings[0].1, body_style().line_height);
    }

    #[test]
    fn centered_paragraph_is_offset_by_half_the_slack() {
        let paragraph = Paragraph::new("Hi")
            .with_style(body_style())
            .with_align(TextAlign::Center);
        let width = Pt::from_f32(100.0);
        let strings = draw_strings(&paragraph, width);
        let expected = (width - body_style().measure("Hi")).mul_ratio(1, 2);
        assert_eq!(strings[0].0, expected);
    }

    #[test]
    fn paragraph_splits_by_whole_lines() {
        let paragraph = Paragraph::new("one\ntwo\nthree").with_style(body_style());
        let line_height = body_style().line_height;
        let (first, second) = paragraph
            .split(Pt::from_f32(300.0), line_height * 2)
            .expect("split");
        assert_eq!(first.wrap(Pt::from_f32(300.0), huge_pt()).height, line_height * 2);
        assert_eq!(second.wrap(Pt::from_f32(300.0), huge_pt()).height, line_height);
        assert!(paragraph.split(Pt::from_f32(300.0), line_height * 3).is_none());
        assert!(paragraph.split(Pt::from_f32(300.0), Pt::from_f32(1.0)).is_none());
    }

    #[test]
    fn horizontal_rule_reserves_spacing_and_thickness() {
        let rule = HorizontalRule::new(2.0, Color::BLACK).with_spacing(10.0, 20.0);
        let size = rule.wrap(Pt::from_f32(468.0), huge_pt());
        assert_eq!(size.height, Pt::from_f32(32.0));
    }

    fn row(values: &[&str]) -> Vec<TableCell> {
        values
            .iter()
            .map(|value| TableCell::new(*value, body_style()))
            .collect()
    }

    #[test]
    fn table_spans_sum_column_widths() {
        let widths = vec![Pt::from_f32(100.0), Pt::from_f32(50.0)];
        let table = Table::new(
            vec![vec![TableCell::new("Header", body_style()).with_col_span(2)]],
            widths,
        );
        let spans = table.data.cell_widths(&table.data.body_rows[0]);
        assert_eq!(spans, vec![Pt::from_f32(150.0)]);
    }

    #[test]
    fn table_is_centered_within_the_frame() {
        let table = Table::new(vec![row(&["a"])], vec![Pt::from_f32(100.0)]);
        let strings = draw_strings(&table, Pt::from_f32(300.0));
        // 100pt slack on each side plus the default 6pt left padding.
        assert_eq!(strings[0].0, Pt::from_f32(106.0));
    }

    #[test]
    fn table_splits_between_rows_and_repeats_header() {
        let widths = vec![Pt::from_f32(100.0), Pt::from_f32(100.0)];
        let table = Table::new(
            vec![row(&["1", "a"]), row(&["2", "b"]), row(&["3", "c"])],
            widths,
        )
        .with_header(vec![row(&["#", "value"])])
        .repeat_header(true);
        let row_height = table.data.row_height(&table.data.body_rows[0]);

        let (first, second) = table
            .split(Pt::from_f32(200.0), row_height * 2 + Pt::from_f32(1.0))
            .expect("split");
        assert_eq!(first.wrap(Pt::from_f32(200.0), huge_pt()).height, row_height * 2);
        // Repeated header plus the two remaining rows.
        assert_eq!(second.wrap(Pt::from_f32(200.0), huge_pt()).height, row_height * 3);

        let texts: Vec<String> = draw_strings(second.as_ref(), Pt::from_f32(200.0))
            .into_iter()
            .map(|(_, _, text)| text)
            .collect();
        assert_eq!(texts, vec!["#", "value", "2", "b", "3", "c"]);
    }

    #[test]
    fn unsplittable_table_refuses_to_split() {
        let table = Table::new(vec![row(&["1"]), row(&["2"])], vec![Pt::from_f32(50.0)])
            .with_pagination(Pagination::avoid_break());
        assert!(table.split(Pt::from_f32(50.0), Pt::from_f32(15.0)).is_none());
    }

    #[test]
    fn list_item_body_hangs_after_label() {
        let item = ListItem::new(
            Paragraph::new("1.").with_style(body_style().bold()),
            Paragraph::new("Do the thing").with_style(body_style()),
            Pt::from_f32(4.0),
        )
        .with_indent(Pt::from_f32(20.0));
        let strings = draw_strings(&item, Pt::from_f32(400.0));
        assert_eq!(strings[0].2, "1.");
        assert_eq!(strings[0].0, Pt::from_f32(20.0));
        let label_width = body_style().bold().measure("1.");
        assert_eq!(strings[1].0, Pt::from_f32(24.0) + label_width);
    }

    #[test]
    fn keep_together_stacks_children() {
        let group = KeepTogether::new(vec![
            Box::new(Spacer::new(10.0)),
            Box::new(Paragraph::new("x").with_style(body_style())),
        ]);
        let size = group.wrap(Pt::from_f32(100.0), huge_pt());
        assert_eq!(size.height, Pt::from_f32(10.0) + body_style().line_height);
        assert_eq!(group.pagination().break_inside, BreakInside::Avoid);

        let strings = draw_strings(&group, Pt::from_f32(100.0));
        assert!(strings[0].1 > Pt::from_f32(9.0));
    }

    #[test]
    fn oversized_keep_together_splits_inside_a_child() {
        let line = body_style().line_height;
        let group = KeepTogether::new(vec![
            Box::new(Paragraph::new("a\nb").with_style(body_style())),
            Box::new(Paragraph::new("c\nd\ne").with_style(body_style())),
        ]);
        let (first, second) = group
            .split(Pt::from_f32(100.0), line * 3)
            .expect("split");
        assert_eq!(first.wrap(Pt::from_f32(100.0), huge_pt()).height, line * 3);
        assert_eq!(second.wrap(Pt::from_f32(100.0), huge_pt()).height, line * 2);
    }
}
