mod canvas;
mod composer;
mod doc_template;
mod error;
mod flowable;
mod font;
mod frame;
mod metrics;
mod model;
mod page_template;
mod pdf;
mod pdfinspect;
pub mod rules;
pub mod telemetry;
pub mod theme;
mod types;

pub use canvas::{Canvas, Command, Document, Page};
pub use composer::{DEFAULT_OUTPUT_FILE, ReportComposer, ReportConfig};
pub use doc_template::DocTemplate;
pub use error::ReportError;
pub use flowable::{
    BorderSpec, BreakInside, Flowable, HorizontalRule, KeepTogether, ListItem, Pagination,
    Paragraph, Spacer, Table, TableCell, TextAlign, TextStyle,
};
pub use font::Base14Font;
pub use frame::{AddResult, Frame};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use model::{
    Dti, Field, LoanInputs, MonthlyDebts, ReadinessReport, ReadinessStatus, Verdict,
    strip_markers,
};
pub use page_template::{FrameSpec, PageTemplate};
pub use pdf::{PdfOptions, document_to_pdf, write_pdf};
pub use pdfinspect::{
    PdfInspectError, PdfInspectErrorCode, PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path,
};
pub use types::{Color, EdgeSizes, Margins, Pt, Rect, Size};

/// Reads a record from `input` and writes the rendered report to `output`.
pub fn generate_report(
    input: &std::path::Path,
    output: &std::path::Path,
    config: ReportConfig,
) -> Result<std::path::PathBuf, ReportError> {
    let report = ReadinessReport::from_path(input)?;
    ReportComposer::with_config(config).render_to_path(&report, output)
}
