use crate::canvas::Document;
use crate::doc_template::DocTemplate;
use crate::error::ReportError;
use crate::flowable::{
    BorderSpec, Flowable, HorizontalRule, KeepTogether, ListItem, Pagination, Paragraph, Spacer,
    Table, TableCell, TextAlign, TextStyle,
};
use crate::metrics::DocumentMetrics;
use crate::model::{Field, ReadinessReport};
use crate::page_template::PageTemplate;
use crate::pdf::{PdfOptions, write_pdf};
use crate::rules::{
    self, DtiStatus, HOUSING_DTI_LIMIT, TOTAL_DTI_LIMIT, currency_display, currency_or_zero,
    format_currency, target_price_display, title_case, total_monthly_debt,
};
use crate::theme;
use crate::types::{Color, EdgeSizes, Margins, Pt, Size};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_OUTPUT_FILE: &str = "home_buying_report.pdf";

const DISCLAIMER: &str = "This report is for informational purposes only and does not constitute financial advice.\nConsult with a mortgage professional for personalized guidance.";
const DTI_NOTE: &str = "Housing DTI: Percentage of income going to housing costs. Total DTI: Percentage including all debts.";

/// Page geometry and fixed wording of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub page_size: Size,
    pub margins: Margins,
    pub title: String,
    pub attribution: String,
    /// Shown in the subtitle when the record carries no `generatedAt`.
    pub fallback_generated_at: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: Size::letter(),
            margins: Margins::inches(0.75),
            title: "Home Buying Readiness Report".to_string(),
            attribution: "Generated by Home Buying Readiness Calculator".to_string(),
            fallback_generated_at: None,
        }
    }
}

impl ReportConfig {
    pub fn with_page_size(mut self, page_size: Size) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = attribution.into();
        self
    }

    pub fn with_fallback_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.fallback_generated_at = Some(generated_at.into());
        self
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        let content = self.margins.content_rect(self.page_size);
        if content.width <= Pt::ZERO || content.height <= Pt::ZERO {
            return Err(ReportError::InvalidConfiguration(format!(
                "margins leave no room on a {}x{}pt page",
                self.page_size.width.to_f32(),
                self.page_size.height.to_f32()
            )));
        }
        Ok(())
    }

    // Tables use a 6.5in measure, centered in the frame and narrowed only
    // when the frame itself is smaller.
    fn table_width(&self) -> Pt {
        let frame = self.margins.content_rect(self.page_size).width;
        Pt::from_inches(6.5).min(frame)
    }
}

type Story = Vec<Box<dyn Flowable>>;
type Stage = fn(&ReportConfig, &ReadinessReport) -> Story;

const STAGES: [(&str, Stage); 9] = [
    ("header", header),
    ("verdict", verdict),
    ("key_results", key_results),
    ("dti", dti_analysis),
    ("income", income_profile),
    ("debts", debt_profile),
    ("loan", loan_configuration),
    ("recommendations", next_steps),
    ("footer", footer),
];

/// Turns one readiness record into a paginated report.
#[derive(Debug, Clone, Default)]
pub struct ReportComposer {
    config: ReportConfig,
}

impl ReportComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn story(&self, report: &ReadinessReport) -> Story {
        let mut story = Vec::new();
        for (name, stage) in STAGES {
            let flowables = stage(&self.config, report);
            debug!(stage = name, flowables = flowables.len(), "section composed");
            story.extend(flowables);
        }
        story
    }

    pub fn compose(&self, report: &ReadinessReport) -> Result<Document, ReportError> {
        Ok(self.compose_with_metrics(report)?.0)
    }

    pub fn compose_with_metrics(
        &self,
        report: &ReadinessReport,
    ) -> Result<(Document, DocumentMetrics), ReportError> {
        self.config.validate()?;
        let template =
            PageTemplate::single_frame("report", self.config.page_size, self.config.margins);
        let mut doc = DocTemplate::new(vec![template]);
        doc.extend(self.story(report));
        doc.build_with_metrics()
    }

    pub fn render_to_bytes(&self, report: &ReadinessReport) -> Result<Vec<u8>, ReportError> {
        let (document, mut metrics) = self.compose_with_metrics(report)?;
        let options = PdfOptions {
            title: Some(self.config.title.clone()),
            ..PdfOptions::default()
        };
        let mut bytes = Vec::new();
        write_pdf(&document, &options, &mut bytes, Some(&mut metrics))
            .map_err(output_error("memory"))?;
        info!(
            pages = metrics.page_count(),
            flowables = metrics.flowable_count(),
            bytes = metrics.total_bytes,
            "report rendered"
        );
        Ok(bytes)
    }

    pub fn render_to_writer<W: Write>(
        &self,
        report: &ReadinessReport,
        writer: &mut W,
    ) -> Result<usize, ReportError> {
        let bytes = self.render_to_bytes(report)?;
        writer.write_all(&bytes).map_err(output_error("writer"))?;
        writer.flush().map_err(output_error("writer"))?;
        Ok(bytes.len())
    }

    /// Renders fully in memory first, so a layout failure never leaves a
    /// partial file behind.
    pub fn render_to_path(
        &self,
        report: &ReadinessReport,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, ReportError> {
        let path = path.as_ref();
        let bytes = self.render_to_bytes(report)?;
        let destination = path.display().to_string();
        let file = File::create(path).map_err(output_error(&destination))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .map_err(output_error(&destination))?;
        writer.flush().map_err(output_error(&destination))?;
        debug!(path = %path.display(), bytes = bytes.len(), "report written");
        Ok(path.to_path_buf())
    }
}

fn output_error(destination: &str) -> impl Fn(io::Error) -> ReportError + '_ {
    move |source| ReportError::Output {
        destination: destination.to_string(),
        source,
    }
}

fn cell_padding(vertical: f32, left: f32, right: f32) -> EdgeSizes {
    EdgeSizes {
        top: Pt::from_f32(vertical),
        right: Pt::from_f32(right),
        bottom: Pt::from_f32(vertical),
        left: Pt::from_f32(left),
    }
}

fn half_width_columns(config: &ReportConfig) -> Vec<Pt> {
    let half = config.table_width().mul_ratio(1, 2);
    vec![half, half]
}

// Heading and its content move to a new page together.
fn section(title: &str, content: Vec<Box<dyn Flowable>>) -> Box<dyn Flowable> {
    let mut children: Vec<Box<dyn Flowable>> = vec![
        Box::new(Paragraph::new(title).with_style(theme::section_header())),
        Box::new(Spacer::new(10.0)),
    ];
    children.extend(content);
    Box::new(KeepTogether::new(children))
}

fn label_cell(text: &str, size: f32) -> TableCell {
    TableCell::new(text, TextStyle::sized(size).with_color(theme::GRAY))
        .with_background(theme::LIGHT_GRAY)
        .with_padding(cell_padding(10.0, 15.0, 6.0))
}

fn value_cell(text: impl Into<String>, size: f32) -> TableCell {
    TableCell::new(text, TextStyle::sized(size).with_color(theme::DARK_GRAY).bold())
        .with_padding(cell_padding(10.0, 15.0, 6.0))
}

fn banner_cell(text: &str, background: Color) -> TableCell {
    TableCell::new(text, TextStyle::sized(11.0).with_color(Color::WHITE).bold())
        .with_background(background)
        .with_align(TextAlign::Center)
        .with_padding(cell_padding(10.0, 15.0, 6.0))
        .with_col_span(2)
}

fn profile_table(config: &ReportConfig, banner: TableCell, rows: Vec<Vec<TableCell>>) -> Table {
    Table::new(rows, half_width_columns(config))
        .with_header(vec![vec![banner]])
        .repeat_header(true)
        .with_grid(theme::grid())
}

fn header(config: &ReportConfig, report: &ReadinessReport) -> Story {
    let mut story: Story = vec![
        Box::new(
            Paragraph::new(config.title.clone())
                .with_style(theme::title())
                .with_align(TextAlign::Center),
        ),
        Box::new(Spacer::new(6.0)),
    ];
    let generated_at = if report.generated_at.is_blank() {
        config.fallback_generated_at.clone()
    } else {
        Some(report.generated_at.text_or(""))
    };
    if let Some(generated_at) = generated_at {
        story.push(Box::new(
            Paragraph::new(format!("Generated on {}", generated_at))
                .with_style(theme::subtitle())
                .with_align(TextAlign::Center),
        ));
        story.push(Box::new(Spacer::new(20.0)));
    }
    story.push(Box::new(
        HorizontalRule::new(2.0, theme::PRIMARY).with_spacing(10.0, 20.0),
    ));
    story
}

fn verdict(config: &ReportConfig, report: &ReadinessReport) -> Story {
    let colors = theme::status_theme(report.verdict.status);
    let padding = EdgeSizes::symmetric(15.0, 20.0);
    let rows = vec![
        vec![
            TableCell::new(
                format!(
                    "Target Home Price: {}",
                    target_price_display(&report.target_home_price)
                ),
                theme::subtitle(),
            )
            .with_align(TextAlign::Center)
            .with_background(colors.background)
            .with_padding(padding),
        ],
        vec![
            TableCell::new(
                report.verdict.display_label(),
                TextStyle::sized(18.0).with_color(colors.accent).bold(),
            )
            .with_align(TextAlign::Center)
            .with_background(colors.background)
            .with_padding(padding),
        ],
    ];
    let banner = Table::new(rows, vec![config.table_width()])
        .with_outline(BorderSpec::new(2.0, colors.accent))
        .with_pagination(Pagination::avoid_break());
    vec![Box::new(banner), Box::new(Spacer::new(20.0))]
}

fn key_results(config: &ReportConfig, report: &ReadinessReport) -> Story {
    let padding = EdgeSizes::symmetric(12.0, 15.0);
    let row = |label: &str, value: String| {
        vec![
            TableCell::new(label, TextStyle::sized(12.0).with_color(theme::GRAY))
                .with_background(theme::LIGHT_GRAY)
                .with_padding(padding),
            TableCell::new(
                value,
                TextStyle::sized(12.0).with_color(theme::DARK_GRAY).bold(),
            )
            .with_background(Color::WHITE)
            .with_padding(padding),
        ]
    };
    let table = Table::new(
        vec![
            row("Monthly Payment", currency_display(&report.monthly_payment)),
            row(
                "Down Payment Needed",
                currency_display(&report.down_payment_needed),
            ),
            row("Closing Costs (Est.)", currency_display(&report.closing_costs)),
            row("Total Cash Needed", currency_display(&report.total_cash_needed)),
        ],
        half_width_columns(config),
    )
    .with_grid(theme::grid());
    vec![
        section("Key Results", vec![Box::new(table)]),
        Box::new(Spacer::new(20.0)),
    ]
}

fn dti_analysis(_config: &ReportConfig, report: &ReadinessReport) -> Story {
    let padding = EdgeSizes::symmetric(10.0, 6.0);
    let centered = |text: String, style: TextStyle| {
        TableCell::new(text, style)
            .with_align(TextAlign::Center)
            .with_padding(padding)
    };
    let header = ["Metric", "Your Value", "Recommended Max", "Status"]
        .into_iter()
        .map(|text| {
            centered(
                text.to_string(),
                TextStyle::sized(11.0).with_color(Color::WHITE).bold(),
            )
            .with_background(theme::PRIMARY)
        })
        .collect();
    let row = |label: &str, value: &Field, limit: f64| {
        let status = DtiStatus::classify(value, limit);
        let body = theme::body();
        vec![
            centered(label.to_string(), body.clone()),
            centered(value.text_or("N/A"), body.clone()),
            centered(format!("{}%", limit), body),
            centered(
                status.label().to_string(),
                TextStyle::sized(11.0)
                    .with_color(theme::dti_color(status))
                    .bold(),
            ),
        ]
    };
    let column = Pt::from_inches(1.6);
    let table = Table::new(
        vec![
            row("Housing DTI", &report.dti.housing, HOUSING_DTI_LIMIT),
            row("Total DTI", &report.dti.total, TOTAL_DTI_LIMIT),
        ],
        vec![column; 4],
    )
    .with_header(vec![header])
    .with_grid(theme::grid());
    vec![
        section(
            "Debt-to-Income Analysis",
            vec![
                Box::new(table),
                Box::new(Spacer::new(8.0)),
                Box::new(Paragraph::new(DTI_NOTE).with_style(theme::note())),
            ],
        ),
        Box::new(Spacer::new(20.0)),
    ]
}

fn income_profile(config: &ReportConfig, report: &ReadinessReport) -> Story {
    let inputs = &report.inputs;
    let rows = [
        ("Annual Gross Income", currency_or_zero(&inputs.annual_income)),
        ("Additional Income", currency_or_zero(&inputs.additional_income)),
        ("Credit Score", inputs.credit_score.text_or("N/A")),
        ("Total Savings", currency_or_zero(&inputs.total_savings)),
        ("Monthly Savings Rate", currency_or_zero(&inputs.monthly_savings)),
    ]
    .into_iter()
    .map(|(label, value)| vec![label_cell(label, 11.0), value_cell(value, 11.0)])
    .collect();
    let table = profile_table(
        config,
        banner_cell("Income Information", theme::PRIMARY),
        rows,
    );
    vec![
        section("Your Financial Profile", vec![Box::new(table)]),
        Box::new(Spacer::new(15.0)),
    ]
}

fn debt_profile(config: &ReportConfig, report: &ReadinessReport) -> Story {
    let debts = &report.monthly_debts;
    let mut rows: Vec<Vec<TableCell>> = debts
        .entries()
        .into_iter()
        .map(|(label, field)| vec![label_cell(label, 11.0), value_cell(currency_or_zero(field), 11.0)])
        .collect();
    let total_style = TextStyle::sized(11.0).with_color(theme::DARK_GRAY).bold();
    rows.push(vec![
        TableCell::new("Total Monthly Debt", total_style.clone())
            .with_background(theme::DEBT_TOTAL)
            .with_padding(cell_padding(10.0, 15.0, 6.0)),
        TableCell::new(format_currency(total_monthly_debt(debts)), total_style)
            .with_background(theme::DEBT_TOTAL)
            .with_padding(cell_padding(10.0, 15.0, 6.0)),
    ]);
    let table = profile_table(
        config,
        banner_cell("Monthly Debt Payments", theme::DEBT_HEADER),
        rows,
    );
    vec![Box::new(table), Box::new(Spacer::new(20.0))]
}

fn loan_configuration(config: &ReportConfig, report: &ReadinessReport) -> Story {
    let inputs = &report.inputs;
    let rows = [
        ("Down Payment", inputs.down_payment_percent.text_or("N/A")),
        ("Loan Type", title_case(&inputs.loan_type.text_or("N/A"))),
        ("Loan Term", inputs.loan_term.text_or("N/A")),
        ("Interest Rate", inputs.interest_rate.text_or("N/A")),
    ]
    .into_iter()
    .map(|(label, value)| vec![label_cell(label, 11.0), value_cell(value, 11.0)])
    .collect();
    let table = Table::new(rows, half_width_columns(config)).with_grid(theme::grid());
    vec![
        section("Loan Configuration", vec![Box::new(table)]),
        Box::new(Spacer::new(25.0)),
    ]
}

fn next_steps(_config: &ReportConfig, report: &ReadinessReport) -> Story {
    let mut items: Vec<Box<dyn Flowable>> = Vec::new();
    for (index, step) in rules::recommendations(report).into_iter().enumerate() {
        items.push(Box::new(Spacer::new(5.0)));
        items.push(Box::new(
            ListItem::new(
                Paragraph::new(format!("{}.", index + 1)).with_style(theme::body().bold()),
                Paragraph::new(step).with_style(theme::body()),
                Pt::from_f32(4.0),
            )
            .with_indent(Pt::from_f32(20.0)),
        ));
        items.push(Box::new(Spacer::new(5.0)));
    }
    vec![
        section("Recommended Next Steps", items),
        Box::new(Spacer::new(30.0)),
    ]
}

fn footer(config: &ReportConfig, _report: &ReadinessReport) -> Story {
    let centered = |text: &str| {
        Box::new(
            Paragraph::new(text)
                .with_style(theme::footer())
                .with_align(TextAlign::Center),
        ) as Box<dyn Flowable>
    };
    vec![Box::new(KeepTogether::new(vec![
        Box::new(HorizontalRule::new(1.0, theme::GRAY).with_spacing(10.0, 10.0)),
        centered(DISCLAIMER),
        Box::new(Spacer::new(10.0)),
        centered(config.attribution.as_str()),
    ]))]
}
