//! Printable tabular report
//!
//! The engine produces the layout model: fixed page size, a header row on
//! every page, one row per subject, text fields truncated to fixed widths.
//! Turning a page model into PDF bytes is a runtime capability the caller
//! may or may not have; without a registered backend the result is
//! [`ExportError::RendererUnavailable`].

use chrono::{DateTime, Utc};

use crate::error::ExportError;
use crate::scoring::pipeline::ScoreRecord;

pub const NAME_WIDTH: usize = 20;
pub const CATEGORY_WIDTH: usize = 12;
pub const DEFAULT_ROWS_PER_PAGE: usize = 40;
pub const COLUMNS: [&str; 7] = [
    "Identificacion",
    "Nombre",
    "Departamento",
    "Max PPM",
    "Med. Pos.",
    "Score (%)",
    "Riesgo",
];

#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub title: String,
    pub rows_per_page: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            title: "Analisis AHP de Riesgo de Alcohol".to_string(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub cells: [String; 7],
}

#[derive(Debug, Clone)]
pub struct ReportPage {
    /// 1-based page number.
    pub number: usize,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<ReportPage>,
}

/// Build the page model. Empty input is an explicit error.
pub fn build_report(
    records: &[ScoreRecord],
    layout: &ReportLayout,
    generated_at: DateTime<Utc>,
) -> Result<Report, ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptyResult);
    }

    let rows_per_page = layout.rows_per_page.max(1);
    let pages = records
        .chunks(rows_per_page)
        .enumerate()
        .map(|(index, chunk)| ReportPage {
            number: index + 1,
            rows: chunk.iter().map(to_row).collect(),
        })
        .collect();

    Ok(Report {
        title: layout.title.clone(),
        generated_at,
        pages,
    })
}

fn to_row(record: &ScoreRecord) -> ReportRow {
    ReportRow {
        cells: [
            record.external_id.clone(),
            truncate(&record.display_name, NAME_WIDTH),
            truncate(&record.category, CATEGORY_WIDTH),
            format!("{:.2}", record.severity_metric),
            record.frequency_metric.to_string(),
            format!("{:.1}", record.score),
            record.tier.localized_label().to_string(),
        ],
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Plain-text rendering with the header row visually distinguished.
pub fn render_text(report: &Report) -> String {
    let widths = [14, NAME_WIDTH, CATEGORY_WIDTH, 9, 9, 9, 8];
    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');
    out.push_str(&format!(
        "Generado: {}\n",
        report.generated_at.format("%d/%m/%Y %H:%M:%S")
    ));

    for page in &report.pages {
        out.push_str(&format!("\n--- Pagina {} ---\n", page.number));
        let header: Vec<String> = COLUMNS
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        let header = header.join(" ");
        let rule = "=".repeat(header.len());
        out.push_str(&header);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in &page.rows {
            let line: Vec<String> = row
                .cells
                .iter()
                .zip(widths)
                .map(|(c, w)| format!("{c:<w$}"))
                .collect();
            out.push_str(line.join(" ").trim_end());
            out.push('\n');
        }
    }

    out
}

/// Backend capability for PDF rendering, registered by the caller.
pub trait PdfRenderer {
    fn render(&self, report: &Report) -> Result<Vec<u8>, ExportError>;
}

/// Render through the registered backend, or fail with a distinct,
/// actionable error when none is available.
pub fn render_pdf(
    report: &Report,
    renderer: Option<&dyn PdfRenderer>,
) -> Result<Vec<u8>, ExportError> {
    match renderer {
        Some(backend) => backend.render(report),
        None => Err(ExportError::RendererUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classifier::RiskTier;
    use chrono::TimeZone;

    fn record(id: &str, name: &str) -> ScoreRecord {
        ScoreRecord {
            external_id: id.to_string(),
            display_name: name.to_string(),
            category: "Administracion".to_string(),
            severity_metric: 88.0,
            frequency_metric: 4,
            score: 61.25,
            tier: RiskTier::High,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_result_is_explicit() {
        let layout = ReportLayout::default();
        assert!(matches!(
            build_report(&[], &layout, generated_at()),
            Err(ExportError::EmptyResult)
        ));
    }

    #[test]
    fn test_truncation_widths() {
        let report = build_report(
            &[record("EMP001", "Maximiliano Covarrubias de la Torre")],
            &ReportLayout::default(),
            generated_at(),
        )
        .unwrap();

        let row = &report.pages[0].rows[0];
        assert_eq!(row.cells[1].chars().count(), NAME_WIDTH);
        assert_eq!(row.cells[2], "Administraci"); // 12 chars
    }

    #[test]
    fn test_pagination() {
        let records: Vec<ScoreRecord> = (0..95)
            .map(|i| record(&format!("EMP{i:03}"), "Subject"))
            .collect();
        let layout = ReportLayout {
            rows_per_page: 40,
            ..Default::default()
        };
        let report = build_report(&records, &layout, generated_at()).unwrap();

        assert_eq!(report.pages.len(), 3);
        assert_eq!(report.pages[0].rows.len(), 40);
        assert_eq!(report.pages[2].rows.len(), 15);
        assert_eq!(report.pages[2].number, 3);
    }

    #[test]
    fn test_text_rendering_distinguishes_header() {
        let report = build_report(
            &[record("EMP001", "Ana")],
            &ReportLayout::default(),
            generated_at(),
        )
        .unwrap();
        let text = render_text(&report);
        assert!(text.contains("Identificacion"));
        assert!(text.contains("====="));
        assert!(text.contains("EMP001"));
        assert!(text.contains("Generado: 01/07/2025"));
    }

    #[test]
    fn test_missing_pdf_backend() {
        let report = build_report(
            &[record("EMP001", "Ana")],
            &ReportLayout::default(),
            generated_at(),
        )
        .unwrap();
        assert!(matches!(
            render_pdf(&report, None),
            Err(ExportError::RendererUnavailable)
        ));
    }

    #[test]
    fn test_registered_pdf_backend_runs() {
        struct FakeBackend;
        impl PdfRenderer for FakeBackend {
            fn render(&self, report: &Report) -> Result<Vec<u8>, ExportError> {
                Ok(report.title.as_bytes().to_vec())
            }
        }

        let report = build_report(
            &[record("EMP001", "Ana")],
            &ReportLayout::default(),
            generated_at(),
        )
        .unwrap();
        let bytes = render_pdf(&report, Some(&FakeBackend)).unwrap();
        assert!(!bytes.is_empty());
    }
}
