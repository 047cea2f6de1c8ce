//! # Audit Report
//!
//! `GET /api/audits/{id}/report` renders a printable summary of a submission
//! with `genpdf`: document header, reviewer verdict and the codes of every
//! page with their catalog descriptions.
//!
//! The layout is computed by `report_lines` as plain data so it can be tested
//! without fonts; `render` only maps those lines onto genpdf elements. The
//! font family is loaded from the configured fonts directory, trying `Arial`
//! first and `LiberationSans` second.

use super::visible_submission;
use crate::auth::AuthUser;
use crate::db::{documents, profiles};
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::codes::catalog;
use common::model::audit::{AuditSubmission, DocumentDecision};
use common::model::document::Document;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use std::path::Path;

const FONT_SIZE: u8 = 10;
const MARGIN_MM: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Title(String),
    Heading(String),
    Text(String),
    /// A code with its description, indented under a page heading.
    Code(String),
    Gap,
}

pub async fn process(state: web::Data<AppState>, user: AuthUser, id: web::Path<String>) -> impl Responder {
    match build_report(&state, &user, &id) {
        Ok((filename, pdf)) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Inline,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .body(pdf),
        Err(e) => e.error_response(),
    }
}

fn build_report(state: &AppState, user: &AuthUser, id: &str) -> Result<(String, Vec<u8>), ServiceError> {
    let conn = state.connect()?;
    let submission = visible_submission(&conn, user, id)?;
    let doc = documents::find(&conn, &submission.document_id)?
        .ok_or_else(|| ServiceError::not_found("document", &submission.document_id))?;
    let coder = profiles::find(&conn, &submission.employee_id)?
        .map(|p| p.name)
        .unwrap_or_else(|| submission.employee_id.clone());
    let auditor = match &submission.auditor_id {
        Some(auditor_id) => profiles::find(&conn, auditor_id)?.map(|p| p.name),
        None => None,
    };

    let lines = report_lines(&submission, &doc, &coder, auditor.as_deref());
    let pdf = render(&state.fonts_dir, &format!("Coding summary: {}", doc.filename), &lines)?;
    Ok((format!("audit-{}.pdf", submission.id), pdf))
}

fn code_line(code: &str) -> ReportLine {
    match catalog::describe(code) {
        Some(entry) => ReportLine::Code(format!("{}  {}", code, entry.description)),
        None => ReportLine::Code(code.to_string()),
    }
}

pub fn report_lines(
    submission: &AuditSubmission,
    doc: &Document,
    coder: &str,
    auditor: Option<&str>,
) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine::Title(format!("Coding summary: {}", doc.filename)),
        ReportLine::Text(format!("Pages: {}   Uploaded: {}", doc.page_count, doc.uploaded_at)),
        ReportLine::Text(format!("Coded by {} on {}", coder, submission.submitted_at)),
    ];

    let decision = match submission.payload.decision {
        DocumentDecision::Accept => "accepted".to_string(),
        DocumentDecision::Reject => match &submission.payload.decision_reason {
            Some(reason) => format!("rejected ({})", reason),
            None => "rejected".to_string(),
        },
    };
    lines.push(ReportLine::Text(format!("Coder decision: document {}", decision)));

    let mut review = format!("Audit status: {}", submission.status);
    if let (Some(auditor), Some(at)) = (auditor, &submission.reviewed_at) {
        review.push_str(&format!(" by {} on {}", auditor, at));
    }
    lines.push(ReportLine::Text(review));
    if let Some(comments) = &submission.comments {
        lines.push(ReportLine::Text(format!("Auditor comments: {}", comments)));
    }

    for page in &submission.payload.pages {
        lines.push(ReportLine::Gap);
        lines.push(ReportLine::Heading(format!("Page {}", page.page_number)));
        if page.icd10_codes.is_empty() && page.cpt_codes.is_empty() {
            lines.push(ReportLine::Text("No codes".to_string()));
        }
        if !page.icd10_codes.is_empty() {
            lines.push(ReportLine::Text("Diagnoses (ICD-10)".to_string()));
            lines.extend(page.icd10_codes.iter().map(|c| code_line(c)));
        }
        if !page.cpt_codes.is_empty() {
            lines.push(ReportLine::Text("Procedures (CPT/HCPCS)".to_string()));
            lines.extend(page.cpt_codes.iter().map(|c| code_line(c)));
        }
        if !page.notes.is_empty() {
            lines.push(ReportLine::Text(format!("Notes: {}", page.notes)));
        }
    }

    lines.push(ReportLine::Gap);
    lines.push(ReportLine::Text(format!(
        "Total codes: {}",
        submission.payload.code_count()
    )));
    lines
}

fn load_font(dir: &Path) -> Result<FontFamily<FontData>, ServiceError> {
    if let Ok(family) = genpdf::fonts::from_files(dir, "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(dir, "LiberationSans", None).map_err(|e| {
        ServiceError::Report(format!("no usable font family in {}: {}", dir.display(), e))
    })
}

fn render(fonts_dir: &Path, title: &str, lines: &[ReportLine]) -> Result<Vec<u8>, ServiceError> {
    let mut doc = genpdf::Document::new(load_font(fonts_dir)?);
    doc.set_title(title);
    doc.set_font_size(FONT_SIZE);
    doc.set_line_spacing(1.25);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    for line in lines {
        match line {
            ReportLine::Title(text) => doc.push(Paragraph::new(StyledString::new(
                text.clone(),
                Style::new().bold().with_font_size(16),
            ))),
            ReportLine::Heading(text) => doc.push(Paragraph::new(StyledString::new(
                text.clone(),
                Style::new().bold().with_font_size(12),
            ))),
            ReportLine::Text(text) => doc.push(Paragraph::new(text.clone())),
            ReportLine::Code(text) => doc.push(Paragraph::new(format!("    {}", text))),
            ReportLine::Gap => doc.push(Break::new(1)),
        }
    }

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| ServiceError::Report(e.to_string()))?;
    Ok(out)
}
