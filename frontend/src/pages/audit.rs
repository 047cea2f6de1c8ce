//! Audit queue for auditors and admins.
//!
//! A verdict is two calls: the review of the submission, then the document
//! status (APPROVED or REJECTED). If the second one fails the review stays
//! recorded and the toast says so.

use crate::api::{self, ApiResult};
use crate::components::pdf_frame::PdfFrame;
use crate::components::status::{document_badge, short_time, submission_badge};
use crate::components::toast::{show_error, show_toast};
use common::auth::Session;
use common::codes::catalog;
use common::model::audit::{AuditSubmission, DocumentDecision, SubmissionStatus};
use common::model::document::{Document, DocumentStatus};
use common::model::query::DocumentQuery;
use common::requests::{RaiseQueryRequest, ReviewAuditRequest, SetStatusRequest};
use gloo_file::ObjectUrl;
use std::collections::HashMap;
use web_sys::HtmlTextAreaElement;
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Vec<AuditSubmission>, Vec<Document>),
    ShowAll(bool),
    Select(String),
    Comments(String),
    Review(SubmissionStatus),
    Reviewed(AuditSubmission, Option<Document>),
    Report,
    ReportReady(ObjectUrl),
    Question(String),
    Ask,
    Asked,
}

#[derive(Properties, PartialEq)]
pub struct AuditProps {
    pub session: Session,
}

pub struct AuditPage {
    submissions: Vec<AuditSubmission>,
    documents: HashMap<String, Document>,
    show_all: bool,
    selected: Option<String>,
    comments: String,
    question: String,
    report: Option<ObjectUrl>,
    busy: bool,
}

/// Document status that follows a review verdict.
pub fn document_status_for(verdict: SubmissionStatus) -> Option<DocumentStatus> {
    match verdict {
        SubmissionStatus::Approved => Some(DocumentStatus::Approved),
        SubmissionStatus::Rejected => Some(DocumentStatus::Rejected),
        SubmissionStatus::Pending => None,
    }
}

async fn review(
    session: &Session,
    submission: &AuditSubmission,
    verdict: SubmissionStatus,
    comments: Option<String>,
) -> ApiResult<(AuditSubmission, Option<Document>)> {
    let reviewed: AuditSubmission = api::put(
        session,
        &format!("/api/audits/{}/review", submission.id),
        &ReviewAuditRequest { status: verdict, comments },
    )
    .await?;
    let Some(status) = document_status_for(verdict) else {
        return Ok((reviewed, None));
    };
    let url = format!("/api/documents/{}/status", submission.document_id);
    match api::put::<_, Document>(session, &url, &SetStatusRequest { status }).await {
        Ok(document) => Ok((reviewed, Some(document))),
        Err(e) => {
            show_error(format!("Review saved, but the document status was not updated: {}", e));
            Ok((reviewed, None))
        }
    }
}

impl AuditPage {
    fn selected(&self) -> Option<&AuditSubmission> {
        let id = self.selected.as_ref()?;
        self.submissions.iter().find(|s| &s.id == id)
    }

    fn filename(&self, document_id: &str) -> String {
        self.documents
            .get(document_id)
            .map(|d| d.filename.clone())
            .unwrap_or_else(|| document_id.to_string())
    }

    fn view_detail(&self, ctx: &Context<Self>, submission: &AuditSubmission) -> Html {
        let link = ctx.link();
        let payload = &submission.payload;
        let decision = match payload.decision {
            DocumentDecision::Accept => "Coder accepted the document".to_string(),
            DocumentDecision::Reject => format!(
                "Coder rejected the document: {}",
                payload.decision_reason.clone().unwrap_or_default()
            ),
        };
        let pending = submission.status == SubmissionStatus::Pending;

        html! {
            <div class="audit-detail">
                <div class="audit-pdf">
                    <PdfFrame session={ctx.props().session.clone()} src={format!("/api/documents/{}/file", submission.document_id)} />
                </div>
                <div class="audit-codes">
                    <h3>{ self.filename(&submission.document_id) }</h3>
                    if let Some(doc) = self.documents.get(&submission.document_id) {
                        { document_badge(doc.status) }
                    }
                    <p>{ decision }</p>
                    <p>{ format!("{} codes on {} pages", payload.code_count(), payload.pages.len()) }</p>
                    { for payload.pages.iter().map(|page| html! {
                        <div class="audit-page">
                            <h4>{ format!("Page {}", page.page_number) }</h4>
                            <ul>
                                { for page.icd10_codes.iter().chain(page.cpt_codes.iter()).map(|code| html! {
                                    <li>
                                        <strong>{ code.clone() }</strong>
                                        { format!(" {}", catalog::describe(code).map(|e| e.description.as_str()).unwrap_or("")) }
                                    </li>
                                }) }
                            </ul>
                            if !page.notes.is_empty() {
                                <p class="notes">{ page.notes.clone() }</p>
                            }
                        </div>
                    }) }
                    <div class="report">
                        <button onclick={link.callback(|_| Msg::Report)}>{ "Printable report" }</button>
                        if let Some(url) = &self.report {
                            <a href={url.to_string()} target="_blank">{ "Open report" }</a>
                        }
                    </div>
                    if pending {
                        <textarea
                            placeholder="Comments"
                            value={self.comments.clone()}
                            oninput={link.callback(|e: InputEvent| Msg::Comments(e.target_unchecked_into::<HtmlTextAreaElement>().value()))}
                        />
                        <div class="dialog-actions">
                            <button class="danger" disabled={self.busy} onclick={link.callback(|_| Msg::Review(SubmissionStatus::Rejected))}>{ "Reject" }</button>
                            <button class="primary" disabled={self.busy} onclick={link.callback(|_| Msg::Review(SubmissionStatus::Approved))}>{ "Approve" }</button>
                        </div>
                    } else {
                        <p>{ format!("Reviewed {}", submission.reviewed_at.as_deref().map(short_time).unwrap_or_default()) }</p>
                        if let Some(comments) = &submission.comments {
                            <p class="notes">{ comments.clone() }</p>
                        }
                    }
                    <div class="queries">
                        <textarea
                            placeholder="Question to the provider"
                            value={self.question.clone()}
                            oninput={link.callback(|e: InputEvent| Msg::Question(e.target_unchecked_into::<HtmlTextAreaElement>().value()))}
                        />
                        <button onclick={link.callback(|_| Msg::Ask)}>{ "Ask" }</button>
                    </div>
                </div>
            </div>
        }
    }
}

impl Component for AuditPage {
    type Message = Msg;
    type Properties = AuditProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            submissions: Vec::new(),
            documents: HashMap::new(),
            show_all: false,
            selected: None,
            comments: String::new(),
            question: String::new(),
            report: None,
            busy: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let session = ctx.props().session.clone();
        let link = ctx.link().clone();
        match msg {
            Msg::Load => {
                let url = if self.show_all {
                    "/api/audits".to_string()
                } else {
                    format!("/api/audits?status={}", SubmissionStatus::Pending)
                };
                spawn_local(async move {
                    let submissions = api::get::<Vec<AuditSubmission>>(&session, &url).await;
                    let documents = api::get::<Vec<Document>>(&session, "/api/documents").await;
                    match (submissions, documents) {
                        (Ok(s), Ok(d)) => link.send_message(Msg::Loaded(s, d)),
                        (Err(e), _) | (_, Err(e)) => show_error(e),
                    }
                });
                false
            }
            Msg::Loaded(submissions, documents) => {
                self.busy = false;
                self.submissions = submissions;
                self.documents = documents.into_iter().map(|d| (d.id.clone(), d)).collect();
                true
            }
            Msg::ShowAll(all) => {
                self.show_all = all;
                link.send_message(Msg::Load);
                true
            }
            Msg::Select(id) => {
                self.selected = Some(id);
                self.comments.clear();
                self.report = None;
                true
            }
            Msg::Comments(text) => {
                self.comments = text;
                false
            }
            Msg::Review(verdict) => {
                let Some(submission) = self.selected().cloned() else {
                    return false;
                };
                let comments = Some(self.comments.trim().to_string()).filter(|c| !c.is_empty());
                self.busy = true;
                spawn_local(async move {
                    match review(&session, &submission, verdict, comments).await {
                        Ok((reviewed, document)) => link.send_message(Msg::Reviewed(reviewed, document)),
                        Err(e) => {
                            show_error(e);
                            link.send_message(Msg::Load);
                        }
                    }
                });
                true
            }
            Msg::Reviewed(reviewed, document) => {
                self.busy = false;
                show_toast(&format!("Submission {}", reviewed.status.as_str().to_lowercase()));
                if let Some(document) = document {
                    self.documents.insert(document.id.clone(), document);
                }
                if let Some(slot) = self.submissions.iter_mut().find(|s| s.id == reviewed.id) {
                    *slot = reviewed;
                }
                true
            }
            Msg::Report => {
                let Some(id) = self.selected.clone() else {
                    return false;
                };
                spawn_local(async move {
                    let url = format!("/api/audits/{}/report", id);
                    match api::object_url(&session, &url, "application/pdf").await {
                        Ok(report) => link.send_message(Msg::ReportReady(report)),
                        Err(e) => show_error(e),
                    }
                });
                false
            }
            Msg::ReportReady(report) => {
                self.report = Some(report);
                true
            }
            Msg::Question(text) => {
                self.question = text;
                false
            }
            Msg::Ask => {
                let (Some(submission), question) = (self.selected(), self.question.trim().to_string()) else {
                    return false;
                };
                if question.is_empty() {
                    show_error("Write the question first");
                    return false;
                }
                let url = format!("/api/documents/{}/queries", submission.document_id);
                let body = RaiseQueryRequest { page_number: None, question };
                spawn_local(async move {
                    match api::post::<_, DocumentQuery>(&session, &url, &body).await {
                        Ok(_) => link.send_message(Msg::Asked),
                        Err(e) => show_error(e),
                    }
                });
                false
            }
            Msg::Asked => {
                show_toast("Query sent to the provider");
                self.question.clear();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let show_all = self.show_all;
        html! {
            <section>
                <h2>{ "Audit queue" }</h2>
                <label class="toolbar">
                    <input type="checkbox" checked={show_all} onchange={link.callback(move |_| Msg::ShowAll(!show_all))} />
                    { " Include reviewed" }
                </label>
                if self.submissions.is_empty() {
                    <div class="empty">{ "Nothing waiting for review" }</div>
                } else {
                    <table>
                        <tr><th>{ "Document" }</th><th>{ "Submitted" }</th><th>{ "Codes" }</th><th>{ "Status" }</th></tr>
                        { for self.submissions.iter().map(|s| {
                            let id = s.id.clone();
                            let class = if self.selected.as_deref() == Some(s.id.as_str()) { "selected" } else { "" };
                            html! {
                                <tr class={class} onclick={link.callback(move |_| Msg::Select(id.clone()))}>
                                    <td>{ self.filename(&s.document_id) }</td>
                                    <td>{ short_time(&s.submitted_at) }</td>
                                    <td>{ s.payload.code_count() }</td>
                                    <td>{ submission_badge(s.status) }</td>
                                </tr>
                            }
                        }) }
                    </table>
                }
                if let Some(submission) = self.selected() {
                    { self.view_detail(ctx, submission) }
                }
            </section>
        }
    }
}
