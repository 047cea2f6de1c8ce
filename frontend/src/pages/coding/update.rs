//! Update logic of the coding workspace.
//!
//! - `load`: document, the coder's own page rows and the document's queries.
//! - Edits bump `edit_generation` and schedule an `AutoSave` tick; only the
//!   tick of the latest generation saves.
//! - `Submit` runs the four-step chain in one task and reports the step
//!   that failed, if any.

use super::helpers::{fingerprint, set_window_dirty_flag, submission_payload, PageDraft};
use super::messages::Msg;
use super::state::CodingWorkspace;
use crate::api::{self, ApiResult};
use crate::components::toast::{show_error, show_toast};
use crate::components::top_sheet::{close_top_sheet, open_top_sheet};
use common::auth::Session;
use common::model::audit::{AuditSubmission, DocumentDecision};
use common::model::document::{Document, DocumentStatus};
use common::model::page_code::PageCode;
use common::model::query::DocumentQuery;
use common::requests::{RaiseQueryRequest, SavePageCodesRequest, SetStatusRequest, SubmitAuditRequest};
use gloo_console::log;
use gloo_timers::future::TimeoutFuture;
use yew::platform::spawn_local;
use yew::prelude::*;

pub const AUTOSAVE_DELAY_MS: u32 = 1500;

pub fn load(ctx: &Context<CodingWorkspace>) {
    let session = ctx.props().session.clone();
    let id = ctx.props().document_id.to_string();
    let link = ctx.link().clone();
    spawn_local(async move {
        let loaded = async {
            let document: Document = api::get(&session, &format!("/api/documents/{}", id)).await?;
            let rows: Vec<PageCode> = api::get(&session, &format!("/api/documents/{}/page_codes", id)).await?;
            let queries: Vec<DocumentQuery> = api::get(&session, &format!("/api/documents/{}/queries", id)).await?;
            ApiResult::Ok((document, rows, queries))
        };
        match loaded.await {
            Ok((document, rows, queries)) => {
                let own = rows.into_iter().filter(|r| r.author_id == session.profile.id).collect();
                link.send_message(Msg::Loaded(document, own, queries));
            }
            Err(e) => link.send_message(Msg::LoadFailed(e.to_string())),
        }
    });
}

async fn set_status(session: &Session, document_id: &str, status: DocumentStatus) -> ApiResult<Document> {
    api::put(
        session,
        &format!("/api/documents/{}/status", document_id),
        &SetStatusRequest { status },
    )
    .await
}

async fn save_page(session: &Session, document_id: &str, page_number: u32, draft: &PageDraft) -> ApiResult<PageCode> {
    let body = SavePageCodesRequest {
        document_id: document_id.to_string(),
        page_number,
        icd10_codes: draft.icd10_codes.clone(),
        cpt_codes: draft.cpt_codes.clone(),
        notes: draft.notes.trim().to_string(),
    };
    api::put(session, "/api/page_codes", &body).await
}

fn schedule_autosave(component: &mut CodingWorkspace, ctx: &Context<CodingWorkspace>) {
    component.edit_generation += 1;
    let generation = component.edit_generation;
    let link = ctx.link().clone();
    spawn_local(async move {
        TimeoutFuture::new(AUTOSAVE_DELAY_MS).await;
        link.send_message(Msg::AutoSave(generation));
    });
    set_window_dirty_flag(component.is_dirty());
}

/// Sends every dirty page, one request each.
pub fn save_dirty(component: &mut CodingWorkspace, ctx: &Context<CodingWorkspace>) {
    let Some(document) = &component.document else {
        return;
    };
    for page in component.dirty_pages() {
        let Some(draft) = component.drafts.get(&page).cloned() else {
            continue;
        };
        component.saves_in_flight += 1;
        let session = ctx.props().session.clone();
        let document_id = document.id.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match save_page(&session, &document_id, page, &draft).await {
                Ok(_) => link.send_message(Msg::Saved(page, fingerprint(&draft))),
                Err(e) => {
                    show_error(format!("Page {} was not saved: {}", page, e));
                    link.send_message(Msg::SaveFailed);
                }
            }
        });
    }
}

/// The submission chain. Each step runs only if the previous one succeeded.
async fn submit_chain(
    session: Session,
    document_id: String,
    pages: Vec<(u32, PageDraft)>,
    request: SubmitAuditRequest,
) -> Result<(), String> {
    for (page, draft) in &pages {
        save_page(&session, &document_id, *page, draft)
            .await
            .map_err(|e| format!("Saving page {} failed: {}", page, e))?;
    }
    set_status(&session, &document_id, DocumentStatus::CodingComplete)
        .await
        .map_err(|e| format!("Marking the document complete failed: {}", e))?;
    let submission: AuditSubmission = api::post(&session, "/api/audits", &request)
        .await
        .map_err(|e| format!("Creating the audit submission failed: {}", e))?;
    log!(format!("Audit submission {} created", submission.id));
    set_status(&session, &document_id, DocumentStatus::UnderAudit)
        .await
        .map_err(|e| format!("Sending the document to audit failed: {}", e))?;
    Ok(())
}

pub fn update(component: &mut CodingWorkspace, ctx: &Context<CodingWorkspace>, msg: Msg) -> bool {
    match msg {
        Msg::Loaded(document, rows, queries) => {
            for row in &rows {
                let draft = PageDraft::from(row);
                component.saved.insert(row.page_number, fingerprint(&draft));
                component.drafts.insert(row.page_number, draft);
            }
            component.queries = queries;

            if document.status == DocumentStatus::Assigned {
                let session = ctx.props().session.clone();
                let id = document.id.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match set_status(&session, &id, DocumentStatus::CodingInProgress).await {
                        Ok(document) => link.send_message(Msg::StatusChanged(document)),
                        Err(e) => show_error(e),
                    }
                });
            }
            component.document = Some(document);
            true
        }
        Msg::LoadFailed(message) => {
            component.load_error = Some(message);
            true
        }
        Msg::StatusChanged(document) => {
            component.document = Some(document);
            true
        }
        Msg::GoToPage(page) => {
            let page = page.clamp(1, component.page_count());
            if page == component.current_page {
                return false;
            }
            component.current_page = page;
            true
        }
        Msg::AddCode(list, code) => {
            if !component.editable() || !component.current_draft_mut().add(list, code) {
                return false;
            }
            schedule_autosave(component, ctx);
            true
        }
        Msg::RemoveCode(list, code) => {
            if !component.editable() || !component.current_draft_mut().remove(list, &code) {
                return false;
            }
            schedule_autosave(component, ctx);
            true
        }
        Msg::Notes(notes) => {
            if !component.editable() {
                return false;
            }
            component.current_draft_mut().notes = notes;
            schedule_autosave(component, ctx);
            false
        }
        Msg::AutoSave(generation) => {
            if generation != component.edit_generation || component.submitting {
                return false;
            }
            save_dirty(component, ctx);
            component.saves_in_flight > 0
        }
        Msg::Saved(page, print) => {
            component.saves_in_flight = component.saves_in_flight.saturating_sub(1);
            component.saved.insert(page, print);
            set_window_dirty_flag(component.is_dirty());
            true
        }
        Msg::SaveFailed => {
            component.saves_in_flight = component.saves_in_flight.saturating_sub(1);
            true
        }
        Msg::QueryDraft(text) => {
            component.query_draft = text;
            false
        }
        Msg::QueryForPage(for_page) => {
            component.query_for_page = for_page;
            true
        }
        Msg::RaiseQuery => {
            let question = component.query_draft.trim().to_string();
            if question.is_empty() {
                show_error("Write the question first");
                return false;
            }
            let body = RaiseQueryRequest {
                page_number: component.query_for_page.then_some(component.current_page),
                question,
            };
            let session = ctx.props().session.clone();
            let url = format!("/api/documents/{}/queries", ctx.props().document_id);
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::post::<_, DocumentQuery>(&session, &url, &body).await {
                    Ok(query) => link.send_message(Msg::QueryRaised(query)),
                    Err(e) => show_error(e),
                }
            });
            false
        }
        Msg::QueryRaised(query) => {
            show_toast("Query sent to the provider");
            component.query_draft.clear();
            component.queries.insert(0, query);
            true
        }
        Msg::OpenSubmit => {
            open_top_sheet(&component.submit_ref);
            false
        }
        Msg::CloseSubmit => {
            close_top_sheet(&component.submit_ref);
            false
        }
        Msg::Decision(decision) => {
            component.decision = decision;
            true
        }
        Msg::Reason(reason) => {
            component.reason = reason;
            false
        }
        Msg::Submit => {
            let Some(document) = &component.document else {
                return false;
            };
            if component.decision == DocumentDecision::Reject && component.reason.trim().is_empty() {
                show_error("Give a reason for rejecting the document");
                return false;
            }
            let payload = submission_payload(&component.drafts, component.decision, &component.reason);
            if component.decision == DocumentDecision::Accept && payload.code_count() == 0 {
                show_error("Add at least one code before submitting");
                return false;
            }
            let dirty: Vec<(u32, PageDraft)> = component
                .dirty_pages()
                .into_iter()
                .filter_map(|page| component.drafts.get(&page).map(|d| (page, d.clone())))
                .collect();
            let request = SubmitAuditRequest {
                document_id: document.id.clone(),
                payload,
            };
            let session = ctx.props().session.clone();
            let document_id = document.id.clone();
            let link = ctx.link().clone();

            component.submitting = true;
            // Pending debounce ticks become stale.
            component.edit_generation += 1;
            close_top_sheet(&component.submit_ref);
            spawn_local(async move {
                link.send_message(Msg::Submitted(submit_chain(session, document_id, dirty, request).await));
            });
            true
        }
        Msg::Submitted(Ok(())) => {
            component.submitting = false;
            component.saved = component
                .drafts
                .iter()
                .map(|(page, draft)| (*page, fingerprint(draft)))
                .collect();
            set_window_dirty_flag(false);
            show_toast("Submitted for audit");
            ctx.props().on_done.emit(());
            true
        }
        Msg::Submitted(Err(message)) => {
            component.submitting = false;
            show_error(message);
            // The chain may have moved the document part of the way.
            load_status(ctx);
            true
        }
    }
}

fn load_status(ctx: &Context<CodingWorkspace>) {
    let session = ctx.props().session.clone();
    let id = ctx.props().document_id.to_string();
    let link = ctx.link().clone();
    spawn_local(async move {
        if let Ok(document) = api::get::<Document>(&session, &format!("/api/documents/{}", id)).await {
            link.send_message(Msg::StatusChanged(document));
        }
    });
}
