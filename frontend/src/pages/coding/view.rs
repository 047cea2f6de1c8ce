//! Layout: PDF on the left, the current page's codes on the right, queries
//! and the submit dialog below.

use super::messages::Msg;
use super::state::CodingWorkspace;
use crate::components::code_picker::{CodeList, CodePicker};
use crate::components::pdf_frame::PdfFrame;
use crate::components::status::{document_badge, short_time};
use crate::components::top_sheet::TopSheet;
use common::codes::catalog;
use common::model::audit::DocumentDecision;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

pub fn view(component: &CodingWorkspace, ctx: &Context<CodingWorkspace>) -> Html {
    let link = ctx.link();
    if let Some(error) = &component.load_error {
        return html! { <div class="empty">{ format!("Could not open the document: {}", error) }</div> };
    }
    let Some(document) = &component.document else {
        return html! { <div class="empty">{ "Loading document..." }</div> };
    };

    html! {
        <section class="workspace">
            <header class="workspace-head">
                <h2>{ document.filename.clone() }</h2>
                { document_badge(document.status) }
                <span class="save-state">{ save_state(component) }</span>
                <button
                    class="primary"
                    disabled={!component.editable()}
                    onclick={link.callback(|_| Msg::OpenSubmit)}
                >
                    { if component.submitting { "Submitting..." } else { "Submit for audit" } }
                </button>
            </header>
            <div class="workspace-body">
                <div class="workspace-pdf">
                    <PdfFrame
                        session={ctx.props().session.clone()}
                        src={format!("/api/documents/{}/file", document.id)}
                        page={component.current_page}
                    />
                </div>
                <div class="workspace-codes">
                    { page_selector(component, link) }
                    { code_list(component, link, CodeList::Diagnoses) }
                    { code_list(component, link, CodeList::Procedures) }
                    { notes(component, link) }
                    { queries(component, link) }
                </div>
            </div>
            { submit_dialog(component, link) }
        </section>
    }
}

fn save_state(component: &CodingWorkspace) -> &'static str {
    if component.saves_in_flight > 0 {
        "Saving..."
    } else if component.is_dirty() {
        "Unsaved changes"
    } else {
        "All changes saved"
    }
}

fn page_selector(component: &CodingWorkspace, link: &Scope<CodingWorkspace>) -> Html {
    let current = component.current_page;
    let count = component.page_count();
    html! {
        <div class="page-selector">
            <button disabled={current <= 1} onclick={link.callback(move |_| Msg::GoToPage(current - 1))}>{ "‹" }</button>
            { for (1..=count).map(|page| {
                let mut class = classes!("page-chip");
                if page == current {
                    class.push("current");
                }
                if component.drafts.get(&page).is_some_and(|d| !d.is_empty()) {
                    class.push("coded");
                }
                html! {
                    <button class={class} onclick={link.callback(move |_| Msg::GoToPage(page))}>{ page }</button>
                }
            }) }
            <button disabled={current >= count} onclick={link.callback(move |_| Msg::GoToPage(current + 1))}>{ "›" }</button>
        </div>
    }
}

fn code_list(component: &CodingWorkspace, link: &Scope<CodingWorkspace>, list: CodeList) -> Html {
    let draft = component.current_draft();
    let editable = component.editable();
    html! {
        <div class="code-list">
            <CodePicker {list} disabled={!editable} on_add={link.callback(move |code: String| Msg::AddCode(list, code))} />
            <ul>
                { for draft.codes(list).iter().map(|code| {
                    let description = catalog::describe(code).map(|e| e.description.clone()).unwrap_or_default();
                    let remove = code.clone();
                    html! {
                        <li>
                            <strong>{ code.clone() }</strong>
                            <span class="description">{ format!(" {}", description) }</span>
                            if editable {
                                <button class="remove" onclick={link.callback(move |_| Msg::RemoveCode(list, remove.clone()))}>{ "✕" }</button>
                            }
                        </li>
                    }
                }) }
            </ul>
        </div>
    }
}

fn notes(component: &CodingWorkspace, link: &Scope<CodingWorkspace>) -> Html {
    html! {
        <div class="notes">
            <label>{ format!("Notes for page {}", component.current_page) }</label>
            <textarea
                key={component.current_page}
                value={component.current_draft().notes}
                disabled={!component.editable()}
                oninput={link.callback(|e: InputEvent| Msg::Notes(e.target_unchecked_into::<HtmlTextAreaElement>().value()))}
            />
        </div>
    }
}

fn queries(component: &CodingWorkspace, link: &Scope<CodingWorkspace>) -> Html {
    let for_page = component.query_for_page;
    html! {
        <div class="queries">
            <h3>{ "Queries to the provider" }</h3>
            <textarea
                placeholder="Question"
                value={component.query_draft.clone()}
                oninput={link.callback(|e: InputEvent| Msg::QueryDraft(e.target_unchecked_into::<HtmlTextAreaElement>().value()))}
            />
            <label>
                <input
                    type="checkbox"
                    checked={for_page}
                    onchange={link.callback(move |_| Msg::QueryForPage(!for_page))}
                />
                { format!(" About page {}", component.current_page) }
            </label>
            <button onclick={link.callback(|_| Msg::RaiseQuery)}>{ "Ask" }</button>
            <ul>
                { for component.queries.iter().map(|q| html! {
                    <li>
                        <span class="when">{ short_time(&q.created_at) }</span>
                        { q.page_number.map(|p| format!(" p.{} ", p)).unwrap_or_else(|| " ".to_string()) }
                        { q.question.clone() }
                        if let Some(answer) = &q.answer {
                            <div class="answer">{ answer.clone() }</div>
                        }
                    </li>
                }) }
            </ul>
        </div>
    }
}

fn submit_dialog(component: &CodingWorkspace, link: &Scope<CodingWorkspace>) -> Html {
    let decision_radio = |decision: DocumentDecision, label: &'static str| {
        html! {
            <label>
                <input
                    type="radio"
                    name="decision"
                    checked={component.decision == decision}
                    onchange={link.callback(move |_| Msg::Decision(decision))}
                />
                { label }
            </label>
        }
    };
    html! {
        <TopSheet node_ref={component.submit_ref.clone()}>
            <div class="dialog">
                <h3>{ "Submit for audit" }</h3>
                <p>{ format!("{} pages with codes, {} unsaved.",
                    component.drafts.values().filter(|d| !d.is_empty()).count(),
                    component.dirty_pages().len()) }</p>
                { decision_radio(DocumentDecision::Accept, " Accept the document") }
                { decision_radio(DocumentDecision::Reject, " Reject the document") }
                if component.decision == DocumentDecision::Reject {
                    <input
                        type="text"
                        placeholder="Reason"
                        value={component.reason.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::Reason(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                }
                <div class="dialog-actions">
                    <button onclick={link.callback(|_| Msg::CloseSubmit)}>{ "Cancel" }</button>
                    <button class="primary" disabled={component.submitting} onclick={link.callback(|_| Msg::Submit)}>{ "Submit" }</button>
                </div>
            </div>
        </TopSheet>
    }
}
