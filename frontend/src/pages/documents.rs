//! Document list. Providers see their own uploads; admins see everything
//! and assign documents to coders.

use crate::api::{self, ApiError};
use crate::components::pdf_frame::PdfFrame;
use crate::components::status::{document_badge, format_size, short_time};
use crate::components::toast::{show_error, show_toast};
use common::auth::Session;
use common::model::document::{Document, DocumentStatus};
use common::model::profile::Profile;
use common::model::role::Role;
use common::requests::AssignDocumentRequest;
use gloo_file::ObjectUrl;
use std::str::FromStr;
use web_sys::HtmlSelectElement;
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Vec<Document>),
    ProfilesLoaded(Vec<Profile>),
    Filter(Option<DocumentStatus>),
    Select(String),
    Assign(String, String),
    Assigned(Document),
    Export(String),
    Exported(String, ObjectUrl),
}

#[derive(Properties, PartialEq)]
pub struct DocumentsProps {
    pub session: Session,
    pub admin: bool,
}

pub struct DocumentsPage {
    documents: Vec<Document>,
    profiles: Vec<Profile>,
    filter: Option<DocumentStatus>,
    selected: Option<String>,
    export: Option<(String, ObjectUrl)>,
    loading: bool,
}

fn list_url(filter: Option<DocumentStatus>) -> String {
    match filter {
        Some(status) => format!("/api/documents?status={}", status),
        None => "/api/documents".to_string(),
    }
}

/// Active coders, the only valid assignees.
pub fn assignable(profiles: &[Profile]) -> Vec<&Profile> {
    profiles
        .iter()
        .filter(|p| p.active && p.role == Role::Employee)
        .collect()
}

fn report(e: ApiError) {
    if e != ApiError::Offline {
        show_error(e);
    }
}

impl DocumentsPage {
    fn name_of(&self, id: &str) -> String {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn view_row(&self, ctx: &Context<Self>, doc: &Document) -> Html {
        let link = ctx.link();
        let id = doc.id.clone();
        let select_id = doc.id.clone();
        let export_id = doc.id.clone();
        let assign = if ctx.props().admin {
            let doc_id = doc.id.clone();
            let onchange = link.batch_callback(move |e: Event| {
                let value = e.target_unchecked_into::<HtmlSelectElement>().value();
                (!value.is_empty()).then(|| Msg::Assign(doc_id.clone(), value))
            });
            html! {
                <td>
                    <select {onchange}>
                        <option value="" selected={doc.assigned_to.is_none()}>{ "Unassigned" }</option>
                        { for assignable(&self.profiles).into_iter().map(|p| html! {
                            <option value={p.id.clone()} selected={doc.assigned_to.as_deref() == Some(p.id.as_str())}>
                                { p.name.clone() }
                            </option>
                        }) }
                    </select>
                </td>
            }
        } else {
            html! {}
        };
        let export = match &self.export {
            Some((doc_id, url)) if *doc_id == doc.id => {
                let filename = format!("{}-codes.csv", doc.filename.trim_end_matches(".pdf"));
                html! { <a href={url.to_string()} download={filename}>{ "Download CSV" }</a> }
            }
            _ => html! { <button onclick={link.callback(move |_| Msg::Export(export_id.clone()))}>{ "Export codes" }</button> },
        };
        let class = if self.selected.as_deref() == Some(id.as_str()) { "selected" } else { "" };

        html! {
            <tr class={class}>
                <td><a onclick={link.callback(move |_| Msg::Select(select_id.clone()))}>{ doc.filename.clone() }</a></td>
                <td>{ doc.page_count }</td>
                <td>{ format_size(doc.byte_size) }</td>
                <td>{ short_time(&doc.uploaded_at) }</td>
                <td>{ document_badge(doc.status) }</td>
                if ctx.props().admin {
                    <td>{ doc.assigned_to.as_deref().map(|a| self.name_of(a)).unwrap_or_default() }</td>
                }
                { assign }
                <td>{ export }</td>
            </tr>
        }
    }
}

impl Component for DocumentsPage {
    type Message = Msg;
    type Properties = DocumentsProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        if ctx.props().admin {
            let session = ctx.props().session.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::get::<Vec<Profile>>(&session, "/api/profiles").await {
                    Ok(profiles) => link.send_message(Msg::ProfilesLoaded(profiles)),
                    Err(e) => report(e),
                }
            });
        }
        Self {
            documents: Vec::new(),
            profiles: Vec::new(),
            filter: None,
            selected: None,
            export: None,
            loading: true,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let session = ctx.props().session.clone();
        let link = ctx.link().clone();
        match msg {
            Msg::Load => {
                self.loading = true;
                let url = list_url(self.filter);
                spawn_local(async move {
                    match api::get::<Vec<Document>>(&session, &url).await {
                        Ok(documents) => link.send_message(Msg::Loaded(documents)),
                        Err(e) => {
                            report(e);
                            link.send_message(Msg::Loaded(Vec::new()));
                        }
                    }
                });
            }
            Msg::Loaded(documents) => {
                self.loading = false;
                self.documents = documents;
            }
            Msg::ProfilesLoaded(profiles) => self.profiles = profiles,
            Msg::Filter(filter) => {
                self.filter = filter;
                link.send_message(Msg::Load);
            }
            Msg::Select(id) => {
                self.selected = if self.selected.as_deref() == Some(id.as_str()) { None } else { Some(id) };
            }
            Msg::Assign(document_id, employee_id) => {
                let body = AssignDocumentRequest { employee_id };
                spawn_local(async move {
                    let url = format!("/api/documents/{}/assign", document_id);
                    match api::put::<_, Document>(&session, &url, &body).await {
                        Ok(document) => link.send_message(Msg::Assigned(document)),
                        Err(e) => report(e),
                    }
                });
                return false;
            }
            Msg::Assigned(document) => {
                show_toast(&format!("{} assigned to {}", document.filename, document.assigned_to.as_deref().map(|a| self.name_of(a)).unwrap_or_default()));
                if let Some(slot) = self.documents.iter_mut().find(|d| d.id == document.id) {
                    *slot = document;
                }
            }
            Msg::Export(document_id) => {
                spawn_local(async move {
                    let url = format!("/api/documents/{}/codes.csv", document_id);
                    match api::object_url(&session, &url, "text/csv").await {
                        Ok(object_url) => link.send_message(Msg::Exported(document_id, object_url)),
                        Err(e) => report(e),
                    }
                });
                return false;
            }
            Msg::Exported(document_id, url) => self.export = Some((document_id, url)),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let admin = ctx.props().admin;
        let onchange = link.callback(|e: Event| {
            let value = e.target_unchecked_into::<HtmlSelectElement>().value();
            Msg::Filter(DocumentStatus::from_str(&value).ok())
        });
        let selected = self
            .selected
            .as_ref()
            .and_then(|id| self.documents.iter().find(|d| &d.id == id));

        html! {
            <section>
                <h2>{ if admin { "All documents" } else { "My documents" } }</h2>
                <div class="toolbar">
                    <select {onchange}>
                        <option value="">{ "Any status" }</option>
                        { for DocumentStatus::ALL.iter().map(|s| html! {
                            <option value={s.as_str()} selected={self.filter == Some(*s)}>{ s.label() }</option>
                        }) }
                    </select>
                    <button onclick={link.callback(|_| Msg::Load)}>{ "Refresh" }</button>
                </div>
                if self.loading {
                    <div class="empty">{ "Loading..." }</div>
                } else if self.documents.is_empty() {
                    <div class="empty">{ "No documents" }</div>
                } else {
                    <table>
                        <tr>
                            <th>{ "File" }</th><th>{ "Pages" }</th><th>{ "Size" }</th><th>{ "Uploaded" }</th><th>{ "Status" }</th>
                            if admin {
                                <th>{ "Coder" }</th><th>{ "Assign" }</th>
                            }
                            <th />
                        </tr>
                        { for self.documents.iter().map(|doc| self.view_row(ctx, doc)) }
                    </table>
                }
                if let Some(doc) = selected {
                    <PdfFrame session={ctx.props().session.clone()} src={format!("/api/documents/{}/file", doc.id)} />
                }
            </section>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, role: Role, active: bool) -> Profile {
        Profile {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@clinic.test", id),
            role,
            active,
            created_at: String::new(),
        }
    }

    #[test]
    fn only_active_coders_are_assignable() {
        let profiles = vec![
            profile("a", Role::Employee, true),
            profile("b", Role::Employee, false),
            profile("c", Role::Auditor, true),
        ];
        let ids: Vec<&str> = assignable(&profiles).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn status_filter_goes_into_the_query() {
        assert_eq!(list_url(None), "/api/documents");
        assert_eq!(list_url(Some(DocumentStatus::UnderAudit)), "/api/documents?status=UNDER_AUDIT");
    }
}
