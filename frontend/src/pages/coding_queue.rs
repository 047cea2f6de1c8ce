use crate::api;
use crate::components::status::{document_badge, short_time};
use crate::components::toast::show_error;
use common::auth::Session;
use common::model::document::Document;
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Loaded(Vec<Document>),
}

#[derive(Properties, PartialEq)]
pub struct CodingQueueProps {
    pub session: Session,
    pub on_open: Callback<String>,
}

/// Documents assigned to the signed-in coder, codable ones first.
pub struct CodingQueue {
    documents: Option<Vec<Document>>,
}

pub fn queue_order(documents: &mut [Document]) {
    documents.sort_by(|a, b| {
        b.status
            .is_codable()
            .cmp(&a.status.is_codable())
            .then_with(|| a.uploaded_at.cmp(&b.uploaded_at))
    });
}

impl Component for CodingQueue {
    type Message = Msg;
    type Properties = CodingQueueProps;

    fn create(ctx: &Context<Self>) -> Self {
        let session = ctx.props().session.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match api::get::<Vec<Document>>(&session, "/api/documents").await {
                Ok(documents) => link.send_message(Msg::Loaded(documents)),
                Err(e) => {
                    show_error(e);
                    link.send_message(Msg::Loaded(Vec::new()));
                }
            }
        });
        Self { documents: None }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(mut documents) => {
                queue_order(&mut documents);
                self.documents = Some(documents);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(documents) = &self.documents else {
            return html! { <div class="empty">{ "Loading..." }</div> };
        };
        if documents.is_empty() {
            return html! { <div class="empty">{ "Nothing is assigned to you" }</div> };
        }
        html! {
            <section>
                <h2>{ "Coding queue" }</h2>
                <table>
                    <tr><th>{ "File" }</th><th>{ "Pages" }</th><th>{ "Uploaded" }</th><th>{ "Status" }</th><th /></tr>
                    { for documents.iter().map(|doc| {
                        let id = doc.id.clone();
                        let on_open = ctx.props().on_open.clone();
                        html! {
                            <tr>
                                <td>{ doc.filename.clone() }</td>
                                <td>{ doc.page_count }</td>
                                <td>{ short_time(&doc.uploaded_at) }</td>
                                <td>{ document_badge(doc.status) }</td>
                                <td>
                                    <button class="primary" onclick={move |_| on_open.emit(id.clone())}>
                                        { if doc.status.is_codable() { "Code" } else { "View" } }
                                    </button>
                                </td>
                            </tr>
                        }
                    }) }
                </table>
            </section>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::document::DocumentStatus;

    fn doc(id: &str, status: DocumentStatus, uploaded_at: &str) -> Document {
        Document {
            id: id.to_string(),
            provider_id: "p".to_string(),
            filename: format!("{}.pdf", id),
            storage_path: String::new(),
            page_count: 1,
            byte_size: 1,
            status,
            assigned_to: Some("c".to_string()),
            checksum: String::new(),
            uploaded_at: uploaded_at.to_string(),
        }
    }

    #[test]
    fn codable_documents_come_first_oldest_first() {
        let mut docs = vec![
            doc("done", DocumentStatus::UnderAudit, "2026-01-01"),
            doc("new", DocumentStatus::Assigned, "2026-01-03"),
            doc("old", DocumentStatus::CodingInProgress, "2026-01-02"),
        ];
        queue_order(&mut docs);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "new", "done"]);
    }
}
