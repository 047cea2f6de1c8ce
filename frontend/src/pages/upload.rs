//! Provider upload form. Sends `multipart/form-data` with the PDF as `file`
//! and, when given, the page count as `page_count`.

use crate::api;
use crate::components::status::{document_badge, format_size};
use crate::components::toast::{show_error, show_toast};
use common::auth::Session;
use common::model::document::Document;
use web_sys::{FormData, HtmlInputElement};
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    PageCount(String),
    Submit,
    Uploaded(Document),
    Failed,
}

#[derive(Properties, PartialEq)]
pub struct UploadProps {
    pub session: Session,
}

pub struct UploadPage {
    file_ref: NodeRef,
    page_count: String,
    busy: bool,
    uploaded: Vec<Document>,
}

pub fn is_pdf_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// Empty means "let the server estimate it".
pub fn parse_page_count(value: &str) -> Result<Option<u32>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err("The page count must be a positive number"),
    }
}

impl UploadPage {
    fn form(&self) -> Result<FormData, String> {
        let input = self
            .file_ref
            .cast::<HtmlInputElement>()
            .ok_or_else(|| "The file input is missing".to_string())?;
        let file = input
            .files()
            .and_then(|files| files.get(0))
            .ok_or_else(|| "Choose a PDF file first".to_string())?;
        if !is_pdf_name(&file.name()) {
            return Err("Only PDF files can be uploaded".to_string());
        }
        let page_count = parse_page_count(&self.page_count).map_err(str::to_string)?;

        let form = FormData::new().map_err(|_| "Could not build the upload".to_string())?;
        if let Some(count) = page_count {
            form.append_with_str("page_count", &count.to_string())
                .map_err(|_| "Could not build the upload".to_string())?;
        }
        form.append_with_blob_and_filename("file", &file, &file.name())
            .map_err(|_| "Could not build the upload".to_string())?;
        Ok(form)
    }
}

impl Component for UploadPage {
    type Message = Msg;
    type Properties = UploadProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            file_ref: NodeRef::default(),
            page_count: String::new(),
            busy: false,
            uploaded: Vec::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::PageCount(value) => self.page_count = value,
            Msg::Submit => {
                let form = match self.form() {
                    Ok(form) => form,
                    Err(problem) => {
                        show_error(problem);
                        return false;
                    }
                };
                self.busy = true;
                let session = ctx.props().session.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api::upload::<Document>(&session, "/api/documents/upload", form).await {
                        Ok(document) => link.send_message(Msg::Uploaded(document)),
                        Err(e) => {
                            show_error(e);
                            link.send_message(Msg::Failed);
                        }
                    }
                });
            }
            Msg::Uploaded(document) => {
                self.busy = false;
                self.page_count.clear();
                if let Some(input) = self.file_ref.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
                show_toast(&format!("Uploaded {}", document.filename));
                self.uploaded.insert(0, document);
            }
            Msg::Failed => self.busy = false,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <section>
                <h2>{ "Upload a document" }</h2>
                <div class="card form">
                    <input type="file" accept="application/pdf,.pdf" ref={self.file_ref.clone()} />
                    <input
                        type="number"
                        min="1"
                        placeholder="Page count (optional)"
                        value={self.page_count.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::PageCount(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                    <button class="primary" disabled={self.busy} onclick={link.callback(|_| Msg::Submit)}>
                        { if self.busy { "Uploading..." } else { "Upload" } }
                    </button>
                </div>
                if !self.uploaded.is_empty() {
                    <h3>{ "Uploaded in this session" }</h3>
                    <table>
                        <tr><th>{ "File" }</th><th>{ "Pages" }</th><th>{ "Size" }</th><th>{ "Status" }</th></tr>
                        { for self.uploaded.iter().map(|doc| html! {
                            <tr>
                                <td>{ doc.filename.clone() }</td>
                                <td>{ doc.page_count }</td>
                                <td>{ format_size(doc.byte_size) }</td>
                                <td>{ document_badge(doc.status) }</td>
                            </tr>
                        }) }
                    </table>
                }
            </section>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pdf_names_pass() {
        assert!(is_pdf_name("Chart.PDF"));
        assert!(!is_pdf_name("chart.pdf.txt"));
    }

    #[test]
    fn page_count_is_optional_but_positive() {
        assert_eq!(parse_page_count("  "), Ok(None));
        assert_eq!(parse_page_count("12"), Ok(Some(12)));
        assert!(parse_page_count("0").is_err());
        assert!(parse_page_count("ten").is_err());
    }
}
