use common::model::audit::SubmissionStatus;
use common::model::document::DocumentStatus;
use num_format::{Locale, ToFormattedString};
use yew::{html, Html};

pub fn document_badge(status: DocumentStatus) -> Html {
    let class = format!("badge badge-{}", status.as_str().to_lowercase());
    html! { <span class={class}>{ status.label() }</span> }
}

pub fn submission_badge(status: SubmissionStatus) -> Html {
    let class = format!("badge badge-{}", status.as_str().to_lowercase());
    html! { <span class={class}>{ status.as_str() }</span> }
}

/// `1536000` → `"1,500 KB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    format!("{} KB", (bytes / 1024).to_formatted_string(&Locale::en))
}

/// Drops the sub-second part and offset of an RFC 3339 timestamp.
pub fn short_time(timestamp: &str) -> String {
    timestamp.get(..16).unwrap_or(timestamp).replace('T', " ")
}
