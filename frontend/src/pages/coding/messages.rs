use crate::components::code_picker::CodeList;
use common::model::audit::DocumentDecision;
use common::model::document::Document;
use common::model::page_code::PageCode;
use common::model::query::DocumentQuery;

pub enum Msg {
    Loaded(Document, Vec<PageCode>, Vec<DocumentQuery>),
    LoadFailed(String),
    StatusChanged(Document),

    GoToPage(u32),
    AddCode(CodeList, String),
    RemoveCode(CodeList, String),
    Notes(String),

    /// Debounce tick carrying the edit generation it was scheduled for.
    AutoSave(u64),
    /// A page was stored; carries the fingerprint of what was sent.
    Saved(u32, String),
    SaveFailed,

    QueryDraft(String),
    QueryForPage(bool),
    RaiseQuery,
    QueryRaised(DocumentQuery),

    OpenSubmit,
    CloseSubmit,
    Decision(DocumentDecision),
    Reason(String),
    Submit,
    /// Result of the whole submission chain; `Err` names the failed step.
    Submitted(Result<(), String>),
}
