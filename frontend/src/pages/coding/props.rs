use common::auth::Session;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CodingWorkspaceProps {
    pub session: Session,
    pub document_id: AttrValue,
    /// Called after a successful submission.
    pub on_done: Callback<()>,
}
