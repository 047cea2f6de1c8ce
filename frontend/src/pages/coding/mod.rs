//! Coding workspace: one document, page by page.
//!
//! The PDF sits beside the code pickers of the current page. Edits are kept
//! as drafts and auto-saved 1500 ms after the last change; a page whose
//! fingerprint matches its last save is not sent again. Submitting flushes
//! unsaved pages, marks the document CODING_COMPLETE, posts the audit
//! submission and moves the document UNDER_AUDIT. These are independent
//! calls: a failure part way stops the chain and leaves the earlier steps in
//! place.

use yew::prelude::*;

mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::CodingWorkspaceProps;
pub use state::CodingWorkspace;

impl Component for CodingWorkspace {
    type Message = Msg;
    type Properties = CodingWorkspaceProps;

    fn create(ctx: &Context<Self>) -> Self {
        update::load(ctx);
        CodingWorkspace::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn destroy(&mut self, ctx: &Context<Self>) {
        // Leaving inside the SPA: send what the debounce has not sent yet.
        if !self.submitting {
            update::save_dirty(self, ctx);
        }
        helpers::set_window_dirty_flag(false);
    }
}
