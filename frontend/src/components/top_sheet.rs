//! Slide-down sheet used for dialogs. Visibility is a `show` class toggled
//! on the sheet element; the stylesheet animates it.

use uuid::Uuid;
use yew::{html, Component, Context, Html, NodeRef, Properties};

pub struct TopSheet {
    id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
}

impl Component for TopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("sheet-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="top-sheet" id={self.id.clone()} ref={ctx.props().node_ref.clone()}>
                { ctx.props().children.clone() }
            </div>
        }
    }
}

fn toggle(sheet_ref: &NodeRef, show: bool) {
    if let Some(sheet) = sheet_ref.cast::<web_sys::HtmlElement>() {
        let classes = sheet.class_list();
        let _ = if show { classes.add_1("show") } else { classes.remove_1("show") };
    }
}

pub fn open_top_sheet(sheet_ref: &NodeRef) {
    toggle(sheet_ref, true);
}

pub fn close_top_sheet(sheet_ref: &NodeRef) {
    toggle(sheet_ref, false);
}
