//! Widgets shared by several pages.

pub mod code_picker;
pub mod password_dialog;
pub mod pdf_frame;
pub mod status;
pub mod toast;
pub mod top_sheet;
