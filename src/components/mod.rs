//! UI Components
//!
//! Leptos views for one IO Select instance. All of them read the engine
//! through [`IoSelectContext`](crate::context::IoSelectContext).

mod io_select;
mod option_list;
mod select_box;

pub use io_select::IoSelectWidget;
pub use option_list::{OptionList, OptionRow};
pub use select_box::SelectBox;
