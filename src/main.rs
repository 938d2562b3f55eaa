//! IO Select Demo Entry Point

mod app;

use app::App;
use leptos::prelude::*;

fn main() {
    io_select::logger::init(log::LevelFilter::Debug);
    mount_to_body(App);
}
