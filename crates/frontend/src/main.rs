mod api;
mod canvas;
mod components;
mod coords;
mod feed;
mod pages;
mod session;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/paddock/:name")]
    PaddockView { name: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::dashboard::Dashboard { paddock_name: None::<String> }
    }
}

#[component]
fn PaddockView(name: String) -> Element {
    rsx! {
        pages::dashboard::Dashboard { paddock_name: Some(name) }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    // The `logger` feature installs a tracing subscriber that forwards to the
    // browser console, so events from paddock-shared show up there too.
    launch(App);
}
