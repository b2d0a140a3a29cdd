use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable};

use crate::views::AssessmentView;

// Session parameters live in the address bar, not in the route.
#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", AssessmentView)] Assessment {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "masthead",
                h1 { "Leadership Assessment" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
