use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{FlashBanner, HomeView, ResultsView, SurveyView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/surveys/:instance_id", SurveyView)] Survey { instance_id: u64 },
        #[route("/surveys/:survey_id/instances/:instance_id/results", ResultsView)] Results { survey_id: u64, instance_id: u64 },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "topbar",
                Link { to: Route::Home {}, class: "topbar__brand", "Surveys" }
            }
            main { class: "content",
                FlashBanner {}
                Outlet::<Route> {}
            }
        }
    }
}
