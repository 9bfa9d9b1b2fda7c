use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;
use crate::views::use_flash_provider;

/// Shell shared by every route: the flash slot sits above the router so a
/// message set before a redirect is still there on the next page.
#[component]
pub fn App() -> Element {
    use_flash_provider();

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "Surveys" }

        div { class: "survey-client",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "The survey client hit an error" }
                        p { "Restart the app to continue. Saved answers are kept on the server." }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
