use dioxus::prelude::*;

/// A success message that survives a route change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Shared slot for the current flash, provided once above the router.
#[derive(Clone, Copy)]
pub struct FlashSlot(Signal<Option<Flash>>);

impl FlashSlot {
    pub fn show(mut self, flash: Flash) {
        self.0.set(Some(flash));
    }

    pub fn dismiss(mut self) {
        self.0.set(None);
    }

    #[must_use]
    pub fn current(&self) -> Option<Flash> {
        self.0.read().clone()
    }
}

pub fn use_flash_provider() -> FlashSlot {
    use_context_provider(|| FlashSlot(Signal::new(None)))
}

/// The flash slot, if a provider sits above the caller.
#[must_use]
pub fn use_flash() -> Option<FlashSlot> {
    try_use_context::<FlashSlot>()
}

#[component]
pub fn FlashBanner() -> Element {
    let Some(slot) = use_flash() else {
        return rsx! {};
    };
    let Some(flash) = slot.current() else {
        return rsx! {};
    };
    rsx! {
        div { class: "flash flash--success", role: "status", id: "flash",
            p { "{flash.message}" }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| slot.dismiss(),
                "Dismiss"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[component]
    fn Preset() -> Element {
        use_context_provider(|| {
            FlashSlot(Signal::new(Some(Flash::success("Answers submitted"))))
        });
        rsx! { FlashBanner {} }
    }

    #[test]
    fn banner_renders_the_current_flash() {
        let mut dom = VirtualDom::new(Preset);
        dom.rebuild_in_place();
        let html = dioxus_ssr::render(&dom);
        assert!(html.contains("Answers submitted"), "missing flash in {html}");
        assert!(html.contains("Dismiss"), "missing dismiss in {html}");
    }

    #[test]
    fn banner_is_empty_without_a_provider() {
        let mut dom = VirtualDom::new(FlashBanner);
        dom.rebuild_in_place();
        assert!(!dioxus_ssr::render(&dom).contains("flash"));
    }
}
