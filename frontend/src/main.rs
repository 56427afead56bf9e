use log::info;
use web_sys::{window, MouseEvent};
use yew::prelude::*;

mod config;
mod env;
mod components {
    pub mod icons;
    pub mod waitlist_banner;
}
mod utils {
    pub mod waitlist_spots;
}

use components::waitlist_banner::WaitlistBanner;

const WAITLIST_SECTION_ID: &str = "waitlist";

#[function_component]
fn App() -> Html {
    let scroll_to_waitlist = Callback::from(|_: MouseEvent| {
        info!("Waitlist banner clicked");
        if let Some(section) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(WAITLIST_SECTION_ID))
        {
            section.scroll_into_view();
        }
    });

    html! {
        <div class="storefront">
            <style>{PAGE_CSS}</style>
            <nav class="top-nav">
                <div class="nav-content">
                    <span class="nav-logo">{"storefront"}</span>
                </div>
            </nav>

            <section class="hero">
                <h1>{"The drop is gone."}</h1>
                <p>{"Scroll down to see what's next."}</p>
            </section>

            <WaitlistBanner onclick={scroll_to_waitlist} />

            { for (1..=6).map(|n| html! {
                <section class="filler">
                    <h2>{format!("Chapter {}", n)}</h2>
                    <p>{"Every unit from the first batch shipped within a week. The second batch is being assembled now."}</p>
                </section>
            }) }

            <section class="filler" id={WAITLIST_SECTION_ID}>
                <h2>{"Join the waitlist"}</h2>
                <p>{"We'll email you the moment the next drop opens."}</p>
            </section>
        </div>
    }
}

const PAGE_CSS: &str = r#"
    body {
        margin: 0;
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
        background: #111;
        color: #eee;
    }
    .top-nav {
        position: fixed;
        top: 0;
        left: 0;
        right: 0;
        height: 72px;
        background: rgba(17, 17, 17, 0.95);
        z-index: 1000;
        display: flex;
        align-items: center;
    }
    .nav-content {
        padding: 0 24px;
    }
    .nav-logo {
        font-weight: 700;
        font-size: 20px;
    }
    .hero {
        padding: 160px 24px 96px;
        text-align: center;
    }
    .filler {
        max-width: 720px;
        margin: 0 auto;
        padding: 96px 24px;
    }
    @media (max-width: 768px) {
        .top-nav {
            height: 56px;
        }
    }
"#;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
