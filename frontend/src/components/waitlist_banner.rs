pub mod countdown;
pub mod scarcity;
pub mod sticky;
pub mod visibility;

use web_sys::MouseEvent;
use yew::prelude::*;

use crate::components::icons::{ClockIcon, FlameIcon, UsersIcon};
use crate::env::SystemClock;
use crate::utils::waitlist_spots::calculate_spots_remaining;

use countdown::{resolve_drop_at, use_countdown};
use scarcity::use_spots_remaining;
use sticky::{placeholder_height, use_layout, use_sticky_observer, use_sticky_polling, StickyState, StickyStrategy};
use visibility::use_first_interaction;

#[derive(Properties, PartialEq)]
pub struct WaitlistBannerProps {
    #[prop_or_default]
    pub onclick: Option<Callback<MouseEvent>>,
    #[prop_or_default]
    pub strategy: StickyStrategy,
    /// Local `YYYY-MM-DDTHH:MM:SS`; defaults to the configured next drop.
    #[prop_or_default]
    pub drop_at: Option<AttrValue>,
    /// Replaces the computed spots seed.
    #[prop_or_default]
    pub initial_spots: Option<u32>,
}

#[function_component(WaitlistBanner)]
pub fn waitlist_banner(props: &WaitlistBannerProps) -> Html {
    let sentinel_ref = use_node_ref();
    let banner_ref = use_node_ref();

    let drop_at_ms = use_memo(|drop_at| resolve_drop_at(drop_at.as_deref()), props.drop_at.clone());
    let spots_seed = use_memo(
        |initial| initial.unwrap_or_else(|| calculate_spots_remaining(&SystemClock)),
        props.initial_spots,
    );

    let visible = use_first_interaction();
    let time_left = use_countdown(*drop_at_ms);
    let spots = use_spots_remaining(*spots_seed);

    // Both hooks always run; only the selected one is ever activated.
    let sticky_now = use_mut_ref(StickyState::default);
    let layout = use_layout(banner_ref.clone(), visible, sticky_now.clone());
    let observed = use_sticky_observer(
        sentinel_ref.clone(),
        visible && props.strategy == StickyStrategy::Observer,
        layout.header_height,
    );
    let polled = use_sticky_polling(sentinel_ref.clone(), visible && props.strategy == StickyStrategy::Polling);
    let sticky = match props.strategy {
        StickyStrategy::Observer => observed,
        StickyStrategy::Polling => polled,
    };
    *sticky_now.borrow_mut() = sticky;

    if !visible {
        return html! {};
    }

    let cursor = if props.onclick.is_some() { "pointer" } else { "default" };
    let style = if sticky.is_stuck() {
        format!("cursor: {}; top: {}px;", cursor, layout.header_height)
    } else {
        format!("cursor: {};", cursor)
    };

    html! {
        <>
            <style>{BANNER_CSS}</style>
            <div ref={sentinel_ref} class="waitlist-banner-sentinel" aria-hidden="true"></div>
            {
                if let Some(height) = placeholder_height(sticky, layout.banner_height) {
                    html! { <div class="waitlist-banner-placeholder" style={format!("height: {}px;", height)}></div> }
                } else {
                    html! {}
                }
            }
            <div
                ref={banner_ref}
                class={classes!("waitlist-banner-wrapper", sticky.is_stuck().then(|| "stuck"))}
                onclick={props.onclick.clone()}
                style={style}
            >
                <div class="waitlist-banner">
                    <div class="banner-content">
                        <div class="banner-left">
                            <FlameIcon size={20} class={classes!("banner-icon")} />
                            <span class="sold-out-text">{"FIRST DROP SOLD OUT"}</span>
                        </div>

                        <div class="banner-center">
                            <ClockIcon />
                            <span class="countdown-inline">
                                {format!("Next drop: {}", time_left)}
                            </span>
                        </div>

                        <div class="banner-right">
                            <UsersIcon />
                            <span class="waitlist-count-inline">
                                {"Only "}<strong>{spots.to_string()}</strong>{" spots left"}
                            </span>
                        </div>
                    </div>
                </div>
            </div>
        </>
    }
}

const BANNER_CSS: &str = r#"
    .waitlist-banner-sentinel {
        height: 0;
        width: 100%;
    }
    .waitlist-banner-wrapper {
        position: relative;
        width: 100%;
        z-index: 900;
    }
    .waitlist-banner-wrapper.stuck {
        position: fixed;
        left: 0;
        right: 0;
    }
    .waitlist-banner {
        background: linear-gradient(90deg, #7f1d1d, #b91c1c 50%, #7f1d1d);
        color: #fff;
        padding: 12px 20px;
        box-shadow: 0 4px 12px rgba(0, 0, 0, 0.25);
        transition: padding 0.2s ease;
    }
    .waitlist-banner-wrapper.stuck .waitlist-banner {
        padding: 6px 20px;
    }
    .banner-content {
        max-width: 1100px;
        margin: 0 auto;
        display: flex;
        align-items: center;
        justify-content: space-between;
        gap: 16px;
        font-size: 14px;
    }
    .banner-left,
    .banner-center,
    .banner-right {
        display: flex;
        align-items: center;
        gap: 8px;
    }
    .banner-icon {
        color: #fbbf24;
    }
    .sold-out-text {
        font-weight: 800;
        letter-spacing: 0.08em;
    }
    .countdown-inline {
        font-variant-numeric: tabular-nums;
    }
    .waitlist-count-inline strong {
        color: #fde68a;
    }
    @media (max-width: 768px) {
        .banner-content {
            flex-direction: column;
            gap: 4px;
            font-size: 12px;
        }
        .waitlist-banner {
            padding: 8px 12px;
        }
        .waitlist-banner-wrapper.stuck .waitlist-banner {
            padding: 4px 12px;
        }
    }
"#;
