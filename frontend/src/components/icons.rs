use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct IconProps {
    #[prop_or(16)]
    pub size: u32,
    #[prop_or_default]
    pub class: Classes,
}

fn svg(props: &IconProps, body: Html) -> Html {
    let size = props.size.to_string();
    html! {
        <svg
            xmlns="http://www.w3.org/2000/svg"
            width={size.clone()}
            height={size}
            viewBox="0 0 24 24"
            fill="none"
            stroke="currentColor"
            stroke-width="2"
            stroke-linecap="round"
            stroke-linejoin="round"
            aria-hidden="true"
            class={props.class.clone()}
        >
            { body }
        </svg>
    }
}

#[function_component(FlameIcon)]
pub fn flame_icon(props: &IconProps) -> Html {
    svg(props, html! {
        <path d="M8.5 14.5A2.5 2.5 0 0 0 11 12c0-1.38-.5-2-1-3-1.072-2.143-.224-4.054 2-6 .5 2.5 2 4.9 4 6.5 2 1.6 3 3.5 3 5.5a7 7 0 1 1-14 0c0-1.153.433-2.294 1-3a2.5 2.5 0 0 0 2.5 2.5z" />
    })
}

#[function_component(ClockIcon)]
pub fn clock_icon(props: &IconProps) -> Html {
    svg(props, html! {
        <>
            <circle cx="12" cy="12" r="10" />
            <polyline points="12 6 12 12 16 14" />
        </>
    })
}

#[function_component(UsersIcon)]
pub fn users_icon(props: &IconProps) -> Html {
    svg(props, html! {
        <>
            <path d="M16 21v-2a4 4 0 0 0-4-4H6a4 4 0 0 0-4 4v2" />
            <circle cx="9" cy="7" r="4" />
            <path d="M22 21v-2a4 4 0 0 0-3-3.87" />
            <path d="M16 3.13a4 4 0 0 1 0 7.75" />
        </>
    })
}
