use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use yew::functional::hook;
use yew::prelude::*;

use crate::env::{BrowserWindow, WindowListener};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    Scroll,
    Touch,
}

impl Interaction {
    pub const ALL: [Interaction; 2] = [Interaction::Scroll, Interaction::Touch];

    pub fn event_name(self) -> &'static str {
        match self {
            Interaction::Scroll => "scroll",
            Interaction::Touch => "touchstart",
        }
    }
}

/// Hidden until the first interaction, visible for the rest of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityGate {
    visible: bool,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` only for the interaction that opened the gate.
    pub fn trigger(&mut self, interaction: Interaction) -> bool {
        if self.visible {
            return false;
        }
        debug!("Waitlist banner revealed by first {:?}", interaction);
        self.visible = true;
        true
    }
}

#[hook]
pub fn use_first_interaction() -> bool {
    let visible = use_state_eq(|| false);

    {
        let visible = visible.clone();
        use_effect_with_deps(
            move |_| {
                let listeners: Rc<RefCell<Vec<WindowListener>>> = Rc::default();

                match BrowserWindow::current() {
                    Ok(browser) => {
                        let gate = Rc::new(RefCell::new(VisibilityGate::new()));

                        for interaction in Interaction::ALL {
                            let visible = visible.clone();
                            let gate = gate.clone();
                            let siblings = listeners.clone();

                            let registered = WindowListener::passive(
                                browser.raw(),
                                interaction.event_name(),
                                true,
                                move || {
                                    if gate.borrow_mut().trigger(interaction) {
                                        visible.set(true);
                                    }
                                    for listener in siblings.borrow().iter() {
                                        listener.detach();
                                    }
                                },
                            );

                            match registered {
                                Ok(listener) => listeners.borrow_mut().push(listener),
                                Err(err) => warn!("{}", err),
                            }
                        }
                    }
                    Err(err) => warn!("Waitlist banner stays hidden: {}", err),
                }

                // Handlers hold the list too; clearing it breaks the cycle.
                move || listeners.borrow_mut().clear()
            },
            (),
        );
    }

    *visible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        assert!(!VisibilityGate::new().is_visible());
    }

    #[test]
    fn first_interaction_opens_the_gate() {
        let mut gate = VisibilityGate::new();
        assert!(gate.trigger(Interaction::Touch));
        assert!(gate.is_visible());
    }

    #[test]
    fn later_interactions_are_no_ops() {
        let mut gate = VisibilityGate::new();
        assert!(gate.trigger(Interaction::Scroll));

        for interaction in [Interaction::Touch, Interaction::Scroll, Interaction::Scroll] {
            assert!(!gate.trigger(interaction));
            assert!(gate.is_visible());
        }
    }

    #[test]
    fn listens_for_scroll_and_touchstart() {
        let names: Vec<_> = Interaction::ALL.iter().map(|i| i.event_name()).collect();
        assert_eq!(names, ["scroll", "touchstart"]);
    }
}
