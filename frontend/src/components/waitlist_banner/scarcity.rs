use gloo_timers::callback::Interval;
use log::debug;
use yew::functional::hook;
use yew::prelude::*;

use crate::config;

/// Uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// `Math.random()` from the host page.
#[derive(Clone, Copy, Debug, Default)]
pub struct MathRandom;

impl RandomSource for MathRandom {
    fn next_f64(&mut self) -> f64 {
        web_sys::js_sys::Math::random()
    }
}

/// Maps a draw to a decrement of 0 or 1.
pub fn decrement_for(draw: f64) -> u32 {
    ((draw * 2.0).floor() as u32).min(1)
}

/// Cosmetic "spots left" counter. Never drops below one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpotsRemaining(u32);

impl SpotsRemaining {
    pub fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn decay(&mut self, random: &mut impl RandomSource) -> u32 {
        let decrement = decrement_for(random.next_f64());
        self.0 = self.0.saturating_sub(decrement).max(1);
        self.0
    }
}

#[hook]
pub fn use_spots_remaining(seed: u32) -> u32 {
    let spots = use_state_eq(|| SpotsRemaining::new(seed).get());

    {
        let spots = spots.clone();
        use_effect_with_deps(
            move |seed| {
                let mut counter = SpotsRemaining::new(*seed);
                spots.set(counter.get());

                let mut random = MathRandom;
                let interval = Interval::new(config::SPOTS_DECAY_MS, move || {
                    let next = counter.decay(&mut random);
                    debug!("Spots remaining now {}", next);
                    spots.set(next);
                });

                move || drop(interval)
            },
            seed,
        );
    }

    *spots
}
