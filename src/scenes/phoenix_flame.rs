//! A small fire: two particle emitters sharing a fixed sprite budget.

use log::debug;

use super::director::Director;
use super::hud::{self, HudState};
use super::status::StatusText;
use crate::app::App;
use crate::audio::{PlayOptions, PlayType};
use crate::core::math::lerp;
use crate::core::rng::ShellRng;
use crate::lifecycle::{Component, Hooks};

pub const PARTICLES_ATLAS: &str = "textures/particles";
pub const AMBIENCE_SOUND: &str = "fire_ambience";
/// Live particles across all emitters.
pub const MAX_PARTICLES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub age: f64,
    pub lifetime: f64,
    pub scale: f64,
    pub alpha: f64,
}

/// Spawns particles at a fixed interval while the budget allows.
#[derive(Clone, Debug, PartialEq)]
pub struct FlameEmitter {
    pub spawn_interval: f64,
    pub lifetime: f64,
    /// Rise speed, units per ms.
    pub rise: f64,
    /// Horizontal spawn jitter.
    pub spread: f64,
    since_spawn: f64,
    pub particles: Vec<Particle>,
}

impl FlameEmitter {
    #[must_use]
    pub fn new(spawn_interval: f64, lifetime: f64, rise: f64, spread: f64) -> Self {
        Self {
            spawn_interval,
            lifetime,
            rise,
            spread,
            since_spawn: 0.0,
            particles: Vec::new(),
        }
    }

    fn age(&mut self, dt: f64) {
        self.since_spawn += dt;
        for particle in &mut self.particles {
            particle.age += dt;
            particle.y -= self.rise * dt;
            let t = (particle.age / particle.lifetime).min(1.0);
            particle.alpha = 1.0 - t;
            particle.scale = lerp(1.0, 0.3, t);
        }
        self.particles.retain(|p| p.age < p.lifetime);
    }

    /// Spawn one particle if due. Returns true if it did.
    fn try_spawn(&mut self, origin: (f64, f64), rng: &mut ShellRng) -> bool {
        if self.since_spawn < self.spawn_interval {
            return false;
        }
        self.since_spawn -= self.spawn_interval;
        let jitter = if self.spread > 0.0 {
            rng.gen_range_f64(-self.spread..self.spread)
        } else {
            0.0
        };
        self.particles.push(Particle {
            x: origin.0 + jitter,
            y: origin.1,
            age: 0.0,
            lifetime: self.lifetime,
            scale: 1.0,
            alpha: 1.0,
        });
        true
    }
}

/// Emitters plus the shared budget.
#[derive(Clone, Debug)]
pub struct Flame {
    pub emitters: Vec<FlameEmitter>,
    pub origin: (f64, f64),
    rng: ShellRng,
}

impl Flame {
    /// The scene's fire: a fast core and slow embers.
    #[must_use]
    pub fn new(rng: ShellRng) -> Self {
        Self {
            emitters: vec![
                FlameEmitter::new(90.0, 700.0, 0.25, 40.0),
                FlameEmitter::new(400.0, 1200.0, 0.4, 120.0),
            ],
            origin: (0.0, 0.0),
            rng,
        }
    }

    #[must_use]
    pub fn live_particles(&self) -> usize {
        self.emitters.iter().map(|e| e.particles.len()).sum()
    }

    pub fn update(&mut self, dt: f64) {
        for emitter in &mut self.emitters {
            emitter.age(dt);
        }
        let mut live = self.live_particles();
        for emitter in &mut self.emitters {
            while live < MAX_PARTICLES && emitter.try_spawn(self.origin, &mut self.rng) {
                live += 1;
            }
            // Over budget: drop what is due instead of queueing it.
            emitter.since_spawn = emitter.since_spawn.min(emitter.spawn_interval);
        }
    }
}

pub struct PhoenixFlameState {
    pub status: StatusText,
    pub flame: Flame,
    pub ambience_playing: bool,
    pub hud: Option<Component<HudState>>,
}

/// Build the fire scene.
pub fn create(app: &App, director: &Director) -> Component<PhoenixFlameState> {
    let state = PhoenixFlameState {
        status: StatusText::new(),
        flame: Flame::new(app.rng().for_context("phoenix_flame")),
        ambience_playing: false,
        hud: None,
    };
    let director = director.downgrade();

    let hooks = Hooks::new()
        .on_load(|state: &mut PhoenixFlameState, ctx| {
            state.status.display("Loading scene assets...");
            ctx.app().assets().add_atlas(PARTICLES_ATLAS, Some(1.0))?;
            state.status.hide();
            Ok(())
        })
        .on_load_error(|state, _, err| {
            state.status.display_error("Failed to load scene assets", err)
        })
        .on_init(move |state, ctx| {
            state.hud = Some(hud::attach(ctx, &director));
            let ambience = PlayOptions::new().with_type(PlayType::Attack);
            match ctx.app().audio().play(AMBIENCE_SOUND, ambience) {
                Ok(_) => state.ambience_playing = true,
                Err(err) => debug!("ambience skipped: {err}"),
            }
        })
        .on_resize(|state, _, event| state.flame.origin = (0.0, event.height * 0.25))
        .on_update(|state, _, dt| state.flame.update(dt))
        .on_unload(|state, ctx| {
            if state.ambience_playing {
                let release = PlayOptions::new().with_type(PlayType::Release);
                ctx.app().audio().play(AMBIENCE_SOUND, release)?;
                state.ambience_playing = false;
            }
            ctx.app().assets().unload(PARTICLES_ATLAS);
            Ok(())
        });

    Component::new(app, state, hooks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_shared() {
        let mut flame = Flame::new(ShellRng::new(3));
        let mut peak = 0;
        let mut embers_seen = false;
        for _ in 0..200 {
            flame.update(16.0);
            let live = flame.live_particles();
            assert!(live <= MAX_PARTICLES);
            peak = peak.max(live);
            embers_seen |= !flame.emitters[1].particles.is_empty();
        }
        assert_eq!(peak, MAX_PARTICLES);
        assert!(embers_seen);
    }

    #[test]
    fn test_particles_rise_and_fade() {
        let mut emitter = FlameEmitter::new(10.0, 100.0, 1.0, 0.0);
        emitter.age(10.0);
        assert!(emitter.try_spawn((0.0, 0.0), &mut ShellRng::new(1)));

        emitter.age(50.0);
        let particle = emitter.particles[0];
        assert_eq!(particle.y, -50.0);
        assert_eq!(particle.alpha, 0.5);

        emitter.age(50.0);
        assert!(emitter.particles.is_empty());
    }
}
