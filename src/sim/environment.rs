//! Ambient particles (fire embers, waterfall, rain)
//!
//! Purely visual. Uses its own RNG stream so toggling particles in the
//! settings never changes what spawns.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::entity::{Entity, EntityKind};
use super::util::random_int;
use crate::consts::*;
use crate::settings::Settings;
use crate::theme::Theme;

const EMBER_RATE: f64 = 0.3;
const WATERFALL_RATE: f64 = 0.8;
/// Chance per tick to drop one leftover particle after the theme changed
const FADE_RATE: f64 = 0.1;
const WATERFALL_HALF_WIDTH: i32 = 50;
const WATERFALL_LIFE: u32 = 100;
const RAIN_LIFE: u32 = 60;
/// Keeps the ambient stream apart from the gameplay stream for the same seed
const STREAM_SALT: u64 = 0x5eed_a4b1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Ticks left
    pub life: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub fire: Vec<Particle>,
    pub waterfall: Vec<Particle>,
    pub rain: Vec<Particle>,
    rng: Pcg32,
}

impl Environment {
    pub fn new(seed: u64) -> Self {
        Self {
            fire: Vec::new(),
            waterfall: Vec::new(),
            rain: Vec::new(),
            rng: Pcg32::seed_from_u64(seed ^ STREAM_SALT),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.fire.len() + self.waterfall.len() + self.rain.len()
    }

    pub fn clear(&mut self) {
        self.fire.clear();
        self.waterfall.clear();
        self.rain.clear();
    }

    pub fn update(&mut self, theme: &Theme, entities: &[Entity], settings: &Settings) {
        if !settings.particles {
            self.clear();
            return;
        }
        let budget = settings.max_particles();

        self.update_fire(budget);
        self.update_waterfall(theme, budget);
        self.update_rain(theme, entities, budget);
    }

    fn has_room(&self, budget: usize) -> bool {
        self.particle_count() < budget
    }

    fn update_fire(&mut self, budget: usize) {
        if self.has_room(budget) && self.rng.random_bool(EMBER_RATE) {
            let ember = Particle {
                pos: Vec2::new(
                    random_int(&mut self.rng, 0, GAME_WIDTH as i32) as f32,
                    GROUND_Y - random_int(&mut self.rng, 0, 15) as f32,
                ),
                vel: Vec2::ZERO,
                size: random_int(&mut self.rng, 3, 8) as f32,
                life: random_int(&mut self.rng, 20, 50) as u32,
            };
            self.fire.push(ember);
        }

        let rng = &mut self.rng;
        self.fire.retain_mut(|p| {
            p.life = p.life.saturating_sub(1);
            p.pos.y -= 0.5 + rng.random::<f32>() * 0.5;
            p.pos.x += (rng.random::<f32>() - 0.5) * 0.5;
            p.size *= 0.98;
            p.life > 0 && p.size > 0.5
        });
    }

    fn update_waterfall(&mut self, theme: &Theme, budget: usize) {
        if theme.is_wet() {
            if self.has_room(budget) && self.rng.random_bool(WATERFALL_RATE) {
                let center = (GAME_WIDTH / 2.0) as i32;
                let drop = Particle {
                    pos: Vec2::new(
                        random_int(&mut self.rng, center - WATERFALL_HALF_WIDTH, center + WATERFALL_HALF_WIDTH) as f32,
                        -10.0,
                    ),
                    vel: Vec2::new(0.0, random_int(&mut self.rng, 4, 8) as f32),
                    size: 2.0,
                    life: WATERFALL_LIFE,
                };
                self.waterfall.push(drop);
            }
        } else if !self.waterfall.is_empty() && self.rng.random_bool(FADE_RATE) {
            self.waterfall.remove(0);
        }

        self.waterfall.retain_mut(|p| {
            p.life = p.life.saturating_sub(1);
            p.pos.y += p.vel.y;
            p.vel.y += 0.1;
            p.life > 0 && p.pos.y < GROUND_Y
        });
    }

    fn update_rain(&mut self, theme: &Theme, entities: &[Entity], budget: usize) {
        if theme.is_wet() {
            for cloud in entities.iter().filter(|e| e.kind == EntityKind::RainCloud) {
                if !self.has_room(budget) {
                    break;
                }
                if self.rng.random::<f32>() < RAIN_RATE {
                    let x = cloud.pos.x + random_int(&mut self.rng, 5, cloud.size.x as i32 - 5) as f32;
                    let vy = RAIN_SPEED + random_int(&mut self.rng, -2, 2) as f32;
                    self.rain.push(Particle {
                        pos: Vec2::new(x, cloud.pos.y + cloud.size.y - 5.0),
                        vel: Vec2::new(0.0, vy),
                        size: 1.5,
                        life: RAIN_LIFE,
                    });
                }
            }
        } else if !self.rain.is_empty() && self.rng.random_bool(FADE_RATE) {
            self.rain.remove(0);
        }

        self.rain.retain_mut(|p| {
            p.life = p.life.saturating_sub(1);
            p.pos.y += p.vel.y;
            p.life > 0 && p.pos.y < GROUND_Y
        });
    }
}
