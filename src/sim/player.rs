//! The player body
//!
//! The orchestrator only drives it through `update`, `jump`, `hitbox` and the
//! bonus setters; everything else is internal physics.

use glam::Vec2;

use super::util::Rect;
use crate::consts::*;
use crate::snap_quarter_turn;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity_y: f32,
    pub on_ground: bool,
    pub rotation: f32,
    pub jumps_left: u32,
    pub max_jumps: u32,
    pub is_invincible: bool,
    base_size: Vec2,
    base_max_jumps: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        let size = Vec2::splat(PLAYER_SIZE);
        Self {
            pos: Vec2::new(PLAYER_INITIAL_X, GROUND_Y - size.y),
            size,
            velocity_y: 0.0,
            on_ground: true,
            rotation: 0.0,
            jumps_left: MAX_JUMPS,
            max_jumps: MAX_JUMPS,
            is_invincible: false,
            base_size: size,
            base_max_jumps: MAX_JUMPS,
        }
    }

    /// Jump count before any bonus changed it
    pub fn base_max_jumps(&self) -> u32 {
        self.base_max_jumps
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn jump(&mut self) {
        if self.jumps_left > 0 {
            self.velocity_y = -JUMP_VELOCITY;
            self.on_ground = false;
            self.jumps_left -= 1;
        }
    }

    /// Snap onto a surface and refill jumps
    pub fn land(&mut self, surface_y: f32) {
        self.pos.y = surface_y - self.size.y;
        self.velocity_y = 0.0;
        self.on_ground = true;
        self.jumps_left = self.max_jumps;
        self.rotation = snap_quarter_turn(self.rotation);
    }

    /// Apply gravity and resolve landing against the given platform tops
    pub fn update(&mut self, platforms: &[Rect]) {
        self.velocity_y += GRAVITY;
        let next_y = self.pos.y + self.velocity_y;

        // Platforms only catch the player while falling
        let mut landed = false;
        if self.velocity_y > 0.0 {
            for platform in platforms {
                let horizontal = self.pos.x < platform.right() && self.pos.x + self.size.x > platform.pos.x;
                // Allow landing from 1px inside the top edge
                let crossing = self.bottom() <= platform.pos.y + 1.0 && next_y + self.size.y >= platform.pos.y;
                if horizontal && crossing {
                    self.land(platform.pos.y);
                    landed = true;
                    break;
                }
            }
        }

        if !landed {
            self.pos.y = next_y;
            if self.bottom() >= GROUND_Y {
                self.land(GROUND_Y);
            } else {
                self.on_ground = false;
            }
        }

        if self.on_ground {
            self.rotation = snap_quarter_turn(self.rotation);
        } else {
            self.rotation += PLAYER_ROTATION_SPEED;
        }
    }

    /// Collision box, inset by a fraction of the current size
    pub fn hitbox(&self) -> Rect {
        let pad = self.size.x * HITBOX_PADDING_RATIO;
        Rect::new(
            self.pos.x + pad,
            self.pos.y + pad,
            self.size.x - pad * 2.0,
            self.size.y - pad * 2.0,
        )
    }

    // --- Bonus hooks ---

    pub fn set_tiny(&mut self, tiny: bool) {
        if tiny {
            let shrunk = self.base_size * PLAYER_TINY_SCALE;
            // Keep the feet where they were
            self.pos.y += self.size.y - shrunk.y;
            self.size = shrunk;
        } else {
            let grown_y = self.pos.y - (self.base_size.y - self.size.y);
            self.pos.y = grown_y.min(GROUND_Y - self.base_size.y);
            self.size = self.base_size;
        }
    }

    pub fn set_invincible(&mut self, invincible: bool) {
        self.is_invincible = invincible;
    }

    pub fn set_max_jumps(&mut self, count: u32) {
        self.max_jumps = count;
        self.jumps_left = self.jumps_left.min(count);
    }

    pub fn reset_max_jumps(&mut self) {
        self.set_max_jumps(self.base_max_jumps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_jump_then_exhausted() {
        let mut player = Player::new();
        player.jump();
        player.jump();
        assert_eq!(player.jumps_left, 0);
        let vy = player.velocity_y;
        player.update(&[]);
        player.jump();
        assert_eq!(player.velocity_y, vy + GRAVITY);
    }

    #[test]
    fn test_lands_on_platform_one_pixel_below() {
        let mut player = Player::new();
        let platform = Rect::new(60.0, 200.0, 120.0, PLATFORM_HEIGHT);
        // Mid-air, feet 1px above the platform top, falling
        player.pos.y = platform.pos.y - 1.0 - player.size.y;
        player.velocity_y = 2.0;
        player.on_ground = false;
        player.jumps_left = 0;

        player.update(&[platform]);

        assert_eq!(player.bottom(), platform.pos.y);
        assert_eq!(player.velocity_y, 0.0);
        assert_eq!(player.jumps_left, player.max_jumps);
        assert!(player.on_ground);
    }

    #[test]
    fn test_rising_player_passes_through_platform() {
        let mut player = Player::new();
        let platform = Rect::new(60.0, 300.0, 120.0, PLATFORM_HEIGHT);
        player.jump();
        player.update(&[platform]);
        assert!(player.velocity_y < 0.0);
        assert!(!player.on_ground);
    }

    #[test]
    fn test_falls_to_ground() {
        let mut player = Player::new();
        player.pos.y = 100.0;
        player.on_ground = false;
        for _ in 0..200 {
            player.update(&[]);
        }
        assert_eq!(player.bottom(), GROUND_Y);
        assert!(player.on_ground);
        assert_eq!(player.rotation, snap_quarter_turn(player.rotation));
    }

    #[test]
    fn test_tiny_keeps_feet_and_restores() {
        let mut player = Player::new();
        let feet = player.bottom();
        player.set_tiny(true);
        assert!((player.bottom() - feet).abs() < 1e-4);
        assert!(player.size.x < PLAYER_SIZE);
        player.set_tiny(false);
        assert_eq!(player.size, Vec2::splat(PLAYER_SIZE));
        assert!((player.bottom() - feet).abs() < 1e-4);
    }

    #[test]
    fn test_hitbox_is_inset() {
        let player = Player::new();
        let hb = player.hitbox();
        assert!(hb.pos.x > player.pos.x);
        assert!(hb.bottom() < player.bottom());
    }

    #[test]
    fn test_max_jumps_caps_remaining() {
        let mut player = Player::new();
        player.set_max_jumps(3);
        assert_eq!(player.jumps_left, MAX_JUMPS);
        player.set_max_jumps(1);
        assert_eq!(player.jumps_left, 1);
        player.reset_max_jumps();
        assert_eq!(player.max_jumps, MAX_JUMPS);
    }
}
