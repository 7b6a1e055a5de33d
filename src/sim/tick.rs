//! Fixed timestep simulation tick
//!
//! One call advances a running game by exactly one frame. Paused and
//! finished runs are left untouched.

use super::bonus::{BonusKind, FEWER_OBSTACLES_FACTOR, SPEED_DECREASE_FACTOR};
use super::collision::{CollisionResult, resolve_collisions};
use super::entity::{EntityKind, UpdateContext};
use super::factory::create_entity;
use super::pause::Transition;
use super::state::GameState;
use super::util::Rect;
use crate::consts::*;
use crate::error::Error;
use crate::theme::THEMES;

/// What the caller's frame driver should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking
    Continue,
    /// A letter pause just started; the transition's effects are still pending
    EnteredPause(Transition),
    /// Already paused or over; nothing changed
    Idle,
    /// A fatal collision ended the run this tick
    GameOver,
}

/// True when `score` sits in a later `interval` bucket than `last`
fn crossed(score: f32, last: f32, interval: f32) -> bool {
    (score / interval).floor() > (last / interval).floor()
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState) -> Result<TickOutcome, Error> {
    if !state.is_running() {
        return Ok(TickOutcome::Idle);
    }

    state.frame += 1;
    state.score += state.tuning.score_multiplier * state.speed;

    advance_difficulty(state);

    if crossed(state.score, state.last_theme_score, state.tuning.theme_switch_interval) {
        state.theme_index = (state.theme_index + 1) % THEMES.len();
        state.last_theme_score = state.score;
        state.apply_theme();
        log::info!("Theme switched to {}", state.theme.name);
    }

    if crossed(state.score, state.last_letter_score, state.tuning.letter_pause_interval) {
        if let Some(transition) = state.enter_letter_pause() {
            return Ok(TickOutcome::EnteredPause(transition));
        }
    }

    state.tick_bonus();

    // Decorative offsets
    state.grid_offset = (state.grid_offset - state.speed * 0.1) % GRID_SIZE;
    if state.settings.animate_background() {
        state.wave_offset = (state.wave_offset + state.speed * 0.05) % std::f32::consts::TAU;
    }

    let platforms: Vec<Rect> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_platform())
        .map(|e| e.rect())
        .collect();
    state.player.update(&platforms);

    spawn(state);

    let ctx = UpdateContext {
        speed: state.speed,
        frame: state.frame,
        player: &state.player,
        difficulty: state.difficulty,
    };
    for entity in state.entities.iter_mut() {
        entity.update(&ctx);
    }
    state.entities.retain(|e| !e.to_be_removed);

    // Mounted shooters follow their platform's position from this tick
    let platforms: Vec<Rect> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_platform())
        .map(|e| e.rect())
        .collect();
    for entity in state.entities.iter_mut().filter(|e| e.kind == EntityKind::Shooter) {
        entity.ride(&platforms);
    }
    // The gap tracker follows its entity's trailing edge
    state.last_ground_end_x -= state.speed;

    state.environment.update(&state.theme, &state.entities, &state.settings);

    drift(state);

    if let CollisionResult::Fatal { kind, .. } = resolve_collisions(&state.player, &state.entities) {
        log::debug!("Fatal collision with {:?} at frame {}", kind, state.frame);
        state.game_over(None);
        return Ok(TickOutcome::GameOver);
    }

    state.update_messages();

    state.check_invariants()?;
    Ok(TickOutcome::Continue)
}

/// Step the difficulty level when the next milestone is reached
fn advance_difficulty(state: &mut GameState) {
    let milestone = state.tuning.difficulty_milestone;
    if state.score < state.last_difficulty_score + milestone {
        return;
    }
    state.difficulty += 1;
    state.last_difficulty_score += milestone;

    state.speed = state.tuning.milestone_speed(state.difficulty);
    state.base_speed = state.speed;
    state.spawn_rate = state.tuning.milestone_spawn_rate(state.difficulty);
    state.base_spawn_rate = state.spawn_rate;
    log::info!(
        "Difficulty Increased! Level: {}, Speed: {:.2}, Spawn Rate: {:.2}",
        state.difficulty,
        state.speed,
        state.spawn_rate
    );

    // An active bonus stays in effect on top of the new baseline
    match state.bonus_kind() {
        Some(BonusKind::SpeedDecrease) => state.speed *= SPEED_DECREASE_FACTOR,
        Some(BonusKind::FewerObstacles) => state.spawn_rate *= FEWER_OBSTACLES_FACTOR,
        _ => {}
    }
}

/// Count down the spawn timer and ask the factory for something new
fn spawn(state: &mut GameState) {
    state.spawn_timer -= 1.0;
    if state.spawn_timer > 0.0 {
        return;
    }

    let spawned = create_entity(
        &state.entities,
        state.last_ground_end_x,
        &state.theme,
        state.difficulty,
        &mut state.rng,
    );
    match spawned {
        Some(entity) => {
            if entity.kind.is_ground_anchored() {
                state.last_ground_end_x = entity.right();
            }
            state.entities.push(entity);
        }
        None => {
            state.spawn_timer = (state.spawn_timer * state.tuning.spawn_retry_factor).max(state.tuning.spawn_retry_floor);
            if !state.theme.lava_capable() {
                state.last_ground_end_x = GAME_WIDTH;
            }
        }
    }

    // Every attempt, hit or miss, waits a full spawn interval
    state.spawn_timer = state.spawn_rate.floor();
}

/// Continuous ramp between milestones, suspended for whichever value a bonus holds
fn drift(state: &mut GameState) {
    let bonus = state.bonus_kind();
    let tuning = &state.tuning;

    if bonus != Some(BonusKind::SpeedDecrease) && state.base_speed < tuning.max_speed {
        state.base_speed = (state.base_speed + tuning.speed_increase).min(tuning.max_speed);
        state.speed = state.base_speed;
    }
    if bonus != Some(BonusKind::FewerObstacles) && state.base_spawn_rate > tuning.min_spawn_rate {
        state.base_spawn_rate =
            (state.base_spawn_rate - tuning.spawn_rate_decrease / FRAMES_PER_SECOND).max(tuning.min_spawn_rate);
        state.spawn_rate = state.base_spawn_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::bonus::BONUS_CATALOG;
    use crate::sim::pause::PauseState;
    use crate::tuning::Tuning;

    fn state(seed: u64) -> GameState {
        GameState::new(seed, Tuning::default(), Settings::default())
    }

    /// Invincible so collisions never end the run under test
    fn immortal(seed: u64) -> GameState {
        let mut s = state(seed);
        s.player.set_invincible(true);
        s
    }

    #[test]
    fn test_tick_advances_score_and_frame() {
        let mut s = immortal(1);
        assert_eq!(tick(&mut s).unwrap(), TickOutcome::Continue);
        assert_eq!(s.frame, 1);
        assert!((s.score - s.tuning.score_multiplier * s.tuning.initial_speed).abs() < 1e-6);
    }

    #[test]
    fn test_letter_threshold_pauses_and_freezes_score() {
        let mut s = immortal(2);
        s.score = s.tuning.letter_pause_interval - 0.1;
        // Keep the other milestones out of the way
        s.last_difficulty_score = s.score;
        s.last_theme_score = s.score;

        let outcome = tick(&mut s).unwrap();
        assert!(matches!(outcome, TickOutcome::EnteredPause(_)));
        assert_eq!(s.pause, PauseState::ShowingIcon);

        let frozen = s.score;
        let frame = s.frame;
        for _ in 0..10 {
            assert_eq!(tick(&mut s).unwrap(), TickOutcome::Idle);
        }
        assert_eq!(s.score, frozen);
        assert_eq!(s.frame, frame);
    }

    #[test]
    fn test_score_on_letter_boundary_pauses_next_tick() {
        let mut s = immortal(12);
        s.score = s.tuning.letter_pause_interval;
        s.last_difficulty_score = s.score;
        s.last_theme_score = s.score;
        assert!(matches!(tick(&mut s).unwrap(), TickOutcome::EnteredPause(_)));
        assert!(s.letter.is_some());
        assert_eq!(s.bonus_options.len(), BONUS_CHOICE_COUNT);
    }

    #[test]
    fn test_difficulty_milestone_recomputes_baseline() {
        let mut s = immortal(3);
        s.score = s.tuning.difficulty_milestone - 0.1;
        s.last_theme_score = s.score;
        tick(&mut s).unwrap();
        assert_eq!(s.difficulty, 1);
        assert_eq!(s.last_difficulty_score, s.tuning.difficulty_milestone);
        let expected = s.tuning.milestone_speed(1) + s.tuning.speed_increase;
        assert!((s.speed - expected).abs() < 1e-5);
    }

    #[test]
    fn test_milestone_keeps_speed_bonus() {
        let mut s = immortal(4);
        let slow = *BONUS_CATALOG.iter().find(|b| b.kind == BonusKind::SpeedDecrease).unwrap();
        s.apply_bonus(slow);
        s.score = s.tuning.difficulty_milestone - 0.1;
        s.last_theme_score = s.score;
        tick(&mut s).unwrap();
        let expected = s.tuning.milestone_speed(1) * SPEED_DECREASE_FACTOR;
        assert!((s.speed - expected).abs() < 1e-5);
        assert_eq!(s.base_speed, s.tuning.milestone_speed(1));
    }

    #[test]
    fn test_theme_cycles_on_interval() {
        let mut s = immortal(5);
        s.score = s.tuning.theme_switch_interval - 0.1;
        s.last_difficulty_score = s.score;
        tick(&mut s).unwrap();
        assert_eq!(s.theme_index, 1);
        assert_eq!(s.theme, THEMES[1]);
    }

    #[test]
    fn test_extra_jump_expires_to_captured_value() {
        let mut s = immortal(6);
        let before = s.player.max_jumps;
        let mut extra = *BONUS_CATALOG.iter().find(|b| b.kind == BonusKind::ExtraJump).unwrap();
        extra.duration = 30;
        s.apply_bonus(extra);
        assert_eq!(s.player.max_jumps, before + 1);
        for _ in 0..30 {
            tick(&mut s).unwrap();
        }
        assert!(s.active_bonus.is_none());
        assert_eq!(s.player.max_jumps, before);
    }

    #[test]
    fn test_failed_spawn_waits_full_interval() {
        let mut s = immortal(7);
        // A crowded right edge forces every candidate except lasers to abort
        let mut blocker = crate::sim::entity::Entity::spike();
        blocker.pos.x = GAME_WIDTH + 500.0;
        s.entities.push(blocker);
        s.spawn_timer = 1.0;
        s.spawn_rate = 100.0;
        s.base_spawn_rate = 100.0;
        tick(&mut s).unwrap();
        assert_eq!(s.entities.len(), 1);
        assert_eq!(s.spawn_timer, 100.0);
        // Snapped to the edge, then scrolled with this tick's speed
        assert_eq!(s.last_ground_end_x, GAME_WIDTH - s.tuning.initial_speed);
    }

    #[test]
    fn test_successful_spawn_waits_floored_interval() {
        let mut s = immortal(12);
        s.spawn_timer = 1.0;
        s.spawn_rate = 99.6;
        s.base_spawn_rate = 99.6;
        tick(&mut s).unwrap();
        assert_eq!(s.entities.len(), 1);
        assert_eq!(s.spawn_timer, 99.0);
    }

    #[test]
    fn test_mounted_shooter_rides_bobbing_platform() {
        use rand::SeedableRng;
        let mut s = immortal(13);
        s.spawn_timer = 1000.0;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(4);
        let mut platform = crate::sim::entity::Entity::moving_platform(&mut rng);
        platform.pos.x = 400.0;
        let mut shooter = crate::sim::entity::Entity::shooter(platform.pos.y);
        shooter.pos.x = 420.0;
        s.entities.push(platform);
        s.entities.push(shooter);

        for _ in 0..30 {
            tick(&mut s).unwrap();
            let (platform, shooter) = (&s.entities[0], &s.entities[1]);
            assert!((shooter.pos.y + shooter.size.y - platform.pos.y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_collision_ends_run() {
        let mut s = state(8);
        let mut spike = crate::sim::entity::Entity::spike();
        spike.pos.x = s.player.pos.x + s.speed;
        s.entities.push(spike);
        assert_eq!(tick(&mut s).unwrap(), TickOutcome::GameOver);
        assert!(s.is_game_over);
        assert_eq!(tick(&mut s).unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = immortal(99);
        let mut b = immortal(99);
        for _ in 0..3000 {
            let oa = tick(&mut a).unwrap();
            let ob = tick(&mut b).unwrap();
            assert_eq!(oa, ob);
            if a.pause.is_paused() {
                a.resume_from_letter();
                b.resume_from_letter();
            }
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_drift_is_held_by_bonus() {
        let mut s = immortal(10);
        let fewer = *BONUS_CATALOG.iter().find(|b| b.kind == BonusKind::FewerObstacles).unwrap();
        s.apply_bonus(fewer);
        let rate = s.spawn_rate;
        let speed = s.speed;
        tick(&mut s).unwrap();
        assert_eq!(s.spawn_rate, rate);
        assert!(s.speed > speed);
    }

    #[test]
    fn test_at_most_one_laser_over_long_run() {
        let mut s = immortal(11);
        s.difficulty = 3;
        s.last_difficulty_score = f32::MAX / 2.0;
        for _ in 0..5000 {
            tick(&mut s).unwrap();
            assert!(s.laser_count() <= 1);
            if s.pause.is_paused() {
                s.resume_from_letter();
            }
        }
    }
}
