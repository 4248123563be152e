//! Fixed timestep simulation tick
//!
//! Ordering within a tick is fixed:
//! 1. physics step, contacts delivered to the player
//! 2. player update (cooldown first, then the state handler)
//! 3. charge signals forwarded to the stage
//! 4. cosmetic tweens advanced

use super::player::PlayerCtx;
use super::state::{Game, GameEvent, PlayerState, World};
use crate::horizontal_distance;
use crate::settings::Settings;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer (mouse button / touch) held this tick
    pub pointer_down: bool,
    /// Restart after game over
    pub restart: bool,
    /// Idle/demo mode - autopilot plays the game
    pub autopilot: bool,
}

/// Advance the game by one fixed timestep
pub fn tick(game: &mut Game, input: &TickInput, dt: f32) {
    game.events.clear();

    // A restart in flight blocks gameplay until the reload completes
    if let Some(task) = game.reload.as_mut() {
        if task.poll().is_pending() {
            return;
        }
        game.reload = None;
        finish_restart(game);
        return;
    }

    if input.restart
        && let Some(task) = game.session.restart()
    {
        // Nothing from the old run may animate past this point
        game.world.kill_tweens();
        game.audio.stop_all();
        game.reload = Some(task);
        return;
    }

    let pointer_down = if input.autopilot {
        autopilot_pointer(&game.world, &game.settings, dt)
    } else {
        input.pointer_down
    };

    let world = &mut game.world;
    world.time_ticks += 1;
    let now = world.time_secs();

    world.player.begin_tick();
    let contacts = world.physics.step(&mut world.body, world.stage.platforms(), dt);

    let mut ctx = PlayerCtx {
        body: &mut world.body,
        stage: &mut world.stage,
        session: &mut game.session,
        audio: &mut game.audio,
        events: &mut game.events,
    };
    for contact in contacts {
        world.player.on_contact(contact, &mut ctx);
    }
    world.player.update(now, pointer_down, &mut ctx);

    for event in &game.events {
        match event {
            GameEvent::ChargeStarted => world.stage.on_charge_started(),
            GameEvent::ChargeReleased { .. } => world.stage.on_charge_released(),
            GameEvent::Landed {
                reward: Some(_), ..
            } => {
                world.landings += 1;
                world.best_multiplier = world.best_multiplier.max(world.stage.multiplier());
            }
            _ => {}
        }
    }

    world.player.advance_cosmetics(dt);
    world.stage.advance(dt);

    if game.session.is_game_over() && !game.run_recorded {
        game.run_recorded = true;
        let score = game.session.score().total;
        let rank = game
            .high_scores
            .add_score(score, world.landings, world.best_multiplier, world.seed);
        if let Some(rank) = rank {
            log::info!("Run placed #{} with {} points", rank, score);
        }
    }
}

/// Rebuild the world and start the next run
fn finish_restart(game: &mut Game) {
    let seed = next_seed(game.world.seed);
    match World::new(&game.settings, seed) {
        Ok(world) => game.world = world,
        Err(e) => {
            log::error!("Failed to rebuild world: {}", e);
            return;
        }
    }
    game.run_recorded = false;
    game.session.start_game(&mut game.audio);
    game.events.push(GameEvent::RunStarted { seed });
}

/// Derive the next run's seed
pub fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407)
}

/// Pointer state the demo autopilot wants this tick
///
/// Charges for the time needed to reach the next platform center, with a
/// slow oscillating error so runs eventually end.
pub fn autopilot_pointer(world: &World, settings: &Settings, dt: f32) -> bool {
    let player = &world.player;
    let jump = &settings.jump;

    let target = world.stage.next_stage_position();
    let distance = horizontal_distance(world.body.position, target);
    let time_factor = world.time_ticks as f32 * 0.004;
    let error = 1.0 + time_factor.sin() * 0.15;
    let needed = jump.charge_for_distance(distance * error, dt);

    match player.state() {
        PlayerState::Idle => {
            player.is_input_enabled()
                && player.is_grounded()
                && !player.cooldown_active()
                && !player.is_falling(&world.body)
                && !player.is_shaking(&world.body)
        }
        PlayerState::Charging => {
            let next_now = (world.time_ticks + 1) as f32 * dt;
            let held = player
                .charge()
                .map(|c| next_now - c.started_at)
                .unwrap_or(0.0);
            // Release on the tick closest to the needed charge
            held + dt * 0.5 < needed
        }
        PlayerState::Jumping => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::physics::PhysicsBody;
    use crate::sim::session::SessionState;

    fn game(seed: u64) -> Game {
        Game::new(Settings::default(), seed).unwrap()
    }

    fn press() -> TickInput {
        TickInput {
            pointer_down: true,
            ..Default::default()
        }
    }

    /// Hold the pointer for `hold` ticks, then release and run `after` ticks
    fn hold_and_release(game: &mut Game, hold: u32, after: u32) {
        for _ in 0..hold {
            tick(game, &press(), SIM_DT);
        }
        for _ in 0..after {
            tick(game, &TickInput::default(), SIM_DT);
        }
    }

    /// Ticks to hold so the jump covers `distance`
    fn ticks_for(game: &Game, distance: f32) -> u32 {
        let charge = game.settings.jump.charge_for_distance(distance, SIM_DT);
        (charge / SIM_DT).round() as u32
    }

    fn distance_to_next(game: &Game) -> f32 {
        horizontal_distance(
            game.world.body.position,
            game.world.stage.next_stage_position(),
        )
    }

    /// Jump into the gap between the current and next platform
    fn fall_into_gap(game: &mut Game) {
        let next = game.world.stage.next();
        let near_edge = distance_to_next(game) - next.scale.x / 2.0;
        let current_edge = game.world.stage.current().scale.x / 2.0;
        let hold = ticks_for(game, (near_edge + current_edge) / 2.0);
        hold_and_release(game, hold, 600);
    }

    #[test]
    fn test_idle_without_input() {
        let mut g = game(1);
        for _ in 0..120 {
            tick(&mut g, &TickInput::default(), SIM_DT);
        }
        assert_eq!(g.world.player.state(), PlayerState::Idle);
        assert!(g.world.player.is_grounded());
        assert_eq!(g.session.score().total, 0);
    }

    #[test]
    fn test_charge_squashes_current_platform() {
        let mut g = game(2);
        tick(&mut g, &press(), SIM_DT);
        assert_eq!(g.world.player.state(), PlayerState::Charging);
        assert!(g.events.contains(&GameEvent::ChargeStarted));
        assert!(g.world.stage.is_deforming());
        assert!(g.audio.is_playing(crate::audio::CUE_ENERGY));
    }

    #[test]
    fn test_aimed_jump_lands_and_scores() {
        let mut g = game(3);
        let target = g.world.stage.next().id;
        let hold = ticks_for(&g, distance_to_next(&g));
        hold_and_release(&mut g, hold, 200);

        assert_eq!(g.world.stage.current().id, target);
        assert_eq!(g.world.player.state(), PlayerState::Idle);
        assert_eq!(g.world.landings, 1);
        assert!(g.session.score().total >= 1);
        assert!(!g.world.stage.is_deforming());
    }

    #[test]
    fn test_off_center_landing_must_settle_before_charging() {
        let mut g = game(12);
        let next = g.world.stage.next().clone();
        // Land just inside the near edge of the next platform
        let hold = ticks_for(&g, distance_to_next(&g) - next.scale.x / 2.0 + 0.1);
        for _ in 0..hold {
            tick(&mut g, &press(), SIM_DT);
        }
        let mut landed = false;
        for _ in 0..300 {
            tick(&mut g, &TickInput::default(), SIM_DT);
            if g.events.iter().any(|e| matches!(e, GameEvent::Landed { .. })) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(g.world.stage.current().id, next.id);

        // Still wobbling: the press is ignored
        tick(&mut g, &press(), SIM_DT);
        assert!(g.world.player.is_shaking(&g.world.body));
        assert_eq!(g.world.player.state(), PlayerState::Idle);

        tick(&mut g, &TickInput::default(), SIM_DT);
        for _ in 0..120 {
            tick(&mut g, &TickInput::default(), SIM_DT);
        }
        assert!(!g.world.player.is_shaking(&g.world.body));
        tick(&mut g, &press(), SIM_DT);
        assert_eq!(g.world.player.state(), PlayerState::Charging);
    }

    #[test]
    fn test_tap_hops_in_place_without_scoring() {
        let mut g = game(4);
        let start = g.world.stage.current().id;
        hold_and_release(&mut g, 1, 200);
        assert_eq!(g.world.stage.current().id, start);
        assert_eq!(g.world.player.state(), PlayerState::Idle);
        assert_eq!(g.session.score().total, 0);
        assert_eq!(g.world.stage.platforms().len(), 2);
    }

    #[test]
    fn test_falling_into_gap_ends_the_game() {
        let mut g = game(5);
        fall_into_gap(&mut g);
        assert!(g.session.is_game_over());
        assert!(g.world.player.is_dead());
        // Zero-point runs never reach the board
        assert!(g.high_scores.entries.is_empty());
    }

    #[test]
    fn test_restart_waits_for_reload() {
        let mut g = game(6);
        fall_into_gap(&mut g);
        assert!(g.session.is_game_over());

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut g, &restart, SIM_DT);
        assert!(g.is_reloading());

        // Still over while the reload is pending
        for _ in 0..RELOAD_TICKS {
            tick(&mut g, &TickInput::default(), SIM_DT);
            assert!(g.session.is_game_over());
        }
        tick(&mut g, &TickInput::default(), SIM_DT);
        assert!(!g.is_reloading());
        assert_eq!(g.session.state(), SessionState::InProgress);
        assert_eq!(g.session.score().total, 0);
        assert!(matches!(g.events[..], [GameEvent::RunStarted { .. }]));
        assert_eq!(g.world.player.state(), PlayerState::Idle);
        assert!(!g.world.player.is_dead());
        assert_eq!(g.world.time_ticks, 0);
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut g = game(7);
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut g, &restart, SIM_DT);
        assert!(!g.is_reloading());
    }

    #[test]
    fn test_restart_kills_tweens_before_rebuild() {
        let mut g = game(8);
        fall_into_gap(&mut g);
        // Start a squash on the doomed world, then restart
        g.world.stage.on_charge_started();
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut g, &restart, SIM_DT);
        assert!(!g.world.stage.is_deforming());
    }

    #[test]
    fn test_autopilot_lands() {
        let mut g = game(9);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..400 {
            tick(&mut g, &input, SIM_DT);
        }
        assert!(g.world.landings >= 1);
        assert!(g.session.score().total >= 1);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = game(10);
        let mut b = game(10);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..1200 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.session.score(), b.session.score());
        assert_eq!(a.world.body.position(), b.world.body.position());
        assert_eq!(a.world.stage.platforms().len(), b.world.stage.platforms().len());
    }
}
