use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use gravity_runner::config::FIXED_DELTA_TIME;
use gravity_runner::{Action, Axis, Game, GameConfig, InputState, Pose, Result, TriggerKind};

const FRAMES: usize = 600;

/// Small obstacle course: a floor, a checkpoint at the start, a pit edge and a
/// killing block further ahead.
fn build_level(game: &mut Game, spawn: Pose) {
    game.add_solid(
        Pose::from_position(Vec3::new(0.0, -0.5, -10.0)),
        Vec3::new(5.0, 0.5, 15.0),
    );
    game.add_solid(
        Pose::new(Vec3::new(6.0, 3.0, -10.0), Quat::from_rotation_z(0.3)),
        Vec3::new(0.5, 4.0, 15.0),
    );
    game.add_checkpoint("start", spawn, Vec3::new(1.5, 1.5, 1.5));
    game.add_volume(
        TriggerKind::Area,
        Pose::from_position(Vec3::new(0.0, 5.0, -10.0)),
        Vec3::new(8.0, 10.0, 18.0),
    );
    game.add_volume(
        TriggerKind::Edge,
        Pose::from_position(Vec3::new(0.0, 1.0, -10.0)),
        Vec3::new(5.0, 1.5, 15.0),
    );
    game.add_volume(
        TriggerKind::Kill,
        Pose::from_position(Vec3::new(0.0, 0.5, -20.0)),
        Vec3::new(2.0, 0.5, 0.5),
    );
}

fn run(config: GameConfig) -> Result<()> {
    let spawn = Pose::from_position(Vec3::new(0.0, 1.0, 0.0));
    let mut game = Game::new(config, spawn);
    build_level(&mut game, spawn);

    let mut rng = SmallRng::seed_from_u64(2026);
    let mut input = InputState::new();
    input.set_axis(Axis::Vertical, 1.0);

    for frame in 0..FRAMES {
        // Jittered frame time around the fixed step
        let dt = FIXED_DELTA_TIME * rng.gen_range(0.5..2.0);

        input.handle_mouse_move(rng.gen_range(-0.2..0.2), rng.gen_range(-0.1..0.1));
        input.set_axis(Axis::Horizontal, rng.gen_range(-0.3..0.3));
        if rng.gen_bool(0.02) {
            input.handle_press(Action::Jump);
        } else {
            input.handle_release(Action::Jump);
        }
        if frame == FRAMES / 2 {
            input.handle_press(Action::ResetGravity);
        }

        game.update(&mut input, dt)?;

        if frame % 50 == 0 {
            let pose = game.player.pose(&game.world)?;
            log::info!(
                "frame {frame}: position {:.2?}, gravity {:.2?}, grounded {}, fade {:.2}",
                pose.position,
                game.world.gravity,
                game.player.is_grounded(),
                game.overlay.alpha()
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    if let Err(e) = run(config) {
        log::error!("Game error: {e}");
        std::process::exit(1);
    }
}
