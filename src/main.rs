//! Stage Runner entry point
//!
//! Runs a headless session with a simple autopilot standing in for the
//! renderer, input and physics layers, then prints the final HUD as JSON.
//!
//! Usage: `stage-runner [SETTINGS] [STAGES]`

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;

    use stage_runner::consts::*;
    use stage_runner::sim::{GameSession, PlayerSnapshot, ShopItem, TickInput};

    /// Downward acceleration per reference frame
    const GRAVITY: f32 = 0.7;
    /// Initial upward speed of a jump
    const JUMP_POWER: f32 = 13.0;
    /// Jump when the next obstacle's left edge is this far ahead of the player
    const JUMP_WINDOW: std::ops::Range<f32> = 8.0..14.0;
    /// Stop this short of the door and wait for it to open
    const DOOR_STOP: f32 = 10.0;

    /// Kinematic player that walks right, jumps hazards and shops
    pub struct Autopilot {
        pub pos: Vec2,
        pub vel: Vec2,
        on_ground: bool,
        shopped_stage: Option<u32>,
    }

    impl Autopilot {
        pub fn new(spawn: Vec2) -> Self {
            Self {
                pos: spawn,
                vel: Vec2::ZERO,
                on_ground: true,
                shopped_stage: None,
            }
        }

        pub fn snapshot(&self) -> PlayerSnapshot {
            PlayerSnapshot {
                pos: self.pos,
                vel: self.vel,
            }
        }

        pub fn reset(&mut self, pos: Vec2) {
            self.pos = pos;
            self.vel = Vec2::ZERO;
            self.on_ground = true;
        }

        /// Pick this frame's input
        pub fn decide(&mut self, session: &GameSession) -> TickInput {
            let mut input = TickInput::default();
            let stage = &session.stage;

            if stage.shop.is_open {
                match next_purchase(session) {
                    Some(index) => input.purchase = Some(index),
                    None => {
                        input.exit_shop = true;
                        self.shopped_stage = Some(session.stage_index);
                    }
                }
                return input;
            }
            if session.shop_near && self.shopped_stage != Some(session.stage_index) {
                input.open_shop = true;
                return input;
            }

            if stage.door.is_open() {
                input.jump = true;
                return input;
            }
            input.move_right = self.pos.x < stage.door.x - DOOR_STOP;

            let front = self.pos.x + PLAYER_WIDTH / 2.0;
            let hazard_ahead = stage.obstacles.iter().any(|o| {
                let left = if o.kind.is_spike() { o.x } else { o.x - o.width() / 2.0 };
                JUMP_WINDOW.contains(&(left - front))
            });
            input.jump = hazard_ahead && self.on_ground;
            input
        }

        /// Integrate one frame the way the game's physics layer would
        pub fn step(&mut self, session: &GameSession, input: &TickInput, scale: f32) {
            let speed = session.player_speed();
            self.vel.x = if session.stage.shop.is_open {
                0.0
            } else if input.move_right {
                speed
            } else if input.move_left {
                -speed
            } else {
                0.0
            };

            if input.jump && self.on_ground && session.jump_allowed() {
                self.vel.y = -JUMP_POWER;
                self.on_ground = false;
            }
            self.vel.y += GRAVITY * scale;
            self.pos += self.vel * scale;
            self.pos.x = session.clamp_player_x(self.pos.x);

            let rest_y = session.settings.ground_y - PLAYER_HEIGHT / 2.0;
            if !session.is_falling() && self.pos.y >= rest_y {
                self.pos.y = rest_y;
                self.vel.y = 0.0;
                self.on_ground = true;
            }
        }
    }

    /// Best shoe upgrade we can afford, else a heart if we are below the start count
    fn next_purchase(session: &GameSession) -> Option<usize> {
        let ledger = &session.ledger;
        let shoe = (1..=MAX_SHOE_TIER)
            .rev()
            .find(|&tier| ledger.can_buy(ShopItem::Shoe(tier)).is_ok());
        if let Some(tier) = shoe {
            return ShopItem::CATALOGUE
                .iter()
                .position(|item| *item == ShopItem::Shoe(tier));
        }
        let short_of_hearts = ledger.hearts < session.settings.starting_hearts;
        if short_of_hearts && ledger.can_buy(ShopItem::Heart).is_ok() {
            return Some(0);
        }
        None
    }
}

/// Headless stage runner
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings JSON file (defaults apply when omitted or unreadable)
    settings: Option<std::path::PathBuf>,

    /// Stop after clearing this many stages
    #[arg(default_value_t = 5)]
    stages: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use stage_runner::Settings;
    use stage_runner::sim::{FrameTime, GameEvent, GamePhase, GameSession, tick};

    /// Give up after this many frames (ten minutes at 60 FPS)
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    let args = Args::parse();
    env_logger::init();
    log::info!("Stage Runner (headless) starting...");

    let settings = match &args.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let target_stages = args.stages;

    let frame_secs = settings.target_fps.frame_secs();
    let scale = (frame_secs * 60.0) as f32;
    log::info!(
        "Target {} FPS, seed {}, clearing {target_stages} stages",
        settings.target_fps.as_str(),
        settings.seed
    );

    let mut session = GameSession::new(settings);
    let mut pilot = autopilot::Autopilot::new(session.spawn_point());
    let frames_per_sec = session.settings.target_fps.frames_per_sec() as u64;

    for frame in 0..MAX_FRAMES {
        let now = frame as f64 * frame_secs;
        let input = pilot.decide(&session);
        pilot.step(&session, &input, scale);
        tick(&mut session, &input, &pilot.snapshot(), FrameTime::new(scale, now));

        for event in session.drain_events() {
            if let Some(cue) = event.sound_cue() {
                log::debug!("Sound cue {cue:?}");
            }
            match event {
                GameEvent::PlayerReset { pos } => pilot.reset(pos),
                GameEvent::CoinCollected { .. } => log::debug!("{event:?}"),
                _ => log::info!("{event:?}"),
            }
        }

        if (frame + 1) % frames_per_sec == 0 {
            if let Some(line) = session.overlay_line(frames_per_sec as u32) {
                log::info!("[overlay] {line}");
            }
        }

        if session.phase == GamePhase::GameOver {
            break;
        }
        if session.stage_index > target_stages && session.phase == GamePhase::InProgress {
            log::info!("Reached stage {} after {frame} frames", session.stage_index);
            break;
        }
    }

    match serde_json::to_string_pretty(&session.hud()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize HUD: {err}"),
    }
    if let (Some(best), Some(stage)) = (session.records.top_score(), session.records.best_stage()) {
        println!("Best recorded score: {best}, furthest stage: {stage}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The engine is a library; web builds drive it from their own loop
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["stage-runner"]).unwrap();
        assert!(args.settings.is_none());
        assert_eq!(args.stages, 5);
    }

    #[test]
    fn test_args_settings_and_stages() {
        let args = Args::try_parse_from(["stage-runner", "cfg.json", "8"]).unwrap();
        assert_eq!(args.settings.as_deref(), Some(std::path::Path::new("cfg.json")));
        assert_eq!(args.stages, 8);
    }

    #[test]
    fn test_args_reject_bad_stage_count() {
        assert!(Args::try_parse_from(["stage-runner", "cfg.json", "five"]).is_err());
        assert!(Args::try_parse_from(["stage-runner", "cfg.json", "-2"]).is_err());
    }
}
