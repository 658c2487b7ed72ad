//! Per-frame update
//!
//! Called once per rendered frame with the player's position from the
//! physics layer. Rate-based changes scale with `FrameTime::scale`; the
//! stage advance delay runs on `FrameTime::now`.

use glam::Vec2;

use super::collision::{coin_hit, over_trap, spike_hit};
use super::entities::DoorTransition;
use super::events::GameEvent;
use super::ledger::ShopItem;
use super::state::{GamePhase, GameSession};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump key; also opens a nearby shop or walks through an open door
    pub jump: bool,
    pub open_shop: bool,
    pub advance_stage: bool,
    /// Catalogue index to buy while the shop is open
    pub purchase: Option<usize>,
    pub exit_shop: bool,
    pub restart_continue: bool,
    pub restart_full: bool,
    /// Debug coin cheat
    pub grant_coins: bool,
}

/// Player state reported by the physics layer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerSnapshot {
    /// Centre of the player's body
    pub pos: Vec2,
    pub vel: Vec2,
}

impl PlayerSnapshot {
    pub fn at(pos: Vec2) -> Self {
        Self { pos, vel: Vec2::ZERO }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Frame timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Elapsed time relative to a 60 Hz frame
    pub scale: f32,
    /// Wall clock in seconds
    pub now: f64,
}

impl FrameTime {
    pub fn new(scale: f32, now: f64) -> Self {
        Self { scale, now }
    }

    pub fn secs(&self) -> f32 {
        crate::scale_to_secs(self.scale)
    }

    /// Finite, non-negative scale and a finite clock
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale >= 0.0 && self.now.is_finite()
    }
}

/// Advance the session by one frame
pub fn tick(
    session: &mut GameSession,
    input: &TickInput,
    player: &PlayerSnapshot,
    frame: FrameTime,
) {
    if !player.is_finite() {
        log::warn!(
            "Invalid player state pos={:?} vel={:?}, resetting",
            player.pos,
            player.vel
        );
        let pos = session.spawn_point();
        session.push_event(GameEvent::PlayerReset { pos });
        return;
    }
    if !frame.is_valid() {
        log::warn!(
            "Invalid frame timing scale={} now={}, skipping frame",
            frame.scale,
            frame.now
        );
        return;
    }

    if input.restart_full {
        session.restart_full();
        return;
    }
    if input.restart_continue {
        session.restart_continue();
        return;
    }
    if session.phase == GamePhase::GameOver {
        return;
    }

    if input.grant_coins {
        session.grant_debug_coins();
    }

    session.poll_pending_stage(frame.now, player.pos.x);

    let shop_open = update_shop(session, input, player.pos.x);

    if !shop_open {
        if input.move_right {
            session.odometer.advance(1.0, frame.scale);
        } else if input.move_left {
            session.odometer.advance(-1.0, frame.scale);
        }
    }

    resolve_hazards(session, player.pos);
    session.advance_timers(frame.secs());

    if player.pos.y > session.out_of_world_y() {
        session.game_over("fell out of the world");
    }
    if session.phase == GamePhase::GameOver {
        return;
    }

    session.stage.sweep_behind_start();

    if session.phase == GamePhase::InProgress {
        match session.stage.door.update(player.pos.x, frame.scale) {
            Some(DoorTransition::StartedOpening) => session.push_event(GameEvent::DoorOpening),
            Some(DoorTransition::Opened) => session.push_event(GameEvent::DoorOpened),
            None => {}
        }

        if !shop_open && (input.advance_stage || input.jump) && session.stage.door.is_open() {
            session.advance_stage(frame.now);
        }
    }
}

/// Proximity, opening, buying and closing; returns whether the shop is open
fn update_shop(session: &mut GameSession, input: &TickInput, player_x: f32) -> bool {
    session.update_shop_proximity(player_x);

    if !session.stage.shop.is_open {
        if (input.open_shop || input.jump) && session.shop_near {
            session.open_shop();
        }
        // The key that opened the shop must not also buy on the same frame
        return session.stage.shop.is_open;
    }

    if let Some(index) = input.purchase {
        match ShopItem::from_index(index) {
            Some(item) => {
                // Refusals are reported through events and the notice
                let _ = session.buy(item);
            }
            None => log::warn!("No shop item at index {index}"),
        }
    }
    if input.exit_shop {
        session.close_shop();
    }
    session.stage.shop.is_open
}

fn resolve_hazards(session: &mut GameSession, pos: Vec2) {
    let mut picked = 0;
    for coin in session.stage.coins.iter_mut() {
        if coin_hit(pos, coin) {
            coin.collected = true;
            picked += 1;
        }
    }
    for _ in 0..picked {
        session.ledger.collect_coin();
        let total = session.ledger.stage_coins;
        session.push_event(GameEvent::CoinCollected { total });
    }

    let spiked = session
        .stage
        .obstacles
        .iter()
        .any(|o| o.kind.is_spike() && spike_hit(pos, o));
    if spiked {
        session.hit_spike();
    }

    if !session.is_falling() && session.stage.obstacles.iter().any(|o| over_trap(pos, o)) {
        session.fall_into_trap();
    }
}
