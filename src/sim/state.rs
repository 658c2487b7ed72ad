//! Session state
//!
//! `GameSession` owns everything a run needs: the current stage, the ledger,
//! distance travelled, player-facing timers and the pending stage advance.
//! The per-frame driver lives in `tick`; the methods here are the state
//! transitions it (and tests) call.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::DoorState;
use super::events::GameEvent;
use super::ledger::{Ledger, PurchaseRejection, ShopItem};
use super::stage::{Stage, build_stage};
use super::timers::{Deferred, TimedEffect};
use crate::consts::*;
use crate::records::{RunRecord, RunRecords};
use crate::settings::Settings;

/// Stage lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Stage playable, door animating as the player approaches
    InProgress,
    /// Door used; next stage is built after a short delay
    Cleared,
    /// Run ended, waiting for a restart
    GameOver,
}

/// Distance travelled, in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Odometer {
    pub total: f32,
    /// Distance on the current stage
    pub stage: f32,
    /// Total at the last clear or game over
    pub saved_total: f32,
}

impl Odometer {
    /// Move one frame; `direction` is 1.0 for right and -1.0 for left
    pub fn advance(&mut self, direction: f32, scale: f32) {
        // One meter per second of held movement
        let delta = direction * crate::scale_to_secs(scale);
        self.total = (self.total + delta).max(0.0);
        self.stage = (self.stage + delta).max(0.0);
    }

    pub fn save(&mut self) {
        self.saved_total = self.total;
    }

    pub fn start_stage(&mut self) {
        self.stage = 0.0;
    }

    /// Back to the saved total
    pub fn restore(&mut self) {
        self.total = self.saved_total;
        self.stage = 0.0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Purchase rejection shown to the player for a few seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub reason: PurchaseRejection,
    pub timer: TimedEffect,
}

impl Notice {
    pub fn new(reason: PurchaseRejection) -> Self {
        Self {
            reason,
            timer: TimedEffect::start(NOTICE_SECS),
        }
    }
}

/// Everything the HUD draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub stage: u32,
    pub phase: GamePhase,
    /// Whole meters
    pub total_distance: u64,
    pub stage_distance: u64,
    pub stage_length: u32,
    pub obstacles: usize,
    pub hearts: u8,
    pub max_hearts: u8,
    pub stage_coins: u32,
    pub total_coins: u32,
    pub speed_bonus: u32,
    pub best_shoe: u8,
    pub heart_bonus: u32,
    pub door: DoorState,
    pub shop_near: bool,
    pub shop_open: bool,
    pub notice: Option<String>,
    pub damage_flash: bool,
    pub invincible: bool,
    pub falling: bool,
}

/// One playthrough
#[derive(Debug, Clone)]
pub struct GameSession {
    pub settings: Settings,
    /// 1-based stage number
    pub stage_index: u32,
    pub phase: GamePhase,
    pub stage: Stage,
    pub ledger: Ledger,
    pub odometer: Odometer,
    /// Player is close enough to use the shop (stays set while it is open)
    pub shop_near: bool,
    pub invincible: TimedEffect,
    pub damage_flash: TimedEffect,
    /// Dropping through a trap; the run ends when this runs out
    pub falling: TimedEffect,
    pub notice: Option<Notice>,
    pub records: RunRecords,
    rng: Pcg32,
    /// Bumped on every restart; stale deferred actions are dropped
    generation: u64,
    pending_stage: Deferred<u32>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Start a run on stage 1 with the player at the spawn point
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let stage = build_stage(1, PLAYER_SPAWN_X, settings.ground_y, &mut rng);
        let ledger = Ledger::new(settings.starting_hearts, settings.max_hearts);

        log::info!("New session, seed {}", settings.seed);

        Self {
            settings,
            stage_index: 1,
            phase: GamePhase::InProgress,
            stage,
            ledger,
            odometer: Odometer::default(),
            shop_near: false,
            invincible: TimedEffect::Inactive,
            damage_flash: TimedEffect::Inactive,
            falling: TimedEffect::Inactive,
            notice: None,
            records: RunRecords::new(),
            rng,
            generation: 0,
            pending_stage: Deferred::default(),
            events: vec![GameEvent::StageStarted { stage: 1 }],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a cleared stage waits for the next build
    pub fn advance_pending(&self) -> bool {
        self.pending_stage.is_pending()
    }

    /// Where the player is put after a restart or an invalid state
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(PLAYER_SPAWN_X, self.settings.ground_y - PLAYER_HEIGHT / 2.0)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn start_stage(&mut self, origin_x: f32) {
        self.stage = build_stage(
            self.stage_index,
            origin_x,
            self.settings.ground_y,
            &mut self.rng,
        );
        self.odometer.start_stage();
        self.shop_near = false;
        self.phase = GamePhase::InProgress;
        self.events.push(GameEvent::StageStarted {
            stage: self.stage_index,
        });
    }

    /// Walk through the open door
    ///
    /// Banks the stage coins, snapshots the ledger for "continue" and
    /// schedules the next stage. Returns false if the door is not open or the
    /// stage was already cleared.
    pub fn advance_stage(&mut self, now: f64) -> bool {
        if self.phase != GamePhase::InProgress || !self.stage.door.is_open() {
            log::debug!(
                "Advance ignored: phase {:?}, door {:?}",
                self.phase,
                self.stage.door.state
            );
            return false;
        }

        let cleared = self.stage_index;
        self.ledger.bank_stage();
        self.odometer.save();
        self.stage.shop.is_open = false;
        self.stage_index = self.stage_index.saturating_add(1);
        self.phase = GamePhase::Cleared;
        self.pending_stage.schedule(
            self.stage_index,
            now + STAGE_ADVANCE_DELAY_SECS,
            self.generation,
        );

        log::info!(
            "Stage {cleared} cleared with {} coins banked",
            self.ledger.cumulative_coins
        );
        self.events.push(GameEvent::StageCleared { stage: cleared });
        true
    }

    /// Build the scheduled stage once its delay has passed
    ///
    /// The new stage starts at `player_x`. Does nothing unless the session
    /// is in the cleared phase.
    pub fn poll_pending_stage(&mut self, now: f64, player_x: f32) -> bool {
        if self.phase != GamePhase::Cleared {
            return false;
        }
        match self.pending_stage.poll(now, self.generation) {
            Some(index) => {
                self.stage_index = index;
                self.start_stage(player_x);
                true
            }
            None => false,
        }
    }

    fn begin_restart(&mut self) {
        self.generation += 1;
        self.pending_stage.cancel();
        self.invincible.cancel();
        self.damage_flash.cancel();
        self.falling.cancel();
        self.notice = None;
    }

    /// Retry the current stage with the state saved at the last clear
    pub fn restart_continue(&mut self) {
        self.begin_restart();
        self.ledger.restore_last_clear();
        self.odometer.restore();
        log::info!("Continuing at stage {}", self.stage_index);
        self.start_stage(PLAYER_SPAWN_X);
        self.events.push(GameEvent::PlayerReset {
            pos: self.spawn_point(),
        });
    }

    /// Start over from stage 1 with fresh defaults
    pub fn restart_full(&mut self) {
        self.begin_restart();
        self.stage_index = 1;
        self.ledger.reset();
        self.odometer.reset();
        log::info!("Restarting from stage 1");
        self.start_stage(PLAYER_SPAWN_X);
        self.events.push(GameEvent::PlayerReset {
            pos: self.spawn_point(),
        });
    }

    /// Recompute shop proximity for the player's x
    pub fn update_shop_proximity(&mut self, player_x: f32) {
        let near = (self.stage.shop.x - player_x).abs() < SHOP_PROXIMITY;
        self.shop_near = near || self.stage.shop.is_open;
    }

    pub fn open_shop(&mut self) -> bool {
        if self.phase == GamePhase::GameOver || !self.shop_near || self.stage.shop.is_open {
            return false;
        }
        self.stage.shop.is_open = true;
        self.events.push(GameEvent::ShopOpened);
        true
    }

    pub fn close_shop(&mut self) -> bool {
        if !self.stage.shop.is_open {
            return false;
        }
        self.stage.shop.is_open = false;
        self.events.push(GameEvent::ShopClosed);
        true
    }

    /// Try to buy `item`; a refusal also raises a notice
    pub fn buy(&mut self, item: ShopItem) -> Result<(), PurchaseRejection> {
        match self.ledger.purchase(item) {
            Ok(()) => {
                self.notice = None;
                self.events.push(GameEvent::PurchaseSucceeded { item });
                Ok(())
            }
            Err(reason) => {
                log::info!("Purchase of {} refused: {reason}", item.name());
                self.notice = Some(Notice::new(reason));
                self.events.push(GameEvent::PurchaseFailed { reason });
                Err(reason)
            }
        }
    }

    /// Debug cheat: ten free coins, only when cheats are enabled
    pub fn grant_debug_coins(&mut self) -> bool {
        if !self.settings.cheats {
            log::warn!("Coin cheat requested but cheats are disabled");
            return false;
        }
        self.ledger.grant_coins(10);
        log::debug!("Cheat: +10 coins");
        true
    }

    /// Spike contact; returns true if it cost a heart
    pub fn hit_spike(&mut self) -> bool {
        if self.phase == GamePhase::GameOver || self.invincible.is_active() {
            return false;
        }
        let remaining = self.ledger.lose_heart();
        self.events.push(GameEvent::HeartLost { remaining });
        if remaining == 0 {
            self.game_over("out of hearts");
        } else {
            self.invincible = TimedEffect::start(INVINCIBLE_SECS);
            self.damage_flash = TimedEffect::start(DAMAGE_FLASH_SECS);
        }
        true
    }

    /// Start falling into a trap
    pub fn fall_into_trap(&mut self) {
        if self.phase == GamePhase::GameOver || self.falling.is_active() {
            return;
        }
        log::debug!("Fell into a trap on stage {}", self.stage_index);
        self.falling = TimedEffect::start(TRAP_FALL_SECS);
        self.events.push(GameEvent::TrapTriggered);
    }

    pub fn is_falling(&self) -> bool {
        self.falling.is_active()
    }

    /// End the run and record it
    pub fn game_over(&mut self, cause: &str) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.odometer.save();
        self.stage.shop.is_open = false;
        self.phase = GamePhase::GameOver;

        let score = self.score();
        let rank = self.records.add(RunRecord {
            score,
            stage: self.stage_index,
            distance: self.odometer.total,
        });
        log::info!(
            "Game over on stage {} ({cause}), score {score}, rank {rank:?}",
            self.stage_index
        );
        self.events.push(GameEvent::GameOver {
            score,
            stage: self.stage_index,
        });
    }

    /// Advance the damage, notice and fall timers
    pub fn advance_timers(&mut self, secs: f32) {
        self.invincible.advance(secs);
        self.damage_flash.advance(secs);
        let notice_expired = self
            .notice
            .as_mut()
            .is_some_and(|notice| notice.timer.advance(secs));
        if notice_expired {
            self.notice = None;
        }
        if self.falling.advance(secs) {
            self.game_over("fell into a trap");
        }
    }

    /// Whether the physics layer may start a jump
    ///
    /// Jumping is off while the door is open (the key advances instead) and
    /// while the shop is open or close enough to open.
    pub fn jump_allowed(&self) -> bool {
        self.phase != GamePhase::GameOver
            && !self.is_falling()
            && !self.stage.door.is_open()
            && !self.stage.shop.is_open
            && !self.shop_near
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.ledger.speed_multiplier()
    }

    /// Horizontal speed per reference frame including shoe bonus
    pub fn player_speed(&self) -> f32 {
        PLAYER_BASE_SPEED * self.speed_multiplier()
    }

    /// Keep the player from walking back past the stage start
    pub fn clamp_player_x(&self, x: f32) -> f32 {
        x.max(self.stage.min_player_x())
    }

    /// Falling below this y ends the run
    pub fn out_of_world_y(&self) -> f32 {
        self.settings.ground_y * 1.5 + 300.0
    }

    /// One-line frame rate and stage summary, if the overlay is enabled
    ///
    /// `frames` is the number of frames ticked over the last second.
    pub fn overlay_line(&self, frames: u32) -> Option<String> {
        if !self.settings.debug_overlay {
            return None;
        }
        Some(format!(
            "{frames}/{} fps | stage {} {:?} | {:.1}m | obstacles {} coins {} | hearts {}/{}",
            self.settings.target_fps.frames_per_sec(),
            self.stage_index,
            self.phase,
            self.odometer.total,
            self.stage.obstacles.len(),
            self.stage.remaining_coins(),
            self.ledger.hearts,
            self.ledger.max_hearts,
        ))
    }

    /// Whole meters travelled plus coins picked up on this stage
    pub fn score(&self) -> u64 {
        self.odometer.total.floor() as u64 + self.ledger.stage_coins as u64
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score(),
            stage: self.stage_index,
            phase: self.phase,
            total_distance: self.odometer.total.floor() as u64,
            stage_distance: self.odometer.stage.floor() as u64,
            stage_length: self.stage.length_m,
            obstacles: self.stage.obstacles.len(),
            hearts: self.ledger.hearts,
            max_hearts: self.ledger.max_hearts,
            stage_coins: self.ledger.stage_coins,
            total_coins: self.ledger.funds(),
            speed_bonus: self.ledger.items.speed_bonus,
            best_shoe: self.ledger.items.best_shoe,
            heart_bonus: self.ledger.items.heart_bonus,
            door: self.stage.door.state,
            shop_near: self.shop_near,
            shop_open: self.stage.shop.is_open,
            notice: self.notice.map(|n| n.reason.to_string()),
            damage_flash: self.damage_flash.is_active(),
            invincible: self.invincible.is_active(),
            falling: self.is_falling(),
        }
    }
}
