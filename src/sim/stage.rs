//! Stage builder
//!
//! Lays out one stage relative to the player's position when the stage
//! starts: the shop just ahead, obstacles spread evenly over the middle of
//! the stage, one coin per placed obstacle, and the exit door at the end.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Coin, Door, Obstacle, Shop};
use super::placement::{self, KindAllocator};
use super::progression::{obstacle_count, obstacle_spacing, stage_length, stage_length_px};
use crate::consts::*;

/// Outcome of laying out a stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Obstacles the stage asked for
    pub target_obstacles: u64,
    /// Obstacles actually placed
    pub placed_obstacles: u64,
    /// Slots abandoned after every retry failed
    pub exhausted_slots: u64,
    /// Coin candidates skipped for landing in a keep-out zone
    pub skipped_coins: u64,
}

/// A fully built stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub index: u32,
    /// Player x when the stage was built
    pub start_x: f32,
    pub ground_y: f32,
    /// Stage length in meters, as used for the door
    pub length_m: u32,
    /// Nominal obstacle spacing for this stage
    pub spacing: u32,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub shop: Shop,
    pub door: Door,
    pub report: StageReport,
}

impl Stage {
    /// Leftmost x the player may walk back to
    pub fn min_player_x(&self) -> f32 {
        (self.start_x - BACKTRACK_ALLOWANCE).max(PLAYER_SPAWN_X)
    }

    /// Coins not yet picked up
    pub fn remaining_coins(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }

    /// Drop obstacles and coins left far behind the stage start
    pub fn sweep_behind_start(&mut self) {
        let cutoff = self.start_x - CLEANUP_BEHIND_START;
        self.obstacles.retain(|o| o.x >= cutoff);
        self.coins.retain(|c| c.pos.x >= cutoff);
    }
}

/// Build stage `index` starting at `origin_x`
///
/// A non-finite origin falls back to the spawn point.
pub fn build_stage<R: Rng + ?Sized>(
    index: u32,
    origin_x: f32,
    ground_y: f32,
    rng: &mut R,
) -> Stage {
    let origin = if origin_x.is_finite() {
        origin_x
    } else {
        log::warn!("Stage {index}: non-finite origin {origin_x}, using spawn x");
        PLAYER_SPAWN_X
    };

    let length_m = stage_length(index).max(1) as u32;
    let door_x = origin + stage_length_px(index);
    let shop = Shop::new(origin + SHOP_OFFSET, ground_y);
    let door = Door::new(door_x, ground_y);
    let target = obstacle_count(index);

    log::info!(
        "Stage {index}: origin={origin:.0}, length={length_m}m, door={door_x:.0}, \
         target obstacles={target}, spacing={}",
        obstacle_spacing(index)
    );

    let mut report = StageReport {
        target_obstacles: target,
        ..Default::default()
    };
    let obstacles = place_obstacles(&shop, &door, origin, target, ground_y, &mut report, rng);
    let coins = place_coins(&shop, &door, &obstacles, origin, ground_y, &mut report, rng);

    log::info!(
        "Stage {index}: placed {}/{} obstacles ({} slots exhausted), {} coins",
        report.placed_obstacles,
        target,
        report.exhausted_slots,
        coins.len()
    );

    Stage {
        index,
        start_x: origin,
        ground_y,
        length_m,
        spacing: obstacle_spacing(index),
        obstacles,
        coins,
        shop,
        door,
        report,
    }
}

/// One placement per equal section of `[origin + 500, door - 240]`
fn place_obstacles<R: Rng + ?Sized>(
    shop: &Shop,
    door: &Door,
    origin: f32,
    target: u64,
    ground_y: f32,
    report: &mut StageReport,
    rng: &mut R,
) -> Vec<Obstacle> {
    let band_start = origin + OBSTACLE_BAND_OFFSET;
    let band_end = door.clear_zone_start();
    let band = band_end - band_start;
    let mut obstacles = Vec::new();

    if band <= 0.0 || target == 0 {
        log::debug!("No room for obstacles (band={band:.0})");
        return obstacles;
    }

    let section = band / target as f32;
    let mut allocator = KindAllocator::new(target);

    for slot in 0..target {
        let section_start = band_start + section * slot as f32;
        let section_end = section_start + section;
        if section_start >= band_end {
            break;
        }

        let mut placed = false;
        for attempt in 0..=SECTION_RETRIES {
            let x = random_in(section_start, section_end, rng);
            if x >= band_end {
                continue;
            }
            match placement::create_safe_obstacle(
                x,
                &mut obstacles,
                shop,
                door,
                &mut allocator,
                ground_y,
                rng,
            ) {
                Ok(_) => {
                    placed = true;
                    break;
                }
                Err(err) => log::debug!("Obstacle slot {slot} attempt {attempt}: {err}"),
            }
        }

        if placed {
            report.placed_obstacles += 1;
        } else {
            report.exhausted_slots += 1;
        }
    }

    obstacles
}

/// Exactly one coin per placed obstacle, walking forward from `origin + 350`
///
/// Strides are 200-300 units; on stages too crowded for that, strides and
/// jitter are compressed so the walk still ends before the door zone.
fn place_coins<R: Rng + ?Sized>(
    shop: &Shop,
    door: &Door,
    obstacles: &[Obstacle],
    origin: f32,
    ground_y: f32,
    report: &mut StageReport,
    rng: &mut R,
) -> Vec<Coin> {
    let wanted = obstacles.len();
    let mut coins = Vec::with_capacity(wanted);
    if wanted == 0 {
        return coins;
    }

    let start = origin + COIN_START_OFFSET;
    let limit = door.clear_zone_start();
    // Furthest the last candidate can land with full-size strides
    let reach = (wanted - 1) as f32 * COIN_STRIDE_MAX + COIN_JITTER;
    let fit = ((limit - start) / reach).clamp(0.05, 1.0);

    let mut coin_x = start;
    while coins.len() < wanted && coin_x < limit {
        let x = coin_x + rng.random_range(0.0..COIN_JITTER) * fit;
        coin_x += rng.random_range(COIN_STRIDE_MIN..COIN_STRIDE_MAX) * fit;

        if placement::coin_blocked(x, shop, door) {
            report.skipped_coins += 1;
            continue;
        }

        let near_obstacle = obstacles
            .iter()
            .any(|o| (o.x - x).abs() < COIN_OBSTACLE_RADIUS);
        coins.push(if near_obstacle {
            Coin::at_jump_apex(x, ground_y)
        } else {
            Coin::on_ground(x, ground_y)
        });
    }

    if coins.len() < wanted {
        log::warn!(
            "Placed only {}/{} coins before reaching the door",
            coins.len(),
            wanted
        );
    }
    coins
}

fn random_in<R: Rng + ?Sized>(low: f32, high: f32, rng: &mut R) -> f32 {
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::DoorState;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const GROUND: f32 = 480.0;

    #[test]
    fn test_stage_one_layout() {
        let mut rng = Pcg32::seed_from_u64(42);
        let stage = build_stage(1, 100.0, GROUND, &mut rng);

        assert_eq!(stage.door.x, 100.0 + 5.0 * 240.0);
        assert_eq!(stage.door.state, DoorState::Closed);
        assert_eq!(stage.shop.x, 300.0);
        assert!(!stage.shop.is_open);
        assert_eq!(stage.report.target_obstacles, 2);
        assert!(stage.obstacles.len() <= 2);
        assert_eq!(stage.coins.len(), stage.obstacles.len());
        assert_eq!(stage.report.placed_obstacles as usize, stage.obstacles.len());
        assert_eq!(stage.length_m, 5);
        assert_eq!(stage.spacing, 250);
    }

    #[test]
    fn test_obstacles_inside_band() {
        let mut rng = Pcg32::seed_from_u64(9);
        for index in 1..=6 {
            let stage = build_stage(index, 250.0, GROUND, &mut rng);
            for o in &stage.obstacles {
                assert!(o.x >= 250.0 + OBSTACLE_BAND_OFFSET);
                assert!(o.x < stage.door.x - DOOR_CLEAR_ZONE);
                assert_eq!(o.ground_y, GROUND);
            }
        }
    }

    #[test]
    fn test_coins_match_obstacles_across_stages() {
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            for index in 1..=7 {
                let stage = build_stage(index, 100.0, GROUND, &mut rng);
                assert_eq!(
                    stage.coins.len(),
                    stage.obstacles.len(),
                    "seed {seed}, stage {index}"
                );
            }
        }
    }

    #[test]
    fn test_coins_near_obstacles_are_raised() {
        let mut rng = Pcg32::seed_from_u64(1234);
        let stage = build_stage(5, 100.0, GROUND, &mut rng);
        for coin in &stage.coins {
            let near = stage
                .obstacles
                .iter()
                .any(|o| (o.x - coin.pos.x).abs() < COIN_OBSTACLE_RADIUS);
            let expected = if near {
                GROUND - COIN_APEX_LIFT
            } else {
                GROUND - COIN_GROUND_LIFT
            };
            assert_eq!(coin.pos.y, expected);
            assert!(!coin.collected);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = build_stage(4, 100.0, GROUND, &mut Pcg32::seed_from_u64(77));
        let b = build_stage(4, 100.0, GROUND, &mut Pcg32::seed_from_u64(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_origin_falls_back() {
        let mut rng = Pcg32::seed_from_u64(2);
        let stage = build_stage(1, f32::NAN, GROUND, &mut rng);
        assert_eq!(stage.start_x, PLAYER_SPAWN_X);
        assert!(stage.door.x.is_finite());
    }

    #[test]
    fn test_degenerate_stage_still_has_door_ahead() {
        let mut rng = Pcg32::seed_from_u64(2);
        let stage = build_stage(22, 100.0, GROUND, &mut rng);
        assert_eq!(stage.door.x, 340.0);
        assert!(stage.obstacles.is_empty());
        assert!(stage.coins.is_empty());
    }

    #[test]
    fn test_sweep_behind_start() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut stage = build_stage(3, 1000.0, GROUND, &mut rng);
        stage.coins.push(Coin::on_ground(700.0, GROUND));
        stage.obstacles.push(Obstacle::trap(790.0, GROUND));
        let before = stage.obstacles.len();
        stage.sweep_behind_start();
        assert!(stage.coins.iter().all(|c| c.pos.x >= 800.0));
        assert_eq!(stage.obstacles.len(), before - 1);
        assert_eq!(stage.min_player_x(), 950.0);
    }
}
