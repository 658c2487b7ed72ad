//! Hit tests between the player and stage hazards
//!
//! The player position is the centre of its 32x64 body. Coin and spike tests
//! extend the body upward by a quarter of its width to cover the head.

use glam::Vec2;

use super::entities::{Coin, Obstacle};
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};

/// Fraction of a spike tooth's height, from the tip down, that hurts
const SPIKE_HIT_FRACTION: f32 = 0.6;

/// Axis-aligned box given by its edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            left: center.x - half.x,
            right: center.x + half.x,
            top: center.y - half.y,
            bottom: center.y + half.y,
        }
    }

    /// Strict overlap; touching edges do not count
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }
}

/// Player body including the head
pub fn player_box(pos: Vec2) -> Rect {
    let mut rect = Rect::from_center(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));
    rect.top -= PLAYER_WIDTH / 4.0;
    rect
}

/// True if the player touches an uncollected coin
pub fn coin_hit(player_pos: Vec2, coin: &Coin) -> bool {
    !coin.collected && player_box(player_pos).intersects(&Rect::from_center(coin.pos, coin.size()))
}

/// True if the player touches the sharp part of any spike tooth
///
/// Always false for traps.
pub fn spike_hit(player_pos: Vec2, obstacle: &Obstacle) -> bool {
    let player = player_box(player_pos);
    obstacle.teeth().iter().any(|tooth| {
        let left = obstacle.x + tooth.offset_x;
        let danger = Rect {
            left,
            right: left + tooth.width,
            top: obstacle.ground_y - tooth.height * SPIKE_HIT_FRACTION,
            bottom: obstacle.ground_y,
        };
        player.intersects(&danger)
    })
}

/// True if the player stands on the ground inside a trap's pit
pub fn over_trap(player_pos: Vec2, obstacle: &Obstacle) -> bool {
    if obstacle.kind.is_spike() {
        return false;
    }
    let feet = player_pos.y + PLAYER_HEIGHT / 2.0;
    let half = obstacle.width() / 2.0;
    feet >= obstacle.ground_y
        && player_pos.x > obstacle.x - half
        && player_pos.x < obstacle.x + half
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f32 = 480.0;

    /// Player standing on the ground at `x`
    fn standing(x: f32) -> Vec2 {
        Vec2::new(x, GROUND - PLAYER_HEIGHT / 2.0)
    }

    #[test]
    fn test_rect_touching_edges_miss() {
        let a = Rect::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::from_center(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.intersects(&b));
        let c = Rect::from_center(Vec2::new(9.0, 0.0), Vec2::splat(10.0));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_player_box_includes_head() {
        let rect = player_box(Vec2::new(100.0, 448.0));
        assert_eq!(rect.bottom, 480.0);
        assert_eq!(rect.top, 448.0 - 32.0 - 8.0);
        assert_eq!(rect.right - rect.left, PLAYER_WIDTH);
    }

    #[test]
    fn test_coin_hit() {
        let coin = Coin::on_ground(110.0, GROUND);
        assert!(coin_hit(standing(100.0), &coin));
        assert!(!coin_hit(standing(300.0), &coin));

        // Apex coins need a jump
        let high = Coin::at_jump_apex(100.0, GROUND);
        assert!(!coin_hit(standing(100.0), &high));
        assert!(coin_hit(Vec2::new(100.0, 400.0), &high));

        let mut taken = coin.clone();
        taken.collected = true;
        assert!(!coin_hit(standing(100.0), &taken));
    }

    #[test]
    fn test_spike_hit_only_on_teeth() {
        let spike = Obstacle::small_spike(200.0, GROUND);
        assert!(spike_hit(standing(210.0), &spike));
        assert!(spike_hit(standing(270.0), &spike));
        // Right edge of player at 199 stays clear of the first tooth
        assert!(!spike_hit(standing(183.0), &spike));
        // Feet above the danger zone (top 60% of a 25 tall tooth)
        assert!(!spike_hit(Vec2::new(230.0, GROUND - 16.0 - 32.0), &spike));
        assert!(spike_hit(Vec2::new(230.0, GROUND - 14.0 - 32.0), &spike));
    }

    #[test]
    fn test_trap_needs_feet_on_ground() {
        let trap = Obstacle::trap(500.0, GROUND);
        assert!(over_trap(standing(500.0), &trap));
        assert!(over_trap(standing(539.0), &trap));
        assert!(!over_trap(standing(540.0), &trap));
        assert!(!over_trap(Vec2::new(500.0, 400.0), &trap));
        assert!(!over_trap(standing(210.0), &Obstacle::large_spike(200.0, GROUND)));
        assert!(!spike_hit(standing(500.0), &trap));
    }
}
