/// Entities: Player, oscillating bodies (platforms, enemies) and triggers.
///
/// Oscillating bodies share one `Oscillator`: it advances by the current
/// direction every tick and reverses once its counter passes the limit.
/// Triggers (hazards, coins, the exit) have no state beyond their rect.

use super::geom::Rect;
use super::tile::{Axis, EnemyColor, HazardKind, PlatformKind, SCREEN_HEIGHT, TILE_SIZE};

/// Ticks an oscillating body travels in one direction before reversing.
pub const OSCILLATION_LIMIT: i32 = 50;

pub const PLAYER_WIDTH: i32 = 45;
pub const PLAYER_HEIGHT: i32 = 70;
pub const PLAYER_SPAWN_X: i32 = 100;
pub const PLAYER_SPAWN_Y: i32 = SCREEN_HEIGHT - 130;

pub const ENEMY_WIDTH: i32 = 50;
pub const ENEMY_HEIGHT: i32 = 35;

/// Control intent sampled once per tick by the input layer.
/// `jump` is the raw held state; edge detection happens in physics.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

// ── Oscillation ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Oscillator {
    /// +1 or -1.
    pub direction: i32,
    pub counter: i32,
}

impl Oscillator {
    pub const fn new() -> Self {
        Oscillator { direction: 1, counter: 0 }
    }

    /// Advance one tick. Returns the direction that applied to this tick's
    /// displacement (the value before any reversal).
    pub fn tick(&mut self) -> i32 {
        let applied = self.direction;
        self.counter += 1;
        if self.counter.abs() > OSCILLATION_LIMIT {
            self.direction = -self.direction;
            self.counter = -self.counter;
        }
        applied
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Oscillator::new()
    }
}

/// Per-axis motion multiplier. At most one component is non-zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MotionMask {
    pub x: i32,
    pub y: i32,
}

impl MotionMask {
    pub const HORIZONTAL: MotionMask = MotionMask { x: 1, y: 0 };
    pub const VERTICAL: MotionMask = MotionMask { x: 0, y: 1 };
}

impl From<Axis> for MotionMask {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => MotionMask::HORIZONTAL,
            Axis::Vertical => MotionMask::VERTICAL,
        }
    }
}

// ── Dynamic bodies ──

/// Moving platform (regular or ice). Solid for the player, rides it along
/// when moving horizontally.
#[derive(Clone, Debug)]
pub struct Platform {
    pub rect: Rect,
    pub mask: MotionMask,
    pub osc: Oscillator,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(x: i32, y: i32, mask: MotionMask, kind: PlatformKind) -> Self {
        Platform {
            rect: Rect::new(x, y, TILE_SIZE, TILE_SIZE / 2),
            mask,
            osc: Oscillator::new(),
            kind,
        }
    }

    pub fn advance(&mut self) {
        let dir = self.osc.tick();
        self.rect.x += dir * self.mask.x;
        self.rect.y += dir * self.mask.y;
    }

    /// Horizontal displacement this platform imparts on a rider per tick.
    pub fn carry_dx(&self) -> i32 {
        if self.mask.x != 0 { self.osc.direction } else { 0 }
    }
}

/// Patrolling enemy: horizontal oscillation at one unit per tick.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub rect: Rect,
    pub osc: Oscillator,
    pub color: EnemyColor,
    pub facing_right: bool,
}

impl Enemy {
    pub fn new(x: i32, y: i32, color: EnemyColor) -> Self {
        Enemy {
            rect: Rect::new(x, y, ENEMY_WIDTH, ENEMY_HEIGHT),
            osc: Oscillator::new(),
            color,
            facing_right: true,
        }
    }

    pub fn advance(&mut self) {
        self.rect.x += self.osc.tick();
        self.facing_right = self.osc.direction > 0;
    }
}

// ── Triggers ──

#[derive(Clone, Debug)]
pub struct Hazard {
    pub rect: Rect,
    pub kind: HazardKind,
}

impl Hazard {
    pub fn new(x: i32, y: i32, kind: HazardKind) -> Self {
        Hazard { rect: Rect::new(x, y, TILE_SIZE, TILE_SIZE / 2), kind }
    }
}

/// One-shot pickup. Removed from the world on first contact.
#[derive(Clone, Debug)]
pub struct Coin {
    pub rect: Rect,
}

impl Coin {
    pub fn centered_at(cx: i32, cy: i32) -> Self {
        Coin { rect: Rect::centered(cx, cy, TILE_SIZE / 2, TILE_SIZE / 2) }
    }
}

#[derive(Clone, Debug)]
pub struct ExitGate {
    pub rect: Rect,
}

impl ExitGate {
    pub fn new(x: i32, y: i32) -> Self {
        ExitGate { rect: Rect::new(x, y, TILE_SIZE, TILE_SIZE * 3 / 2) }
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub vel_y: i32,
    /// No downward contact was resolved on the last tick.
    pub in_air: bool,
    /// Jump latch: set by a jump, cleared once the jump control is released.
    pub jumped: bool,
    /// Jump control state on the previous tick.
    pub jump_held: bool,
    /// -1 left, 1 right, 0 before the first horizontal move.
    pub facing: i32,
    pub walk_counter: u32,
    pub walk_frame: u32,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Player {
            rect: Rect::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT),
            vel_y: 0,
            in_air: true,
            jumped: false,
            jump_held: false,
            facing: 0,
            walk_counter: 0,
            walk_frame: 0,
        }
    }

    /// Fresh player at the level spawn point.
    pub fn spawn() -> Self {
        Player::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn oscillator_flips_after_limit() {
        let mut osc = Oscillator::new();
        for _ in 0..50 {
            assert_eq!(osc.tick(), 1);
        }
        assert_eq!(osc.direction, 1);
        assert_eq!(osc.counter, 50);

        // 51st tick still moves forward, then reverses
        assert_eq!(osc.tick(), 1);
        assert_eq!(osc.direction, -1);
        assert_eq!(osc.counter, -51);
        assert_eq!(osc.tick(), -1);
    }

    #[test]
    fn horizontal_platform_scenario() {
        let mut p = Platform::new(200, 500, MotionMask::HORIZONTAL, PlatformKind::Dirt);
        for _ in 0..30 { p.advance(); }
        assert_eq!(p.rect.x, 230);
        assert_eq!(p.rect.y, 500);

        for _ in 0..21 { p.advance(); }
        assert_eq!(p.rect.x, 251);
        assert_eq!(p.osc.direction, -1);
        assert_eq!(p.osc.counter, -51);

        p.advance();
        assert_eq!(p.rect.x, 250);
        assert_eq!(p.carry_dx(), -1);
    }

    #[test]
    fn vertical_platform_never_carries() {
        let mut p = Platform::new(0, 300, MotionMask::VERTICAL, PlatformKind::Ice);
        p.advance();
        assert_eq!((p.rect.x, p.rect.y), (0, 301));
        assert_eq!(p.carry_dx(), 0);
    }

    #[test]
    fn enemy_facing_follows_direction() {
        let mut e = Enemy::new(50, 65, EnemyColor::Green);
        for _ in 0..51 { e.advance(); }
        assert_eq!(e.rect.x, 101);
        assert!(!e.facing_right);
        for _ in 0..102 { e.advance(); }
        assert_eq!(e.rect.x, -1);
        assert!(e.facing_right);
    }

    #[test]
    fn body_returns_to_origin_without_drift() {
        let mut p = Platform::new(400, 400, MotionMask::HORIZONTAL, PlatformKind::Cake);
        for _ in 0..102 { p.advance(); }
        assert_eq!(p.rect.x, 400);
        // one full cycle later it is back again
        for _ in 0..204 { p.advance(); }
        assert_eq!(p.rect.x, 400);
    }

    proptest! {
        #[test]
        fn oscillation_is_bounded_and_periodic(ticks in 0usize..2000) {
            let mut e = Enemy::new(500, 0, EnemyColor::Blue);
            for _ in 0..ticks { e.advance(); }
            let at_t = e.rect.x;
            prop_assert!((at_t - 500).abs() <= OSCILLATION_LIMIT + 1);
            prop_assert!(e.osc.counter.abs() <= OSCILLATION_LIMIT + 1);

            // Once past the first reversal the motion repeats every 204 ticks.
            if ticks >= 51 {
                for _ in 0..204 { e.advance(); }
                prop_assert_eq!(e.rect.x, at_t);
            }
        }
    }
}
