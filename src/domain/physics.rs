/// Player movement resolver.
///
/// ## Per-tick pipeline
///
///   1. `integrate`        : input → intent, jump latch, gravity, candidate motion
///   2. `resolve_tiles`    : exact axis-separated snapping against static tiles
///   3. (triggers)         : hazard / exit checks live in `rules`, run by the caller
///   4. `resolve_platforms`: threshold snapping + ride-along against moving bodies
///   5. `commit`           : apply the final displacement
///
/// Each axis is tested independently against the *unmoved* rect offset on
/// that axis only; there is no swept test. With fall speed capped at 10 and
/// walk speed at 5 against 50-unit tiles, tunneling cannot happen.
///
/// Tiles and platforms use different vertical rules:
///   - Tiles snap exactly to the touching edge.
///   - Platforms snap when the edge is within `PLATFORM_SNAP_THRESHOLD`,
///     which lets the player pop up through a platform from below.

use super::collision::TileSet;
use super::entity::{FrameInput, Platform, Player};
use super::tile::TILE_SIZE;

pub const WALK_SPEED: i32 = 5;
pub const JUMP_VELOCITY: i32 = -15;
pub const GRAVITY: i32 = 1;
pub const MAX_FALL_SPEED: i32 = 10;
pub const PLATFORM_SNAP_THRESHOLD: i32 = 20;

/// Ticks of walking per animation frame advance.
const WALK_COOLDOWN: u32 = 3;
const WALK_FRAMES: u32 = 11;

/// Ghost drift while dead: rises this fast until it reaches the ceiling.
const GHOST_SPEED: i32 = 5;
const GHOST_CEILING: i32 = 200;

/// Candidate displacement for one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Motion {
    pub dx: i32,
    pub dy: i32,
    /// A jump started this tick.
    pub jumped: bool,
}

// ══════════════════════════════════════════════════════════════
// Intent + gravity
// ══════════════════════════════════════════════════════════════

/// Turn input into a candidate motion and integrate gravity.
///
/// A jump fires only on the tick the control goes from released to held,
/// with the latch clear and the player grounded on the previous tick.
/// Releasing the control clears the latch. The player is provisionally airborne afterwards; only a
/// downward contact in a resolve pass grounds it again.
pub fn integrate(player: &mut Player, input: FrameInput) -> Motion {
    let mut motion = Motion::default();

    let pressed = input.jump && !player.jump_held;
    player.jump_held = input.jump;

    if pressed && !player.jumped && !player.in_air {
        player.vel_y = JUMP_VELOCITY;
        player.jumped = true;
        motion.jumped = true;
    }
    if !input.jump {
        player.jumped = false;
    }

    if input.left {
        motion.dx -= WALK_SPEED;
        player.walk_counter += 1;
        player.facing = -1;
    }
    if input.right {
        motion.dx += WALK_SPEED;
        player.walk_counter += 1;
        player.facing = 1;
    }
    if !input.left && !input.right {
        player.walk_counter = 0;
        player.walk_frame = 0;
    }
    if player.walk_counter > WALK_COOLDOWN {
        player.walk_counter = 0;
        player.walk_frame = (player.walk_frame + 1) % WALK_FRAMES;
    }

    player.vel_y = (player.vel_y + GRAVITY).min(MAX_FALL_SPEED);
    motion.dy = player.vel_y;
    player.in_air = true;

    motion
}

// ══════════════════════════════════════════════════════════════
// Static tiles: exact snapping
// ══════════════════════════════════════════════════════════════

/// Clip `motion` against the static tiles.
///
/// Horizontal: any tile hit by the x-displaced rect cancels `dx`.
/// Vertical: a tile hit by the y-displaced rect snaps `dy` to the touching
/// edge, zeroes the velocity, and grounds the player when moving down.
pub fn resolve_tiles(player: &mut Player, motion: &mut Motion, tiles: &TileSet) {
    let rect = player.rect;

    if tiles.intersects(&rect.offset(motion.dx, 0)) {
        motion.dx = 0;
    }

    for tile in tiles.iter() {
        if !tile.rect.overlaps(&rect.offset(0, motion.dy)) {
            continue;
        }
        if player.vel_y < 0 {
            // head bump
            motion.dy = tile.rect.bottom() - rect.top();
            player.vel_y = 0;
        } else {
            motion.dy = tile.rect.top() - rect.bottom();
            player.vel_y = 0;
            player.in_air = false;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Moving platforms: threshold snapping
// ══════════════════════════════════════════════════════════════

/// Clip `motion` against one family of platforms.
///
/// Vertical contact is classified by distance rather than velocity:
///   - top edge within the threshold of the platform bottom → head bump.
///     Snaps just below the platform, except when the platform sits lower
///     than one tile plus the player height, where vertical motion stops.
///   - bottom edge within the threshold of the platform top → landing.
///     The rect itself is lifted to one unit above the platform.
///
/// Any vertical contact with a horizontally moving platform carries the
/// player one unit in the platform's current direction.
pub fn resolve_platforms<'a, I>(player: &mut Player, motion: &mut Motion, platforms: I)
where
    I: IntoIterator<Item = &'a Platform>,
{
    for platform in platforms {
        let rect = player.rect;
        let body = platform.rect;

        if body.overlaps(&rect.offset(motion.dx, 0)) {
            motion.dx = 0;
        }

        if !body.overlaps(&rect.offset(0, motion.dy)) {
            continue;
        }

        if (rect.top() + motion.dy - body.bottom()).abs() < PLATFORM_SNAP_THRESHOLD {
            player.vel_y = 0;
            motion.dy = body.bottom() - rect.top() + 1;
            if body.bottom() > TILE_SIZE + rect.h {
                motion.dy = 0;
            }
        } else if (rect.bottom() + motion.dy - body.top()).abs() < PLATFORM_SNAP_THRESHOLD {
            motion.dy = 0;
            player.rect.set_bottom(body.top() - 1);
            player.in_air = false;
        }

        player.rect.x += platform.carry_dx();
    }
}

pub fn commit(player: &mut Player, motion: Motion) {
    player.rect = player.rect.offset(motion.dx, motion.dy);
}

/// Death animation: the ghost floats up until it nears the top of the screen.
pub fn drift_ghost(player: &mut Player) {
    if player.rect.y > GHOST_CEILING {
        player.rect.y -= GHOST_SPEED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::MotionMask;
    use crate::domain::geom::Rect;
    use crate::domain::tile::{Material, PlatformKind, Tile};
    use proptest::prelude::*;

    const IDLE: FrameInput = FrameInput { left: false, right: false, jump: false };
    const JUMP: FrameInput = FrameInput { left: false, right: false, jump: true };
    const RIGHT: FrameInput = FrameInput { left: false, right: true, jump: false };

    fn floor(row: i32, cols: std::ops::Range<i32>) -> TileSet {
        let mut set = TileSet::new();
        for col in cols {
            set.push(Tile::at_cell(col, row, Material::Dirt));
        }
        set
    }

    /// Full tile-only tick (no platforms, no triggers).
    fn tick(player: &mut Player, input: FrameInput, tiles: &TileSet) -> Motion {
        let mut motion = integrate(player, input);
        resolve_tiles(player, &mut motion, tiles);
        commit(player, motion);
        motion
    }

    // ── Gravity ──

    #[test]
    fn gravity_accumulates_and_caps() {
        let mut p = Player::new(0, 0);
        let empty = TileSet::new();
        let mut last = 0;
        for _ in 0..20 {
            let m = tick(&mut p, IDLE, &empty);
            assert!(m.dy >= last);
            last = m.dy;
        }
        assert_eq!(p.vel_y, MAX_FALL_SPEED);
        assert_eq!(last, MAX_FALL_SPEED);
        assert!(p.in_air);
    }

    #[test]
    fn falling_player_comes_to_rest_on_floor() {
        let tiles = floor(19, 0..20);
        let mut p = Player::spawn();
        for _ in 0..30 {
            tick(&mut p, IDLE, &tiles);
        }
        assert_eq!(p.rect.bottom(), 950);
        assert_eq!(p.vel_y, 0);
        assert!(!p.in_air);
    }

    #[test]
    fn long_fall_lands_exactly_on_tile_top() {
        let tiles = floor(19, 0..20);
        let mut p = Player::new(300, 100);
        for _ in 0..200 {
            tick(&mut p, IDLE, &tiles);
        }
        assert_eq!(p.rect.bottom(), 950);
        assert!(!tiles.intersects(&p.rect));
        assert!(!p.in_air);
    }

    // ── Jump ──

    #[test]
    fn jump_requires_ground() {
        let mut p = Player::new(300, 100);
        let empty = TileSet::new();
        let m = tick(&mut p, JUMP, &empty);
        assert!(!m.jumped);
        assert_eq!(p.vel_y, 1);
    }

    #[test]
    fn jump_sets_impulse_then_gravity() {
        let tiles = floor(19, 0..20);
        let mut p = Player::new(300, 880);
        tick(&mut p, IDLE, &tiles);
        assert!(!p.in_air);

        let m = tick(&mut p, JUMP, &tiles);
        assert!(m.jumped);
        assert_eq!(m.dy, JUMP_VELOCITY + GRAVITY);
        assert_eq!(p.rect.y, 880 - 14);
        assert!(p.in_air);
    }

    #[test]
    fn holding_jump_does_not_repeat() {
        let tiles = floor(19, 0..20);
        let mut p = Player::new(300, 880);
        tick(&mut p, IDLE, &tiles);

        let mut jumps = 0;
        for _ in 0..120 {
            if tick(&mut p, JUMP, &tiles).jumped { jumps += 1; }
        }
        assert_eq!(jumps, 1);
        assert!(!p.in_air, "landed again while still holding");

        // release then press again
        tick(&mut p, IDLE, &tiles);
        assert!(tick(&mut p, JUMP, &tiles).jumped);
    }

    #[test]
    fn jump_held_through_a_fall_needs_a_fresh_press() {
        let tiles = floor(19, 0..20);
        let mut p = Player::new(300, 700);

        let mut fired = Vec::new();
        for t in 0..60 {
            if tick(&mut p, JUMP, &tiles).jumped { fired.push(t); }
        }
        assert!(fired.is_empty(), "jumped at ticks {fired:?} without a fresh press");
        assert!(!p.in_air);

        tick(&mut p, IDLE, &tiles);
        assert!(tick(&mut p, JUMP, &tiles).jumped);
    }

    #[test]
    fn head_bump_snaps_below_tile() {
        let tiles = floor(10, 0..20); // bottom edge at 550
        let mut p = Player::new(300, 560);
        p.vel_y = -15;
        p.in_air = true;
        let m = tick(&mut p, IDLE, &tiles);
        assert_eq!(m.dy, -10);
        assert_eq!(p.rect.top(), 550);
        assert_eq!(p.vel_y, 0);
        assert!(p.in_air);
    }

    // ── Horizontal ──

    #[test]
    fn wall_cancels_horizontal_motion() {
        let mut tiles = floor(19, 0..20);
        tiles.push(Tile::at_cell(7, 18, Material::Dirt)); // wall face at x = 350
        let mut p = Player::new(303, 880);
        tick(&mut p, IDLE, &tiles);
        let m = tick(&mut p, RIGHT, &tiles);
        assert_eq!(m.dx, 0);
        assert_eq!(p.rect.x, 303);
        assert_eq!(p.facing, 1);
    }

    #[test]
    fn walking_advances_animation_frame() {
        let tiles = floor(19, 0..20);
        let mut p = Player::new(100, 880);
        for _ in 0..4 { tick(&mut p, RIGHT, &tiles); }
        assert_eq!(p.walk_frame, 1);
        assert_eq!(p.walk_counter, 0);
        tick(&mut p, IDLE, &tiles);
        assert_eq!(p.walk_frame, 0);
    }

    #[test]
    fn opposite_inputs_cancel() {
        let mut p = Player::new(300, 300);
        let m = integrate(&mut p, FrameInput { left: true, right: true, jump: false });
        assert_eq!(m.dx, 0);
        assert_eq!(p.facing, 1);
    }

    // ── Platforms ──

    fn platform_at(x: i32, y: i32, mask: MotionMask) -> Platform {
        Platform::new(x, y, mask, PlatformKind::Dirt)
    }

    #[test]
    fn landing_on_platform_lifts_rect_above_it() {
        let plat = platform_at(200, 500, MotionMask::VERTICAL);
        let mut p = Player::new(200, 425); // bottom 495
        p.vel_y = 5;
        let mut m = integrate(&mut p, IDLE);
        resolve_platforms(&mut p, &mut m, [&plat]);
        commit(&mut p, m);
        assert_eq!(p.rect.bottom(), 499);
        assert!(!p.in_air);
    }

    #[test]
    fn horizontal_platform_carries_rider() {
        let mut plat = platform_at(200, 500, MotionMask::HORIZONTAL);
        plat.advance();
        let mut p = Player::new(210, 429); // bottom 499
        p.vel_y = 1;
        let mut m = integrate(&mut p, IDLE);
        resolve_platforms(&mut p, &mut m, [&plat]);
        commit(&mut p, m);
        assert_eq!(p.rect.x, 211);
        assert_eq!(p.rect.bottom(), 499);
    }

    #[test]
    fn head_bump_below_high_platform_pops_under_it() {
        let plat = platform_at(200, 50, MotionMask::VERTICAL); // bottom 75
        let mut p = Player::new(200, 80);
        p.vel_y = -10;
        let mut m = integrate(&mut p, IDLE);
        resolve_platforms(&mut p, &mut m, [&plat]);
        commit(&mut p, m);
        assert_eq!(p.vel_y, 0);
        assert_eq!(p.rect.top(), 76);
    }

    #[test]
    fn head_bump_below_low_platform_stops_vertical_motion() {
        let plat = platform_at(200, 500, MotionMask::VERTICAL); // bottom 525
        let mut p = Player::new(200, 530);
        p.vel_y = -10;
        let mut m = integrate(&mut p, IDLE);
        resolve_platforms(&mut p, &mut m, [&plat]);
        commit(&mut p, m);
        assert_eq!(p.vel_y, 0);
        assert_eq!(p.rect.top(), 530);
    }

    #[test]
    fn deep_overlap_outside_threshold_is_ignored_vertically() {
        let plat = platform_at(200, 500, MotionMask::HORIZONTAL);
        // middle of the player overlaps the platform; both edges far away
        let mut p = Player::new(200, 470);
        let mut m = integrate(&mut p, IDLE);
        let before = p.rect.y;
        resolve_platforms(&mut p, &mut m, [&plat]);
        assert_eq!(m.dy, 1);
        assert!(p.in_air);
        // still carried
        assert_eq!(p.rect.x, 201);
        assert_eq!(p.rect.y, before);
    }

    #[test]
    fn ghost_floats_to_ceiling() {
        let mut p = Player::new(100, 212);
        drift_ghost(&mut p);
        assert_eq!(p.rect.y, 207);
        drift_ghost(&mut p);
        drift_ghost(&mut p);
        assert_eq!(p.rect.y, 197);
        drift_ghost(&mut p);
        assert_eq!(p.rect.y, 197);
    }

    proptest! {
        #[test]
        fn tile_resolution_leaves_no_overlap_on_triggering_axis(
            x in 380i32..620,
            y in 380i32..620,
            vel in -15i32..=10,
            left in any::<bool>(),
            right in any::<bool>(),
        ) {
            let tile = Tile::at_cell(10, 10, Material::Grass);
            let mut tiles = TileSet::new();
            tiles.push(tile);

            let mut p = Player::new(x, y);
            p.vel_y = vel;
            prop_assume!(!tile.rect.overlaps(&p.rect));

            let mut m = integrate(&mut p, FrameInput { left, right, jump: false });
            resolve_tiles(&mut p, &mut m, &tiles);

            prop_assert!(!tile.rect.overlaps(&p.rect.offset(m.dx, 0)));
            prop_assert!(!tile.rect.overlaps(&p.rect.offset(0, m.dy)));
        }
    }

    #[test]
    fn resolved_rect_touches_but_does_not_enter() {
        let tiles = floor(19, 0..20);
        let mut p = Player::new(300, 875);
        p.vel_y = 9;
        let m = tick(&mut p, IDLE, &tiles);
        assert_eq!(m.dy, 5);
        assert_eq!(p.rect, Rect::new(300, 880, 45, 70));
    }
}
