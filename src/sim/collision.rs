//! Collision detection and response for axis-aligned geometry
//!
//! Bodies are pushed out of static platforms along the axis of least
//! penetration. Platforms are resolved one at a time in order, so a body
//! wedged into a corner formed by two platforms may resolve differently
//! depending on their order. That matches the arcade feel and is kept.

use glam::Vec2;

use super::entity::Body;
use super::projectile::Projectile;
use super::rect::Rect;
use crate::consts::GROUND_TOLERANCE;

/// Which axis a resolution pushed along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAxis {
    Horizontal,
    Vertical,
}

#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

/// Push `body` out of a single platform if they overlap.
///
/// Overlap depth on each axis is measured from the side of the platform the
/// body's centre lies on, so a body sunk deep into a thin platform still
/// exits through the nearer face.
pub fn resolve_against_platform(body: &mut Body, platform: &Rect) -> Option<ResolvedAxis> {
    if !rects_overlap(&body.hitbox, platform) {
        return None;
    }

    let hb = body.hitbox;
    let body_center = hb.center();
    let platform_center = platform.center();

    let left_of = body_center.x < platform_center.x;
    let above = body_center.y < platform_center.y;

    let overlap_x = if left_of {
        hb.right() - platform.x
    } else {
        platform.right() - hb.x
    };
    let overlap_y = if above {
        hb.bottom() - platform.y
    } else {
        platform.bottom() - hb.y
    };

    let axis = if overlap_x < overlap_y {
        body.position.x += if left_of { -overlap_x } else { overlap_x };
        body.velocity.x = 0.0;
        ResolvedAxis::Horizontal
    } else {
        body.position.y += if above { -overlap_y } else { overlap_y };
        body.velocity.y = 0.0;
        body.on_ground = body.position.y + hb.height <= platform.y + GROUND_TOLERANCE;
        ResolvedAxis::Vertical
    };

    body.sync_hitbox();
    Some(axis)
}

/// Resolve `body` against every platform, re-syncing the hitbox between each
pub fn resolve_against_platforms(body: &mut Body, platforms: &[Rect]) {
    for platform in platforms {
        resolve_against_platform(body, platform);
    }
}

/// Circle vs axis-aligned rectangle (touching counts as a hit)
#[inline]
pub fn circle_hits_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.clamp_point(center);
    center.distance_squared(closest) <= radius * radius
}

/// Projectile vs body hitbox
#[inline]
pub fn projectile_hits(body: &Body, projectile: &Projectile) -> bool {
    circle_hits_rect(projectile.position, projectile.radius, &body.hitbox)
}
