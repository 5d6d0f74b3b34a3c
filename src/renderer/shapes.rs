//! Scene building: flat-colored 2D primitives in display pixels.
//!
//! `build_scene` consumes a read-only snapshot of the run each frame; nothing
//! in here mutates simulation state.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Palette, Vertex, palette};
use crate::catalog::{self, OBSTACLE_SPRITES};
use crate::consts::*;
use crate::settings::Theme;
use crate::sim::RunState;

/// Append a filled rectangle (two triangles)
pub fn push_rect(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
    let (x2, y2) = (x + w, y + h);
    out.push(Vertex::new(x, y, color));
    out.push(Vertex::new(x2, y, color));
    out.push(Vertex::new(x, y2, color));

    out.push(Vertex::new(x2, y, color));
    out.push(Vertex::new(x2, y2, color));
    out.push(Vertex::new(x, y2, color));
}

/// Append a filled circle as a triangle fan
pub fn push_circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Height of one center-line dash and the gap that follows it
const DASH_H: f32 = 34.0;
/// Length/gap of the static lane divider dashes
const LANE_DASH: f32 = 16.0;
const LANE_GAP: f32 = 18.0;

fn push_road(out: &mut Vec<Vertex>, run: &RunState, pal: &Palette) {
    push_rect(out, 0.0, 0.0, run.width, run.height, pal.backdrop);
    push_rect(out, run.lanes.road_x, 0.0, run.lanes.road_w, run.height, pal.road);

    // Static lane dividers
    for i in 1..LANE_COUNT {
        let x = run.lanes.road_x + i as f32 * run.lanes.lane_width;
        let mut y = 0.0;
        while y < run.height {
            push_rect(out, x - 2.0, y, 4.0, LANE_DASH, pal.lane_line);
            y += LANE_DASH + LANE_GAP;
        }
    }

    // Center dashes scroll with the road speed
    let offset = (run.frame as f32 * run.effective_speed()) % (DASH_H * 2.0);
    let center_x = run.lanes.road_x + run.lanes.road_w / 2.0;
    let mut y = -offset;
    while y < run.height {
        push_rect(out, center_x - 6.0, y + 40.0, 12.0, DASH_H, pal.center_dash);
        y += DASH_H * 2.0;
    }
}

/// Build the frame's vertex list from the run snapshot
pub fn build_scene(run: &RunState, theme: Theme, selected_vehicle: &str) -> Vec<Vertex> {
    let pal = palette(theme);
    let mut out = Vec::with_capacity(1024);

    push_road(&mut out, run, &pal);

    if let Some(finish) = &run.finish {
        push_rect(
            &mut out,
            run.lanes.road_x,
            finish.y,
            run.lanes.road_w,
            15.0,
            pal.finish_light,
        );
        push_rect(
            &mut out,
            run.lanes.road_x,
            finish.y + 15.0,
            run.lanes.road_w,
            15.0,
            pal.finish_dark,
        );
    }

    for obstacle in &run.obstacles {
        let color = OBSTACLE_SPRITES[obstacle.sprite % OBSTACLE_SPRITES.len()].color;
        push_rect(
            &mut out,
            obstacle.x,
            obstacle.y,
            OBSTACLE_WIDTH,
            OBSTACLE_HEIGHT,
            color,
        );
    }

    for coin in &run.coins {
        let center = Vec2::new(coin.x + COIN_SIZE / 2.0, coin.y + COIN_SIZE / 2.0);
        push_circle(&mut out, center, COIN_SIZE / 2.0, pal.coin, 20);
    }

    // Player car on top; unknown selections render as the default vehicle
    let body = catalog::vehicle(selected_vehicle)
        .or_else(|| catalog::vehicle(catalog::DEFAULT_VEHICLE))
        .map(|v| v.color)
        .unwrap_or([1.0, 0.24, 0.0, 1.0]);
    push_rect(
        &mut out,
        run.player.x - PLAYER_WIDTH / 2.0,
        run.player.y,
        PLAYER_WIDTH,
        PLAYER_HEIGHT,
        body,
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Difficulty, Mode};

    #[test]
    fn test_circle_vertex_count() {
        let mut out = Vec::new();
        push_circle(&mut out, Vec2::new(0.0, 0.0), 10.0, [1.0; 4], 16);
        assert_eq!(out.len(), 16 * 3);
    }

    #[test]
    fn test_scene_ends_with_player_quad() {
        let run = RunState::new(
            Mode::Endless {
                tier: Difficulty::Easy,
            },
            900.0,
            600.0,
            3,
        );
        let scene = build_scene(&run, Theme::Light, "red");
        assert!(scene.len() >= 6);
        // Last quad is the player's car at its lane center
        let last = &scene[scene.len() - 6..];
        let min_x = last
            .iter()
            .map(|v| v.position[0])
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_x, run.player.x - PLAYER_WIDTH / 2.0);
    }
}
