//! Replay of recorded pointer, camera and selector input.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec2;
use pano_hotspot::{InteractionController, LoadStatus, OverlaySurface, PointerOutcome, Viewer};
use serde::Deserialize;

use crate::software_viewer::SoftwareViewer;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    Move {
        x: f32,
        y: f32,
        /// Simulated time since the previous step.
        #[serde(default = "default_move_gap_ms")]
        after_ms: u64,
    },
    Click {
        x: f32,
        y: f32,
    },
    Leave,
    Camera {
        #[serde(default)]
        yaw: Option<f32>,
        #[serde(default)]
        pitch: Option<f32>,
        #[serde(default)]
        hfov: Option<f32>,
    },
    SelectRoom {
        room: String,
    },
    SelectVariant {
        slot: String,
        variant: String,
    },
    Cycle {
        slot: String,
    },
    NextRoom,
    /// Blocks until the pending reload settles.
    Wait {
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

fn default_move_gap_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

pub fn load_script(path: &Path) -> Result<Script> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let script: Script = serde_json::from_str(&data)
        .with_context(|| format!("parsing script {}", path.display()))?;
    Ok(script)
}

/// Counters printed at the end of a replay.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub hovers: usize,
    pub activations: usize,
    pub ignored: usize,
    pub throttled: usize,
}

pub fn run_script<O: OverlaySurface>(
    controller: &mut InteractionController<SoftwareViewer, O>,
    script: &Script,
    settle_timeout: Duration,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    let mut clock = Instant::now();
    for (idx, step) in script.steps.iter().enumerate() {
        summary.steps += 1;
        controller.pump();
        match step {
            ScriptStep::Move { x, y, after_ms } => {
                clock += Duration::from_millis(*after_ms);
                let outcome = controller.pointer_move(Vec2::new(*x, *y), clock);
                tally(&mut summary, &outcome);
                println!(
                    "[pano_viewer] step {idx} move ({x:.1}, {y:.1}) -> {} cursor={:?}",
                    describe(&outcome),
                    controller.viewer().cursor()
                );
            }
            ScriptStep::Click { x, y } => {
                let outcome = controller.pointer_click(Vec2::new(*x, *y));
                tally(&mut summary, &outcome);
                println!(
                    "[pano_viewer] step {idx} click ({x:.1}, {y:.1}) -> {}",
                    describe(&outcome)
                );
            }
            ScriptStep::Leave => {
                let outcome = controller.pointer_leave();
                tally(&mut summary, &outcome);
                println!("[pano_viewer] step {idx} leave -> {}", describe(&outcome));
            }
            ScriptStep::Camera { yaw, pitch, hfov } => {
                controller.viewer_mut().set_camera(*yaw, *pitch, *hfov);
                let highlighted = controller.camera_changed();
                let viewer = controller.viewer();
                println!(
                    "[pano_viewer] step {idx} camera yaw={:.1} pitch={:.1} hfov={:.1} highlighted={highlighted}",
                    viewer.yaw(),
                    viewer.pitch(),
                    viewer.hfov()
                );
            }
            ScriptStep::SelectRoom { room } => {
                let changed = controller.switch_room(room);
                println!("[pano_viewer] step {idx} select_room {room} -> changed={changed}");
            }
            ScriptStep::SelectVariant { slot, variant } => {
                let changed = controller.set_furniture_variant(slot, variant);
                println!(
                    "[pano_viewer] step {idx} select_variant {slot}={variant} -> changed={changed}"
                );
            }
            ScriptStep::Cycle { slot } => match controller.cycle_furniture_variant(slot) {
                Some(variant) => println!("[pano_viewer] step {idx} cycle {slot} -> {variant}"),
                None => println!("[pano_viewer] step {idx} cycle {slot} -> unavailable"),
            },
            ScriptStep::NextRoom => {
                let changed = controller.next_room();
                println!(
                    "[pano_viewer] step {idx} next_room -> {} changed={changed}",
                    controller.navigation().current_room_id()
                );
            }
            ScriptStep::Wait { timeout_ms } => {
                let timeout = timeout_ms.map(Duration::from_millis).unwrap_or(settle_timeout);
                let settled = controller.settle(timeout);
                println!("[pano_viewer] step {idx} wait -> settled={settled}");
                report_state(controller);
            }
        }
    }
    summary
}

fn tally(summary: &mut ReplaySummary, outcome: &PointerOutcome) {
    match outcome {
        PointerOutcome::Hover { .. } => summary.hovers += 1,
        PointerOutcome::Activated(_) => summary.activations += 1,
        PointerOutcome::Ignored => summary.ignored += 1,
        PointerOutcome::Throttled => summary.throttled += 1,
        PointerOutcome::Idle => {}
    }
}

pub fn describe(outcome: &PointerOutcome) -> String {
    match outcome {
        PointerOutcome::Ignored => "ignored".to_string(),
        PointerOutcome::Throttled => "throttled".to_string(),
        PointerOutcome::Idle => "idle".to_string(),
        PointerOutcome::Hover {
            key,
            label,
            highlighted,
        } => match label {
            Some(label) => format!("hover {key} \"{label}\" highlighted={highlighted}"),
            None => format!("hover {key} highlighted={highlighted}"),
        },
        PointerOutcome::Activated(key) => format!("activated {key}"),
    }
}

/// Prints the room, selection and load status after a transition.
pub fn report_state<O: OverlaySurface>(controller: &InteractionController<SoftwareViewer, O>) {
    let navigation = controller.navigation();
    let selection = if navigation.current_room().has_swappable_furniture() {
        navigation
            .current_room()
            .furniture_slots
            .iter()
            .filter_map(|slot| {
                navigation
                    .furniture_variant(&slot.name)
                    .map(|variant| format!("{}={variant}", slot.name))
            })
            .collect::<Vec<_>>()
            .join(",")
    } else {
        "-".to_string()
    };
    let reference = match controller.references().status() {
        LoadStatus::Idle => "idle".to_string(),
        LoadStatus::Loading { .. } => "loading".to_string(),
        LoadStatus::Ready { .. } => "ready".to_string(),
        LoadStatus::Failed { reason, .. } => format!("failed ({reason})"),
    };
    let visible = match controller.viewer().panorama_size() {
        Some((width, height)) => format!("{width}x{height}"),
        None => "unavailable".to_string(),
    };
    println!(
        "[pano_viewer] ready room={} furniture={selection} visible={} ({visible}) reference={reference} armed={}",
        navigation.current_room_id(),
        navigation.current_visible_asset_path(),
        controller.listeners_armed()
    );
}
