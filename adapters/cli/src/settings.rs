//! TOML settings layered over the built-in simulation tuning.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use faemaze_core::{PropKind, VisitorState};
use faemaze_simulation::{
    FaeConfig, MovementConfig, PlacementRequest, SimulationConfig, SpawningConfig,
};
use faemaze_world::PathCosts;
use glam::Vec3;
use serde::Deserialize;

/// Every section is optional; absent keys keep their built-in value.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    grid: GridSettings,
    pathfinding: PathfindingSettings,
    visitors: VisitorSettings,
    fae: FaeSettings,
    spawning: SpawningSettings,
    economy: EconomySettings,
    props: BTreeMap<PropKind, PropSettings>,
    placements: Vec<ScriptedPlacement>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct GridSettings {
    origin: Option<[f32; 3]>,
    tile_size: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct PathfindingSettings {
    base_step_cost: Option<u32>,
    min_step_cost: Option<u32>,
    attraction_weight: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct VisitorSettings {
    step_interval_ms: Option<u64>,
    multipliers: MultiplierSettings,
    fascination_ms: Option<u64>,
    confusion_ms: Option<u64>,
    wander_seed: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct MultiplierSettings {
    walking: Option<f32>,
    fascinated: Option<f32>,
    confused: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct FaeSettings {
    wisp_step_interval_ms: Option<u64>,
    puka_reach: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct SpawningSettings {
    interval_ms: Option<u64>,
    seed: Option<u64>,
    max_visitors: Option<usize>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct EconomySettings {
    starting_essence: Option<u32>,
    essence_per_visitor: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct PropSettings {
    radius: Option<u32>,
    max_steps: Option<u32>,
    strength: Option<f32>,
    cost: Option<u32>,
}

/// Prop the player drops at a fixed tick of a headless run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptedPlacement {
    pub(crate) kind: PropKind,
    pub(crate) x: f32,
    pub(crate) y: f32,
    #[serde(default)]
    pub(crate) at_tick: u64,
}

impl ScriptedPlacement {
    pub(crate) fn request(&self, z: f32) -> PlacementRequest {
        PlacementRequest::new(self.kind, Vec3::new(self.x, self.y, z))
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }

    /// Placements scripted for the run, ordered by tick.
    pub(crate) fn placements(&self) -> Vec<ScriptedPlacement> {
        let mut placements = self.placements.clone();
        placements.sort_by_key(|placement| placement.at_tick);
        placements
    }

    /// Simulation tuning with every present key applied over the defaults.
    pub(crate) fn simulation_config(&self) -> SimulationConfig {
        let defaults = SimulationConfig::default();
        let mut world = defaults.world;

        if let Some([x, y, z]) = self.grid.origin {
            world.origin = Vec3::new(x, y, z);
        }
        if let Some(tile_size) = self.grid.tile_size {
            world.tile_size = tile_size;
        }

        let costs = world.path_costs;
        world.path_costs = PathCosts::new(
            self.pathfinding
                .base_step_cost
                .unwrap_or(costs.base_step_cost()),
            self.pathfinding
                .min_step_cost
                .unwrap_or(costs.min_step_cost()),
            self.pathfinding
                .attraction_weight
                .unwrap_or(costs.attraction_weight()),
        );

        if let Some(ms) = self.visitors.step_interval_ms {
            world.visitor_step_interval = Duration::from_millis(ms);
        }
        if let Some(essence) = self.economy.starting_essence {
            world.starting_essence = essence;
        }
        if let Some(essence) = self.economy.essence_per_visitor {
            world.essence_per_visitor = essence;
        }

        for (kind, overrides) in &self.props {
            let tuning = world.props.tuning_mut(*kind);
            tuning.radius = overrides.radius.unwrap_or(tuning.radius);
            tuning.max_steps = overrides.max_steps.unwrap_or(tuning.max_steps);
            tuning.strength = overrides.strength.unwrap_or(tuning.strength);
            tuning.cost = overrides.cost.unwrap_or(tuning.cost);
        }

        let spawning = defaults.spawning;
        let movement = defaults.movement;
        let fae = defaults.fae;
        let multipliers = &self.visitors.multipliers;

        SimulationConfig {
            world,
            spawning: SpawningConfig::new(
                millis_or(self.spawning.interval_ms, spawning.spawn_interval()),
                self.spawning.seed.unwrap_or(spawning.rng_seed()),
                self.spawning.max_visitors.unwrap_or(spawning.max_visitors()),
            ),
            movement: MovementConfig::new(
                multipliers
                    .walking
                    .unwrap_or(movement.multiplier_for(VisitorState::Walking)),
                multipliers
                    .fascinated
                    .unwrap_or(movement.multiplier_for(VisitorState::Fascinated)),
                multipliers
                    .confused
                    .unwrap_or(movement.multiplier_for(VisitorState::Confused)),
                self.visitors.wander_seed.unwrap_or(movement.rng_seed()),
            ),
            fae: FaeConfig::new(
                millis_or(self.visitors.fascination_ms, fae.fascination()),
                millis_or(self.visitors.confusion_ms, fae.confusion()),
                millis_or(self.fae.wisp_step_interval_ms, fae.wisp_step_interval()),
                self.fae.puka_reach.unwrap_or(fae.puka_reach()),
            ),
        }
    }
}

fn millis_or(value: Option<u64>, fallback: Duration) -> Duration {
    value.map_or(fallback, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_keep_defaults() {
        let settings = Settings::parse("").expect("empty toml is valid");
        assert_eq!(settings.simulation_config(), SimulationConfig::default());
        assert!(settings.placements().is_empty());
    }

    #[test]
    fn present_keys_override_defaults() {
        let settings = Settings::parse(
            r#"
            [grid]
            tile_size = 2.0
            origin = [1.0, -1.0, 0.5]

            [pathfinding]
            base_step_cost = 500

            [visitors]
            step_interval_ms = 250
            fascination_ms = 1000
            multipliers = { fascinated = 5.0 }

            [spawning]
            max_visitors = 3

            [economy]
            starting_essence = 7

            [props.fairy_ring]
            cost = 1
            radius = 6
            "#,
        )
        .expect("valid settings");
        let config = settings.simulation_config();
        let defaults = SimulationConfig::default();

        assert_eq!(config.world.tile_size, 2.0);
        assert_eq!(config.world.origin, Vec3::new(1.0, -1.0, 0.5));
        assert_eq!(config.world.path_costs.base_step_cost(), 500);
        assert_eq!(
            config.world.path_costs.min_step_cost(),
            defaults.world.path_costs.min_step_cost()
        );
        assert_eq!(config.world.visitor_step_interval, Duration::from_millis(250));
        assert_eq!(config.world.starting_essence, 7);
        assert_eq!(config.world.props.fairy_ring.cost, 1);
        assert_eq!(config.world.props.fairy_ring.radius, 6);
        assert_eq!(
            config.world.props.fairy_ring.strength,
            defaults.world.props.fairy_ring.strength
        );
        assert_eq!(config.world.props.lantern, defaults.world.props.lantern);
        assert_eq!(config.fae.fascination(), Duration::from_millis(1000));
        assert_eq!(config.movement.multiplier_for(VisitorState::Fascinated), 5.0);
        assert_eq!(
            config.movement.multiplier_for(VisitorState::Walking),
            defaults.movement.multiplier_for(VisitorState::Walking)
        );
        assert_eq!(config.spawning.max_visitors(), 3);
    }

    #[test]
    fn scripted_placements_are_sorted_by_tick() {
        let settings = Settings::parse(
            r#"
            [[placements]]
            kind = "puka"
            x = 3.5
            y = 1.5
            at_tick = 40

            [[placements]]
            kind = "lantern"
            x = 0.5
            y = 0.5
            "#,
        )
        .expect("valid settings");

        let placements = settings.placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].kind, PropKind::Lantern);
        assert_eq!(placements[0].at_tick, 0);
        assert_eq!(
            placements[1].request(0.0),
            PlacementRequest::new(PropKind::Puka, Vec3::new(3.5, 1.5, 0.0))
        );
    }

    #[test]
    fn bundled_settings_drive_the_bundled_maze() {
        let settings = Settings::parse(include_str!("../faemaze.toml")).expect("bundled settings");
        let layout = faemaze_world::MazeLayout::parse(include_str!("../mazes/glade.txt"))
            .expect("bundled maze");
        let config = settings.simulation_config();
        assert_eq!(config, SimulationConfig::default());

        let transform = faemaze_world::GridTransform::for_grid(
            &layout.to_grid(),
            config.world.origin,
            config.world.tile_size,
        )
        .expect("valid tile size");
        for placement in settings.placements() {
            assert!(
                transform
                    .world_to_grid(placement.request(0.0).position)
                    .is_some(),
                "{placement:?} lies outside the maze"
            );
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::parse("[grid]\ntile = 2.0\n").is_err());
        assert!(Settings::parse("[props.dragon]\ncost = 1\n").is_err());
    }
}
