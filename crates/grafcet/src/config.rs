//! Configuration types for GRAFCET compilation and simulation.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field is optional and falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and simulation settings.
//! - [`LayoutSpacing`] - Element sizes and the vertical and horizontal offsets used by layout.
//! - [`SimulationConfig`] - Tunables of the simulation engine.
//!
//! # Example
//!
//! ```
//! # use grafcet::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout]
//!     branch_spacing = 120.0
//!
//!     [simulation]
//!     pulse_duration = 0.05
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.layout().branch_spacing(), 120.0);
//! assert_eq!(config.layout().step_width(), 40.0);
//! assert_eq!(config.simulation().pulse_duration(), 0.05);
//! ```

use serde::Deserialize;

/// Top-level configuration combining layout and simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutSpacing,

    /// Simulation configuration section.
    #[serde(default)]
    simulation: SimulationConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and simulation configurations.
    ///
    /// # Arguments
    ///
    /// * `layout` - Sizes and offsets used to place diagram elements.
    /// * `simulation` - Simulation engine tunables.
    pub fn new(layout: LayoutSpacing, simulation: SimulationConfig) -> Self {
        Self { layout, simulation }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutSpacing {
        &self.layout
    }

    /// Returns the simulation configuration.
    pub fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }
}

/// Element sizes and spacing used by the layout pass.
///
/// Vertical offsets are gaps between the bottom edge of one element and the
/// top edge of the next. All values are in diagram units.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutSpacing {
    /// Left edge and top edge of the trunk's first element.
    origin_x: f32,
    origin_y: f32,

    step_width: f32,
    step_height: f32,
    transition_width: f32,
    transition_height: f32,
    /// Thickness of an AND gate's double bar.
    and_gate_height: f32,
    /// Thickness of an OR gate bar; zero draws a plain marker line.
    or_gate_height: f32,

    /// Step to the following transition.
    step_to_transition: f32,
    /// Step to a transition that opens an AND divergence.
    step_to_transition_compressed: f32,
    /// Transition to the following step.
    transition_to_step: f32,
    /// Transition to an AND divergence bar, and last branch step to an AND convergence bar.
    and_gate_offset: f32,
    /// Step to an OR divergence bar, and last branch transition to an OR convergence bar.
    or_gate_offset: f32,
    /// AND convergence bar to the synchronizing transition.
    and_post_convergence: f32,
    /// OR convergence bar to the following step.
    or_post_convergence: f32,

    /// Minimum horizontal gap between neighbouring branch columns.
    branch_spacing: f32,
    /// Extra width of a gate bar beyond its outermost branch centers.
    gate_margin: f32,
    /// Horizontal clearance of backward jump routes from the diagram.
    jump_margin: f32,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            origin_x: 40.0,
            origin_y: 40.0,
            step_width: 40.0,
            step_height: 40.0,
            transition_width: 30.0,
            transition_height: 4.0,
            and_gate_height: 6.0,
            or_gate_height: 0.0,
            step_to_transition: 30.0,
            step_to_transition_compressed: 20.0,
            transition_to_step: 30.0,
            and_gate_offset: 15.0,
            or_gate_offset: 15.0,
            and_post_convergence: 20.0,
            or_post_convergence: 30.0,
            branch_spacing: 60.0,
            gate_margin: 40.0,
            jump_margin: 30.0,
        }
    }
}

impl LayoutSpacing {
    pub fn origin_x(&self) -> f32 {
        self.origin_x
    }

    pub fn origin_y(&self) -> f32 {
        self.origin_y
    }

    pub fn step_width(&self) -> f32 {
        self.step_width
    }

    pub fn step_height(&self) -> f32 {
        self.step_height
    }

    pub fn transition_width(&self) -> f32 {
        self.transition_width
    }

    pub fn transition_height(&self) -> f32 {
        self.transition_height
    }

    pub fn and_gate_height(&self) -> f32 {
        self.and_gate_height
    }

    pub fn or_gate_height(&self) -> f32 {
        self.or_gate_height
    }

    pub fn step_to_transition(&self) -> f32 {
        self.step_to_transition
    }

    pub fn step_to_transition_compressed(&self) -> f32 {
        self.step_to_transition_compressed
    }

    pub fn transition_to_step(&self) -> f32 {
        self.transition_to_step
    }

    pub fn and_gate_offset(&self) -> f32 {
        self.and_gate_offset
    }

    pub fn or_gate_offset(&self) -> f32 {
        self.or_gate_offset
    }

    pub fn and_post_convergence(&self) -> f32 {
        self.and_post_convergence
    }

    pub fn or_post_convergence(&self) -> f32 {
        self.or_post_convergence
    }

    pub fn branch_spacing(&self) -> f32 {
        self.branch_spacing
    }

    pub fn gate_margin(&self) -> f32 {
        self.gate_margin
    }

    pub fn jump_margin(&self) -> f32 {
        self.jump_margin
    }
}

/// Simulation engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Window in seconds after step activation during which a `P` action is active.
    pulse_duration: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pulse_duration: 0.1,
        }
    }
}

impl SimulationConfig {
    /// Creates a new [`SimulationConfig`].
    ///
    /// # Arguments
    ///
    /// * `pulse_duration` - Length of the `P` qualifier window, in seconds.
    pub fn new(pulse_duration: f64) -> Self {
        Self { pulse_duration }
    }

    /// Returns the `P` qualifier window in seconds.
    pub fn pulse_duration(&self) -> f64 {
        self.pulse_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.layout().step_height(), 40.0);
        assert_eq!(config.layout().or_gate_height(), 0.0);
        assert_eq!(config.simulation().pulse_duration(), 0.1);
    }

    #[test]
    fn test_partial_layout_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            step_width = 60.0
            jump_margin = 50.0
            "#,
        )
        .unwrap();

        assert_eq!(config.layout().step_width(), 60.0);
        assert_eq!(config.layout().jump_margin(), 50.0);
        assert_eq!(config.layout().step_height(), 40.0);
    }

    #[test]
    fn test_compressed_spacing_is_tighter() {
        let spacing = LayoutSpacing::default();
        assert!(spacing.step_to_transition_compressed() < spacing.step_to_transition());
    }
}
