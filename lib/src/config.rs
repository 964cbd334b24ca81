#[cfg(feature = "clap")]
use clap::{Args, ValueEnum};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use wolfram_code::max_code;

use crate::error::ConfigError;

/// Boundary conditions of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Boundary {
    /// The grid wraps around: the left neighbor of the first cell is the
    /// last cell, and the right neighbor of the last cell is the first cell.
    #[default]
    Periodic,

    /// The grid is extended by `radius` cells that never evolve and always
    /// read as state 0.
    Fixed,
}

/// The configuration of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(Args))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// The number of evolving cells in the grid.
    pub width: u32,

    /// The Wolfram code initially assigned to every cell.
    ///
    /// The base-`num_states` digits of the code, least significant first,
    /// are the outputs of the rule for each possible neighborhood. Code 0 is
    /// the quiescent rule that maps every neighborhood to state 0.
    pub initial_code: u64,

    /// The neighborhood radius.
    ///
    /// A cell's neighborhood consists of itself and the `radius` cells on
    /// each side, `2 * radius + 1` cells in total.
    #[cfg_attr(feature = "clap", arg(short, long, default_value = "1"))]
    pub radius: u32,

    /// The number of states a cell can take.
    #[cfg_attr(feature = "clap", arg(short, long, default_value = "2"))]
    pub num_states: u8,

    /// Boundary conditions of the grid.
    #[cfg_attr(
        feature = "clap",
        arg(short, long, value_enum, default_value = "periodic")
    )]
    pub boundary: Boundary,

    /// Random seed for the randomized state initializers.
    ///
    /// If this is [`None`], the seed is taken from the operating system, and
    /// the initializers are not reproducible.
    #[cfg_attr(feature = "clap", arg(long))]
    pub seed: Option<u64>,
}

impl Config {
    /// Create a new configuration with the default radius (1), number of
    /// states (2), and boundary conditions ([`Periodic`](Boundary::Periodic)).
    #[inline]
    pub const fn new(width: u32, initial_code: u64) -> Self {
        Self {
            width,
            initial_code,
            radius: 1,
            num_states: 2,
            boundary: Boundary::Periodic,
            seed: None,
        }
    }

    /// Set the neighborhood radius.
    ///
    /// See [`radius`](Config::radius) for more details.
    #[inline]
    pub const fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the number of states a cell can take.
    ///
    /// See [`num_states`](Config::num_states) for more details.
    #[inline]
    pub const fn with_num_states(mut self, num_states: u8) -> Self {
        self.num_states = num_states;
        self
    }

    /// Set the boundary conditions.
    ///
    /// See [`boundary`](Config::boundary) for more details.
    #[inline]
    pub const fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the random seed for the randomized state initializers.
    ///
    /// See [`seed`](Config::seed) for more details.
    #[inline]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The number of cells in a neighborhood, `2 * radius + 1`.
    #[inline]
    pub const fn neighborhood_size(&self) -> u32 {
        2 * self.radius + 1
    }

    /// Check whether the configuration is valid.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidSize`] if the width is zero.
    /// - [`ConfigError::InvalidRadius`] if the radius is zero.
    /// - [`ConfigError::TooFewStates`] if the number of states is smaller
    ///   than 2.
    /// - [`ConfigError::NeighborhoodTooLarge`] if the neighborhood has more
    ///   than [`MAX_NEIGHBORHOOD_STATES`](wolfram_code::MAX_NEIGHBORHOOD_STATES)
    ///   possible states.
    /// - [`ConfigError::InvalidRuleCode`] if the initial code is out of
    ///   range.
    pub fn check(self) -> Result<Self, ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::InvalidSize);
        }

        if self.radius == 0 {
            return Err(ConfigError::InvalidRadius);
        }

        if self.num_states < 2 {
            return Err(ConfigError::TooFewStates);
        }

        let bound = max_code(self.num_states, self.neighborhood_size())
            .map_err(|_| ConfigError::NeighborhoodTooLarge)?;

        if bound.is_some_and(|bound| self.initial_code >= bound) {
            return Err(ConfigError::InvalidRuleCode(self.initial_code));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_defaults() {
        let config = Config::new(16, 110);

        assert_eq!(config.width, 16);
        assert_eq!(config.initial_code, 110);
        assert_eq!(config.radius, 1);
        assert_eq!(config.num_states, 2);
        assert_eq!(config.boundary, Boundary::Periodic);
        assert_eq!(config.seed, None);
        assert_eq!(config.neighborhood_size(), 3);
    }

    #[test]
    fn test_builder() {
        let config = Config::new(10, 0)
            .with_radius(2)
            .with_num_states(3)
            .with_boundary(Boundary::Fixed)
            .with_seed(42);

        assert_eq!(config.radius, 2);
        assert_eq!(config.num_states, 3);
        assert_eq!(config.boundary, Boundary::Fixed);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.neighborhood_size(), 5);
    }

    #[test]
    fn test_check() {
        assert!(Config::new(16, 110).check().is_ok());
        assert!(Config::new(16, 255).check().is_ok());

        assert_eq!(Config::new(0, 110).check(), Err(ConfigError::InvalidSize));
        assert_eq!(
            Config::new(16, 110).with_radius(0).check(),
            Err(ConfigError::InvalidRadius)
        );
        assert_eq!(
            Config::new(16, 110).with_num_states(1).check(),
            Err(ConfigError::TooFewStates)
        );
        assert_eq!(
            Config::new(16, 110).with_radius(12).check(),
            Err(ConfigError::NeighborhoodTooLarge)
        );
        assert_eq!(
            Config::new(16, 256).check(),
            Err(ConfigError::InvalidRuleCode(256))
        );
    }

    #[test]
    fn test_boundary_strings() {
        assert_eq!(Boundary::Periodic.to_string(), "Periodic");
        assert_eq!(Boundary::from_str("Fixed"), Ok(Boundary::Fixed));
        assert!(Boundary::from_str("reflective").is_err());

        // Every boundary round-trips through its string form.
        for boundary in Boundary::iter() {
            assert_eq!(Boundary::from_str(&boundary.to_string()), Ok(boundary));
        }
    }
}
