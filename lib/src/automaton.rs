use crate::{
    config::{Boundary, Config},
    error::{AutomatonError, ConfigError},
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter, Write},
};
use wolfram_code::{max_code, RuleTable};

/// A one-dimensional cellular automaton.
///
/// The automaton owns a row of cells, a Wolfram code assignment for every
/// cell, and a cache of the lookup tables those codes encode. Cells evolve
/// synchronously: every [`step`](Automaton::step) reads the previous
/// generation only, and the new grid replaces the old one atomically.
///
/// The rule assignment methods let different cells be governed by different
/// codes, so a grid can be partitioned into regions whose boundaries show
/// interface effects.
///
/// # Example
///
/// ```
/// use wolfline_lib::{Automaton, Config};
///
/// let config = Config::new(16, 110);
/// let mut automaton = Automaton::new(config).unwrap();
///
/// automaton.set_state(8, 1).unwrap();
/// automaton.step().unwrap();
/// assert_eq!(automaton.generation(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Automaton {
    /// The configuration of the automaton.
    config: Config,

    /// The state of each cell.
    ///
    /// Under [`Boundary::Fixed`] this holds `radius` extra trailing cells
    /// that never evolve and always stay in state 0.
    grid: Vec<u8>,

    /// The Wolfram code governing each evolving cell.
    rule_grid: Vec<u64>,

    /// Lookup tables for every code that appears in `rule_grid`.
    rules: HashMap<u64, RuleTable>,

    /// The exclusive upper bound of valid Wolfram codes.
    ///
    /// [`None`] means the bound exceeds [`u64::MAX`] and every code is valid.
    code_bound: Option<u64>,

    /// Source of randomness for the randomized state initializers.
    rng: Xoshiro256StarStar,

    /// The number of steps taken so far.
    generation: u64,
}

impl Automaton {
    /// Create a new automaton from a configuration.
    ///
    /// Every cell starts in state 0 and is governed by
    /// [`initial_code`](Config::initial_code).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. See
    /// [`Config::check`] for the possible errors.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let config = config.check()?;

        let width = config.width as usize;
        let grid_len = match config.boundary {
            Boundary::Periodic => width,
            Boundary::Fixed => width + config.radius as usize,
        };

        let code_bound = max_code(config.num_states, config.neighborhood_size())
            .map_err(|_| ConfigError::NeighborhoodTooLarge)?;

        let table = RuleTable::from_code(
            config.initial_code,
            config.neighborhood_size(),
            config.num_states,
        )
        .map_err(|_| ConfigError::InvalidRuleCode(config.initial_code))?;

        let rng = match config.seed {
            Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
            None => Xoshiro256StarStar::from_entropy(),
        };

        Ok(Self {
            grid: vec![0; grid_len],
            rule_grid: vec![config.initial_code; width],
            rules: HashMap::from([(config.initial_code, table)]),
            code_bound,
            rng,
            generation: 0,
            config,
        })
    }

    /// The configuration of the automaton.
    #[inline]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The number of evolving cells in the grid.
    #[inline]
    pub const fn width(&self) -> usize {
        self.config.width as usize
    }

    /// The neighborhood radius.
    #[inline]
    pub const fn radius(&self) -> u32 {
        self.config.radius
    }

    /// The number of states a cell can take.
    #[inline]
    pub const fn num_states(&self) -> u8 {
        self.config.num_states
    }

    /// The boundary conditions of the grid.
    #[inline]
    pub const fn boundary(&self) -> Boundary {
        self.config.boundary
    }

    /// The number of steps taken so far.
    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The states of the evolving cells.
    ///
    /// Under [`Boundary::Fixed`] the always-zero extension cells are not
    /// included.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.grid[..self.width()]
    }

    /// The state of the cell at `index`, or [`None`] outside the evolving
    /// region.
    #[inline]
    pub fn state(&self, index: usize) -> Option<u8> {
        self.cells().get(index).copied()
    }

    /// The Wolfram code assigned to each evolving cell.
    #[inline]
    pub fn rule_codes(&self) -> &[u64] {
        &self.rule_grid
    }

    /// The cached lookup table for a code, or [`None`] if no cell uses it.
    #[inline]
    pub fn rule_table(&self, code: u64) -> Option<&RuleTable> {
        self.rules.get(&code)
    }

    /// Encode the neighborhood of the cell at `index` as a base-`num_states`
    /// integer.
    ///
    /// The leftmost neighbor is the least significant digit: the encoding is
    /// `sum(cell[index - radius + i] * num_states^i)` for `i` in
    /// `0..=2 * radius`. This is the exact inverse of the digit decomposition
    /// in [`RuleTable::from_code`], so a neighborhood's left-to-right state
    /// sequence round-trips through the lookup.
    ///
    /// Under periodic boundary conditions the indices wrap around the grid.
    /// Under fixed boundary conditions the cells beyond either end read as
    /// state 0.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the evolving region.
    pub fn neighborhood_code(&self, index: usize) -> u64 {
        assert!(index < self.width());

        let width = self.width() as isize;
        let radius = self.config.radius as isize;
        let base = u64::from(self.config.num_states);

        let mut code = 0;
        let mut weight = 1;

        for i in -radius..=radius {
            let offset = index as isize + i;

            let state = match self.config.boundary {
                Boundary::Periodic => self.grid[offset.rem_euclid(width) as usize],
                // The cells beyond the right end are the always-zero
                // extension cells, which are part of the grid.
                Boundary::Fixed => {
                    if offset < 0 {
                        0
                    } else {
                        self.grid[offset as usize]
                    }
                }
            };

            code += u64::from(state) * weight;
            weight *= base;
        }

        code
    }

    /// Set the state of the cell at `index`.
    ///
    /// # Errors
    ///
    /// - [`AutomatonError::InvalidState`] if `state` is not smaller than the
    ///   number of states.
    /// - [`AutomatonError::IndexOutOfRange`] if `index` is outside the
    ///   evolving region.
    ///
    /// The grid is left unchanged on error.
    pub fn set_state(&mut self, index: usize, state: u8) -> Result<(), AutomatonError> {
        if state >= self.config.num_states {
            return Err(AutomatonError::InvalidState(state));
        }

        if index >= self.width() {
            return Err(AutomatonError::IndexOutOfRange(index));
        }

        self.grid[index] = state;

        Ok(())
    }

    /// Advance the cell at `index` to the next state, wrapping back to 0
    /// after the last one, and return the new state.
    ///
    /// This is the toggle that pointer-driven collaborators map clicks to.
    ///
    /// # Errors
    ///
    /// [`AutomatonError::IndexOutOfRange`] if `index` is outside the evolving
    /// region.
    pub fn cycle_state(&mut self, index: usize) -> Result<u8, AutomatonError> {
        let state = self
            .state(index)
            .ok_or(AutomatonError::IndexOutOfRange(index))?;

        let next = (state + 1) % self.config.num_states;
        self.grid[index] = next;

        Ok(next)
    }

    /// Reset every cell to state 0.
    #[inline]
    pub fn clear(&mut self) {
        self.grid.fill(0);
    }

    /// Assign an independent uniformly random state to every evolving cell.
    ///
    /// Reproducible only if the configuration has a [`seed`](Config::seed).
    pub fn randomize_all(&mut self) {
        let width = self.width();
        let num_states = self.config.num_states;

        for cell in &mut self.grid[..width] {
            *cell = self.rng.gen_range(0..num_states);
        }
    }

    /// Assign independent uniformly random states to `count` randomly chosen
    /// evolving cells.
    ///
    /// The cells are drawn with replacement: an index may be drawn more than
    /// once, and the later draw simply overwrites the earlier one.
    pub fn randomize_sparse(&mut self, count: usize) {
        let width = self.width();
        let num_states = self.config.num_states;

        for _ in 0..count {
            let index = self.rng.gen_range(0..width);
            self.grid[index] = self.rng.gen_range(0..num_states);
        }
    }

    /// Check that a Wolfram code is within range.
    fn check_code(&self, code: u64) -> Result<(), AutomatonError> {
        if self.code_bound.is_some_and(|bound| code >= bound) {
            Err(AutomatonError::InvalidRuleCode(code))
        } else {
            Ok(())
        }
    }

    /// Insert the lookup table for a code into the cache if it is absent.
    fn cache_rule(&mut self, code: u64) -> Result<(), AutomatonError> {
        self.check_code(code)?;

        if !self.rules.contains_key(&code) {
            let table = RuleTable::from_code(
                code,
                self.config.neighborhood_size(),
                self.config.num_states,
            )
            .map_err(|_| AutomatonError::InvalidRuleCode(code))?;

            self.rules.insert(code, table);
        }

        Ok(())
    }

    /// Assign a Wolfram code to every cell.
    ///
    /// Tables cached for other codes are discarded, since no cell references
    /// them any more.
    ///
    /// # Errors
    ///
    /// [`AutomatonError::InvalidRuleCode`] if the code is out of range. The
    /// assignment and the cache are left unchanged.
    pub fn assign_rule_global(&mut self, code: u64) -> Result<(), AutomatonError> {
        self.check_code(code)?;

        let table = match self.rules.remove(&code) {
            Some(table) => table,
            None => RuleTable::from_code(
                code,
                self.config.neighborhood_size(),
                self.config.num_states,
            )
            .map_err(|_| AutomatonError::InvalidRuleCode(code))?,
        };

        self.rules.clear();
        self.rules.insert(code, table);
        self.rule_grid.fill(code);

        Ok(())
    }

    /// Assign a Wolfram code to the single cell at `index`.
    ///
    /// The code's table is built and cached on first use; tables for every
    /// other code still in use are kept.
    ///
    /// # Errors
    ///
    /// - [`AutomatonError::InvalidRuleCode`] if the code is out of range.
    /// - [`AutomatonError::IndexOutOfRange`] if `index` is outside the
    ///   evolving region.
    ///
    /// The assignment is left unchanged on error.
    pub fn assign_rule_local(&mut self, code: u64, index: usize) -> Result<(), AutomatonError> {
        if index >= self.width() {
            return Err(AutomatonError::IndexOutOfRange(index));
        }

        self.cache_rule(code)?;
        self.rule_grid[index] = code;

        Ok(())
    }

    /// Assign a Wolfram code to every cell with index in `[front, back)`,
    /// taken modulo the width.
    ///
    /// The interval wraps around the grid boundary, so `back < front`
    /// describes a wrapping range rather than an error, and `front == back`
    /// assigns nothing.
    ///
    /// # Errors
    ///
    /// [`AutomatonError::InvalidRuleCode`] if the code is out of range. The
    /// assignment is left unchanged.
    pub fn assign_rule_interval(
        &mut self,
        code: u64,
        front: usize,
        back: usize,
    ) -> Result<(), AutomatonError> {
        self.check_code(code)?;

        let width = self.width();
        let front = front % width;
        let span = (back % width + width - front) % width;

        for i in 0..span {
            self.assign_rule_local(code, (front + i) % width)?;
        }

        Ok(())
    }

    /// Assign a Wolfram code to evenly spaced cells: every `skip`-th cell
    /// starting from `front`, `width / skip` cells in total, wrapping around
    /// the grid boundary.
    ///
    /// # Errors
    ///
    /// - [`AutomatonError::InvalidSkip`] if `skip` is zero.
    /// - [`AutomatonError::InvalidRuleCode`] if the code is out of range.
    ///
    /// The assignment is left unchanged on error.
    pub fn assign_rule_skip(
        &mut self,
        code: u64,
        front: usize,
        skip: usize,
    ) -> Result<(), AutomatonError> {
        if skip == 0 {
            return Err(AutomatonError::InvalidSkip);
        }

        self.check_code(code)?;

        let width = self.width();

        for i in 0..width / skip {
            self.assign_rule_local(code, (front + i * skip) % width)?;
        }

        Ok(())
    }

    /// Advance the whole grid by one generation.
    ///
    /// The update is synchronous: every neighborhood is read from the old
    /// grid, and the new grid replaces the old one only once every cell is
    /// computed. The new grid starts from all zeros, so the extension cells
    /// under [`Boundary::Fixed`] stay in state 0.
    ///
    /// # Errors
    ///
    /// [`AutomatonError::MissingRuleTable`] if a cell is governed by a code
    /// with no cached table. The grid is left unchanged. This cannot happen
    /// when the cache is maintained through the rule assignment methods.
    pub fn step(&mut self) -> Result<(), AutomatonError> {
        let mut new_grid = vec![0; self.grid.len()];

        for index in 0..self.width() {
            let code = self.rule_grid[index];
            let table = self
                .rules
                .get(&code)
                .ok_or(AutomatonError::MissingRuleTable(code))?;

            new_grid[index] = table.get(self.neighborhood_code(index));
        }

        self.grid = new_grid;
        self.generation += 1;

        Ok(())
    }

    /// Advance the grid by `count` generations.
    ///
    /// # Errors
    ///
    /// The same as [`step`](Automaton::step).
    pub fn steps(&mut self, count: u64) -> Result<(), AutomatonError> {
        for _ in 0..count {
            self.step()?;
        }

        Ok(())
    }
}

/// One character per evolving cell: `.` for state 0, `o` for state 1, the
/// base-36 digit for higher states, and `?` beyond those.
impl Display for Automaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &state in self.cells() {
            let c = match state {
                0 => '.',
                1 => 'o',
                n => char::from_digit(u32::from(n), 36).unwrap_or('?'),
            };

            f.write_char(c)?;
        }

        Ok(())
    }
}
