//! A library for simulating one-dimensional cellular automata with spatially
//! heterogeneous rules.
//!
//! Every cell holds an integer state and is governed by a rule given as a
//! [Wolfram code](https://en.wikipedia.org/wiki/Wolfram_code). Different
//! cells may be governed by different codes, so a grid can be partitioned
//! into regions whose boundaries show interface effects.
//!
//! # Example
//!
//! ```
//! use wolfline_lib::{Automaton, Config};
//!
//! // An elementary rule 110 automaton on 16 cells.
//! let config = Config::new(16, 110);
//! let mut automaton = Automaton::new(config).unwrap();
//!
//! automaton.set_state(8, 1).unwrap();
//! automaton.step().unwrap();
//! ```

#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::use_self)]
#![warn(missing_docs)]

mod automaton;
mod config;
mod error;

pub use automaton::Automaton;
pub use config::{Boundary, Config};
pub use error::{AutomatonError, ConfigError};
pub use wolfram_code::{CodeError, RuleTable};
