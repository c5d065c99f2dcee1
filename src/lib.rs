//! Race management and ranking engine for multi-stage cycling races.
//!
//! The [`CyclingPortal`] stores teams, riders, races, stages and checkpoints
//! together with the riders' registered times. Rankings, adjusted times,
//! points and race classifications are derived on demand by [`ranking`].

pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod output;
pub mod persistence;
pub mod portal;
pub mod ranking;

pub use error::{PortalError, Result};
pub use portal::CyclingPortal;
