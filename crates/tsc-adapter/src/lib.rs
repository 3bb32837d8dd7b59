//! `tsc-adapter`: the boundary between the control core and a running
//! traffic simulation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`adapter`]   | `SimulationAdapter` trait, `Scenario`                           |
//! | [`reward`]    | `RewardSignal` trait, `QueuedVehicles`, `NegativeQueue`, `MeanOccupancy` |
//! | [`demand`]    | `Trip`, `Leg`, `load_demand_csv`, `load_demand_reader`          |
//! | [`queue_sim`] | `QueueSimulation`: deterministic in-process collaborator       |
//! | [`error`]     | `AdapterError`, `AdapterResult<T>`                              |
//!
//! # Design notes
//!
//! Everything the controller learns about the world, and every signal change
//! it makes, goes through [`SimulationAdapter`].  All methods take
//! `&mut self`: an adapter fronts a single external process, so exactly one
//! call can be in flight, and the borrow checker enforces that.
//!
//! [`QueueSimulation`] is a small point-queue model that implements the trait
//! without any external process, so the workspace trains and evaluates
//! end-to-end in tests and in the demo.  Production deployments implement
//! the trait over their simulator's remote-control protocol instead.

pub mod adapter;
pub mod demand;
pub mod error;
pub mod queue_sim;
pub mod reward;


pub use adapter::{Scenario, SimulationAdapter};
pub use demand::{load_demand_csv, load_demand_reader, Leg, Trip};
pub use error::{AdapterError, AdapterResult};
pub use queue_sim::{JunctionSpec, QueueSimConfig, QueueSimulation};
pub use reward::{reward_signal, MeanOccupancy, NegativeQueue, QueuedVehicles, RewardSignal};
