//! `tsc-episode`: runs control episodes against a simulation adapter.
//!
//! # Step loop
//!
//! ```text
//! start(scenario); prime last_state for every intersection
//! while !is_drained():
//!   ① Step     adapter.step(); record departures, then arrivals
//!   ② Observe  per intersection (ascending id): phase, plus the reward
//!              sample or approach counts the scheduler asks for
//!   ③ Decide   DecisionScheduler::step per intersection
//!              (parallel with the `parallel` feature)
//!   ④ Apply    set_phase for every decision, ascending id
//! close(); report average trip time over matched trips
//! ```
//!
//! Only ③ may leave the calling thread; the adapter sees exactly one call at
//! a time.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the decide phase on Rayon's thread pool.          |
//! | `fx-hash`  | FxHash maps in [`TripTimes`].                          |

pub mod builder;
pub mod controller;
pub mod error;
pub mod observer;
pub mod training;
pub mod trips;


pub use builder::EpisodeControllerBuilder;
pub use controller::{EpisodeController, EpisodeReport};
pub use error::{EpisodeError, EpisodeResult};
pub use observer::{DecisionRecord, EpisodeObserver, NoopObserver};
pub use training::TrainingSchedule;
pub use trips::TripTimes;
