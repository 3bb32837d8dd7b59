//! `QueueSimulation`: a deterministic point-queue traffic model.
//!
//! # Model
//!
//! - Every junction has `approaches` incoming lanes, each a FIFO queue, and a
//!   fixed signal program of `program.len()` slots.  The program advances on
//!   its own when a slot's duration expires; `set_phase` jumps to a slot and
//!   restarts its timer.
//! - Slot `0` is green for even-numbered approaches and slot `group_split`
//!   is green for odd-numbered ones.  Every other slot is a clearance slot
//!   (no discharge).
//! - Each green tick discharges up to `saturation_flow` vehicles per served
//!   approach.  A discharged vehicle either finishes its trip (last leg) or
//!   spends `link_travel_ticks` in transit before joining its next queue.
//!
//! Per step, in order: scheduled departures join their first queue, transit
//! vehicles join their next queue, green approaches discharge, and signal
//! timers advance.
//!
//! Vehicle counts reported per approach include both the queue and the
//! vehicles in transit towards it, i.e. everything on the incoming link.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::debug;

use tsc_core::Tick;

use crate::{
    load_demand_csv, AdapterError, AdapterResult, Scenario, SimulationAdapter, Trip,
};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Parameters shared by every junction in a [`QueueSimulation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSimConfig {
    /// Duration in ticks of each program slot.
    pub program:           Vec<u32>,
    /// Slot that turns the odd-numbered approaches green.
    pub group_split:       u32,
    /// Vehicles discharged per green tick per served approach.
    pub saturation_flow:   u32,
    /// Ticks between discharging from one junction and queueing at the next.
    pub link_travel_ticks: u64,
    /// Vehicles per incoming link at which occupancy reads 1.0.
    pub lane_capacity:     u32,
}

impl Default for QueueSimConfig {
    fn default() -> Self {
        Self {
            program:           vec![31, 4, 2, 2, 31, 4, 2, 2],
            group_split:       4,
            saturation_flow:   1,
            link_travel_ticks: 10,
            lane_capacity:     20,
        }
    }
}

/// Static description of one signalised junction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionSpec {
    pub name:       String,
    pub approaches: usize,
}

impl JunctionSpec {
    pub fn new(name: impl Into<String>, approaches: usize) -> Self {
        Self { name: name.into(), approaches }
    }
}

// ── Run state ─────────────────────────────────────────────────────────────────

struct Junction {
    phase:   u32,
    elapsed: u32,
    queues:  Vec<VecDeque<usize>>,
    /// Vehicles in transit towards each approach.
    inbound: Vec<u32>,
}

struct Vehicle {
    name: String,
    /// `(junction, approach)` per leg.
    legs: Vec<(usize, usize)>,
    leg:  usize,
}

struct RunState {
    now:        Tick,
    junctions:  Vec<Junction>,
    vehicles:   Vec<Vehicle>,
    /// Vehicles not yet departed, keyed by departure tick.
    pending:    BTreeMap<Tick, Vec<usize>>,
    /// Vehicles between junctions, keyed by the tick they join their next queue.
    transit:    BTreeMap<Tick, Vec<usize>>,
    in_network: usize,
    departed:   Vec<String>,
    arrived:    Vec<String>,
}

// ── QueueSimulation ───────────────────────────────────────────────────────────

/// In-process implementation of [`SimulationAdapter`].
pub struct QueueSimulation {
    config:     QueueSimConfig,
    junctions:  Vec<JunctionSpec>,
    by_name:    HashMap<String, usize>,
    registered: HashMap<String, Vec<Trip>>,
    run:        Option<RunState>,
}

impl QueueSimulation {
    /// Build a simulation over `junctions`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::Malformed`] for an empty program, a `group_split`
    /// outside the program, a zero-length slot, a zero saturation flow, a
    /// junction without approaches, or a duplicate junction name.
    pub fn new(config: QueueSimConfig, junctions: Vec<JunctionSpec>) -> AdapterResult<Self> {
        if config.program.is_empty() {
            return Err(AdapterError::Malformed("signal program has no slots".into()));
        }
        if config.group_split == 0 || config.group_split as usize >= config.program.len() {
            return Err(AdapterError::Malformed(format!(
                "group_split {} must be inside the {}-slot program",
                config.group_split,
                config.program.len()
            )));
        }
        if config.program.contains(&0) {
            return Err(AdapterError::Malformed("program slots must last at least one tick".into()));
        }
        if config.saturation_flow == 0 {
            return Err(AdapterError::Malformed("saturation_flow must be positive".into()));
        }

        let mut by_name = HashMap::with_capacity(junctions.len());
        for (i, spec) in junctions.iter().enumerate() {
            if spec.approaches == 0 {
                return Err(AdapterError::Malformed(format!(
                    "junction {:?} has no approaches",
                    spec.name
                )));
            }
            if by_name.insert(spec.name.clone(), i).is_some() {
                return Err(AdapterError::Malformed(format!(
                    "duplicate junction {:?}",
                    spec.name
                )));
            }
        }

        Ok(Self {
            config,
            junctions,
            by_name,
            registered: HashMap::new(),
            run: None,
        })
    }

    /// Serve `trips` whenever a scenario named `scenario` is started, instead
    /// of reading its demand file.
    pub fn register_demand(&mut self, scenario: impl Into<String>, trips: Vec<Trip>) {
        self.registered.insert(scenario.into(), trips);
    }

    /// Junction names in declaration order (the simulation's topology).
    pub fn intersection_names(&self) -> Vec<String> {
        self.junctions.iter().map(|j| j.name.clone()).collect()
    }

    /// The last completed tick, or `None` if no scenario is running.
    pub fn now(&self) -> Option<Tick> {
        self.run.as_ref().map(|r| r.now)
    }

    pub fn config(&self) -> &QueueSimConfig {
        &self.config
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn index_of(&self, name: &str) -> AdapterResult<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AdapterError::UnknownIntersection(name.to_owned()))
    }

    fn running(&self) -> AdapterResult<&RunState> {
        self.run.as_ref().ok_or(AdapterError::NotStarted)
    }

    fn running_mut(&mut self) -> AdapterResult<&mut RunState> {
        self.run.as_mut().ok_or(AdapterError::NotStarted)
    }

    /// Resolve demand into run state, validating every leg.
    fn build_run(&self, trips: Vec<Trip>) -> AdapterResult<RunState> {
        let junctions = self
            .junctions
            .iter()
            .map(|spec| Junction {
                phase:   0,
                elapsed: 0,
                queues:  vec![VecDeque::new(); spec.approaches],
                inbound: vec![0; spec.approaches],
            })
            .collect();

        let mut vehicles = Vec::with_capacity(trips.len());
        let mut pending: BTreeMap<Tick, Vec<usize>> = BTreeMap::new();

        for trip in trips {
            if trip.route.is_empty() {
                return Err(AdapterError::Demand(format!(
                    "vehicle {:?} has an empty route",
                    trip.vehicle
                )));
            }
            let legs = trip
                .route
                .iter()
                .map(|leg| {
                    let j = self.by_name.get(&leg.intersection).copied().ok_or_else(|| {
                        AdapterError::Demand(format!(
                            "vehicle {:?} routes through unknown junction {:?}",
                            trip.vehicle, leg.intersection
                        ))
                    })?;
                    if leg.approach >= self.junctions[j].approaches {
                        return Err(AdapterError::Demand(format!(
                            "vehicle {:?}: junction {:?} has no approach {}",
                            trip.vehicle, leg.intersection, leg.approach
                        )));
                    }
                    Ok((j, leg.approach))
                })
                .collect::<AdapterResult<Vec<_>>>()?;

            pending.entry(trip.depart).or_default().push(vehicles.len());
            vehicles.push(Vehicle { name: trip.vehicle, legs, leg: 0 });
        }

        Ok(RunState {
            now: Tick::ZERO,
            junctions,
            vehicles,
            pending,
            transit: BTreeMap::new(),
            in_network: 0,
            departed: Vec::new(),
            arrived: Vec::new(),
        })
    }
}

/// Which approach parity `phase` serves, if it is a green slot.
#[inline]
fn served_parity(phase: u32, group_split: u32) -> Option<usize> {
    if phase == 0 {
        Some(0)
    } else if phase == group_split {
        Some(1)
    } else {
        None
    }
}

/// Remove and return every entry keyed at or before `now`.
fn drain_due(map: &mut BTreeMap<Tick, Vec<usize>>, now: Tick) -> Vec<usize> {
    let mut due = Vec::new();
    while let Some(entry) = map.first_entry() {
        if *entry.key() > now {
            break;
        }
        due.extend(entry.remove());
    }
    due
}

impl SimulationAdapter for QueueSimulation {
    fn start(&mut self, scenario: &Scenario) -> AdapterResult<()> {
        let trips = match self.registered.get(&scenario.name) {
            Some(trips) => trips.clone(),
            None => load_demand_csv(&scenario.demand)?,
        };
        let vehicle_count = trips.len();
        self.run = Some(self.build_run(trips)?);
        debug!(scenario = %scenario.name, vehicles = vehicle_count, "queue simulation started");
        Ok(())
    }

    fn step(&mut self) -> AdapterResult<()> {
        let cfg = self.config.clone();
        let run = self.running_mut()?;
        run.now = run.now.next();
        let now = run.now;
        run.departed.clear();
        run.arrived.clear();

        // ── Departures join their first queue ────────────────────────────
        for v in drain_due(&mut run.pending, now) {
            let (j, a) = run.vehicles[v].legs[0];
            run.junctions[j].queues[a].push_back(v);
            run.departed.push(run.vehicles[v].name.clone());
            run.in_network += 1;
        }

        // ── Transit vehicles join their next queue ────────────────────────
        for v in drain_due(&mut run.transit, now) {
            let vehicle = &run.vehicles[v];
            let (j, a) = vehicle.legs[vehicle.leg];
            let junction = &mut run.junctions[j];
            junction.inbound[a] = junction.inbound[a].saturating_sub(1);
            junction.queues[a].push_back(v);
        }

        // ── Green approaches discharge ────────────────────────────────────
        let mut discharged = Vec::new();
        for junction in run.junctions.iter_mut() {
            let Some(parity) = served_parity(junction.phase, cfg.group_split) else {
                continue;
            };
            for queue in junction.queues.iter_mut().skip(parity).step_by(2) {
                for _ in 0..cfg.saturation_flow {
                    match queue.pop_front() {
                        Some(v) => discharged.push(v),
                        None => break,
                    }
                }
            }
        }
        for v in discharged {
            let vehicle = &mut run.vehicles[v];
            vehicle.leg += 1;
            if vehicle.leg == vehicle.legs.len() {
                run.arrived.push(vehicle.name.clone());
                run.in_network -= 1;
            } else {
                let (j, a) = vehicle.legs[vehicle.leg];
                run.junctions[j].inbound[a] += 1;
                run.transit
                    .entry(now.offset(cfg.link_travel_ticks.max(1)))
                    .or_default()
                    .push(v);
            }
        }

        // ── Signal programs advance ───────────────────────────────────────
        for junction in run.junctions.iter_mut() {
            junction.elapsed += 1;
            if junction.elapsed >= cfg.program[junction.phase as usize] {
                junction.phase = (junction.phase + 1) % cfg.program.len() as u32;
                junction.elapsed = 0;
            }
        }

        Ok(())
    }

    fn is_drained(&mut self) -> AdapterResult<bool> {
        let run = self.running()?;
        Ok(run.pending.is_empty() && run.in_network == 0)
    }

    fn arrived_vehicles(&mut self) -> AdapterResult<Vec<String>> {
        Ok(self.running()?.arrived.clone())
    }

    fn departed_vehicles(&mut self) -> AdapterResult<Vec<String>> {
        Ok(self.running()?.departed.clone())
    }

    fn vehicle_counts(&mut self, intersection: &str) -> AdapterResult<Vec<u32>> {
        let j = self.index_of(intersection)?;
        let junction = &self.running()?.junctions[j];
        Ok(junction
            .queues
            .iter()
            .zip(&junction.inbound)
            .map(|(q, &inbound)| q.len() as u32 + inbound)
            .collect())
    }

    fn occupancy(&mut self, intersection: &str) -> AdapterResult<Vec<f64>> {
        let capacity = f64::from(self.config.lane_capacity.max(1));
        let counts = self.vehicle_counts(intersection)?;
        Ok(counts
            .into_iter()
            .map(|c| (f64::from(c) / capacity).min(1.0))
            .collect())
    }

    fn current_phase(&mut self, intersection: &str) -> AdapterResult<u32> {
        let j = self.index_of(intersection)?;
        Ok(self.running()?.junctions[j].phase)
    }

    fn set_phase(&mut self, intersection: &str, phase: u32) -> AdapterResult<()> {
        let j = self.index_of(intersection)?;
        if phase as usize >= self.config.program.len() {
            return Err(AdapterError::InvalidPhase {
                intersection: intersection.to_owned(),
                phase,
            });
        }
        let junction = &mut self.running_mut()?.junctions[j];
        junction.phase = phase;
        junction.elapsed = 0;
        Ok(())
    }

    fn close(&mut self) -> AdapterResult<()> {
        if let Some(run) = self.run.take() {
            debug!(final_tick = %run.now.0, "queue simulation closed");
        }
        Ok(())
    }
}
