// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A minimal single-threaded discrete-event engine.
//!
//! The engine is only as large as the device models require: a simulated
//! clock, a min-heap of per-device timer events, and the three outputs a
//! device can drive (deferred responses, the barrier-acknowledge wire, and
//! a termination request). Devices never see each other; each callback
//! receives a [`DeviceContext`] scoped to its own identity.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::bus::{IoRequest, IoResponse, IoStatus};
use crate::error::Error;
use crate::periph::{Device, DeviceSpec};
use crate::SimTime;

/// Index of a registered device within the engine.
pub type DeviceId = usize;

/// A scheduled wake-up for one device.
///
/// Ordered by firing time, with the registration sequence number breaking
/// ties so that events armed earlier fire earlier at the same instant.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
struct TimerEvent {
    at: SimTime,
    seq: u64,
    device: DeviceId,
}

/// Engine-side simulation state: clock, event queue, output wires.
///
/// Kept separate from the device vector so that a device callback can hold
/// `&mut Engine` while the simulator holds `&mut` to the device itself.
#[derive(Debug, Default)]
pub struct Engine {
    now: SimTime,
    seq: u64,
    queue: BinaryHeap<Reverse<TimerEvent>>,
    armed: Vec<bool>,
    responses: VecDeque<IoResponse>,
    barrier_acks: u64,
    exit_code: Option<u32>,
}

impl Engine {
    fn register_device(&mut self) -> DeviceId {
        self.armed.push(false);
        self.armed.len() - 1
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Arm the device's timer `delay` time units from now. Each device has
    /// a single timer; arming twice without an intervening firing is an
    /// engine-invariant violation.
    pub fn arm_timer(&mut self, device: DeviceId, delay: SimTime) -> Result<(), Error> {
        if device >= self.armed.len() {
            return Err(Error::UnknownDevice(device));
        }
        if self.armed[device] {
            return Err(Error::TimerAlreadyArmed(device));
        }
        self.armed[device] = true;
        self.seq += 1;
        self.queue.push(Reverse(TimerEvent {
            at: self.now + delay,
            seq: self.seq,
            device,
        }));
        Ok(())
    }

    pub fn timer_armed(&self, device: DeviceId) -> bool {
        self.armed.get(device).copied().unwrap_or(false)
    }

    /// Issue the deferred response for a completed trigger access.
    pub fn complete(&mut self, response: IoResponse) {
        self.responses.push_back(response);
    }

    /// Pulse the barrier-acknowledge wire. Write-only and fire-and-forget
    /// from the device's point of view; the harness aggregates the pulses.
    pub fn raise_barrier_ack(&mut self) {
        self.barrier_acks += 1;
    }

    /// Ask the engine to stop after the current callback returns.
    pub fn request_exit(&mut self, code: u32) {
        self.exit_code = Some(code);
    }

    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    pub fn barrier_acks(&self) -> u64 {
        self.barrier_acks
    }

    pub fn pop_response(&mut self) -> Option<IoResponse> {
        self.responses.pop_front()
    }

    fn pop_event(&mut self) -> Option<TimerEvent> {
        self.queue.pop().map(|Reverse(event)| event)
    }
}

/// Per-callback handle a device uses to reach the engine.
///
/// Carries the device's own identity so callbacks cannot arm or complete
/// on behalf of another device.
pub struct DeviceContext<'a> {
    device: DeviceId,
    engine: &'a mut Engine,
}

impl<'a> DeviceContext<'a> {
    pub fn new(device: DeviceId, engine: &'a mut Engine) -> Self {
        Self { device, engine }
    }

    pub fn now(&self) -> SimTime {
        self.engine.now()
    }

    pub fn arm_timer(&mut self, delay: SimTime) -> Result<(), Error> {
        self.engine.arm_timer(self.device, delay)
    }

    pub fn timer_armed(&self) -> bool {
        self.engine.timer_armed(self.device)
    }

    pub fn complete(&mut self, response: IoResponse) {
        self.engine.complete(response);
    }

    pub fn raise_barrier_ack(&mut self) {
        self.engine.raise_barrier_ack();
    }

    pub fn request_exit(&mut self, code: u32) {
        self.engine.request_exit(code);
    }
}

/// The engine plus its registered devices; the unit a harness drives.
#[derive(Debug, Default)]
pub struct Simulator {
    engine: Engine,
    devices: Vec<Device>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device<D: Into<Device>>(&mut self, device: D) -> DeviceId {
        let id = self.engine.register_device();
        self.devices.push(device.into());
        id
    }

    pub fn now(&self) -> SimTime {
        self.engine.now()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Present one access to a device, as the memory interconnect would.
    pub fn access(&mut self, id: DeviceId, request: IoRequest) -> Result<IoStatus, Error> {
        let device = self.devices.get_mut(id).ok_or(Error::UnknownDevice(id))?;
        let mut ctx = DeviceContext::new(id, &mut self.engine);
        device.handle_access(request, &mut ctx)
    }

    /// Fire the next scheduled event, advancing the clock to its
    /// timestamp. Returns false when the queue is empty.
    pub fn step_event(&mut self) -> Result<bool, Error> {
        let event = match self.engine.pop_event() {
            Some(event) => event,
            None => return Ok(false),
        };
        self.engine.now = event.at;
        self.engine.armed[event.device] = false;
        let device = self
            .devices
            .get_mut(event.device)
            .ok_or(Error::UnknownDevice(event.device))?;
        let mut ctx = DeviceContext::new(event.device, &mut self.engine);
        device.timer_fired(&mut ctx)?;
        Ok(true)
    }

    /// Drain the event queue, stopping early if a device requests
    /// termination. Returns the exit code if one was requested.
    pub fn run(&mut self) -> Result<Option<u32>, Error> {
        while self.engine.exit_code().is_none() {
            if !self.step_event()? {
                break;
            }
        }
        Ok(self.engine.exit_code())
    }
}
