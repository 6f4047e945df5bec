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

//! The cluster control-unit peripheral.
//!
//! Five write-only registers: end-of-computation, barrier wakeup, a
//! start/read performance-counter pair, and a debug print. No pending slot
//! is needed; the only deferred action is the fixed one-cycle barrier
//! wakeup pulsing the acknowledge wire.

use crate::bus::{IoRequest, IoStatus};
use crate::config::CtrlConfiguration;
use crate::engine::DeviceContext;
use crate::error::Error;
use crate::periph::DeviceSpec;
use crate::SimTime;

/// Delay between the barrier-trigger write and the acknowledge pulse.
const BARRIER_WAKEUP_DELAY: SimTime = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CtrlRegister {
    Eoc,
    BarrierTrigger,
    TimerStart,
    TimerRead,
    Print,
}

impl CtrlRegister {
    pub fn from_offset(offset: u64) -> Option<Self> {
        match offset {
            0 => Some(Self::Eoc),
            4 => Some(Self::BarrierTrigger),
            8 => Some(Self::TimerStart),
            12 => Some(Self::TimerRead),
            16 => Some(Self::Print),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct CtrlRegisters {
    name: String,
    config: CtrlConfiguration,
    timer_start: SimTime,
}

impl CtrlRegisters {
    pub fn new(name: &str, config: CtrlConfiguration) -> Self {
        log::info!(
            "[{}] num_cluster_x = {}, num_cluster_y = {}",
            name,
            config.num_cluster_x,
            config.num_cluster_y
        );
        Self {
            name: name.to_string(),
            config,
            timer_start: 0,
        }
    }

    pub fn config(&self) -> &CtrlConfiguration {
        &self.config
    }

    pub fn timer_start(&self) -> SimTime {
        self.timer_start
    }

    fn write(
        &mut self,
        register: CtrlRegister,
        value: u32,
        ctx: &mut DeviceContext,
    ) -> Result<(), Error> {
        match register {
            CtrlRegister::Eoc => {
                log::debug!("[{}] end of computation, exit code {:#x}", self.name, value);
                ctx.request_exit(value);
            }
            CtrlRegister::BarrierTrigger => {
                if ctx.timer_armed() {
                    log::warn!("[{}] barrier wakeup already armed, ignored", self.name);
                } else {
                    ctx.arm_timer(BARRIER_WAKEUP_DELAY)?;
                }
            }
            CtrlRegister::TimerStart => {
                self.timer_start = ctx.now();
            }
            CtrlRegister::TimerRead => {
                let period = ctx.now() - self.timer_start;
                log::info!("[{}] execution period is {} time units", self.name, period);
                self.timer_start = ctx.now();
            }
            CtrlRegister::Print => {
                log::info!("[{}] print: {}", self.name, value);
            }
        }
        Ok(())
    }
}

impl DeviceSpec for CtrlRegisters {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_access(
        &mut self,
        request: IoRequest,
        ctx: &mut DeviceContext,
    ) -> Result<IoStatus, Error> {
        match (
            request.is_write,
            CtrlRegister::from_offset(request.offset),
            request.value(),
        ) {
            (true, Some(register), Some(value)) => self.write(register, value, ctx)?,
            _ => {
                log::warn!(
                    "[{}] access to INVALID offset {:#x} (size {}, is_write: {})",
                    self.name,
                    request.offset,
                    request.size(),
                    request.is_write
                );
            }
        }
        Ok(IoStatus::Ok)
    }

    fn timer_fired(&mut self, ctx: &mut DeviceContext) -> Result<(), Error> {
        ctx.raise_barrier_ack();
        log::debug!("[{}] global barrier at {}", self.name, ctx.now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DeviceId, Simulator};

    fn simulator() -> (Simulator, DeviceId) {
        let mut sim = Simulator::new();
        let id = sim.add_device(CtrlRegisters::new("ctrl", CtrlConfiguration::default()));
        (sim, id)
    }

    fn unit(sim: &Simulator, id: DeviceId) -> &CtrlRegisters {
        match sim.device(id).unwrap() {
            crate::periph::Device::Ctrl(ctrl) => ctrl,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_eoc_propagates_exit_code() {
        let (mut sim, id) = simulator();
        assert_eq!(
            sim.access(id, IoRequest::write(1, 0, 3)).unwrap(),
            IoStatus::Ok
        );
        assert_eq!(sim.engine().exit_code(), Some(3));
        assert_eq!(sim.run().unwrap(), Some(3));
    }

    #[test]
    fn test_barrier_wakeup_pulses_once() {
        let (mut sim, id) = simulator();
        sim.access(id, IoRequest::write(1, 4, 1)).unwrap();
        assert_eq!(sim.engine().barrier_acks(), 0);

        assert!(sim.step_event().unwrap());
        assert_eq!(sim.now(), BARRIER_WAKEUP_DELAY);
        assert_eq!(sim.engine().barrier_acks(), 1);
        // exactly one pulse per trigger write
        assert!(!sim.step_event().unwrap());
        assert_eq!(sim.engine().barrier_acks(), 1);
    }

    #[test]
    fn test_barrier_retrigger_while_armed_is_ignored() {
        let (mut sim, id) = simulator();
        sim.access(id, IoRequest::write(1, 4, 1)).unwrap();
        sim.access(id, IoRequest::write(2, 4, 1)).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.engine().barrier_acks(), 1);
    }

    #[test]
    fn test_performance_counter_latch_and_read() {
        let (mut sim, id) = simulator();
        // advance the clock with a barrier wakeup before latching
        sim.access(id, IoRequest::write(1, 4, 1)).unwrap();
        sim.step_event().unwrap();
        assert_eq!(sim.now(), 1);

        sim.access(id, IoRequest::write(2, 8, 0)).unwrap();
        assert_eq!(unit(&sim, id).timer_start(), 1);

        sim.access(id, IoRequest::write(3, 4, 1)).unwrap();
        sim.step_event().unwrap();
        assert_eq!(sim.now(), 2);

        // the read re-latches the reference
        sim.access(id, IoRequest::write(4, 12, 0)).unwrap();
        assert_eq!(unit(&sim, id).timer_start(), 2);
    }

    #[test]
    fn test_print_and_invalid_accesses_are_noops() {
        let (mut sim, id) = simulator();
        assert_eq!(
            sim.access(id, IoRequest::write(1, 16, 0xdead)).unwrap(),
            IoStatus::Ok
        );
        // unknown offset, read, and narrow write all complete OK with no
        // state change anywhere
        assert_eq!(
            sim.access(id, IoRequest::write(2, 20, 1)).unwrap(),
            IoStatus::Ok
        );
        assert_eq!(sim.access(id, IoRequest::read(3, 0)).unwrap(), IoStatus::Ok);
        assert_eq!(
            sim.access(id, IoRequest::with_size(4, 0, true, 2)).unwrap(),
            IoStatus::Ok
        );
        assert_eq!(sim.engine().exit_code(), None);
        assert_eq!(sim.engine().barrier_acks(), 0);
        assert_eq!(unit(&sim, id).timer_start(), 0);
        assert!(!sim.step_event().unwrap());
    }
}
