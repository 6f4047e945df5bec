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

//! The vector/reduction unit.
//!
//! Same register protocol as the transpose unit, but the trigger offset
//! selects one of ten job kinds; an undecodable offset is accepted as an
//! invalid job that costs nothing and is called out at completion.

use crate::bus::{IoRequest, IoResponse, IoStatus};
use crate::config::VectEngConfiguration;
use crate::engine::DeviceContext;
use crate::error::Error;
use crate::pending::RequestSlot;
use crate::periph::DeviceSpec;
use crate::regfile::{classify, AccessClass, RegisterFile};
use crate::timing::{vector_latency, VectorJob};

#[derive(Debug)]
pub struct VectEngUnit {
    name: String,
    config: VectEngConfiguration,
    regs: RegisterFile,
    slot: RequestSlot,
    /// Job of the in-flight operation; stays at its last value after
    /// completion, like any other piece of device state.
    current_job: VectorJob,
}

impl VectEngUnit {
    pub fn new(name: &str, config: VectEngConfiguration) -> Self {
        Self {
            name: name.to_string(),
            config,
            regs: RegisterFile::default(),
            slot: RequestSlot::default(),
            current_job: VectorJob::Invalid,
        }
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn slot(&self) -> &RequestSlot {
        &self.slot
    }

    pub fn current_job(&self) -> VectorJob {
        self.current_job
    }

    fn accept_trigger(
        &mut self,
        offset: u64,
        request: IoRequest,
        ctx: &mut DeviceContext,
    ) -> Result<IoStatus, Error> {
        let (m, n) = (self.regs.m(), self.regs.n());
        log::trace!("[{}] job configuration (M-N): {}, {}", self.name, m, n);
        if m == 0 || n == 0 {
            return Err(Error::InvalidDimensions {
                device: self.name.clone(),
                m,
                n,
            });
        }

        let job = VectorJob::from_offset(offset);
        let latency = vector_latency(job, m, n, &self.config);
        self.current_job = job;
        ctx.arm_timer(latency)?;
        self.slot.accept(request, ctx.now())?;
        Ok(IoStatus::Pending)
    }
}

impl DeviceSpec for VectEngUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_access(
        &mut self,
        request: IoRequest,
        ctx: &mut DeviceContext,
    ) -> Result<IoStatus, Error> {
        log::trace!(
            "[{}] access (offset: {:#x}, size: {:#x}, is_write: {})",
            self.name,
            request.offset,
            request.size(),
            request.is_write
        );

        match classify(&request) {
            AccessClass::Trigger { offset } if !self.slot.is_busy() => {
                self.accept_trigger(offset, request, ctx)
            }
            AccessClass::Trigger { offset } => {
                log::warn!(
                    "[{}] trigger (offset: {:#x}) while busy, rejected",
                    self.name,
                    offset
                );
                Ok(IoStatus::Ok)
            }
            AccessClass::ConfigWrite { register, value } => {
                self.regs.write(register, value);
                log::trace!("[{}] set {} {:#x}", self.name, register.name(), value);
                Ok(IoStatus::Ok)
            }
            AccessClass::Invalid => {
                log::warn!(
                    "[{}] access to INVALID offset {:#x} (size {})",
                    self.name,
                    request.offset,
                    request.size()
                );
                Ok(IoStatus::Ok)
            }
        }
    }

    fn timer_fired(&mut self, ctx: &mut DeviceContext) -> Result<(), Error> {
        let record = self.slot.complete(ctx.now())?;
        ctx.complete(IoResponse {
            id: record.request.id,
            accepted_at: record.started,
            completed_at: record.finished,
        });
        log::debug!("[{}] job: {}", self.name, self.current_job.label());
        log::debug!("[{}] {}", self.name, record);
        Ok(())
    }
}
