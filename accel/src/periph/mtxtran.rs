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

//! The matrix-transpose unit.
//!
//! The real block is a streaming transpose between TCDM buffers; here only
//! its occupancy is modeled. A read of any register offset while idle
//! snapshots M and N, charges the transpose runtime, and defers the
//! response until the runtime has elapsed.

use crate::bus::{IoRequest, IoResponse, IoStatus};
use crate::config::MtxTranConfiguration;
use crate::engine::DeviceContext;
use crate::error::Error;
use crate::pending::RequestSlot;
use crate::periph::DeviceSpec;
use crate::regfile::{classify, AccessClass, RegisterFile};
use crate::timing::transpose_latency;

#[derive(Debug)]
pub struct MtxTranUnit {
    name: String,
    config: MtxTranConfiguration,
    regs: RegisterFile,
    slot: RequestSlot,
}

impl MtxTranUnit {
    pub fn new(name: &str, config: MtxTranConfiguration) -> Self {
        Self {
            name: name.to_string(),
            config,
            regs: RegisterFile::default(),
            slot: RequestSlot::default(),
        }
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn slot(&self) -> &RequestSlot {
        &self.slot
    }

    fn accept_trigger(
        &mut self,
        request: IoRequest,
        ctx: &mut DeviceContext,
    ) -> Result<IoStatus, Error> {
        let (m, n) = (self.regs.m(), self.regs.n());
        log::trace!("[{}] transpose configuration (M-N): {}, {}", self.name, m, n);
        if m == 0 || n == 0 {
            return Err(Error::InvalidDimensions {
                device: self.name.clone(),
                m,
                n,
            });
        }

        let latency = transpose_latency(m, n, &self.config);
        ctx.arm_timer(latency)?;
        self.slot.accept(request, ctx.now())?;
        Ok(IoStatus::Pending)
    }
}

impl DeviceSpec for MtxTranUnit {
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
            AccessClass::Trigger { .. } if !self.slot.is_busy() => {
                self.accept_trigger(request, ctx)
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
        log::debug!("[{}] {}", self.name, record);
        Ok(())
    }
}
