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

//! The peripheral variants and the interface the engine drives them by.

use crate::bus::{IoRequest, IoStatus};
use crate::engine::DeviceContext;
use crate::error::Error;

pub(super) mod ctrl;
pub(super) mod mtxtran;
pub(super) mod vecteng;

pub use ctrl::CtrlRegisters;
pub use mtxtran::MtxTranUnit;
pub use vecteng::VectEngUnit;

/// The two entry points of a peripheral: a register access arriving from
/// the interconnect, and the firing of the device's timer. The engine
/// holds this interface; it never names a concrete device type.
pub trait DeviceSpec {
    fn name(&self) -> &str;

    /// Decode and apply one memory-mapped access. `Ok(IoStatus::Pending)`
    /// means the access was accepted as a timed operation and will be
    /// completed by a later `timer_fired`.
    fn handle_access(
        &mut self,
        request: IoRequest,
        ctx: &mut DeviceContext,
    ) -> Result<IoStatus, Error>;

    /// The device's armed timer has fired at the current simulated time.
    fn timer_fired(&mut self, ctx: &mut DeviceContext) -> Result<(), Error>;
}

#[derive(Debug)]
pub enum Device {
    MtxTran(MtxTranUnit),
    VectEng(VectEngUnit),
    Ctrl(CtrlRegisters),
}

impl Device {
    fn inner_device_spec(&self) -> &dyn DeviceSpec {
        match self {
            Self::MtxTran(mtxtran) => mtxtran as &dyn DeviceSpec,
            Self::VectEng(vecteng) => vecteng as &dyn DeviceSpec,
            Self::Ctrl(ctrl) => ctrl as &dyn DeviceSpec,
        }
    }

    fn mut_inner_device_spec(&mut self) -> &mut dyn DeviceSpec {
        match self {
            Self::MtxTran(mtxtran) => mtxtran as &mut dyn DeviceSpec,
            Self::VectEng(vecteng) => vecteng as &mut dyn DeviceSpec,
            Self::Ctrl(ctrl) => ctrl as &mut dyn DeviceSpec,
        }
    }
}

impl DeviceSpec for Device {
    fn name(&self) -> &str {
        self.inner_device_spec().name()
    }

    fn handle_access(
        &mut self,
        request: IoRequest,
        ctx: &mut DeviceContext,
    ) -> Result<IoStatus, Error> {
        self.mut_inner_device_spec().handle_access(request, ctx)
    }

    fn timer_fired(&mut self, ctx: &mut DeviceContext) -> Result<(), Error> {
        self.mut_inner_device_spec().timer_fired(ctx)
    }
}

impl From<MtxTranUnit> for Device {
    fn from(mtxtran: MtxTranUnit) -> Device {
        Device::MtxTran(mtxtran)
    }
}

impl From<VectEngUnit> for Device {
    fn from(vecteng: VectEngUnit) -> Device {
        Device::VectEng(vecteng)
    }
}

impl From<CtrlRegisters> for Device {
    fn from(ctrl: CtrlRegisters) -> Device {
        Device::Ctrl(ctrl)
    }
}
