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

//! Timing models for memory-mapped cluster accelerators.
//!
//! Each peripheral (matrix-transpose unit, vector/reduction unit, control
//! registers) receives register accesses from a simulated core, converts a
//! trigger access into a latency derived from its current register file and
//! static configuration, and completes the access on the simulated timeline
//! once that latency has elapsed. The payload data is never transformed --
//! only the timing is modeled.

mod bus;
mod config;
mod engine;
mod error;
mod pending;
mod periph;
mod regfile;
mod timing;

// Public types
// type to use for simulated time
pub type SimTime = u64;

pub use crate::bus::{IoRequest, IoResponse, IoStatus, RequestId};
pub use crate::config::{
    ClusterConfiguration, Config, CtrlConfiguration, MtxTranConfiguration, VectEngConfiguration,
};
pub use crate::engine::{DeviceContext, DeviceId, Engine, Simulator};
pub use crate::error::Error;
pub use crate::pending::{CompletionRecord, PendingRequest, RequestSlot};
pub use crate::periph::{CtrlRegisters, Device, DeviceSpec, MtxTranUnit, VectEngUnit};
pub use crate::regfile::{classify, AccessClass, ComputeRegister, RegisterFile};
pub use crate::timing::{transfer_tiles, transpose_latency, vector_latency, VectorJob};
