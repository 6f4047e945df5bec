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

//! Register file and access decode for the compute peripherals.
//!
//! Both compute units expose the same four 32-bit configuration registers;
//! a read of any offset is the trigger that starts a timed operation, with
//! the offset selecting the operation on the vector unit.

use crate::bus::IoRequest;

/// Named configuration registers, one per 4-byte offset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComputeRegister {
    M,
    N,
    XAddr,
    YAddr,
}

impl ComputeRegister {
    pub fn from_offset(offset: u64) -> Option<Self> {
        match offset {
            0 => Some(Self::M),
            4 => Some(Self::N),
            8 => Some(Self::XAddr),
            12 => Some(Self::YAddr),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::M => "M",
            Self::N => "N",
            Self::XAddr => "X_ADDR",
            Self::YAddr => "Y_ADDR",
        }
    }
}

/// The register file of a compute peripheral.
///
/// Dimensions default to 4x4 so that a trigger issued before any
/// configuration still describes a legal operand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisterFile {
    m: u32,
    n: u32,
    x_addr: u32,
    y_addr: u32,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            m: 4,
            n: 4,
            x_addr: 0,
            y_addr: 0,
        }
    }
}

impl RegisterFile {
    pub fn write(&mut self, register: ComputeRegister, value: u32) {
        match register {
            ComputeRegister::M => self.m = value,
            ComputeRegister::N => self.n = value,
            ComputeRegister::XAddr => self.x_addr = value,
            ComputeRegister::YAddr => self.y_addr = value,
        }
    }

    pub fn m(&self) -> u32 {
        self.m
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    /// Operand address; held for firmware visibility, not consumed by the
    /// timing model.
    pub fn x_addr(&self) -> u32 {
        self.x_addr
    }

    /// Result address; same story as `x_addr`.
    pub fn y_addr(&self) -> u32 {
        self.y_addr
    }
}

/// Semantic classification of one access against a compute peripheral.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccessClass {
    /// 4-byte write to a named register.
    ConfigWrite {
        register: ComputeRegister,
        value: u32,
    },
    /// 4-byte read; starts a timed operation selected by the offset.
    Trigger { offset: u64 },
    /// Anything else. Ignored, but still completes with OK status.
    Invalid,
}

/// Decode an access. Only 4-byte accesses are part of the protocol; every
/// other width decodes to `Invalid` on all devices.
pub fn classify(request: &IoRequest) -> AccessClass {
    if request.size() != 4 {
        return AccessClass::Invalid;
    }
    if !request.is_write {
        return AccessClass::Trigger {
            offset: request.offset,
        };
    }
    match (ComputeRegister::from_offset(request.offset), request.value()) {
        (Some(register), Some(value)) => AccessClass::ConfigWrite { register, value },
        _ => AccessClass::Invalid,
    }
}
