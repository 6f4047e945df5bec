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

//! Register-access transport between simulated cores and peripherals.

use crate::SimTime;

/// Identifier chosen by the issuer, echoed back on the deferred response.
pub type RequestId = u64;

/// Outcome of presenting an access to a device.
///
/// `Ok` means the access completed synchronously (configuration writes,
/// ignored accesses). `Pending` means the device accepted a trigger and the
/// response will be issued later on the simulated timeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IoStatus {
    Ok,
    Pending,
}

/// A single memory-mapped access to a device.
///
/// The offset is relative to the device's base address; the payload length
/// is the access size in bytes. Registers are 32 bits wide and little
/// endian, so only 4-byte payloads carry a register value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IoRequest {
    pub id: RequestId,
    pub offset: u64,
    pub is_write: bool,
    pub data: Vec<u8>,
}

impl IoRequest {
    /// A 4-byte read access; used by the compute peripherals as the
    /// operation trigger.
    pub fn read(id: RequestId, offset: u64) -> Self {
        Self {
            id,
            offset,
            is_write: false,
            data: vec![0; 4],
        }
    }

    /// A 4-byte register write carrying `value` little endian.
    pub fn write(id: RequestId, offset: u64, value: u32) -> Self {
        Self {
            id,
            offset,
            is_write: true,
            data: value.to_le_bytes().to_vec(),
        }
    }

    /// An access of arbitrary width; widths other than 4 are not part of
    /// the register protocol and are ignored by every device.
    pub fn with_size(id: RequestId, offset: u64, is_write: bool, size: usize) -> Self {
        Self {
            id,
            offset,
            is_write,
            data: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The payload as a register value, when the access is register sized.
    pub fn value(&self) -> Option<u32> {
        if self.data.len() == 4 {
            Some(u32::from_le_bytes([
                self.data[0],
                self.data[1],
                self.data[2],
                self.data[3],
            ]))
        } else {
            None
        }
    }
}

/// Deferred completion of an accepted trigger access.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IoResponse {
    pub id: RequestId,
    pub accepted_at: SimTime,
    pub completed_at: SimTime,
}
