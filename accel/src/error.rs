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

use std::fmt;

use crate::engine::DeviceId;

/// Failures that can cross a device boundary.
///
/// `InvalidDimensions` is the only error a well-formed simulation can hit:
/// it flags a zero-sized operand at trigger time, which is a firmware bug
/// and terminates the run. The remaining variants indicate a harness or
/// engine programming error, never a recoverable condition.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    InvalidDimensions { device: String, m: u32, n: u32 },
    DeviceBusy,
    NoPendingRequest,
    TimerAlreadyArmed(DeviceId),
    UnknownDevice(DeviceId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidDimensions { device, m, n } => {
                write!(
                    f,
                    "ERROR: [{}] invalid operand dimensions (M-N): {}, {}",
                    device, m, n
                )
            }
            Self::TimerAlreadyArmed(d) => {
                write!(f, "ERROR: timer already armed for device {}", d)
            }
            Self::UnknownDevice(d) => write!(f, "ERROR: no device registered with id {}", d),
            _ => write!(f, "{:?}", self),
        }
    }
}

// this is needed to allow `anyhow::Result` to accept our definition of
// errors in the integration drivers.
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
