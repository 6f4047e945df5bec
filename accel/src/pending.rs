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

//! The single-entry pending-request slot shared by the compute
//! peripherals, with the cumulative busy-time and completion counters.

use std::fmt;

use crate::bus::IoRequest;
use crate::error::Error;
use crate::SimTime;

/// The one in-flight request of a device.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    pub request: IoRequest,
    pub accepted_at: SimTime,
}

/// Holds at most one pending request. Accepting while occupied is refused,
/// so a device can never end up timing two operations at once.
#[derive(Clone, Debug, Default)]
pub struct RequestSlot {
    pending: Option<PendingRequest>,
    total_busy: SimTime,
    completed: u64,
}

impl RequestSlot {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Store the accepted trigger and its acceptance timestamp.
    pub fn accept(&mut self, request: IoRequest, now: SimTime) -> Result<(), Error> {
        if self.pending.is_some() {
            return Err(Error::DeviceBusy);
        }
        self.pending = Some(PendingRequest {
            request,
            accepted_at: now,
        });
        Ok(())
    }

    /// Release the pending request, fold its runtime into the counters and
    /// return the record to log. The slot is empty afterwards.
    pub fn complete(&mut self, now: SimTime) -> Result<CompletionRecord, Error> {
        let pending = self.pending.take().ok_or(Error::NoPendingRequest)?;
        let period = now - pending.accepted_at;
        self.total_busy += period;
        self.completed += 1;
        Ok(CompletionRecord {
            request: pending.request,
            started: pending.accepted_at,
            finished: now,
            period,
            total_busy: self.total_busy,
            index: self.completed,
        })
    }

    /// Total simulated time spent busy over the device lifetime.
    pub fn total_busy(&self) -> SimTime {
        self.total_busy
    }

    /// Number of completed operations over the device lifetime.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

/// One completed operation, as reported in the completion log.
#[derive(Clone, Debug)]
pub struct CompletionRecord {
    pub request: IoRequest,
    pub started: SimTime,
    pub finished: SimTime,
    pub period: SimTime,
    pub total_busy: SimTime,
    pub index: u64,
}

impl fmt::Display for CompletionRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "finished: {} ---> {} | period = {} | runtime = {} | id = {}",
            self.started, self.finished, self.period, self.total_busy, self.index
        )
    }
}
