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

//! One simulated cluster running a softmax-style offload sequence.
//!
//! Replays the register traffic a firmware kernel would issue against the
//! three peripherals -- transpose the score tile, then row-max, exp(x-max)
//! and row-sum, normalize, synchronize on the barrier and signal end of
//! computation -- and checks the simulated timeline at every step.

use accel::{
    ClusterConfiguration, CtrlRegisters, DeviceId, IoRequest, IoResponse, IoStatus, MtxTranUnit,
    Simulator, VectEngUnit,
};

/// The three peripherals of one cluster, registered with a shared engine.
struct Cluster {
    sim: Simulator,
    ctrl: DeviceId,
    mtxtran: DeviceId,
    vecteng: DeviceId,
    next_request: u64,
}

impl Cluster {
    fn new(config: &ClusterConfiguration) -> Self {
        let mut sim = Simulator::new();
        let ctrl = sim.add_device(CtrlRegisters::new("ctrl", config.ctrl));
        let mtxtran = sim.add_device(MtxTranUnit::new("mtxtran", config.mtxtran));
        let vecteng = sim.add_device(VectEngUnit::new("vecteng", config.vecteng));
        Self {
            sim,
            ctrl,
            mtxtran,
            vecteng,
            next_request: 0,
        }
    }

    fn write(&mut self, device: DeviceId, offset: u64, value: u32) -> anyhow::Result<()> {
        let id = self.next_request;
        self.next_request += 1;
        let status = self.sim.access(device, IoRequest::write(id, offset, value))?;
        anyhow::ensure!(status == IoStatus::Ok, "register write did not complete");
        Ok(())
    }

    /// Issue a trigger read and run the engine until its deferred response
    /// arrives.
    fn trigger(&mut self, device: DeviceId, offset: u64) -> anyhow::Result<IoResponse> {
        let id = self.next_request;
        self.next_request += 1;
        let status = self.sim.access(device, IoRequest::read(id, offset))?;
        anyhow::ensure!(status == IoStatus::Pending, "trigger was not accepted");
        while self.sim.step_event()? {
            if let Some(response) = self.sim.engine_mut().pop_response() {
                anyhow::ensure!(response.id == id, "response for a different request");
                return Ok(response);
            }
        }
        anyhow::bail!("engine went idle with a trigger outstanding");
    }
}

/// Offload one 8x16 score tile; returns the simulated completion time.
fn run_softmax_offload() -> anyhow::Result<u64> {
    let config = ClusterConfiguration::default();
    let mut cluster = Cluster::new(&config);

    // start the performance counter
    cluster.write(cluster.ctrl, 8, 0)?;

    // transpose the tile into row-major order for the vector unit
    cluster.write(cluster.mtxtran, 0, 8)?;
    cluster.write(cluster.mtxtran, 4, 16)?;
    cluster.write(cluster.mtxtran, 8, 0x1000)?;
    cluster.write(cluster.mtxtran, 12, 0x2000)?;
    let transpose = cluster.trigger(cluster.mtxtran, 0)?;
    log::info!("transpose done at {}", transpose.completed_at);

    // softmax over the rows: max, exp(x-max), sum, divide
    cluster.write(cluster.vecteng, 0, 8)?;
    cluster.write(cluster.vecteng, 4, 16)?;
    let row_max = cluster.trigger(cluster.vecteng, 0)?;
    let exp_sub = cluster.trigger(cluster.vecteng, 8)?;
    let row_sum = cluster.trigger(cluster.vecteng, 4)?;
    let divide = cluster.trigger(cluster.vecteng, 12)?;
    log::info!(
        "softmax pipeline done at {} ({} + {} + {} + {})",
        divide.completed_at,
        row_max.completed_at - row_max.accepted_at,
        exp_sub.completed_at - exp_sub.accepted_at,
        row_sum.completed_at - row_sum.accepted_at,
        divide.completed_at - divide.accepted_at
    );

    // read the performance counter, then cross the barrier
    cluster.write(cluster.ctrl, 12, 0)?;
    cluster.write(cluster.ctrl, 4, 1)?;
    while cluster.sim.engine().barrier_acks() == 0 {
        anyhow::ensure!(cluster.sim.step_event()?, "barrier wakeup never fired");
    }

    // report the result and signal end of computation
    cluster.write(cluster.ctrl, 16, divide.completed_at as u32)?;
    cluster.write(cluster.ctrl, 0, 0)?;
    let exit_code = cluster.sim.run()?;
    anyhow::ensure!(exit_code == Some(0), "firmware reported failure");
    Ok(cluster.sim.now())
}

fn main() {
    env_logger::init();
    let finished = run_softmax_offload().expect("cluster simulation failed");
    log::info!("simulation finished at {}", finished);
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel::MtxTranConfiguration;

    #[test]
    fn test_softmax_offload_timeline() {
        // with the default 512 B/cycle TCDM and 2-byte elements, an 8x16
        // tile is a single transfer tile in each dimension:
        //   transpose            = 1 * 1 * 512        = 512
        //   row-max / row-sum    = 1*8 + 1 + 5        = 14
        //   exp(x-max)           = 1 + 1*8 + 1 + 4+16 = 30
        //   mtx/s                = 1 + 2*1*8 + 4      = 21
        // plus the one-cycle barrier wakeup after the last job
        let finished = run_softmax_offload().unwrap();
        assert_eq!(finished, 512 + 14 + 30 + 14 + 21 + 1);
    }

    #[test]
    fn test_devices_time_independently() {
        let config = ClusterConfiguration::default();
        let mut cluster = Cluster::new(&config);

        // trigger both compute units back to back at t=0 with their 4x4
        // register defaults; the row-max (10) completes before the
        // transpose (512) without interference
        let mtx_status = cluster
            .sim
            .access(cluster.mtxtran, IoRequest::read(100, 0))
            .unwrap();
        let vect_status = cluster
            .sim
            .access(cluster.vecteng, IoRequest::read(101, 0))
            .unwrap();
        assert_eq!(mtx_status, IoStatus::Pending);
        assert_eq!(vect_status, IoStatus::Pending);

        assert!(cluster.sim.step_event().unwrap());
        let first = cluster.sim.engine_mut().pop_response().unwrap();
        assert_eq!(first.id, 101);
        assert_eq!(first.completed_at, 10);

        assert!(cluster.sim.step_event().unwrap());
        let second = cluster.sim.engine_mut().pop_response().unwrap();
        assert_eq!(second.id, 100);
        assert_eq!(second.completed_at, 512);
    }

    #[test]
    fn test_two_clusters_do_not_share_counters() {
        let config = ClusterConfiguration::default();
        let mut a = Cluster::new(&config);
        let mut b = Cluster::new(&config);

        a.trigger(a.mtxtran, 0).unwrap();
        a.trigger(a.mtxtran, 0).unwrap();
        let response = b.trigger(b.mtxtran, 0).unwrap();

        // cluster b's first transpose starts at its own t=0
        assert_eq!(response.accepted_at, 0);
        assert_eq!(response.completed_at, 512);
        assert_eq!(a.sim.now(), 2 * 512);
        assert_eq!(b.sim.now(), 512);
    }

    #[test]
    fn test_zero_dimension_halts_the_run() {
        let mut sim = Simulator::new();
        let mtxtran = sim.add_device(MtxTranUnit::new(
            "mtxtran",
            MtxTranConfiguration::default(),
        ));
        sim.access(mtxtran, IoRequest::write(0, 0, 0)).unwrap();
        assert!(sim.access(mtxtran, IoRequest::read(1, 0)).is_err());
    }
}
