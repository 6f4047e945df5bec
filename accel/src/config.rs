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

//! Static device configuration.
//!
//! Everything here is fixed at device construction; nothing is mutable
//! through the register interface. Defaults describe the shipped cluster
//! architecture: 64 TCDM banks of 8 bytes (512 B/cycle aggregate) holding
//! 2-byte elements, on a 16x16 cluster grid.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DEFAULT_BANK_WIDTH: u32 = 8;
const DEFAULT_BANK_COUNT: u32 = 64;
const DEFAULT_ELEM_SIZE: u32 = 2;

/// Parameters of the matrix-transpose unit.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct MtxTranConfiguration {
    pub tcdm_bank_width: u32,
    pub tcdm_bank_count: u32,
    pub elem_size: u32,
}

impl MtxTranConfiguration {
    /// Aggregate TCDM bandwidth in bytes per cycle.
    pub fn bandwidth(&self) -> u32 {
        self.tcdm_bank_width * self.tcdm_bank_count
    }
}

impl Default for MtxTranConfiguration {
    fn default() -> Self {
        Self {
            tcdm_bank_width: DEFAULT_BANK_WIDTH,
            tcdm_bank_count: DEFAULT_BANK_COUNT,
            elem_size: DEFAULT_ELEM_SIZE,
        }
    }
}

/// Parameters of the vector/reduction unit: the transpose-unit memory
/// parameters plus the fixed latencies of its three functional units.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct VectEngConfiguration {
    pub tcdm_bank_width: u32,
    pub tcdm_bank_count: u32,
    pub elem_size: u32,
    pub alu_latency: u32,
    pub exp_latency: u32,
    pub red_latency: u32,
}

impl VectEngConfiguration {
    /// Aggregate TCDM bandwidth in bytes per cycle.
    pub fn bandwidth(&self) -> u32 {
        self.tcdm_bank_width * self.tcdm_bank_count
    }
}

impl Default for VectEngConfiguration {
    fn default() -> Self {
        Self {
            tcdm_bank_width: DEFAULT_BANK_WIDTH,
            tcdm_bank_count: DEFAULT_BANK_COUNT,
            elem_size: DEFAULT_ELEM_SIZE,
            alu_latency: 4,
            exp_latency: 16,
            red_latency: 5,
        }
    }
}

/// Parameters of the control-unit peripheral. The grid dimensions feed the
/// startup diagnostic only.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct CtrlConfiguration {
    pub num_cluster_x: u32,
    pub num_cluster_y: u32,
}

impl Default for CtrlConfiguration {
    fn default() -> Self {
        Self {
            num_cluster_x: 16,
            num_cluster_y: 16,
        }
    }
}

/// The peripheral set of one cluster.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct ClusterConfiguration {
    pub ctrl: CtrlConfiguration,
    pub mtxtran: MtxTranConfiguration,
    pub vecteng: VectEngConfiguration,
}

/// Top-level simulation configuration, constructed programmatically or
/// read from a YAML file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub clusters: Vec<ClusterConfiguration>,
}

impl Config {
    pub fn from_file(file_name: &str) -> anyhow::Result<Self> {
        let file = File::open(Path::new(file_name))
            .with_context(|| format!("config file {} not found", file_name))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("malformed config file {}", file_name))
    }

    pub fn from_str(config: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(config).context("malformed config")
    }
}
