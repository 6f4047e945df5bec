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

//! Latency model for the compute peripherals.
//!
//! Latency is a pure function of the operand dimensions in the register
//! file and the static memory configuration. Transfers are accounted in
//! bandwidth-limited tiles: moving `len` elements costs
//! `ceil(len * elem_size / bandwidth)` cycles, and the closed forms below
//! sum the tile counts of each stream an operation touches, plus the fixed
//! functional-unit latencies where one applies.

use crate::config::{MtxTranConfiguration, VectEngConfiguration};
use crate::SimTime;

/// Cycles to move `len` elements of `elem_size` bytes through an aggregate
/// `bandwidth` bytes per cycle.
pub fn transfer_tiles(len: u32, elem_size: u32, bandwidth: u32) -> SimTime {
    let bytes = len as u64 * elem_size as u64;
    let bandwidth = bandwidth as u64;
    (bytes + bandwidth - 1) / bandwidth
}

/// Runtime of one M x N transpose.
///
/// The unit walks the operand as a grid of bandwidth-sized tiles; each tile
/// is read once and written once (`2 * bandwidth / elem_size` element slots
/// per tile pass).
pub fn transpose_latency(m: u32, n: u32, config: &MtxTranConfiguration) -> SimTime {
    let bandwidth = config.bandwidth();
    let tiles_m = transfer_tiles(m, config.elem_size, bandwidth);
    let tiles_n = transfer_tiles(n, config.elem_size, bandwidth);
    let per_tile = 2 * bandwidth as u64 / config.elem_size as u64;
    tiles_m * tiles_n * per_tile
}

/// Operation kinds of the vector/reduction unit, selected by the trigger
/// offset. Offsets outside the decode table map to `Invalid`, which is
/// harmless: it is accepted, costs nothing, and is called out at
/// completion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorJob {
    RowMax,
    RowSum,
    ExpSubMatrix,
    MatrixDivScalar,
    MatrixDotVector,
    MatrixAddMatrix,
    VectorDotVector,
    VectorAddVector,
    VectorMaxVector,
    ExpSubVector,
    Invalid,
}

impl VectorJob {
    pub fn from_offset(offset: u64) -> Self {
        match offset {
            0 => Self::RowMax,
            4 => Self::RowSum,
            8 => Self::ExpSubMatrix,
            12 => Self::MatrixDivScalar,
            16 => Self::MatrixDotVector,
            20 => Self::MatrixAddMatrix,
            24 => Self::VectorDotVector,
            28 => Self::VectorAddVector,
            32 => Self::VectorMaxVector,
            36 => Self::ExpSubVector,
            _ => Self::Invalid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RowMax => "max(x)",
            Self::RowSum => "sum(x)",
            Self::ExpSubMatrix => "exp(x-max)",
            Self::MatrixDivScalar => "mtx/s",
            Self::MatrixDotVector => "mtx.v",
            Self::MatrixAddMatrix => "mtx+mtx",
            Self::VectorDotVector => "v.v",
            Self::VectorAddVector => "v+v",
            Self::VectorMaxVector => "max(v,v)",
            Self::ExpSubVector => "exp(v-v)",
            Self::Invalid => "invalid job",
        }
    }
}

/// Runtime of one vector-unit job over an M x N operand (M-element vectors
/// for the vector-vector kinds).
///
/// Row-wise kinds stream `tiles(N)` per row over M rows; vector kinds move
/// three M-element streams (two operands, one result). Reductions pay the
/// reduction-tree latency once, exponentials the exp-unit latency, and
/// everything else the plain ALU latency.
pub fn vector_latency(job: VectorJob, m: u32, n: u32, config: &VectEngConfiguration) -> SimTime {
    let bandwidth = config.bandwidth();
    let elem = config.elem_size;
    let row = transfer_tiles(n, elem, bandwidth);
    let col = transfer_tiles(m, elem, bandwidth);
    let m = m as u64;
    let alu = config.alu_latency as u64;
    let exp = config.exp_latency as u64;
    let red = config.red_latency as u64;

    match job {
        // load M rows, store an M-element result, reduce
        VectorJob::RowMax | VectorJob::RowSum => row * m + col + red,
        // additionally loads the per-row max vector up front
        VectorJob::ExpSubMatrix => col + row * m + col + alu + exp,
        // scalar/vector operand load, then a read and a write per row
        VectorJob::MatrixDivScalar | VectorJob::MatrixDotVector => col + 2 * row * m + alu,
        // two operand rows in, one result row out
        VectorJob::MatrixAddMatrix => 3 * row * m + alu,
        VectorJob::VectorDotVector | VectorJob::VectorAddVector | VectorJob::VectorMaxVector => {
            3 * col + alu
        }
        VectorJob::ExpSubVector => 3 * col + alu + exp,
        VectorJob::Invalid => 0,
    }
}
