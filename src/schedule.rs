//! Copy/XOR schedules for bit-matrix encoding.
//!
//! A [`Schedule`] is one [`PacketProgram`] per parity bit-row. Each program
//! names the parity packet it produces and lists the copy and XOR steps that
//! produce it. Programs run in order, so a later program may start from a
//! parity packet an earlier one already computed.

use crate::{bitmatrix::BitMatrix, galois::region_xor};

/// A packet within one `w * packet_size` chunk of a fragment.
///
/// `fragment` is the global fragment index: `0..k` are data, `k..k+m` parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRef {
    pub fragment: usize,
    pub packet: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Copy,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub source: PacketRef,
    pub kind: OpKind,
}

/// All operations writing one destination packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketProgram {
    pub destination: PacketRef,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    k: usize,
    w: usize,
    programs: Vec<PacketProgram>,
}

impl Schedule {
    /// Build a schedule that reuses already computed parity packets.
    ///
    /// Rows are emitted greedily: the lightest row first, then whichever
    /// remaining row is cheapest to produce, either from scratch (its weight)
    /// or by copying an emitted row and XOR-ing in the bits where the two
    /// differ (Hamming distance plus one).
    pub fn smart(bitmatrix: &BitMatrix, k: usize, m: usize, w: usize) -> Self {
        let rows = m * w;
        let mut cost: Vec<usize> = (0..rows).map(|r| bitmatrix.row_weight(r)).collect();
        let mut base: Vec<Option<usize>> = vec![None; rows];
        let mut remaining: Vec<usize> = (0..rows).collect();
        let mut programs = Vec::with_capacity(rows);

        let data_packet = |col: usize| PacketRef {
            fragment: col / w,
            packet: col % w,
        };

        while let Some(row) = cheapest(&remaining, &cost) {
            remaining.retain(|&r| r != row);
            let bits = bitmatrix.row(row);

            let operations: Vec<Operation> = match base[row] {
                None => bits
                    .iter()
                    .enumerate()
                    .filter(|(_, &b)| b != 0)
                    .enumerate()
                    .map(|(n, (col, _))| Operation {
                        source: data_packet(col),
                        kind: if n == 0 { OpKind::Copy } else { OpKind::Xor },
                    })
                    .collect(),
                Some(from) => {
                    let seed = Operation {
                        source: PacketRef {
                            fragment: k + from / w,
                            packet: from % w,
                        },
                        kind: OpKind::Copy,
                    };
                    let from_bits = bitmatrix.row(from);
                    std::iter::once(seed)
                        .chain(
                            bits.iter()
                                .zip(from_bits)
                                .enumerate()
                                .filter(|(_, (a, b))| a != b)
                                .map(|(col, _)| Operation {
                                    source: data_packet(col),
                                    kind: OpKind::Xor,
                                }),
                        )
                        .collect()
                }
            };

            programs.push(PacketProgram {
                destination: PacketRef {
                    fragment: k + row / w,
                    packet: row % w,
                },
                operations,
            });

            for &r in &remaining {
                let distance = 1 + hamming(bits, bitmatrix.row(r));
                if distance < cost[r] {
                    cost[r] = distance;
                    base[r] = Some(row);
                }
            }
        }

        Self { k, w, programs }
    }

    pub fn programs(&self) -> &[PacketProgram] {
        &self.programs
    }

    /// Total number of copy and XOR operations per chunk.
    pub fn len(&self) -> usize {
        self.programs.iter().map(|p| p.operations.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the schedule over the first `blocksize` bytes of every fragment.
    ///
    /// `blocksize` must be a multiple of `w * packet_size`.
    pub fn apply(
        &self,
        data: &[&[u8]],
        parity: &mut [&mut [u8]],
        packet_size: usize,
        blocksize: usize,
    ) {
        let chunk = self.w * packet_size;
        for offset in (0..blocksize).step_by(chunk) {
            for program in &self.programs {
                let dst_fragment = program.destination.fragment - self.k;
                let dst_offset = offset + program.destination.packet * packet_size;

                if program.operations.is_empty() {
                    parity[dst_fragment][dst_offset..dst_offset + packet_size].fill(0);
                    continue;
                }

                for op in &program.operations {
                    let src_offset = offset + op.source.packet * packet_size;
                    if op.source.fragment < self.k {
                        let src = &data[op.source.fragment][src_offset..src_offset + packet_size];
                        let dst = &mut parity[dst_fragment][dst_offset..dst_offset + packet_size];
                        run(op.kind, src, dst);
                    } else {
                        let (src, dst) = packet_pair(
                            parity,
                            (op.source.fragment - self.k, src_offset),
                            (dst_fragment, dst_offset),
                            packet_size,
                        );
                        run(op.kind, src, dst);
                    }
                }
            }
        }
    }
}

/// First remaining row with the strictly smallest cost.
fn cheapest(remaining: &[usize], cost: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &r in remaining {
        if best.map_or(true, |b| cost[r] < cost[b]) {
            best = Some(r);
        }
    }
    best
}

fn hamming(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

fn run(kind: OpKind, src: &[u8], dst: &mut [u8]) {
    match kind {
        OpKind::Copy => dst.copy_from_slice(src),
        OpKind::Xor => region_xor(src, dst),
    }
}

/// Borrow a source packet and a distinct destination packet, both in parity.
fn packet_pair<'a>(
    parity: &'a mut [&mut [u8]],
    (src_fragment, src_offset): (usize, usize),
    (dst_fragment, dst_offset): (usize, usize),
    len: usize,
) -> (&'a [u8], &'a mut [u8]) {
    if src_fragment == dst_fragment {
        let buf: &'a mut [u8] = &mut *parity[dst_fragment];
        if src_offset < dst_offset {
            let (lo, hi) = buf.split_at_mut(dst_offset);
            (&lo[src_offset..src_offset + len], &mut hi[..len])
        } else {
            let (lo, hi) = buf.split_at_mut(src_offset);
            (&hi[..len], &mut lo[dst_offset..dst_offset + len])
        }
    } else if src_fragment < dst_fragment {
        let (lo, hi) = parity.split_at_mut(dst_fragment);
        (
            &lo[src_fragment][src_offset..src_offset + len],
            &mut hi[0][dst_offset..dst_offset + len],
        )
    } else {
        let (lo, hi) = parity.split_at_mut(src_fragment);
        (
            &hi[0][src_offset..src_offset + len],
            &mut lo[dst_fragment][dst_offset..dst_offset + len],
        )
    }
}
