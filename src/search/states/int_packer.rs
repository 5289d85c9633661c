//! Packs one small integer per variable into a buffer of `u32` bins. Each
//! variable gets the fewest bits that can hold its domain, and bins are filled
//! greedily with the widest variable that still fits.

use crate::search::{PlannerError, Result};

pub type Bin = u32;

const BITS_PER_BIN: u32 = Bin::BITS;

#[derive(Debug, Clone, Copy)]
struct VariableInfo {
    bin: usize,
    shift: u32,
    read_mask: Bin,
    clear_mask: Bin,
}

impl VariableInfo {
    fn new(bin: usize, shift: u32, bits: u32) -> Self {
        let value_mask = if bits == BITS_PER_BIN {
            Bin::MAX
        } else {
            (1 << bits) - 1
        };
        let read_mask = value_mask << shift;
        Self {
            bin,
            shift,
            read_mask,
            clear_mask: !read_mask,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntPacker {
    var_infos: Vec<VariableInfo>,
    num_bins: usize,
}

impl IntPacker {
    /// Lays out variables with the given domain sizes. A variable that needs
    /// the width of a whole bin or more is rejected.
    pub fn new(domain_sizes: &[usize]) -> Result<Self> {
        let mut vars_by_bits: Vec<Vec<usize>> = vec![vec![]; BITS_PER_BIN as usize];
        for (var, &domain_size) in domain_sizes.iter().enumerate() {
            let bits = Self::bits_for_range(domain_size);
            if bits >= BITS_PER_BIN {
                return Err(PlannerError::VariableTooLarge {
                    var,
                    domain_size,
                    bits,
                });
            }
            vars_by_bits[bits as usize].push(var);
        }
        // Within one width, lower variable ids are packed first.
        for vars in vars_by_bits.iter_mut() {
            vars.reverse();
        }

        let mut var_infos = vec![VariableInfo::new(0, 0, 1); domain_sizes.len()];
        let mut num_packed = 0;
        let mut num_bins = 0;
        while num_packed < domain_sizes.len() {
            let mut used_bits = 0;
            loop {
                let free = BITS_PER_BIN - used_bits;
                let Some(bits) = (1..=free)
                    .rev()
                    .find(|&bits| !vars_by_bits[bits as usize].is_empty())
                else {
                    break;
                };
                let var = vars_by_bits[bits as usize]
                    .pop()
                    .unwrap_or_else(|| unreachable!());
                var_infos[var] = VariableInfo::new(num_bins, used_bits, bits);
                used_bits += bits;
                num_packed += 1;
            }
            num_bins += 1;
        }

        Ok(Self {
            var_infos,
            num_bins,
        })
    }

    /// Number of bits to store values `0..range`, at least one.
    fn bits_for_range(range: usize) -> u32 {
        let mut bits = 1;
        while bits < usize::BITS && (1usize << bits) < range {
            bits += 1;
        }
        bits
    }

    #[inline(always)]
    pub fn get(&self, buffer: &[Bin], var: usize) -> usize {
        let info = &self.var_infos[var];
        ((buffer[info.bin] & info.read_mask) >> info.shift) as usize
    }

    #[inline(always)]
    pub fn set(&self, buffer: &mut [Bin], var: usize, value: usize) {
        let info = &self.var_infos[var];
        let value = (value as Bin) << info.shift;
        debug_assert_eq!(value & info.clear_mask, 0, "value too large for variable");
        buffer[info.bin] = (buffer[info.bin] & info.clear_mask) | value;
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn num_variables(&self) -> usize {
        self.var_infos.len()
    }

    pub fn pack(&self, values: &[usize]) -> Vec<Bin> {
        let mut buffer = vec![0; self.num_bins];
        for (var, &value) in values.iter().enumerate() {
            self.set(&mut buffer, var, value);
        }
        buffer
    }

    pub fn unpack(&self, buffer: &[Bin]) -> Vec<usize> {
        (0..self.var_infos.len())
            .map(|var| self.get(buffer, var))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_value() {
        let domain_sizes = vec![2, 3, 17, 1, 1000, 5, 2, 65536, 9];
        let packer = IntPacker::new(&domain_sizes).unwrap();
        let mut buffer = vec![0; packer.num_bins()];
        for (var, &domain_size) in domain_sizes.iter().enumerate() {
            for value in 0..domain_size {
                let before = packer.unpack(&buffer);
                packer.set(&mut buffer, var, value);
                assert_eq!(packer.get(&buffer, var), value);
                let after = packer.unpack(&buffer);
                for other in 0..domain_sizes.len() {
                    if other != var {
                        assert_eq!(before[other], after[other]);
                    }
                }
            }
        }
    }

    #[test]
    fn pack_then_unpack() {
        let domain_sizes = vec![4, 4, 3, 300];
        let packer = IntPacker::new(&domain_sizes).unwrap();
        let values = vec![3, 1, 2, 299];
        assert_eq!(packer.unpack(&packer.pack(&values)), values);
    }

    #[test]
    fn bins_are_filled_greedily() {
        // 32 binary variables fill one bin exactly
        assert_eq!(IntPacker::new(&[2; 32]).unwrap().num_bins(), 1);
        assert_eq!(IntPacker::new(&[2; 33]).unwrap().num_bins(), 2);
        // two 16-bit variables share a bin, the 1-bit variable does not fit
        assert_eq!(IntPacker::new(&[65536, 65536, 2]).unwrap().num_bins(), 2);
    }

    #[test]
    fn too_large_variable_is_an_error() {
        let domain_sizes = vec![2, 1 << 32];
        assert!(matches!(
            IntPacker::new(&domain_sizes),
            Err(PlannerError::VariableTooLarge { var: 1, .. })
        ));
    }
}
