//! A growable bitset over `u64` blocks. Bits beyond [`DynamicBitset::len`]
//! in the last block are always zero, so whole-block operations such as
//! [`DynamicBitset::count`] need no masking.

const BITS_PER_BLOCK: usize = u64::BITS as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DynamicBitset {
    blocks: Vec<u64>,
    num_bits: usize,
}

impl DynamicBitset {
    pub fn new(num_bits: usize) -> Self {
        Self {
            blocks: vec![0; Self::num_blocks(num_bits)],
            num_bits,
        }
    }

    /// A bitset with every bit set.
    pub fn full(num_bits: usize) -> Self {
        let mut bitset = Self::new(num_bits);
        bitset.set_all();
        bitset
    }

    #[inline(always)]
    fn num_blocks(num_bits: usize) -> usize {
        num_bits.div_ceil(BITS_PER_BLOCK)
    }

    #[inline(always)]
    fn mask(pos: usize) -> u64 {
        1 << (pos % BITS_PER_BLOCK)
    }

    fn zero_unused_bits(&mut self) {
        let used = self.num_bits % BITS_PER_BLOCK;
        if used != 0 {
            if let Some(last) = self.blocks.last_mut() {
                *last &= !(u64::MAX << used);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Grows or shrinks the bitset. New bits are zero.
    pub fn resize(&mut self, num_bits: usize) {
        self.num_bits = num_bits;
        self.blocks.resize(Self::num_blocks(num_bits), 0);
        self.zero_unused_bits();
    }

    pub fn set(&mut self, pos: usize) {
        assert!(pos < self.num_bits, "bit {} out of range", pos);
        self.blocks[pos / BITS_PER_BLOCK] |= Self::mask(pos);
    }

    pub fn reset(&mut self, pos: usize) {
        assert!(pos < self.num_bits, "bit {} out of range", pos);
        self.blocks[pos / BITS_PER_BLOCK] &= !Self::mask(pos);
    }

    #[inline(always)]
    pub fn test(&self, pos: usize) -> bool {
        debug_assert!(pos < self.num_bits);
        self.blocks[pos / BITS_PER_BLOCK] & Self::mask(pos) != 0
    }

    pub fn set_all(&mut self) {
        self.blocks.fill(u64::MAX);
        self.zero_unused_bits();
    }

    pub fn reset_all(&mut self) {
        self.blocks.fill(0);
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum()
    }

    pub fn none(&self) -> bool {
        self.blocks.iter().all(|&block| block == 0)
    }

    fn assert_same_len(&self, other: &Self) {
        assert_eq!(
            self.num_bits, other.num_bits,
            "bitset operations need equal sizes"
        );
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.assert_same_len(other);
        self.blocks
            .iter()
            .zip(&other.blocks)
            .any(|(a, b)| a & b != 0)
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.assert_same_len(other);
        self.blocks
            .iter()
            .zip(&other.blocks)
            .all(|(a, b)| a & !b == 0)
    }

    fn combine(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) {
        self.assert_same_len(other);
        for (a, &b) in self.blocks.iter_mut().zip(&other.blocks) {
            *a = op(*a, b);
        }
        self.zero_unused_bits();
    }

    pub fn intersect_with(&mut self, other: &Self) {
        self.combine(other, |a, b| a & b);
    }

    pub fn union_with(&mut self, other: &Self) {
        self.combine(other, |a, b| a | b);
    }

    pub fn xor_with(&mut self, other: &Self) {
        self.combine(other, |a, b| a ^ b);
    }

    /// `self &= !other`
    pub fn and_not(&mut self, other: &Self) {
        self.combine(other, |a, b| a & !b);
    }

    /// `self |= !other`
    pub fn or_not(&mut self, other: &Self) {
        self.combine(other, |a, b| a | !b);
    }

    pub fn complement(&mut self) {
        for block in self.blocks.iter_mut() {
            *block = !*block;
        }
        self.zero_unused_bits();
    }

    /// Iterates over the positions of the set bits in increasing order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .flat_map(|(index, &block)| {
                let mut remaining = block;
                std::iter::from_fn(move || {
                    if remaining == 0 {
                        None
                    } else {
                        let bit = remaining.trailing_zeros() as usize;
                        remaining &= remaining - 1;
                        Some(index * BITS_PER_BLOCK + bit)
                    }
                })
            })
    }
}

impl std::ops::BitAndAssign<&DynamicBitset> for DynamicBitset {
    fn bitand_assign(&mut self, rhs: &DynamicBitset) {
        self.intersect_with(rhs);
    }
}

impl std::ops::BitOrAssign<&DynamicBitset> for DynamicBitset {
    fn bitor_assign(&mut self, rhs: &DynamicBitset) {
        self.union_with(rhs);
    }
}

impl std::ops::BitXorAssign<&DynamicBitset> for DynamicBitset {
    fn bitxor_assign(&mut self, rhs: &DynamicBitset) {
        self.xor_with(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_positions(num_bits: usize, positions: &[usize]) -> DynamicBitset {
        let mut bitset = DynamicBitset::new(num_bits);
        for &pos in positions {
            bitset.set(pos);
        }
        bitset
    }

    fn samples() -> Vec<(DynamicBitset, DynamicBitset)> {
        vec![
            (from_positions(10, &[0, 3, 9]), from_positions(10, &[3, 4])),
            (
                from_positions(130, &[1, 64, 65, 127, 129]),
                from_positions(130, &[0, 1, 63, 64, 128, 129]),
            ),
            (DynamicBitset::new(70), DynamicBitset::full(70)),
        ]
    }

    #[test]
    fn algebra_identities() {
        for (a, b) in samples() {
            let mut a_and_b = a.clone();
            a_and_b &= &b;
            let mut a_and_not_b = a.clone();
            a_and_not_b.and_not(&b);
            let mut rebuilt = a_and_b.clone();
            rebuilt |= &a_and_not_b;
            assert_eq!(rebuilt, a);

            assert!(a.is_subset_of(&a));

            let mut a_or_b = a.clone();
            a_or_b |= &b;
            assert_eq!(a_or_b.count() + a_and_b.count(), a.count() + b.count());
        }
    }

    #[test]
    fn complement_keeps_unused_bits_zero() {
        let mut bitset = from_positions(67, &[2, 66]);
        bitset.complement();
        assert_eq!(bitset.count(), 65);
        assert!(!bitset.test(66));
        let mut or_not = DynamicBitset::new(67);
        or_not.or_not(&DynamicBitset::new(67));
        assert_eq!(or_not.count(), 67);
    }

    #[test]
    fn xor_and_intersects() {
        let mut a = from_positions(8, &[1, 2]);
        let b = from_positions(8, &[2, 3]);
        assert!(a.intersects(&b));
        a ^= &b;
        assert_eq!(a.iter_ones().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!from_positions(8, &[5]).intersects(&b));
    }

    #[test]
    fn resize_preserves_and_zero_fills() {
        let mut bitset = from_positions(5, &[0, 4]);
        bitset.resize(200);
        assert_eq!(bitset.len(), 200);
        assert_eq!(bitset.iter_ones().collect::<Vec<_>>(), vec![0, 4]);
        bitset.set(150);
        bitset.resize(3);
        assert_eq!(bitset.count(), 1);
    }

    #[test]
    fn set_reset_all() {
        let mut bitset = DynamicBitset::new(100);
        bitset.set_all();
        assert_eq!(bitset.count(), 100);
        bitset.reset(42);
        assert!(!bitset.test(42));
        bitset.reset_all();
        assert!(bitset.none());
    }

    #[test]
    #[should_panic]
    fn different_sizes_panic() {
        let mut a = DynamicBitset::new(3);
        a.intersect_with(&DynamicBitset::new(4));
    }
}
