//! Coordinate partitioning
//!
//! Splits a payload whose coordinates are relative to a base tile into
//! tile-local groups, one per tile touched.

use crate::types::{SubstitutePayload, TileAddress, TileGroup};
use indexmap::IndexMap;
use serde_json::Value;
use std::num::NonZeroU32;

/// Partitions absolute coordinates into per-tile groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePartitioner {
    tile_size: NonZeroU32,
}

impl TilePartitioner {
    /// Create partitioner for square tiles of `tile_size`
    #[inline]
    #[must_use]
    pub const fn new(tile_size: NonZeroU32) -> Self {
        Self { tile_size }
    }

    /// Tile edge length
    #[inline]
    #[must_use]
    pub const fn tile_size(&self) -> NonZeroU32 {
        self.tile_size
    }

    /// Partition a validated payload
    #[must_use]
    pub fn partition(&self, payload: &SubstitutePayload, base: TileAddress) -> Vec<TileGroup> {
        self.split(&payload.coords, &payload.colors, base)
    }

    /// Partition flat `(x, y)` pairs and their values
    ///
    /// Groups come out in order of the first pair that lands on each tile.
    /// Within a group, pairs keep their original relative order so values
    /// stay index-aligned with coordinates.
    ///
    /// Expects `coords.len() == 2 * colors.len()`; a trailing unpaired
    /// coordinate or surplus value is ignored.
    #[must_use]
    pub fn split(&self, coords: &[u64], colors: &[Value], base: TileAddress) -> Vec<TileGroup> {
        let size = u64::from(self.tile_size.get());
        let mut groups: IndexMap<TileAddress, TileGroup> = IndexMap::new();

        for (pair, color) in coords.chunks_exact(2).zip(colors) {
            let (x, y) = (pair[0], pair[1]);
            let target = base.offset(x / size, y / size);

            groups
                .entry(target)
                .or_insert_with(|| TileGroup::new(target))
                .push(x % size, y % size, color.clone());
        }

        groups.into_values().collect()
    }
}

impl Default for TilePartitioner {
    fn default() -> Self {
        Self::new(crate::config::InterceptConfig::default().tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn partitioner(size: u32) -> TilePartitioner {
        TilePartitioner::new(NonZeroU32::new(size).unwrap())
    }

    #[test]
    fn splits_across_horizontal_neighbour() {
        let groups = partitioner(1000).split(
            &[10, 20, 1100, 300],
            &[json!(1), json!(2)],
            TileAddress::new(5, 10),
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].address, TileAddress::new(5, 10));
        assert_eq!(groups[0].coords, vec![10, 20]);
        assert_eq!(groups[0].colors, vec![json!(1)]);
        assert_eq!(groups[1].address, TileAddress::new(6, 10));
        assert_eq!(groups[1].coords, vec![100, 300]);
        assert_eq!(groups[1].colors, vec![json!(2)]);
    }

    #[test]
    fn groups_follow_first_encounter_order() {
        let groups = partitioner(10).split(
            &[25, 0, 1, 1, 26, 3, 0, 15],
            &[json!("a"), json!("b"), json!("c"), json!("d")],
            TileAddress::new(0, 0),
        );

        let addresses: Vec<_> = groups.iter().map(|g| g.address).collect();
        assert_eq!(
            addresses,
            vec![
                TileAddress::new(2, 0),
                TileAddress::new(0, 0),
                TileAddress::new(0, 1)
            ]
        );
        assert_eq!(groups[0].coords, vec![5, 0, 6, 3]);
        assert_eq!(groups[0].colors, vec![json!("a"), json!("c")]);
    }

    #[test]
    fn exact_multiple_lands_on_next_tile() {
        let groups = partitioner(1000).split(&[1000, 999], &[json!(7)], TileAddress::new(0, 0));
        assert_eq!(groups[0].address, TileAddress::new(1, 0));
        assert_eq!(groups[0].coords, vec![0, 999]);
    }

    #[test]
    fn diagonal_neighbour() {
        let groups = partitioner(1000).split(&[2500, 1001], &[json!(4)], TileAddress::new(3, 3));
        assert_eq!(groups[0].address, TileAddress::new(5, 4));
        assert_eq!(groups[0].coords, vec![500, 1]);
    }

    fn payload_strategy() -> impl Strategy<Value = (Vec<u64>, Vec<Value>)> {
        proptest::collection::vec((0..5000u64, 0..5000u64, 0..64u8), 1..64).prop_map(|pixels| {
            let coords = pixels.iter().flat_map(|&(x, y, _)| [x, y]).collect();
            let colors = pixels.iter().map(|&(_, _, c)| json!(c)).collect();
            (coords, colors)
        })
    }

    proptest! {
        #[test]
        fn prop_groups_cover_input_exactly(
            (coords, colors) in payload_strategy(),
            size in 1..2000u32,
            bx in 0..100u64,
            by in 0..100u64,
        ) {
            let groups = partitioner(size).split(&coords, &colors, TileAddress::new(bx, by));
            let size = u64::from(size);

            let total: usize = groups.iter().map(|g| g.colors.len()).sum();
            prop_assert_eq!(total, colors.len());

            // Rebuild absolute pixels from every group and compare as multisets
            let mut rebuilt: Vec<(u64, u64, String)> = groups
                .iter()
                .flat_map(|g| {
                    g.pixels().map(move |(x, y, c)| {
                        (
                            (g.address.x - bx) * size + x,
                            (g.address.y - by) * size + y,
                            c.to_string(),
                        )
                    })
                })
                .collect();
            let mut original: Vec<(u64, u64, String)> = coords
                .chunks_exact(2)
                .zip(&colors)
                .map(|(p, c)| (p[0], p[1], c.to_string()))
                .collect();
            rebuilt.sort();
            original.sort();
            prop_assert_eq!(rebuilt, original);
        }

        #[test]
        fn prop_local_coords_within_tile(
            (coords, colors) in payload_strategy(),
            size in 1..2000u32,
        ) {
            let groups = partitioner(size).split(&coords, &colors, TileAddress::new(0, 0));
            for group in &groups {
                prop_assert_eq!(group.coords.len(), group.colors.len() * 2);
                prop_assert!(group.coords.iter().all(|&c| c < u64::from(size)));
            }
        }

        #[test]
        fn prop_in_tile_payload_is_untouched(
            pixels in proptest::collection::vec((0..1000u64, 0..1000u64, 0..64u8), 1..64),
            bx in 0..100u64,
            by in 0..100u64,
        ) {
            let coords: Vec<u64> = pixels.iter().flat_map(|&(x, y, _)| [x, y]).collect();
            let colors: Vec<Value> = pixels.iter().map(|&(_, _, c)| json!(c)).collect();
            let base = TileAddress::new(bx, by);

            let groups = partitioner(1000).split(&coords, &colors, base);
            prop_assert_eq!(groups.len(), 1);
            prop_assert_eq!(groups[0].address, base);
            prop_assert_eq!(&groups[0].coords, &coords);
            prop_assert_eq!(&groups[0].colors, &colors);
        }
    }
}
