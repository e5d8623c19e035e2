use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::data_point::DataPoint;
use crate::error::{NetworkError, Result};

/// Ordered, fixed-length collection of equally sized samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    points: Vec<DataPoint>,
    point_len: usize,
}

impl DataSet {
    /// Every point must carry the same number of bytes.
    pub fn new(points: Vec<DataPoint>) -> Result<DataSet> {
        let point_len = points.first().map_or(0, DataPoint::len);
        if let Some(bad) = points.iter().find(|p| p.len() != point_len) {
            return Err(NetworkError::LengthMismatch {
                what: "data point",
                expected: point_len,
                found: bad.len(),
            });
        }
        Ok(DataSet { points, point_len })
    }

    /// Pairs `images[i]` with `labels[i]`.
    pub fn from_parts(images: Vec<Vec<u8>>, labels: Vec<u8>) -> Result<DataSet> {
        if images.len() != labels.len() {
            return Err(NetworkError::LabelCountMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        DataSet::new(
            images.into_iter().zip(labels)
                .map(|(data, label)| DataPoint::new(data, label))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bytes per sample; 0 for an empty set.
    pub fn point_len(&self) -> usize {
        self.point_len
    }

    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }

    /// Uniform random permutation (Fisher–Yates).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.points.shuffle(rng);
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn numbered(n: u8) -> DataSet {
        DataSet::from_parts((0..n).map(|i| vec![i, i.wrapping_mul(3)]).collect(), (0..n).map(|i| i % 10).collect()).unwrap()
    }

    #[test]
    fn shuffle_preserves_the_multiset() {
        let original = numbered(50);
        let mut shuffled = original.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(3));

        assert_eq!(shuffled.len(), original.len());
        assert_ne!(shuffled, original);

        let mut a: Vec<_> = original.iter().cloned().collect();
        let mut b: Vec<_> = shuffled.iter().cloned().collect();
        a.sort_by(|x, y| x.data().cmp(y.data()).then(x.label().cmp(&y.label())));
        b.sort_by(|x, y| x.data().cmp(y.data()).then(x.label().cmp(&y.label())));
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_parts_are_rejected() {
        assert!(matches!(
            DataSet::from_parts(vec![vec![1], vec![2]], vec![0]),
            Err(NetworkError::LabelCountMismatch { images: 2, labels: 1 })
        ));
    }

    #[test]
    fn ragged_points_are_rejected() {
        let points = vec![DataPoint::new(vec![1, 2], 0), DataPoint::new(vec![1], 0)];
        assert!(matches!(
            DataSet::new(points),
            Err(NetworkError::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn indexing_and_lengths() {
        let set = numbered(4);
        assert_eq!(set.point_len(), 2);
        assert_eq!(set.get(3).unwrap().data(), &[3, 9]);
        assert!(set.get(4).is_none());
        assert!(DataSet::default().is_empty());
        assert_eq!((&set).into_iter().count(), 4);
    }
}
