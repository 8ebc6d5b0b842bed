use matchsort::core::{MatchedData, OrderSource};
use matchsort::prelude::*;
use std::cmp::Ordering;

// Simulate an external columnar batch (like an Arrow record batch).
struct MockStringColumn {
    data: Vec<u8>,
    offsets: Vec<usize>,
}

impl MockStringColumn {
    fn new(strings: &[&str]) -> Self {
        let mut data = Vec::new();
        let mut offsets = vec![0];
        for s in strings {
            data.extend_from_slice(s.as_bytes());
            offsets.push(data.len());
        }
        Self { data, offsets }
    }

    fn value(&self, index: usize) -> &[u8] {
        &self.data[self.offsets[index]..self.offsets[index + 1]]
    }
}

// Implement OrderSource for the external column.
// This proves the trait is implementable by "outside crates".
impl OrderSource for MockStringColumn {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self.value(i).cmp(self.value(j))
    }

    fn len(&self) -> usize {
        self.offsets.len() - 1
    }
}

// A row store that exposes its rows as one mutable slice.
struct MockRows {
    rows: Vec<(u32, &'static str)>,
}

impl MatchedData for MockRows {
    type Item = (u32, &'static str);

    fn as_mut_items(&mut self) -> &mut [Self::Item] {
        &mut self.rows
    }

    fn item_count(&self) -> usize {
        self.rows.len()
    }
}

#[test]
fn test_external_order_source() {
    let column = MockStringColumn::new(&["foo", "bar", "baz"]);
    let mut ids = vec![10, 20, 30];

    sort_matched(&mut ids, &column).unwrap();

    // sorted: bar (20), baz (30), foo (10)
    assert_eq!(ids, vec![20, 30, 10]);
}

#[test]
fn test_external_data_and_order() {
    let column = MockStringColumn::new(&["pear", "apple", "fig", "apple"]);
    let mut rows = MockRows {
        rows: vec![(0, "p"), (1, "a"), (2, "f"), (3, "a2")],
    };

    MatchedSort::new().sort(&mut rows, &column).unwrap();

    assert_eq!(rows.rows, vec![(1, "a"), (3, "a2"), (2, "f"), (0, "p")]);
}

#[test]
fn test_external_length_mismatch() {
    let column = MockStringColumn::new(&["a", "b"]);
    let mut rows = MockRows {
        rows: vec![(0, "x")],
    };

    let err = sort_matched(&mut rows, &column).unwrap_err();
    assert_eq!(err, MatchError::LengthMismatch { data: 1, order: 2 });
    assert_eq!(rows.rows, vec![(0, "x")]);
}
