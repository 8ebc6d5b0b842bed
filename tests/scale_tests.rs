use matchsort::prelude::*;
use rand::Rng;
use std::time::Instant;

#[test]
fn test_sort_1m() {
    let count = 1_000_000;
    println!("Generating {} random elements...", count);

    let mut rng = rand::rng();
    let order: Vec<u32> = (0..count).map(|_| rng.random_range(0..100_000)).collect();
    let mut data: Vec<usize> = (0..count).collect();

    println!("Sorting {} elements...", count);
    let start = Instant::now();
    sort_matched(&mut data, &order).unwrap();
    let duration = start.elapsed();
    println!("Sorted 1M elements in {:?}", duration);

    assert_eq!(data.len(), count);

    // limited verification to save time
    for i in 0..count - 1 {
        let (a, b) = (data[i], data[i + 1]);
        assert!(order[a] <= order[b], "Sort failed at index {}", i);
        if order[a] == order[b] {
            assert!(a < b, "Stability broken at index {}", i);
        }
    }
}

#[test]
fn test_sort_1m_presorted_runs() {
    // Long ascending and descending runs exercise run detection and galloping.
    let count = 1_000_000;
    let order: Vec<i64> = (0..count as i64)
        .map(|i| if (i / 50_000) % 2 == 0 { i } else { -i })
        .collect();
    let mut data: Vec<String> = (0..count).map(|i| i.to_string()).collect();

    let start = Instant::now();
    sort_matched(&mut data, &order).unwrap();
    println!("Sorted 1M run-structured elements in {:?}", start.elapsed());

    let mut expected: Vec<usize> = (0..count).collect();
    expected.sort_by_key(|&i| order[i]);
    let expected: Vec<String> = expected.into_iter().map(|i| i.to_string()).collect();
    assert_eq!(data, expected);
}

#[test]
#[ignore]
fn test_sort_100m() {
    // WARNING: This test requires significant RAM (~4GB).
    // 100M keys * 4 bytes + 100M data * 8 bytes + 100M indices * 8 bytes + merge buffer.
    let count = 100_000_000;
    println!(
        "Generating {} random elements... (Expect high RAM usage)",
        count
    );

    let mut rng = rand::rng();
    let order: Vec<u32> = (0..count).map(|_| rng.random()).collect();
    let mut data: Vec<u64> = (0..count as u64).collect();

    let start = Instant::now();
    sort_matched(&mut data, &order).unwrap();
    println!("Sorted 100M elements in {:?}", start.elapsed());

    for i in (0..count - 1).step_by(1000) {
        assert!(order[data[i] as usize] <= order[data[i + 1] as usize]);
    }
}
