//! Enumeration of factor multisets for product cages.

/// Every non-decreasing multiset of `count` values drawn from `alphabet`
/// whose product is `target`. `alphabet` must be sorted ascending; results
/// come out in lexicographic order.
///
/// A target of 1 over `count` cells yields the single multiset `[1, 1, ...]`
/// when 1 is available.
pub fn factorizations(target: i64, count: usize, alphabet: &[i64]) -> Vec<Vec<i64>> {
    let mut results = Vec::new();
    if target >= 1 && count >= 1 {
        let mut prefix = Vec::with_capacity(count);
        descend(target, count, i64::MIN, alphabet, &mut prefix, &mut results);
    }
    results
}

fn descend(
    target: i64,
    count: usize,
    floor: i64,
    alphabet: &[i64],
    prefix: &mut Vec<i64>,
    results: &mut Vec<Vec<i64>>,
) {
    if count == 1 {
        if target >= floor && alphabet.contains(&target) {
            let mut combo = prefix.clone();
            combo.push(target);
            results.push(combo);
        }
        return;
    }
    for &factor in alphabet {
        if factor < floor || factor == 0 || target % factor != 0 {
            continue;
        }
        prefix.push(factor);
        descend(target / factor, count - 1, factor, alphabet, prefix, results);
        prefix.pop();
    }
}
