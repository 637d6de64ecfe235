//! Bounded iteration table
//!
//! The dispatch loop runs once per row of the steps table. A budget of
//! `k` bits is expressed as a cross join of `k` two-row tables whose values
//! are `0` and `2^i`; the sums enumerate `0..2^k` exactly once each.

/// Offsets contributed by each factor table, `2^0 .. 2^(k-1)`
pub fn step_offsets(bits: u32) -> Vec<u64> {
    (0..bits).map(|i| 1u64 << i).collect()
}

/// Number of dispatch iterations for a budget of `bits`
pub fn step_count(bits: u32) -> u64 {
    1u64 << bits
}

pub fn steps_table(bits: u32) -> String {
    if bits == 0 {
        return "(SELECT 0 v) s".to_string();
    }

    let sum = (0..bits)
        .map(|i| format!("E{}.v", i))
        .collect::<Vec<_>>()
        .join("+");
    let factors = step_offsets(bits)
        .into_iter()
        .enumerate()
        .map(|(i, offset)| format!("(SELECT 0 v UNION ALL SELECT {} v) E{}", offset, i))
        .collect::<Vec<_>>()
        .join(" CROSS JOIN ");

    format!("(SELECT ({}) v FROM {} ORDER BY v) s", sum, factors)
}
