//! Batch partitioning.
//!
//! Batch mode trades CPU parallelism against per-process memory pressure:
//! each sub-process compiles one partition of the Swift inputs as primaries
//! while loading the rest as secondaries.

use indexmap::IndexMap;

use crate::vpath::TypedVirtualPath;

/// User overrides for batch partitioning, from the `-driver-batch-*` flags.
/// `seed` is recorded but reserved; assignment never shuffles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchModeInfo {
    pub count: Option<usize>,
    pub size_limit: Option<usize>,
    pub seed: Option<usize>,
}

// The default size limit bounds per-process memory. Batch-mode primary files
// cost roughly 10 MB each against roughly 512 KB for a non-primary, and the
// outer build system may run up to NCPU drivers concurrently, so the expected
// pressure scales as NCPU * (nonprimary * N + primary * N/NCPU). Capping
// N/NCPU at 25 keeps the dominant term bounded.
pub const DEFAULT_SIZE_LIMIT: usize = 25;

/// The partitioned Swift inputs and the file-to-partition index map.
#[derive(Debug)]
pub struct BatchPartitions {
    pub partitions: Vec<Vec<TypedVirtualPath>>,
    pub assignment: IndexMap<TypedVirtualPath, usize>,
}

/// The partition-count formula: a user-requested count wins outright;
/// otherwise `max(parallelism, N / size_limit)`.
pub fn number_of_partitions(info: &BatchModeInfo, num_threads: usize, input_count: usize) -> usize {
    if let Some(count) = info.count {
        return count;
    }
    let parallelism = num_threads.max(1);
    let size_limit = info.size_limit.unwrap_or(DEFAULT_SIZE_LIMIT);
    parallelism.max(input_count / size_limit)
}

/// Assigns the Swift inputs to partitions, in input order.
///
/// Returns `None` when partitioning degenerates to one partition (or there
/// is nothing to partition); the planner then emits one compile job per
/// input instead of batch jobs. The count is clamped to the input count so
/// every partition is non-empty, and sizes differ by at most one.
pub fn partition_inputs(
    swift_inputs: &[TypedVirtualPath],
    info: &BatchModeInfo,
    num_threads: usize,
) -> Option<BatchPartitions> {
    let input_count = swift_inputs.len();
    if input_count == 0 {
        return None;
    }

    let count = number_of_partitions(info, num_threads, input_count).min(input_count);
    if count <= 1 {
        return None;
    }

    let target_size = input_count / count;
    let remainder = input_count % count;
    log::debug!(
        "partitioning {input_count} inputs into {count} batches (target size {target_size}, remainder {remainder})"
    );

    let mut partitions: Vec<Vec<TypedVirtualPath>> = Vec::with_capacity(count);
    let mut assignment = IndexMap::new();
    let mut remaining = swift_inputs;
    for index in 0..count {
        let size = if index < remainder { target_size + 1 } else { target_size };
        let (chunk, rest) = remaining.split_at(size);
        remaining = rest;
        for file in chunk {
            assignment.insert(file.clone(), index);
        }
        partitions.push(chunk.to_vec());
    }
    debug_assert!(remaining.is_empty());

    Some(BatchPartitions { partitions, assignment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_type::FileType;
    use crate::vpath::VirtualPath;

    fn inputs(count: usize) -> Vec<TypedVirtualPath> {
        (0..count)
            .map(|i| {
                TypedVirtualPath::new(
                    VirtualPath::Relative(format!("f{i}.swift").into()),
                    FileType::Swift,
                )
            })
            .collect()
    }

    #[test]
    fn test_partition_count_formula() {
        let info = BatchModeInfo::default();
        // max(T, N / 25) with T defaulting to 1.
        assert_eq!(number_of_partitions(&info, 0, 10), 1);
        assert_eq!(number_of_partitions(&info, 4, 10), 4);
        assert_eq!(number_of_partitions(&info, 4, 100), 4);
        assert_eq!(number_of_partitions(&info, 2, 100), 4);
        assert_eq!(number_of_partitions(&info, 0, 250), 10);

        // A user count wins outright.
        let with_count = BatchModeInfo { count: Some(3), ..BatchModeInfo::default() };
        assert_eq!(number_of_partitions(&with_count, 8, 100), 3);

        // A user size limit replaces the default 25.
        let with_limit = BatchModeInfo { size_limit: Some(10), ..BatchModeInfo::default() };
        assert_eq!(number_of_partitions(&with_limit, 1, 100), 10);
    }

    #[test]
    fn test_single_partition_means_no_partitioning() {
        let info = BatchModeInfo::default();
        assert!(partition_inputs(&inputs(10), &info, 1).is_none());
        assert!(partition_inputs(&[], &info, 4).is_none());
    }

    #[test]
    fn test_even_split() {
        let files = inputs(100);
        let parts = partition_inputs(&files, &BatchModeInfo::default(), 4).unwrap();
        assert_eq!(parts.partitions.len(), 4);
        for partition in &parts.partitions {
            assert_eq!(partition.len(), 25);
        }
    }

    #[test]
    fn test_remainder_distribution() {
        let files = inputs(10);
        let info = BatchModeInfo { count: Some(4), ..BatchModeInfo::default() };
        let parts = partition_inputs(&files, &info, 1).unwrap();
        let sizes: Vec<usize> = parts.partitions.iter().map(Vec::len).collect();
        assert_eq!(sizes, [3, 3, 2, 2]);

        // Files keep their input order across the concatenated partitions.
        let flattened: Vec<&TypedVirtualPath> = parts.partitions.iter().flatten().collect();
        assert_eq!(flattened.len(), files.len());
        for (flat, original) in flattened.iter().zip(files.iter()) {
            assert_eq!(**flat, *original);
        }
    }

    #[test]
    fn test_assignment_matches_partitions() {
        let files = inputs(17);
        let info = BatchModeInfo { count: Some(5), ..BatchModeInfo::default() };
        let parts = partition_inputs(&files, &info, 1).unwrap();
        for (file, &index) in &parts.assignment {
            assert!(parts.partitions[index].contains(file));
        }
        let total: usize = parts.partitions.iter().map(Vec::len).sum();
        assert_eq!(total, 17);
    }

    #[test]
    fn test_count_clamped_to_input_count() {
        let files = inputs(3);
        let info = BatchModeInfo { count: Some(16), ..BatchModeInfo::default() };
        let parts = partition_inputs(&files, &info, 1).unwrap();
        assert_eq!(parts.partitions.len(), 3);
        assert!(parts.partitions.iter().all(|p| p.len() == 1));
    }
}
