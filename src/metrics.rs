use crate::step::{Operation, Step};

/// Count steps per [`Operation`], indexed by [`Operation::index`].
pub fn operation_histogram(steps: &[Step]) -> [usize; 6] {
    let mut hist = [0usize; 6];
    for step in steps {
        hist[step.operation.index()] += 1;
    }
    hist
}

/// Number of steps tagged as an add or a subtract.
///
/// Division also tags its quotient-bit bookkeeping as `Add`, so this is a
/// count of tagged steps, not of ALU cycles.
pub fn arithmetic_op_count(steps: &[Step]) -> usize {
    steps
        .iter()
        .filter(|s| matches!(s.operation, Operation::Add | Operation::Subtract))
        .count()
}

/// Number of steps tagged as a shift.
pub fn shift_count(steps: &[Step]) -> usize {
    steps
        .iter()
        .filter(|s| s.operation == Operation::Shift)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::AlgorithmKind;

    #[test]
    fn test_histogram_sums_to_len() {
        let steps = AlgorithmKind::BoothMultiplication.simulate(-5, 3, 8).unwrap();
        let hist = operation_histogram(&steps);
        assert_eq!(hist.iter().sum::<usize>(), steps.len());
        // Opening and closing steps.
        assert_eq!(hist[Operation::Init.index()], 2);
        assert_eq!(hist[Operation::Shift.index()], 8);
    }

    #[test]
    fn test_histogram_empty() {
        assert_eq!(operation_histogram(&[]).iter().sum::<usize>(), 0);
    }

    #[test]
    fn test_fast_booth_needs_fewer_operations() {
        // 0101_0101 makes radix-2 Booth add or subtract on every bit.
        let slow = AlgorithmKind::BoothMultiplication.simulate(3, 0b0101_0101, 8).unwrap();
        let fast = AlgorithmKind::FastBoothMultiplication.simulate(3, 0b0101_0101, 8).unwrap();
        assert_eq!(arithmetic_op_count(&slow), 8);
        assert_eq!(arithmetic_op_count(&fast), 4);
    }

    #[test]
    fn test_shift_count_division() {
        // Restoring division shifts once per iteration.
        let steps = AlgorithmKind::RestoringDivision.simulate(13, 4, 8).unwrap();
        assert_eq!(shift_count(&steps), 8);
    }

    #[test]
    fn test_restore_bucket() {
        let steps = AlgorithmKind::RestoringDivision.simulate(13, 4, 8).unwrap();
        let hist = operation_histogram(&steps);
        // Two quotient bits are 1 (13 / 4 = 0b11); the other six restore.
        assert_eq!(hist[Operation::Restore.index()], 6);
        assert_eq!(hist[Operation::Subtract.index()], 8);
    }
}
