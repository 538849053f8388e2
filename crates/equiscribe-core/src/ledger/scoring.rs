//! Total score aggregation.

use crate::models::RegionEntry;

/// Sum of grade points over included regions.
pub fn score(regions: &[RegionEntry]) -> u32 {
    regions.iter().map(RegionEntry::contribution).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{RegionLedger, RegionPatch};
    use crate::models::{Grade, ANATOMICAL_REGIONS};
    use proptest::prelude::*;

    fn grade_strategy() -> impl Strategy<Value = Grade> {
        prop::sample::select(Grade::ALL.to_vec())
    }

    #[test]
    fn test_fresh_ledger_scores_zero() {
        assert_eq!(score(RegionLedger::new().entries()), 0);
    }

    #[test]
    fn test_only_included_regions_count() {
        let mut ledger = RegionLedger::new();
        ledger.update_region("Jarret D", RegionPatch::grade(Grade::G3)).unwrap();
        ledger
            .update_region(
                "Pieds",
                RegionPatch {
                    grade: Some(Grade::G4),
                    is_included: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(score(ledger.entries()), 4);
    }

    proptest! {
        #[test]
        fn prop_score_is_sum_of_included_points(
            grades in prop::collection::vec(grade_strategy(), 12),
            included in prop::collection::vec(any::<bool>(), 12),
        ) {
            let mut ledger = RegionLedger::new();
            let mut expected = 0;
            for (i, label) in ANATOMICAL_REGIONS.iter().enumerate() {
                ledger.update_region(label, RegionPatch {
                    grade: Some(grades[i]),
                    is_included: Some(included[i]),
                    ..Default::default()
                }).unwrap();
                if included[i] {
                    expected += grades[i].points();
                }
            }
            prop_assert_eq!(ledger.total_score(), expected);
        }

        #[test]
        fn prop_toggling_grade_four_moves_score_by_eight(
            index in 0usize..12,
            grades in prop::collection::vec(grade_strategy(), 12),
        ) {
            let mut ledger = RegionLedger::new();
            for (i, label) in ANATOMICAL_REGIONS.iter().enumerate() {
                ledger.update_region(label, RegionPatch::grade(grades[i])).unwrap();
            }
            let label = ANATOMICAL_REGIONS[index];
            ledger.update_region(label, RegionPatch::grade(Grade::G4)).unwrap();

            let before = ledger.total_score();
            ledger.set_included(label, false).unwrap();
            prop_assert_eq!(ledger.total_score() + 8, before);
            ledger.set_included(label, true).unwrap();
            prop_assert_eq!(ledger.total_score(), before);
        }
    }
}
