//! Random constraint generation for property testing.

use proptest::prelude::*;
use smallvec::SmallVec;

use super::{AtomicConstraint, CmpOp};

/// Largest bound, value or remainder generated.
const MAX_BOUND: usize = 12;

impl Arbitrary for CmpOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<CmpOp>;

    fn arbitrary_with(_: ()) -> Self::Strategy {
        proptest::sample::select(CmpOp::ALL.to_vec()).boxed()
    }
}

prop_compose! {
    fn arb_ordering(item: String)(op in any::<CmpOp>(), bound in 0..=MAX_BOUND) -> AtomicConstraint {
        AtomicConstraint::Ordering { item: item.clone(), op, bound }
    }
}

prop_compose! {
    fn arb_membership(item: String)(
        positive in any::<bool>(),
        values in prop::collection::vec(0..=MAX_BOUND, 0..4)
    ) -> AtomicConstraint {
        AtomicConstraint::Membership {
            item: item.clone(),
            positive,
            values: SmallVec::from_vec(values),
        }
    }
}

prop_compose! {
    fn arb_modulo(item: String)(
        modulus in 1..=5usize,
        op in any::<CmpOp>(),
        remainder in 0..=5usize
    ) -> AtomicConstraint {
        AtomicConstraint::Modulo { item: item.clone(), modulus, op, remainder }
    }
}

/// Any atomic constraint on `item`.
pub fn arb_constraint_on(item: impl Into<String>) -> BoxedStrategy<AtomicConstraint> {
    let item = item.into();
    prop_oneof![
        arb_ordering(item.clone()),
        arb_membership(item.clone()),
        arb_modulo(item),
    ]
    .boxed()
}

impl Arbitrary for AtomicConstraint {
    type Parameters = ();
    type Strategy = BoxedStrategy<AtomicConstraint>;

    fn arbitrary_with(_: ()) -> Self::Strategy {
        prop::sample::select(vec!["red", "blue", "yellow"])
            .prop_flat_map(arb_constraint_on)
            .boxed()
    }
}
