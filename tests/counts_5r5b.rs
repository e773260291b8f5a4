//! Counting collections drawn from 5 red and 5 blue items.

use molloy::{count_collections, CountError, Multiset, UnsupportedFeature};
use rstest::{fixture, rstest};

#[fixture]
fn red_blue() -> Multiset {
    Multiset::from_counts([("red", 5), ("blue", 5)]).unwrap()
}

fn count(bag: &Multiset, size: usize, constraints: &str) -> u64 {
    bag.count_collections(Some(size), Some(constraints))
        .unwrap()
}

#[rstest]
#[case(10, 5, 1)]
#[case(9, 5, 1)]
#[case(8, 5, 1)]
#[case(10, 4, 0)]
#[case(6, 1, 1)]
#[case(5, 0, 1)]
#[case(0, 1, 0)]
fn red_eq(red_blue: Multiset, #[case] size: usize, #[case] red: usize, #[case] expected: u64) {
    assert_eq!(count(&red_blue, size, &format!("red == {red}")), expected);
}

#[rstest]
#[case(10, 5, 0)]
#[case(9, 5, 1)]
#[case(1, 1, 1)]
#[case(6, 3, 4)]
fn red_not_eq(red_blue: Multiset, #[case] size: usize, #[case] red: usize, #[case] expected: u64) {
    assert_eq!(count(&red_blue, size, &format!("red != {red}")), expected);
}

#[rstest]
#[case(10, 6, 1)]
#[case(10, 5, 0)]
#[case(3, 3, 3)]
#[case(5, 1, 1)]
#[case(6, 1, 0)]
#[case(6, 2, 1)]
fn red_lt(red_blue: Multiset, #[case] size: usize, #[case] red: usize, #[case] expected: u64) {
    assert_eq!(count(&red_blue, size, &format!("red < {red}")), expected);
}

#[rstest]
#[case(10, 5, 1)]
#[case(9, 5, 1)]
#[case(11, 5, 0)]
#[case(2, 3, 0)]
#[case(5, 0, 6)]
#[case(6, 0, 5)]
#[case(7, 0, 4)]
fn red_ge(red_blue: Multiset, #[case] size: usize, #[case] red: usize, #[case] expected: u64) {
    assert_eq!(count(&red_blue, size, &format!("red >= {red}")), expected);
}

#[rstest]
#[case(3, 2, 1)]
#[case(6, 2, 3)]
#[case(10, 4, 1)]
#[case(4, 5, 0)]
fn red_gt_flipped(
    red_blue: Multiset,
    #[case] size: usize,
    #[case] red: usize,
    #[case] expected: u64,
) {
    let direct = count(&red_blue, size, &format!("red > {red}"));
    let flipped = count(&red_blue, size, &format!("{red} < red"));
    assert_eq!(direct, expected);
    assert_eq!(flipped, expected);
}

#[rstest]
#[case(10, "[5]", 1)]
#[case(9, "[5]", 1)]
#[case(8, "[5]", 1)]
#[case(10, "[4]", 0)]
#[case(6, "[1]", 1)]
#[case(5, "[0]", 1)]
#[case(0, "[1]", 0)]
#[case(10, "[5, 1]", 1)]
#[case(9, "[5, 2]", 1)]
#[case(9, "(5, 4)", 2)]
fn red_in(red_blue: Multiset, #[case] size: usize, #[case] red: &str, #[case] expected: u64) {
    assert_eq!(count(&red_blue, size, &format!("red in {red}")), expected);
}

#[rstest]
#[case(10, "[5]", 0)]
#[case(9, "[5]", 1)]
#[case(1, "[1]", 1)]
#[case(6, "[3]", 4)]
#[case(5, "[1, 2]", 4)]
fn red_not_in(red_blue: Multiset, #[case] size: usize, #[case] red: &str, #[case] expected: u64) {
    assert_eq!(count(&red_blue, size, &format!("red not in {red}")), expected);
}

#[rstest]
#[case(10, 2, 0, 0)]
#[case(10, 2, 1, 1)]
#[case(5, 2, 0, 3)]
#[case(5, 2, 1, 3)]
#[case(5, 3, 0, 2)]
fn red_modulo_eq(
    red_blue: Multiset,
    #[case] size: usize,
    #[case] modulus: usize,
    #[case] remainder: usize,
    #[case] expected: u64,
) {
    let constraints = format!("red % {modulus} == {remainder}");
    assert_eq!(count(&red_blue, size, &constraints), expected);
}

#[rstest]
#[case(5, 2, 1, 3)]
#[case(5, 2, 2, 6)]
#[case(5, 3, 2, 4)]
fn red_modulo_lt(
    red_blue: Multiset,
    #[case] size: usize,
    #[case] modulus: usize,
    #[case] remainder: usize,
    #[case] expected: u64,
) {
    let constraints = format!("red % {modulus} < {remainder}");
    assert_eq!(count(&red_blue, size, &constraints), expected);
}

#[rstest]
#[case(10, 5, 5, 1)]
#[case(9, 4, 5, 1)]
#[case(9, 5, 4, 1)]
#[case(9, 5, 5, 0)]
#[case(2, 1, 1, 1)]
#[case(2, 0, 2, 1)]
#[case(2, 2, 0, 1)]
#[case(5, 1, 1, 0)]
fn red_eq_blue_eq(
    red_blue: Multiset,
    #[case] size: usize,
    #[case] red: usize,
    #[case] blue: usize,
    #[case] expected: u64,
) {
    let constraints = format!("red == {red} and blue == {blue}");
    assert_eq!(count(&red_blue, size, &constraints), expected);
}

#[rstest]
#[case(10, 5, 5, 0, 1)]
#[case(10, 5, 5, 1, 0)]
#[case(11, 5, 5, 1, 1)]
#[case(10, 4, 5, 1, 1)]
#[case(9, 4, 5, 0, 1)]
#[case(2, 0, 2, 0, 1)]
#[case(2, 2, 0, 0, 1)]
fn red_eq_blue_eq_plus_yellow_eq(
    red_blue: Multiset,
    #[case] size: usize,
    #[case] red: usize,
    #[case] blue: usize,
    #[case] yellow: usize,
    #[case] expected: u64,
) {
    let constraints = format!("red == {red} and blue == {blue} and yellow == {yellow}");
    assert_eq!(count(&red_blue, size, &constraints), expected);
}

#[rstest]
fn even_red_at_least_two_blue(red_blue: Multiset) {
    // red in {0, 2, 4}, blue in 2..=5, summing to 6
    assert_eq!(count(&red_blue, 6, "red % 2 == 0 and blue >= 2"), 2);
    assert_eq!(count(&red_blue, 6, "blue >= 2 and red % 2 == 0"), 2);
}

#[rstest]
#[case(10, 1)]
#[case(11, 0)]
#[case(50, 0)]
fn unconstrained_boundaries(red_blue: Multiset, #[case] size: usize, #[case] expected: u64) {
    assert_eq!(red_blue.count_collections(Some(size), None), Ok(expected));
}

#[rstest]
#[case(9, "(red == 4) and blue == 5", 1)]
#[case(9, "(red == 4) and (blue == 4)", 0)]
#[case(6, "(red % 2 == 0) and (2 <= blue)", 2)]
fn parenthesised_constraints(
    red_blue: Multiset,
    #[case] size: usize,
    #[case] constraints: &str,
    #[case] expected: u64,
) {
    assert_eq!(count(&red_blue, size, constraints), expected);
}

#[rstest]
fn size_beyond_any_allocation(red_blue: Multiset) {
    assert_eq!(red_blue.count_collections(Some(usize::MAX), Some("blue == 1")), Ok(0));

    let red = Multiset::from_counts([("red", 5)]).unwrap();
    assert_eq!(
        red.count_collections(Some(usize::MAX), Some("blue == 1")),
        Err(CountError::SizeTooLarge(usize::MAX))
    );
}

#[test]
fn overflow_is_reported() {
    let singles = || (0..70).map(|i| (format!("item{i}"), 1));
    assert_eq!(count_collections(singles(), 1, ""), Ok(70));
    assert_eq!(count_collections(singles(), 35, ""), Err(CountError::Overflow(35)));
}

#[rstest]
#[case("red or blue == 1", UnsupportedFeature::Disjunction)]
#[case("red == 1 or blue == 1", UnsupportedFeature::Disjunction)]
#[case("1 < red <= 4", UnsupportedFeature::OperatorChaining)]
fn unsupported(red_blue: Multiset, #[case] constraints: &str, #[case] feature: UnsupportedFeature) {
    assert_eq!(
        red_blue.count_collections(None, Some(constraints)),
        Err(CountError::Unsupported(feature))
    );
}

#[rstest]
#[case("red == 1.5")]
#[case("red == blue")]
#[case("red + 1 == 2")]
#[case("red in 5")]
#[case("not red == 1")]
#[case("red == 1 and")]
fn not_understood(red_blue: Multiset, #[case] constraints: &str) {
    assert!(matches!(
        red_blue.count_collections(None, Some(constraints)),
        Err(CountError::Constraint(_))
    ));
}
