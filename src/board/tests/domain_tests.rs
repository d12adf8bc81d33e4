//! Domain-focused tests for fractional ordering, keys and lane values.

use crate::board::domain::{
    BoardDomainError, LaneColor, LaneKey, LocalId, SortOrder, TaskKey, TaskPriority,
    normalize_description,
    ordering::{
        append_after, compare_positions, gap_exhausted, insert_between, place_before, renumbered,
    },
    project_acronym, seed_lanes,
};
use crate::tenancy::domain::ProjectId;
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::rstest;
use std::cmp::Ordering;

fn order(value: f64) -> SortOrder {
    SortOrder::new(value).expect("finite order")
}

#[rstest]
#[case(Some(5000.0), Some(6000.0), 5500.0)]
#[case(None, Some(1000.0), 0.0)]
#[case(Some(3000.0), None, 4000.0)]
#[case(None, None, 1000.0)]
fn insert_between_picks_midpoint_or_step(
    #[case] prev: Option<f64>,
    #[case] next: Option<f64>,
    #[case] expected: f64,
) {
    let placed = insert_between(prev.map(order), next.map(order));
    assert_eq!(placed, order(expected));
}

#[rstest]
fn append_after_steps_past_the_maximum() {
    assert_eq!(append_after(None), order(1000.0));
    assert_eq!(append_after(Some(order(2500.0))), order(3500.0));
}

#[rstest]
fn sort_order_rejects_non_finite_values() {
    assert_eq!(SortOrder::new(f64::NAN), Err(BoardDomainError::NonFiniteOrder));
    assert_eq!(
        SortOrder::new(f64::INFINITY),
        Err(BoardDomainError::NonFiniteOrder)
    );
}

#[rstest]
fn repeated_midpoints_eventually_exhaust_the_gap() {
    let prev = order(1000.0);
    let mut next = order(2000.0);
    let mut inserts = 0_u32;
    while !gap_exhausted(Some(prev), Some(next)) {
        next = insert_between(Some(prev), Some(next));
        inserts += 1;
        assert!(inserts < 200, "gap never exhausted");
    }
    assert!(inserts > 10);
}

#[rstest]
fn place_before_uses_midpoint_when_gap_allows() {
    let siblings = vec![('a', order(1000.0)), ('b', order(2000.0))];

    let placement = place_before(&siblings, Some(&'b')).expect("target is a sibling");

    assert_eq!(placement.order, order(1500.0));
    assert_eq!(placement.renumbered, None);
}

#[rstest]
fn place_before_renumbers_exhausted_bucket() {
    let siblings = vec![
        ('a', order(1.0)),
        ('b', order(1.000_000_1)),
        ('c', order(7.0)),
    ];

    let placement = place_before(&siblings, Some(&'b')).expect("target is a sibling");

    assert_eq!(
        placement.renumbered,
        Some(vec![
            ('a', order(1000.0)),
            ('b', order(2000.0)),
            ('c', order(3000.0)),
        ])
    );
    assert_eq!(placement.order, order(1500.0));
}

#[rstest]
fn place_before_appends_without_target_and_rejects_unknown_target() {
    let siblings = vec![('a', order(1000.0)), ('b', order(2000.0))];

    let appended = place_before(&siblings, None).expect("append always succeeds");

    assert_eq!(appended.order, order(3000.0));
    assert_eq!(place_before(&siblings, Some(&'z')), None);
}

#[rstest]
fn renumbered_produces_step_multiples() {
    assert_eq!(
        renumbered(3),
        vec![order(1000.0), order(2000.0), order(3000.0)]
    );
    assert!(renumbered(0).is_empty());
}

#[rstest]
fn equal_positions_show_most_recent_first() {
    let older = Utc::now();
    let newer = older + Duration::seconds(5);

    assert_eq!(
        compare_positions((order(1000.0), newer), (order(1000.0), older)),
        Ordering::Less
    );
    assert_eq!(
        compare_positions((order(500.0), older), (order(1000.0), newer)),
        Ordering::Less
    );
}

#[rstest]
#[case("Apollo Booster Campaign", "ABC")]
#[case("The Lord of the Rings", "LR")]
#[case("website", "W")]
#[case("Mission Control Center East", "MCC")]
#[case("!!!", "TSK")]
fn project_acronym_uses_significant_initials(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(project_acronym(name), expected);
}

#[rstest]
#[case(7, "ABC-07")]
#[case(123, "ABC-123")]
fn task_key_pads_local_id(#[case] local_id: u64, #[case] expected: &str) {
    let key = TaskKey::new(
        "Apollo Booster Campaign",
        LocalId::new(local_id).expect("positive local id"),
    );
    assert_eq!(key.to_string(), expected);
}

#[rstest]
fn local_id_must_be_positive() {
    assert_eq!(LocalId::new(0), Err(BoardDomainError::InvalidLocalId(0)));
}

#[rstest]
fn local_id_must_fit_a_bigint_column() {
    let largest = i64::MAX.unsigned_abs();
    assert_eq!(LocalId::new(largest).map(LocalId::value), Ok(largest));
    assert_eq!(
        LocalId::new(largest + 1),
        Err(BoardDomainError::InvalidLocalId(largest + 1))
    );
}

#[rstest]
fn lane_key_derives_from_name_and_validates_explicit_keys() {
    let derived = LaneKey::derive("My New Lane").expect("derivable name");
    assert_eq!(derived.as_str(), "my-new-lane");
    assert_eq!(
        LaneKey::new("In Review"),
        Err(BoardDomainError::InvalidLaneKey("In Review".to_owned()))
    );
    assert!(LaneKey::derive("???").is_err());
}

#[rstest]
#[case("#ABC", "#abc")]
#[case(" #1e293b ", "#1e293b")]
fn lane_color_normalises_hex(#[case] raw: &str, #[case] expected: &str) {
    let color = LaneColor::new(raw).expect("valid color");
    assert_eq!(color.as_str(), expected);
}

#[rstest]
#[case("blue")]
#[case("#12345")]
#[case("#ggg")]
fn lane_color_rejects_non_hex(#[case] raw: &str) {
    assert!(LaneColor::new(raw).is_err());
}

#[rstest]
fn lane_color_defaults_to_slate() {
    assert_eq!(LaneColor::default().as_str(), "#94a3b8");
}

#[rstest]
#[case("HIGH", TaskPriority::High)]
#[case("", TaskPriority::None)]
#[case("urgent", TaskPriority::Urgent)]
fn task_priority_parses(#[case] raw: &str, #[case] expected: TaskPriority) {
    assert_eq!(TaskPriority::try_from(raw), Ok(expected));
}

#[rstest]
fn blank_description_normalises_to_none() {
    assert_eq!(normalize_description(Some("   ".to_owned())), Ok(None));
    assert_eq!(
        normalize_description(Some("details".to_owned())),
        Ok(Some("details".to_owned()))
    );
}

#[rstest]
fn seed_lanes_creates_todo_doing_done() {
    let lanes = seed_lanes(ProjectId::new(), &DefaultClock);

    let summary: Vec<_> = lanes
        .iter()
        .map(|lane| (lane.key().as_str(), lane.order(), lane.is_default()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("todo", order(1000.0), true),
            ("doing", order(2000.0), false),
            ("done", order(3000.0), false),
        ]
    );
}
