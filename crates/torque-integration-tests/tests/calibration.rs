//! Integration test: calibration scenarios for rotation networks.
//!
//! Small hand-built layouts whose exact outcome (network ids, drives, dump
//! text) is pinned down, exercising the connectivity engine and rotation
//! propagation together through the public API.

use torque_core::test_utils::{dirs, pos, through};
use torque_core::{Axis, Direction, Direction::*, DirectionSet, NetworkId};
use torque_rotation::speed::f64_to_fixed64;
use torque_rotation::{
    Drive, RejectionClass, Rotation, RotationError, RotationNetworkManager, RotationNode,
};

fn spin(direction: Direction, speed: f64) -> Rotation {
    Rotation::new(direction, f64_to_fixed64(speed))
}

/// Source at the origin spinning south with axles at z = 1..=len.
fn axle_line(len: i32) -> RotationNetworkManager {
    let mut m = RotationNetworkManager::new();
    assert!(m.add_source(pos(0, 0, 0), dirs(&[South]), spin(South, 1.0)));
    for z in 1..=len {
        assert!(
            m.add(RotationNode::axle(pos(0, 0, z), Axis::Z)),
            "axle at z={z} should fit"
        );
    }
    m
}

// ---------------------------------------------------------------------------
// Axle runs
// ---------------------------------------------------------------------------

#[test]
fn five_axles_report_the_source_rotation() {
    let m = axle_line(5);
    for z in 1..=5 {
        let drive = m.drive_at(pos(0, 0, z)).unwrap();
        assert_eq!(drive.to_string(), "north→south @ 1");
    }
    assert_eq!(
        m.dump(),
        "network 0 (6 nodes)\n\
         \x20 {south} (0, 0, 0) net 0 source south @ 1\n\
         \x20 {north,south} (0, 0, 1) net 0 axle(z) north→south @ 1\n\
         \x20 {north,south} (0, 0, 2) net 0 axle(z) north→south @ 1\n\
         \x20 {north,south} (0, 0, 3) net 0 axle(z) north→south @ 1\n\
         \x20 {north,south} (0, 0, 4) net 0 axle(z) north→south @ 1\n\
         \x20 {north,south} (0, 0, 5) net 0 axle(z) north→south @ 1\n"
    );
    m.verify().unwrap();
}

#[test]
fn sixth_axle_is_rejected_and_leaves_the_line_intact() {
    let mut m = axle_line(5);
    let before = m.dump();

    let err = m
        .try_add(RotationNode::axle(pos(0, 0, 6), Axis::Z))
        .unwrap_err();
    assert!(matches!(err, RotationError::AxleRunTooLong { len: 6, max: 5, .. }));
    assert_eq!(err.class(), RejectionClass::Constraint);

    assert_eq!(m.dump(), before);
    assert!(m.node_at(pos(0, 0, 6)).is_none());
    m.verify().unwrap();
}

#[test]
fn removing_an_interior_axle_frees_exactly_one_slot() {
    let mut m = axle_line(5);
    assert!(m.remove(pos(0, 0, 3)));

    // The far fragment lost its source.
    assert!(m.is_powered(pos(0, 0, 2)));
    assert!(!m.is_powered(pos(0, 0, 4)));
    assert!(!m.is_powered(pos(0, 0, 5)));

    // One more axle fits on the line...
    assert!(m.add(RotationNode::axle(pos(0, 0, 6), Axis::Z)));
    // ...and refilling the gap would make a run of six.
    assert!(!m.add(RotationNode::axle(pos(0, 0, 3), Axis::Z)));
    assert!(m.node_at(pos(0, 0, 3)).is_none());
    m.verify().unwrap();
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[test]
fn bridging_two_sources_through_an_update_fails() {
    let mut m = RotationNetworkManager::new();
    assert!(m.add_source(pos(0, 0, 0), dirs(&[East]), spin(East, 1.0)));
    assert!(m.add_source(pos(2, 0, 0), dirs(&[West]), spin(West, 1.0)));
    assert!(m.add(RotationNode::plain(pos(1, 0, 0), dirs(&[West]))));

    let before = m.dump();
    let ids_before: Vec<Option<NetworkId>> = (0..3).map(|x| m.network_of(pos(x, 0, 0))).collect();

    let err = m
        .try_update(RotationNode::plain(pos(1, 0, 0), dirs(&[West, East])))
        .unwrap_err();
    assert!(matches!(err, RotationError::MultipleSources(_)));
    assert_eq!(err.class(), RejectionClass::Consistency);

    assert_eq!(m.dump(), before);
    let ids_after: Vec<Option<NetworkId>> = (0..3).map(|x| m.network_of(pos(x, 0, 0))).collect();
    assert_eq!(ids_after, ids_before);
    assert_ne!(m.network_of(pos(1, 0, 0)), m.network_of(pos(2, 0, 0)));
    assert_eq!(
        m.node_at(pos(1, 0, 0)).map(|n| n.base.connections),
        Some(dirs(&[West]))
    );
}

#[test]
fn joining_independently_sourced_networks_directly_fails() {
    let mut m = RotationNetworkManager::new();
    assert!(m.add_source(pos(0, 0, 0), dirs(&[East]), spin(East, 1.0)));
    assert!(m.add(RotationNode::axle(pos(1, 0, 0), Axis::X)));
    assert!(m.add_source(pos(2, 0, 0), DirectionSet::empty(), spin(Up, 2.0)));
    assert!(m.add(RotationNode::plain(pos(2, 1, 0), dirs(&[Down]))));
    // The second source starts with no open faces.
    assert!(!m.is_powered(pos(2, 1, 0)));
    assert!(m.update(RotationNode::source(
        pos(2, 0, 0),
        dirs(&[Up]),
        spin(Up, 2.0)
    )));
    assert_eq!(m.rotation_at(pos(2, 1, 0)), Some(spin(Up, 2.0)));

    let before = m.dump();
    let west_net = m.network_of(pos(0, 0, 0));
    let east_net = m.network_of(pos(2, 0, 0));

    assert!(!m.update(RotationNode::source(
        pos(2, 0, 0),
        dirs(&[Up, West]),
        spin(Up, 2.0)
    )));

    assert_eq!(m.dump(), before);
    assert_eq!(m.network_of(pos(0, 0, 0)), west_net);
    assert_eq!(m.network_of(pos(2, 0, 0)), east_net);
    assert_eq!(m.rotation_at(pos(1, 0, 0)), Some(spin(East, 1.0)));
    assert_eq!(m.rotation_at(pos(2, 1, 0)), Some(spin(Up, 2.0)));
    m.verify().unwrap();
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

#[test]
fn merge_identity_depends_on_insertion_order() {
    let mut forward = RotationNetworkManager::new();
    forward.add(RotationNode::plain(pos(0, 0, 0), dirs(&[East])));
    forward.add(RotationNode::plain(pos(2, 0, 0), dirs(&[West])));
    forward.add(RotationNode::plain(pos(1, 0, 0), through(Axis::X)));
    assert_eq!(forward.network_of(pos(1, 0, 0)), Some(NetworkId(0)));

    let mut reversed = RotationNetworkManager::new();
    reversed.add(RotationNode::plain(pos(2, 0, 0), dirs(&[West])));
    reversed.add(RotationNode::plain(pos(0, 0, 0), dirs(&[East])));
    reversed.add(RotationNode::plain(pos(1, 0, 0), through(Axis::X)));
    assert_eq!(reversed.network_of(pos(1, 0, 0)), Some(NetworkId(1)));
    assert_eq!(reversed.network_count(), 1);
}

#[test]
fn removing_a_powered_hub_splits_and_unpowers_fragments() {
    let mut m = RotationNetworkManager::new();
    assert!(m.add(RotationNode::plain(pos(0, 0, 0), DirectionSet::all())));
    assert!(m.add_source(pos(0, 1, 0), dirs(&[Down]), spin(Up, 1.0)));
    assert!(m.add(RotationNode::plain(pos(1, 0, 0), dirs(&[West]))));
    assert!(m.add(RotationNode::plain(pos(-1, 0, 0), dirs(&[East]))));
    assert!(m.add(RotationNode::plain(pos(0, 0, 1), dirs(&[North]))));
    assert_eq!(m.network_count(), 1);
    assert!(m.is_powered(pos(1, 0, 0)));

    let hub = m.try_remove(pos(0, 0, 0)).unwrap();
    assert_eq!(hub.base.connections, DirectionSet::all());
    assert_eq!(m.network_count(), 4);
    assert_eq!(m.drive_at(pos(0, 1, 0)), Some(Drive::source(spin(Up, 1.0))));
    for p in [pos(1, 0, 0), pos(-1, 0, 0), pos(0, 0, 1)] {
        assert!(!m.is_powered(p), "{p} should be unpowered");
    }
    m.verify().unwrap();
}

#[test]
fn one_sided_connection_does_not_carry_rotation() {
    let mut m = RotationNetworkManager::new();
    assert!(m.add_source(pos(0, 0, 0), dirs(&[East]), spin(East, 1.0)));
    assert!(m.add(RotationNode::plain(pos(1, 0, 0), dirs(&[North]))));
    assert_ne!(m.network_of(pos(0, 0, 0)), m.network_of(pos(1, 0, 0)));
    assert!(!m.is_powered(pos(1, 0, 0)));
}

#[test]
fn packed_positions_are_stable_keys() {
    let p = pos(-1234, 17, 99_999);
    assert_eq!(torque_core::BlockPos::unpack(p.pack()), p);
}
