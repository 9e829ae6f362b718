//! Stress tests for the connectivity engine.
//!
//! These are marked `#[ignore]` for nightly CI runs. Run with:
//!   cargo test --package torque-core -- --ignored

use torque_core::test_utils::*;
use torque_core::{Axis, BlockPos, DirectionSet, Node, NetworkManager};

/// A `side` x `side` sheet in the xz plane, every node linked to all four
/// horizontal neighbors.
fn build_sheet(side: i32) -> NetworkManager<Node> {
    let mut m = NetworkManager::new();
    let flat = DirectionSet::axis(Axis::X)
        .with(torque_core::Direction::North)
        .with(torque_core::Direction::South);
    for x in 0..side {
        for z in 0..side {
            m.add(Node::new(pos(x, 0, z), flat));
        }
    }
    m
}

/// Cut a 128x128 sheet into strips one column at a time, verifying the
/// partition after every cut.
#[test]
#[ignore]
fn cutting_a_large_sheet_into_strips() {
    let side = 128;
    let mut m = build_sheet(side);
    assert_eq!(m.network_count(), 1);

    let mut strips = 1;
    for x in (2..side).step_by(3) {
        for z in 0..side {
            assert!(m.remove(pos(x, 0, z)));
        }
        strips += 1;
        assert_eq!(m.network_count(), strips);
        m.verify().unwrap();
    }
}

/// Add and remove along a long line many times; ids keep climbing and the
/// partition stays exact.
#[test]
#[ignore]
fn churn_on_a_long_line() {
    let mut m = NetworkManager::new();
    add_all(&mut m, plain_line(BlockPos::ORIGIN, torque_core::Direction::East, 5_000));
    for round in 0..200 {
        let x = (round * 37) % 5_000;
        let node = m.take(pos(x, 0, 0)).unwrap();
        assert!(m.add(node));
    }
    assert_eq!(m.network_count(), 1);
    m.verify().unwrap();
}

/// Two managers fed the same sequence produce identical dumps.
#[test]
fn sheet_construction_is_deterministic() {
    let a = build_sheet(24);
    let b = build_sheet(24);
    assert_eq!(a.dump(), b.dump());
    assert_eq!(partition(&a).len(), 1);
}
