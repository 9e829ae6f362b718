//! Property-based tests for rotation transforms and propagation.

use proptest::prelude::*;
use proptest::sample::Index;
use torque_core::test_utils::pos;
use torque_core::{Axis, BlockPos, Direction, DirectionSet};
use torque_rotation::speed::f64_to_fixed64;
use torque_rotation::{Rotation, RotationKind, RotationNetworkManager, RotationNode};

const AT: BlockPos = BlockPos::ORIGIN;

fn arb_direction() -> impl Strategy<Value = Direction> {
    proptest::sample::select(Direction::ALL.to_vec())
}

fn arb_passive_kind() -> impl Strategy<Value = RotationKind> {
    prop_oneof![
        Just(RotationKind::Plain),
        proptest::sample::select(Axis::ALL.to_vec()).prop_map(|axis| RotationKind::Axle { axis }),
        Just(RotationKind::gearbox()),
        Just(RotationKind::Inverter),
    ]
}

/// What a node emits on each of its faces when driven through `from`.
fn emissions(
    kind: RotationKind,
    faces: &[Direction],
    incoming: Rotation,
    from: Direction,
) -> Vec<Rotation> {
    faces
        .iter()
        .map(|&to| kind.rotation(AT, incoming, from, to).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// A settled node emits the same rotation on every face whichever of its
    /// faces it is driven through, so no two paths can disagree about it.
    #[test]
    fn emissions_do_not_depend_on_the_driving_face(
        kind in arb_passive_kind(),
        bits in 1..64u8,
        pick in any::<Index>(),
        spin in arb_direction(),
        speed in 1..8u8,
    ) {
        let connections = match kind {
            RotationKind::Axle { axis } => DirectionSet::from_bits(bits & DirectionSet::axis(axis).bits()),
            _ => DirectionSet::from_bits(bits),
        };
        prop_assume!(!connections.is_empty());
        let settled = kind.settle(AT, connections, None);
        prop_assume!(settled.is_ok());
        let kind = settled.unwrap();

        let faces: Vec<Direction> = connections.iter().collect();
        let from = faces[pick.index(faces.len())];
        // A gearbox only accepts spin along the shaft it is driven through.
        let direction = match kind {
            RotationKind::GearBox { .. } if spin.is_positive() => from,
            RotationKind::GearBox { .. } => from.opposite(),
            _ => spin,
        };
        let incoming = Rotation::new(direction, f64_to_fixed64(speed as f64));
        let expected = emissions(kind, &faces, incoming, from);

        for (i, &face) in faces.iter().enumerate() {
            let redriven = emissions(kind, &faces, expected[i], face);
            prop_assert_eq!(&redriven, &expected, "{} driven through {:?}", kind, face);
        }
    }

    /// A loop of plain connectors with inverters spliced into its west side
    /// is accepted exactly when the inverter count is even.
    #[test]
    fn inverter_loop_parity(inverted in proptest::collection::vec(any::<bool>(), 3)) {
        let mut m = RotationNetworkManager::new();
        let spin = Rotation::new(Direction::Up, f64_to_fixed64(1.0));
        prop_assert!(m.add_source(pos(0, 0, 0), [Direction::South, Direction::East].as_slice().into(), spin));
        prop_assert!(m.add(RotationNode::plain(pos(1, 0, 0), [Direction::West, Direction::South].as_slice().into())));
        prop_assert!(m.add(RotationNode::plain(pos(1, 0, 4), [Direction::North, Direction::West].as_slice().into())));
        for (i, &flip) in inverted.iter().enumerate() {
            let z = i as i32 + 1;
            let faces = DirectionSet::axis(Axis::Z);
            let node = if flip {
                RotationNode::inverter(pos(0, 0, z), faces)
            } else {
                RotationNode::plain(pos(0, 0, z), faces)
            };
            prop_assert!(m.add(node));
        }
        for z in 1..=3 {
            prop_assert!(m.add(RotationNode::plain(pos(1, 0, z), DirectionSet::axis(Axis::Z))));
        }
        let before = m.dump();

        let even = inverted.iter().filter(|&&f| f).count() % 2 == 0;
        let closed = m.add(RotationNode::plain(pos(0, 0, 4), [Direction::North, Direction::East].as_slice().into()));
        prop_assert_eq!(closed, even);
        if !closed {
            prop_assert_eq!(m.dump(), before);
        }
        prop_assert!(m.verify().is_ok());
    }
}
