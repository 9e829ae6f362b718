//! A small gear train: a crank, a shaft, a gearbox turning the corner and an
//! inverter, followed by a rejected second crank. Prints the dump after each
//! step.
//!
//! Run with: `cargo run -p torque-rotation --example gear_train`

use torque_core::{Axis, BlockPos, Direction, DirectionSet};
use torque_rotation::speed::f64_to_fixed64;
use torque_rotation::{Rotation, RotationNetworkManager, RotationNode};

fn main() {
    let mut m = RotationNetworkManager::new();
    let crank = Rotation::new(Direction::South, f64_to_fixed64(1.0));

    m.add_source(
        BlockPos::new(0, 0, 0),
        DirectionSet::empty().with(Direction::South),
        crank,
    );
    m.add(RotationNode::axle(BlockPos::new(0, 0, 1), Axis::Z));
    m.add(RotationNode::gearbox(
        BlockPos::new(0, 0, 2),
        DirectionSet::empty()
            .with(Direction::North)
            .with(Direction::East),
    ));
    m.add(RotationNode::inverter(
        BlockPos::new(1, 0, 2),
        DirectionSet::axis(Axis::X),
    ));
    m.add(RotationNode::axle(BlockPos::new(2, 0, 2), Axis::X));
    println!("--- gear train ---\n{}", m.dump());

    let second = RotationNode::source(
        BlockPos::new(3, 0, 2),
        DirectionSet::empty().with(Direction::West),
        Rotation::new(Direction::East, f64_to_fixed64(2.0)),
    );
    match m.try_add(second) {
        Ok(()) => println!("second crank accepted"),
        Err(err) => println!("second crank rejected: {err} ({:?})", err.class()),
    }
    println!("--- unchanged ---\n{}", m.dump());
}
