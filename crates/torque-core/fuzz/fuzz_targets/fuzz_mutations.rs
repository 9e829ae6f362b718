#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use torque_core::test_utils::pos;
use torque_core::{BlockPos, DirectionSet, NetworkManager, Node};

/// A structured mutation operation for fuzzing. Coordinates are folded
/// into a small box so nodes actually meet.
#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Add { at: (u8, u8, u8), faces: u8 },
    Update { at: (u8, u8, u8), faces: u8 },
    Remove { at: (u8, u8, u8) },
    Begin,
    Rollback,
    Commit,
}

/// Top-level fuzz input: a sequence of operations.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

fn fold((x, y, z): (u8, u8, u8)) -> BlockPos {
    pos((x % 6) as i32, (y % 3) as i32, (z % 6) as i32)
}

fuzz_target!(|input: FuzzInput| {
    let mut manager: NetworkManager<Node> = NetworkManager::new();

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(200);

    for op in &input.ops[..max_ops] {
        match *op {
            FuzzOp::Add { at, faces } => {
                manager.add(Node::new(fold(at), DirectionSet::from_bits(faces)));
            }
            FuzzOp::Update { at, faces } => {
                manager.update(Node::new(fold(at), DirectionSet::from_bits(faces)));
            }
            FuzzOp::Remove { at } => {
                manager.remove(fold(at));
            }
            FuzzOp::Begin => {
                if !manager.in_transaction() {
                    manager.begin();
                }
            }
            FuzzOp::Rollback => manager.rollback(),
            FuzzOp::Commit => manager.commit(),
        }
        assert!(manager.verify().is_ok());
    }
});
