#![no_main]
use libfuzzer_sys::fuzz_target;
use torque_core::{NetworkManager, Node};

fuzz_target!(|data: &[u8]| {
    // Must not panic. A snapshot that decodes must also verify.
    if let Ok(manager) = NetworkManager::<Node>::deserialize(data) {
        assert!(manager.verify().is_ok());
    }
});
