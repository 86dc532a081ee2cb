pub mod shared_buffer;

pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{GatedBackend, RecordingBackend, RecordingNotifier, Rig, rig};
#[allow(unused_imports)]
pub use shared_buffer::SharedBuf;
