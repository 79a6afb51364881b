pub mod assertions;
pub mod builder;
pub mod logs;
pub mod serial;

pub use assertions::{assert_slot_restored, RouteAssertions};
pub use builder::MockActivation;
pub use logs::{capture_logs, CapturedLogs};
pub use serial::{serial, serial_async, AsyncSerialGuard, SerialGuard};
