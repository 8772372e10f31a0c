pub mod dispatcher;
pub mod protocol;

pub use dispatcher::{DispatchError, Dispatcher};
pub use protocol::{
    RequestHeader, ResponseHeader, Status, CONTROL_RUN_BENCHMARK, MAX_INPUT_LEN,
    MAX_OUTPUT_CAPACITY, REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN,
};
