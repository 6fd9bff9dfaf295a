pub mod logging;
pub mod request_id;

pub use logging::{init_tracing, LogFormat};
pub use request_id::{
    extract_request_id, inject_request_id, new_request_id, REQUEST_ID_HEADER,
};
