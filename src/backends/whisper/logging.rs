use std::os::raw::{c_char, c_void};
use std::sync::Once;

/// A no-op log callback used to silence whisper.cpp.
///
/// whisper.cpp logs to stderr by default; our stderr carries the worker's own
/// diagnostics and we keep it readable.
unsafe extern "C" fn whisper_log_callback(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
}

/// Install the no-op callback exactly once per process.
pub(crate) fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}
