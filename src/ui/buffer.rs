use fltk::text::TextBuffer;

/// Copy the editor's text out of FLTK.
///
/// `TextBuffer::text()` copies FLTK's `malloc()`'d string into a `String`
/// and never frees the original, leaking a full document on every save.
/// This calls the C API directly and releases the allocation itself.
pub fn buffer_text_no_leak(buf: &TextBuffer) -> String {
    unsafe extern "C" {
        fn Fl_Text_Buffer_text(buf: *mut std::ffi::c_void) -> *mut std::ffi::c_char;
        fn free(ptr: *mut std::ffi::c_void);
    }

    // SAFETY: `buf.as_ptr()` is the live Fl_Text_Buffer owned by `buf`.
    // The returned pointer is either null or a NUL-terminated string that
    // FLTK allocated with malloc, so it is read once and handed to free.
    unsafe {
        let ptr = Fl_Text_Buffer_text(buf.as_ptr() as *mut std::ffi::c_void);
        if ptr.is_null() {
            return String::new();
        }
        let text = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
        free(ptr as *mut std::ffi::c_void);
        text
    }
}
