use fltk::window::Window;

/// Whether the platform draws its own "unsaved changes" marker on the
/// window (the dot in the macOS close button).
pub fn supports_native_edited_indicator() -> bool {
    cfg!(target_os = "macos")
}

/// Mirror the dirty flag onto the native window decoration.
///
/// No-op on platforms without a native indicator.
pub fn set_native_document_edited(window: &Window, edited: bool) {
    #[cfg(target_os = "macos")]
    {
        use fltk::prelude::WindowExt;
        use objc2::msg_send;
        use objc2::runtime::AnyObject;

        let handle = window.raw_handle();
        if handle.is_null() {
            return;
        }
        // SAFETY: on macOS FLTK's raw handle is the NSWindow backing this
        // widget, which stays alive while the fltk Window is shown.
        unsafe {
            let ns_window = handle as *mut AnyObject;
            let _: () = msg_send![ns_window, setDocumentEdited: edited];
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        let _ = (window, edited);
    }
}
