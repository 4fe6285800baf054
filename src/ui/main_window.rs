use std::cell::Cell;
use std::rc::Rc;

use fltk::{
    app::{self, Sender},
    enums::Event,
    group::{Flex, FlexType},
    menu::MenuBar,
    prelude::*,
    text::{TextBuffer, TextEditor, WrapMode},
    window::Window,
};

use super::buffer::buffer_text_no_leak;
use super::menu::build_menu;
use crate::app::controllers::host::{HostWindow, UiEvent, WindowBackend, WindowOptions};
use crate::app::domain::Message;
use crate::app::infrastructure::error::Result;
use crate::app::infrastructure::platform::set_native_document_edited;

const MENU_HEIGHT: i32 = 30;

/// Builds FLTK windows whose callbacks post to the app channel.
pub struct FltkBackend {
    sender: Sender<Message>,
}

impl FltkBackend {
    pub fn new(sender: Sender<Message>) -> Self {
        Self { sender }
    }
}

impl WindowBackend for FltkBackend {
    type Window = MainWindow;

    fn create_window(&mut self, options: &WindowOptions) -> Result<MainWindow> {
        Ok(MainWindow::build(options, self.sender.clone()))
    }
}

pub struct MainWindow {
    wind: Window,
    editor: TextEditor,
    buffer: TextBuffer,
    sender: Sender<Message>,
    /// Raised while the host replaces the buffer, so the load itself is
    /// not reported as an edit.
    loading: Rc<Cell<bool>>,
    destroyed: bool,
}

impl MainWindow {
    fn build(options: &WindowOptions, sender: Sender<Message>) -> Self {
        let mut wind = Window::default()
            .with_size(options.width, options.height)
            .center_screen()
            .with_label(&options.title);
        wind.set_xclass("CherryMuse");
        wind.size_range(options.min_width, options.min_height, 0, 0);

        let mut flex = Flex::new(0, 0, options.width, options.height, None);
        flex.set_type(FlexType::Column);

        let mut menu = MenuBar::new(0, 0, 0, MENU_HEIGHT, "");
        flex.fixed(&menu, MENU_HEIGHT);
        build_menu(&mut menu, &sender);

        let mut buffer = TextBuffer::default();
        let mut editor = TextEditor::new(0, 0, 0, 0, "");
        editor.set_buffer(buffer.clone());
        editor.wrap_mode(WrapMode::AtBounds, 0);

        flex.end();
        wind.resizable(&flex);
        wind.end();

        let loading = Rc::new(Cell::new(false));
        let suppressed = loading.clone();
        let edit_sender = sender.clone();
        buffer.add_modify_callback(move |_pos, inserted, deleted, _restyled, _deleted_text| {
            if (inserted > 0 || deleted > 0) && !suppressed.get() {
                edit_sender.send(Message::DocumentEdited);
            }
        });

        // The window-manager close button; Escape also fires the window
        // callback and is ignored here.
        let close_sender = sender.clone();
        wind.set_callback(move |_| {
            if app::event() == Event::Close {
                close_sender.send(Message::WindowCloseRequested);
            }
        });

        wind.show();
        sender.send(Message::WindowLoaded);

        Self {
            wind,
            editor,
            buffer,
            sender,
            loading,
            destroyed: false,
        }
    }
}

impl HostWindow for MainWindow {
    fn is_destroyed(&self) -> bool {
        self.destroyed || self.wind.was_deleted()
    }

    fn set_title(&mut self, title: &str) {
        self.wind.set_label(title);
    }

    fn set_document_edited(&mut self, edited: bool) {
        set_native_document_edited(&self.wind, edited);
    }

    fn focus(&mut self) {
        // show() also de-iconifies and raises an already shown window.
        self.wind.show();
        let _ = self.editor.take_focus();
    }

    fn destroy(&mut self) {
        self.wind.hide();
        Window::delete(self.wind.clone());
        self.destroyed = true;
    }

    fn notify(&mut self, event: UiEvent) {
        match event {
            UiEvent::FileOpened(file) => {
                self.loading.set(true);
                self.buffer.set_text(&file.content);
                self.loading.set(false);
                self.editor.set_insert_position(0);
                self.editor.show_insert_position();
            }
            UiEvent::SaveRequested => self.sender.send(Message::FileSave),
            UiEvent::InsertText(text) => {
                let pos = self.editor.insert_position();
                self.buffer.insert(pos, &text);
                self.editor.set_insert_position(pos + text.len() as i32);
                self.editor.show_insert_position();
            }
        }
    }

    fn document_text(&self) -> String {
        buffer_text_no_leak(&self.buffer)
    }
}
