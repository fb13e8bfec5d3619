//! Browser-side owner of the grid renderer.
//!
//! `GridSession` couples a [`Renderer`] to the canvas it paints on. Every
//! input (feed batches, map zoom, pointer motion, open/close) goes through
//! [`GridSession::dispatch`], which folds the event into the renderer and
//! replays the resulting frame, if any. Pointer listeners are attached the
//! first time the renderer asks for them and live as long as the session.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use paddock_shared::feed::RecordSink;
use paddock_shared::models::EntityRecord;
use paddock_shared::render::{Event, Renderer, Surface};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent};

use crate::canvas::{self, Painter};
use crate::coords;

pub const CANVAS_ID: &str = "paddock-grid-canvas";

pub const SURFACE: Surface = Surface {
    width: 1100.0,
    height: 640.0,
};

struct Attached {
    canvas: HtmlCanvasElement,
    painter: Painter,
}

pub struct GridSession {
    surface: Surface,
    renderer: RefCell<Renderer>,
    attached: RefCell<Option<Attached>>,
    /// A frame asked for listeners before the canvas was attached.
    pending_bind: Cell<bool>,
    listeners: RefCell<Vec<(&'static str, Closure<dyn Fn(MouseEvent)>)>>,
}

impl GridSession {
    pub fn new(surface: Surface) -> Rc<Self> {
        Rc::new(GridSession {
            surface,
            renderer: RefCell::new(Renderer::new(surface)),
            attached: RefCell::new(None),
            pending_bind: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Look up the canvas and its 2D context. A missing canvas is a page
    /// wiring error and is returned to the caller.
    pub fn attach(self: &Rc<Self>, canvas_id: &str) -> Result<(), String> {
        let (canvas, ctx) = canvas::lookup(canvas_id)?;
        canvas.set_width(self.surface.width as u32);
        canvas.set_height(self.surface.height as u32);
        *self.attached.borrow_mut() = Some(Attached {
            canvas,
            painter: Painter::new(ctx),
        });
        tracing::info!(canvas = canvas_id, "grid surface attached");

        if self.pending_bind.replace(false) {
            self.bind_pointer();
        }
        Ok(())
    }

    pub fn dispatch(self: &Rc<Self>, event: Event) {
        let frame = self.renderer.borrow_mut().handle(event);
        let Some(frame) = frame else {
            return;
        };

        match self.attached.borrow().as_ref() {
            Some(attached) => attached.painter.paint(&frame.commands),
            None => tracing::debug!("frame dropped: no surface attached"),
        }

        if frame.bind_pointer {
            if self.attached.borrow().is_some() {
                self.bind_pointer();
            } else {
                self.pending_bind.set(true);
            }
        }
    }

    /// Record sink feeding this session, for use with a `FeedAdapter`.
    pub fn sink(self: &Rc<Self>) -> SessionSink {
        SessionSink(Rc::downgrade(self))
    }

    fn bind_pointer(self: &Rc<Self>) {
        let Some(canvas) = self.attached.borrow().as_ref().map(|a| a.canvas.clone()) else {
            return;
        };

        let weak = Rc::downgrade(self);
        let on_move = Closure::<dyn Fn(MouseEvent)>::new(move |evt: MouseEvent| {
            let Some(session) = weak.upgrade() else { return };
            let point = {
                let attached = session.attached.borrow();
                attached
                    .as_ref()
                    .and_then(|a| coords::pointer_on_surface(&evt, &a.canvas, session.surface))
            };
            if let Some((x, y)) = point {
                session.dispatch(Event::PointerMoved { x, y });
            }
        });

        let weak = Rc::downgrade(self);
        let on_leave = Closure::<dyn Fn(MouseEvent)>::new(move |_evt: MouseEvent| {
            if let Some(session) = weak.upgrade() {
                session.dispatch(Event::PointerLeft);
            }
        });

        let mut listeners = self.listeners.borrow_mut();
        for (name, callback) in [("mousemove", on_move), ("mouseleave", on_leave)] {
            if let Err(e) =
                canvas.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            {
                tracing::error!(event = name, error = ?e, "failed to bind pointer listener");
            }
            listeners.push((name, callback));
        }
        tracing::info!("pointer listeners bound");
    }
}

impl Drop for GridSession {
    fn drop(&mut self) {
        let Some(attached) = self.attached.get_mut().take() else {
            return;
        };
        for (name, callback) in self.listeners.get_mut().drain(..) {
            let _ = attached
                .canvas
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
    }
}

/// Forwards normalized batches into a session that may already be gone.
pub struct SessionSink(Weak<GridSession>);

impl RecordSink for SessionSink {
    fn accept(&mut self, records: Vec<EntityRecord>) {
        if let Some(session) = self.0.upgrade() {
            session.dispatch(Event::FeedBatch(records));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_shared::models::Status;

    #[test]
    fn test_sink_feeds_renderer() {
        let session = GridSession::new(SURFACE);
        let mut sink = session.sink();
        sink.accept(vec![EntityRecord::new("A", 1, 1, Status::Contained)]);
        assert_eq!(session.renderer.borrow().state().entities().len(), 1);
    }

    #[test]
    fn test_sink_outliving_session_is_inert() {
        let session = GridSession::new(SURFACE);
        let mut sink = session.sink();
        drop(session);
        sink.accept(vec![EntityRecord::new("A", 1, 1, Status::Contained)]);
    }

    #[test]
    fn test_bind_request_before_attach_is_deferred() {
        let session = GridSession::new(SURFACE);
        session.dispatch(Event::Opened);
        assert!(session.pending_bind.get());
        assert!(session.listeners.borrow().is_empty());

        // Later frames never ask again.
        session.dispatch(Event::PointerLeft);
        assert!(session.renderer.borrow().state().listeners_bound());
    }

    #[test]
    fn test_hidden_session_requests_nothing() {
        let session = GridSession::new(SURFACE);
        session.dispatch(Event::FeedBatch(vec![EntityRecord::new("A", 1, 1, Status::Contained)]));
        session.dispatch(Event::ZoomChanged(18.0));
        assert!(!session.pending_bind.get());
    }
}
