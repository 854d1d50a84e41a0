use futures::future::BoxFuture;
use futures::task::{ArcWake, waker};
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Identifies one request; responses for a superseded ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Hands out tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, invalidating all earlier tickets
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        Ticket {
            generation: self.current,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.current
    }
}

struct RepaintWaker(egui::Context);

impl ArcWake for RepaintWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.request_repaint();
    }
}

/// Backend futures in flight, polled once per frame from the UI thread.
///
/// Waking a future requests a repaint, so a resolved request is picked up
/// on the next frame.
pub struct Pending<T> {
    in_flight: Vec<BoxFuture<'static, T>>,
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Self {
            in_flight: Vec::new(),
        }
    }
}

impl<T> Pending<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, future: impl Future<Output = T> + Send + 'static) {
        self.in_flight.push(Box::pin(future));
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Polls every future once and returns the outputs of those that finished
    pub fn poll_ready(&mut self, ctx: &egui::Context) -> Vec<T> {
        if self.in_flight.is_empty() {
            return Vec::new();
        }
        let waker = waker(Arc::new(RepaintWaker(ctx.clone())));
        let mut cx = Context::from_waker(&waker);
        let mut ready = Vec::new();
        self.in_flight.retain_mut(|future| match future.as_mut().poll(&mut cx) {
            Poll::Ready(output) => {
                ready.push(output);
                false
            }
            Poll::Pending => true,
        });
        ready
    }
}
