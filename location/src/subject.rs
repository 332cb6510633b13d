use std::fmt;
use std::sync::{Arc, Mutex};

use async_channel::{Receiver, Sender, unbounded};

/// A current-value broadcast cell.
///
/// Every subscriber receives the value held at subscription time first, then
/// every later [`set`](Self::set) in order. Values are not compared, so
/// repeated equal values are delivered repeatedly.
pub struct Subject<T> {
    inner: Arc<Mutex<SubjectState<T>>>,
}

struct SubjectState<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
    closed: bool,
}

impl<T: Clone> Subject<T> {
    /// Creates a subject holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SubjectState {
                value,
                subscribers: Vec::new(),
                closed: false,
            })),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner
            .lock()
            .expect("subject mutex poisoned")
            .value
            .clone()
    }

    /// Replaces the current value and delivers it to every live subscriber.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Applies `update` to the current value and publishes the result.
    pub fn update(&self, update: impl FnOnce(&mut T)) {
        let mut state = self.inner.lock().expect("subject mutex poisoned");
        update(&mut state.value);
        let value = state.value.clone();
        // Subscribers whose receiver was dropped are pruned here
        state
            .subscribers
            .retain(|sender| sender.try_send(value.clone()).is_ok());
    }

    /// Subscribes to the subject.
    ///
    /// The returned channel yields the current value immediately. After
    /// [`close`](Self::close) it yields only that value and then ends.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<T> {
        let (sender, receiver) = unbounded();
        let mut state = self.inner.lock().expect("subject mutex poisoned");
        if sender.try_send(state.value.clone()).is_ok() && !state.closed {
            state.subscribers.push(sender);
        }
        receiver
    }

    /// Ends every subscription. Values already sent stay receivable.
    pub fn close(&self) {
        let mut state = self.inner.lock().expect("subject mutex poisoned");
        state.closed = true;
        for sender in state.subscribers.drain(..) {
            sender.close();
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let state = self.inner.lock().expect("subject mutex poisoned");
        state
            .subscribers
            .iter()
            .filter(|sender| !sender.is_closed())
            .count()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Default> Default for Subject<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject").finish_non_exhaustive()
    }
}
