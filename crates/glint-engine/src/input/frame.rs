use super::types::Key;

/// Fixed-capacity event queue.
///
/// Once full, further pushes are dropped. The first drop in a frame is logged
/// at warn level; the queue never reports an error to the caller.
#[derive(Debug)]
pub struct EventQueue<T> {
    items: Vec<T>,
    capacity: usize,
    dropped: usize,
    label: &'static str,
}

impl<T> EventQueue<T> {
    pub fn new(label: &'static str, capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
            label,
        }
    }

    /// Appends `item` if there is room. Returns `false` when it was dropped.
    pub fn push(&mut self, item: T) -> bool {
        if self.items.len() >= self.capacity {
            if self.dropped == 0 {
                log::warn!("{} buffer is full", self.label);
            }
            self.dropped += 1;
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped since the last `clear`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.dropped = 0;
    }
}

/// Per-frame input deltas.
///
/// Events accumulate into an incoming `InputFrame` between frames; at
/// `InputState::begin_frame` it becomes the current frame and a fresh incoming
/// frame starts.
#[derive(Debug)]
pub struct InputFrame {
    /// Keys pressed or repeated, in arrival order.
    pub keys: EventQueue<Key>,

    /// Text committed, one entry per character.
    pub text: EventQueue<char>,

    /// Accumulated vertical wheel notches.
    pub scroll: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys.clear();
        self.text.clear();
        self.scroll = 0.0;
    }
}

impl Default for InputFrame {
    fn default() -> Self {
        Self {
            keys: EventQueue::new("key input", Key::COUNT),
            text: EventQueue::new("text", Key::COUNT),
            scroll: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full_then_drop() {
        let mut q = EventQueue::new("test", 2);
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(!q.push(3));
        assert!(!q.push(4));
        assert_eq!(q.as_slice(), &[1, 2]);
        assert_eq!(q.dropped(), 2);
    }

    #[test]
    fn clear_resets_drop_count() {
        let mut q = EventQueue::new("test", 1);
        q.push('a');
        q.push('b');
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.dropped(), 0);
        assert!(q.push('c'));
    }

    #[test]
    fn default_frame_is_sized_to_key_count() {
        let frame = InputFrame::default();
        assert_eq!(frame.keys.capacity(), Key::COUNT);
        assert_eq!(frame.text.capacity(), Key::COUNT);
    }
}
