/// Handle to a scheduled timer entry, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Scheduled<E> {
    due_us: i64,
    seq: u64,
    event: E,
}

/// Single-threaded queue of callbacks due at a given time.
///
/// Replaces "wait N seconds then continue" steps: the owner schedules an
/// event, polls the queue once per tick, and reacts to whatever came due.
/// Entries due at the same instant fire in scheduling order. Cancelling is
/// immediate: a cancelled entry never fires.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    entries: Vec<Scheduled<E>>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to fire once `now >= due_us`.
    pub fn schedule(&mut self, due_us: i64, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled { due_us, seq, event });
        TimerHandle(seq)
    }

    /// Cancel an entry. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.seq != handle.0);
        self.entries.len() != before
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry due at or before `now_us`, in
    /// (due time, scheduling order).
    pub fn poll(&mut self, now_us: i64) -> Vec<E> {
        if self.entries.iter().all(|e| e.due_us > now_us) {
            return Vec::new();
        }
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.due_us <= now_us);
        self.entries = pending;
        due.sort_by_key(|e| (e.due_us, e.seq));
        due.into_iter().map(|e| e.event).collect()
    }
}
