use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

const POP_TRIES: usize = 5;

/// A thread-safe priority queue of `(index, value)` pairs in ascending
/// order by index, approximately. It is a growable vector, indexed by
/// the priority values, of stacks; it is efficient only if the indexes
/// are small integers. Pairs sharing an index come back in LIFO order.
///
/// Something like the uncertainty principle applies to `pop`: with
/// several threads pushing and popping, any stack may turn empty or
/// non-empty at any instant, so which stack is the first non-empty one
/// depends on who looks and exactly when. No attempt is made to pin
/// that down; the callers tolerate an approximate minimum.
pub struct IndexedPriorityQueue<V> {
    buckets: RwLock<Vec<Bucket<V>>>,
}

struct Bucket<V> {
    // length hint so pop can skip empty stacks without locking them
    len: AtomicUsize,
    stack: Mutex<Vec<V>>,
}

impl<V> Bucket<V> {
    fn new() -> Self {
        Bucket {
            len: AtomicUsize::new(0),
            stack: Mutex::new(Vec::new()),
        }
    }
}

impl<V> IndexedPriorityQueue<V> {
    pub fn new() -> Self {
        IndexedPriorityQueue {
            buckets: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, index: usize, value: V) {
        if self.buckets.read().unwrap().len() <= index {
            let mut buckets = self.buckets.write().unwrap();
            while buckets.len() <= index {
                buckets.push(Bucket::new());
            }
        }
        let buckets = self.buckets.read().unwrap();
        let bucket = &buckets[index];
        let mut stack = bucket.stack.lock().unwrap();
        stack.push(value);
        bucket.len.store(stack.len(), Ordering::Relaxed);
    }

    /// Pops a value with the lowest available index. Returns `None`
    /// once the queue has stayed empty through a few briefly spaced
    /// retries.
    pub fn pop(&self) -> Option<(usize, V)> {
        for _ in 0..POP_TRIES {
            {
                let buckets = self.buckets.read().unwrap();
                for (index, bucket) in buckets.iter().enumerate() {
                    if bucket.len.load(Ordering::Relaxed) == 0 {
                        continue;
                    }
                    let mut stack = bucket.stack.lock().unwrap();
                    if let Some(value) = stack.pop() {
                        bucket.len.store(stack.len(), Ordering::Relaxed);
                        return Some((index, value));
                    }
                }
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        None
    }

    /// Total number of stored values. Approximate if other threads are
    /// making changes; tolerates a poisoned growth lock.
    pub fn len(&self) -> usize {
        self.buckets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|bucket| bucket.len.load(Ordering::Relaxed))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_index() {
        let queue = IndexedPriorityQueue::new();
        queue.push(5, "e");
        queue.push(2, "b1");
        queue.push(9, "x");
        queue.push(2, "b2");

        assert_eq!(queue.len(), 4);
        // lowest index first, LIFO within an index
        assert_eq!(queue.pop(), Some((2, "b2")));
        assert_eq!(queue.pop(), Some((2, "b1")));
        assert_eq!(queue.pop(), Some((5, "e")));
        assert_eq!(queue.pop(), Some((9, "x")));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_concurrent_push_pop() {
        let queue = IndexedPriorityQueue::new();
        for i in 0..1000 {
            queue.push(i % 40, i);
        }
        let popped = Mutex::new(Vec::new());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while let Some((_, v)) = queue.pop() {
                        popped.lock().unwrap().push(v);
                    }
                });
            }
        });
        let mut popped = popped.into_inner().unwrap();
        popped.sort_unstable();
        assert_eq!(popped, (0..1000).collect::<Vec<_>>());
    }
}
