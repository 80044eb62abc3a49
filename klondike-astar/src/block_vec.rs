use std::mem::MaybeUninit;
use std::ptr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

const BLOCK_SIZE: usize = 16 * 1024;

/// An append-only vector stored in fixed-size blocks.
///
/// Blocks never move once allocated, so any index below `len()` stays
/// readable without a lock while other threads append. Appends are
/// serialized by an internal mutex; an element is fully written before
/// the length that publishes it is stored (release), and `get` loads
/// the length and block pointer with acquire ordering, which is what
/// makes the unsynchronized reads sound.
///
/// The capacity passed at construction is a hard ceiling; callers cap
/// their usage below it.
pub struct BlockVec<T> {
    blocks: Box<[AtomicPtr<T>]>,
    len: AtomicUsize,
    write: Mutex<()>,
}

unsafe impl<T: Send> Send for BlockVec<T> {}
unsafe impl<T: Send + Sync> Sync for BlockVec<T> {}

impl<T> BlockVec<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let n_blocks = capacity.div_ceil(BLOCK_SIZE).max(1);
        BlockVec {
            blocks: (0..n_blocks).map(|_| AtomicPtr::new(ptr::null_mut())).collect(),
            len: AtomicUsize::new(0),
            write: Mutex::new(()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.blocks.len() * BLOCK_SIZE
    }

    /// Appends `value` and returns its index.
    pub fn push(&self, value: T) -> usize {
        let _guard = self.write.lock().unwrap();
        let index = self.len.load(Ordering::Relaxed);
        let block = index / BLOCK_SIZE;
        assert!(block < self.blocks.len(), "BlockVec capacity exhausted");
        let mut base = self.blocks[block].load(Ordering::Relaxed);
        if base.is_null() {
            let fresh: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(BLOCK_SIZE);
            base = Box::into_raw(fresh) as *mut T;
            self.blocks[block].store(base, Ordering::Release);
        }
        unsafe {
            base.add(index % BLOCK_SIZE).write(value);
        }
        self.len.store(index + 1, Ordering::Release);
        index
    }

    /// Reads the element at `index`, which must be below `len()`.
    pub fn get(&self, index: usize) -> &T {
        assert!(index < self.len());
        let base = self.blocks[index / BLOCK_SIZE].load(Ordering::Acquire);
        unsafe { &*base.add(index % BLOCK_SIZE) }
    }
}

impl<T> Drop for BlockVec<T> {
    fn drop(&mut self) {
        let len = *self.len.get_mut();
        for (i, slot) in self.blocks.iter_mut().enumerate() {
            let base = *slot.get_mut();
            if base.is_null() {
                continue;
            }
            let filled = (len.saturating_sub(i * BLOCK_SIZE)).min(BLOCK_SIZE);
            unsafe {
                for offset in 0..filled {
                    ptr::drop_in_place(base.add(offset));
                }
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                    base as *mut MaybeUninit<T>,
                    BLOCK_SIZE,
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_push_and_get() {
        let v: BlockVec<usize> = BlockVec::with_capacity(100_000);
        for i in 0..100_000 {
            assert_eq!(v.push(i * 3), i);
        }
        assert_eq!(v.len(), 100_000);
        assert_eq!(*v.get(0), 0);
        assert_eq!(*v.get(99_999), 99_999 * 3);
        assert_eq!(*v.get(BLOCK_SIZE), BLOCK_SIZE * 3);
    }

    #[test]
    fn test_concurrent_append_and_read() {
        let v: BlockVec<usize> = BlockVec::with_capacity(200_000);
        let read = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..25_000 {
                        let i = v.push(7);
                        // read something another thread may have pushed
                        let j = i / 2;
                        assert_eq!(*v.get(j), 7);
                        read.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(v.len(), 100_000);
        assert_eq!(read.load(Ordering::Relaxed), 100_000);
    }

    #[test]
    fn test_drops_contents() {
        let v: BlockVec<String> = BlockVec::with_capacity(10);
        v.push("alpha".to_string());
        v.push("beta".to_string());
        assert_eq!(v.get(1), "beta");
        drop(v); // must not leak or double-free
    }
}
