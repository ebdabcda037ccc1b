//! Hash-consing unique table with reference counts.
//!
//! Values are stored in a plain vector indexed by their position, and a bucket
//! array with chaining (through the `next` field of each entry) makes it possible
//! to find an existing value in O(1) on average. Index 0 is a sentry and never
//! holds a value, so `next == 0` marks the end of a chain.
//!
//! Every occupied entry carries a reference count, managed by the owner of the
//! table. An entry is only removed when explicitly asked to; the table itself
//! never reclaims anything.

use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
    refs: u32,
    occupied: bool,
}

impl<T> Entry<T>
where
    T: Default,
{
    fn vacant() -> Self {
        Self {
            value: T::default(),
            next: 0,
            refs: 0,
            occupied: false,
        }
    }
}

pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,

    /// Index of the first *possibly* free (non-occupied) cell.
    min_free: usize,
    /// Number of occupied cells.
    real_size: usize,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with `2^bits` buckets.
    ///
    /// The storage itself grows on demand.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Table bits should be in the range 0..=31");

        let mut sentry = Entry::vacant();
        sentry.occupied = true;

        let buckets_size = 1 << bits;
        Self {
            data: vec![sentry],
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
            min_free: 1,
            real_size: 0,
        }
    }

    /// Allocate a new cell in the table and return its index.
    fn alloc(&mut self) -> usize {
        let index = (self.min_free..self.data.len())
            .find(|&i| !self.data[i].occupied)
            .unwrap_or_else(|| {
                self.data.push(Entry::vacant());
                self.data.len() - 1
            });

        self.data[index].occupied = true;
        self.min_free = index + 1;
        self.real_size += 1;

        index
    }

    /// Add a new value to the table (without hashing it) and return its index.
    fn add(&mut self, value: T) -> usize {
        let index = self.alloc();

        let entry = &mut self.data[index];
        entry.value = value;
        entry.next = 0;
        entry.refs = 0;

        index
    }
}

impl<T> Table<T> {
    /// Get the number of allocated cells, including the sentry and free cells.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }
    /// Get the number of occupied cells.
    pub fn real_size(&self) -> usize {
        self.real_size
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert!(self.is_occupied(index), "Index {} is not occupied", index);
        &self.data[index].value
    }

    /// Check if the cell at the given index is occupied.
    pub fn is_occupied(&self, index: usize) -> bool {
        assert_ne!(index, 0, "Index is 0");
        index < self.data.len() && self.data[index].occupied
    }

    /// Get the index of the next cell in the same bucket.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next
    }

    /// Get the reference count of the value at the given index.
    pub fn refs(&self, index: usize) -> u32 {
        assert!(self.is_occupied(index), "Index {} is not occupied", index);
        self.data[index].refs
    }

    /// Increment the reference count and return the new count.
    pub fn inc_ref(&mut self, index: usize) -> u32 {
        assert!(self.is_occupied(index), "Index {} is not occupied", index);
        let entry = &mut self.data[index];
        entry.refs += 1;
        entry.refs
    }

    /// Decrement the reference count and return the new count.
    pub fn dec_ref(&mut self, index: usize) -> u32 {
        assert!(self.is_occupied(index), "Index {} is not occupied", index);
        let entry = &mut self.data[index];
        assert!(entry.refs > 0, "Reference count of {} is already 0", index);
        entry.refs -= 1;
        entry.refs
    }

    /// Iterate over the indices of all occupied cells.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.data.len()).filter(|&i| self.data[i].occupied)
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq + Default,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table.
    ///
    /// Returns the index of the (possibly pre-existing) equal value, and whether
    /// a new cell was created for it.
    pub fn put(&mut self, value: T) -> (usize, bool) {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            // Create new node and put it into the bucket.
            let i = self.add(value);
            self.buckets[bucket_index] = i;
            return (i, true);
        }

        loop {
            if &value == self.value(index) {
                // The node already exists.
                return (index, false);
            }

            let next = self.next(index);

            if next == 0 {
                // Create new node and append it to the bucket.
                let i = self.add(value);
                self.data[index].next = i;
                return (i, true);
            } else {
                // Go to the next node in the bucket.
                index = next;
            }
        }
    }

    /// Look a value up without inserting it.
    pub fn find(&self, value: &T) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(value)];
        while index != 0 {
            if value == self.value(index) {
                return Some(index);
            }
            index = self.next(index);
        }
        None
    }

    /// Unlink the value at the given index from its bucket and free the cell.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(self.is_occupied(index), "Index {} is not occupied", index);

        let bucket_index = self.bucket_index(&self.data[index].value);
        let next = self.data[index].next;
        if self.buckets[bucket_index] == index {
            self.buckets[bucket_index] = next;
        } else {
            let mut prev = self.buckets[bucket_index];
            while self.data[prev].next != index {
                prev = self.data[prev].next;
                assert_ne!(prev, 0, "Index {} is not linked in its bucket", index);
            }
            self.data[prev].next = next;
        }

        let entry = &mut self.data[index];
        entry.occupied = false;
        entry.next = 0;
        entry.refs = 0;
        self.min_free = min(self.min_free, index);
        self.real_size -= 1;

        std::mem::take(&mut entry.value)
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
