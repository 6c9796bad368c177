//! Query pipeline (C10).
//!
//! A lazy operator chain over a sequence of `T`, entered via [`from`]
//! (sequential) or [`from_parallel`] (parallel, `parallel` feature).
//! Stateless-per-element nodes (`filter`, `transform`) fuse into the
//! underlying iterator adapter with no intermediate allocation — nothing
//! runs until a terminal (`fold`, `any`, `find`, `to_sequence`, ...)
//! drives the chain. Order-preserving stateful nodes (`scan`, `take`,
//! `skip`) and collection-wide nodes (`sort`, `distinct`, `group_by`)
//! need the whole sequence in hand, so on [`ParChain`] they materialize
//! an intermediate `Vec` before re-entering the parallel iterator — the
//! same distinction Core §4.10 draws between "stateless-per-element" and
//! "collection-wide" nodes, not an arbitrary shortcut. `rayon`'s
//! `ParallelIterator` cannot be type-erased (its `drive_unindexed`
//! method is generic, so it is not object-safe), which is why each
//! combinator grows the chain's concrete type rather than boxing it —
//! exactly how `rayon` itself is used directly in application code.

#[cfg(not(test))]
use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A lazy sequential operator chain. See module docs.
pub struct Chain<I> {
    iter: I,
}

/// Entry point: wraps any collection as a sequential [`Chain`].
pub fn from<T, C: IntoIterator<Item = T>>(collection: C) -> Chain<C::IntoIter> {
    Chain { iter: collection.into_iter() }
}

impl<T, I: Iterator<Item = T>> Chain<I> {
    // -- stateless-per-element (fused, zero-allocation) ----------------

    pub fn filter<F>(self, predicate: F) -> Chain<core::iter::Filter<I, F>>
    where
        F: FnMut(&T) -> bool,
    {
        Chain { iter: self.iter.filter(predicate) }
    }

    pub fn transform<U, F>(self, f: F) -> Chain<core::iter::Map<I, F>>
    where
        F: FnMut(T) -> U,
    {
        Chain { iter: self.iter.map(f) }
    }

    // -- order-preserving stateful --------------------------------------

    pub fn take(self, n: usize) -> Chain<core::iter::Take<I>> {
        Chain { iter: self.iter.take(n) }
    }

    pub fn skip(self, n: usize) -> Chain<core::iter::Skip<I>> {
        Chain { iter: self.iter.skip(n) }
    }

    pub fn zip<U, J: IntoIterator<Item = U>>(self, other: J) -> Chain<core::iter::Zip<I, J::IntoIter>> {
        Chain { iter: self.iter.zip(other) }
    }

    /// Inclusive scan: `n` outputs for `n` inputs, the first output being
    /// the first element itself. Empty input yields empty output.
    pub fn scan(self, mut op: impl FnMut(&T, &T) -> T) -> Chain<alloc::vec::IntoIter<T>>
    where
        T: Clone,
    {
        let mut iter = self.iter;
        let mut out = Vec::new();
        if let Some(first) = iter.next() {
            let mut acc = first.clone();
            out.push(first);
            for item in iter {
                acc = op(&acc, &item);
                out.push(acc.clone());
            }
        }
        Chain { iter: out.into_iter() }
    }

    /// Seeded scan: `n+1` outputs for `n` inputs, the first output being
    /// `seed` itself.
    pub fn scan_seeded<Acc: Clone>(self, seed: Acc, mut op: impl FnMut(&Acc, &T) -> Acc) -> Chain<alloc::vec::IntoIter<Acc>> {
        let mut out = Vec::new();
        let mut acc = seed;
        out.push(acc.clone());
        for item in self.iter {
            acc = op(&acc, &item);
            out.push(acc.clone());
        }
        Chain { iter: out.into_iter() }
    }

    // -- collection-wide -------------------------------------------------

    pub fn sort(self) -> Chain<alloc::vec::IntoIter<T>>
    where
        T: Ord,
    {
        let mut v: Vec<T> = self.iter.collect();
        v.sort(); // Vec::sort is stable.
        Chain { iter: v.into_iter() }
    }

    pub fn sort_by<F>(self, cmp: F) -> Chain<alloc::vec::IntoIter<T>>
    where
        F: FnMut(&T, &T) -> core::cmp::Ordering,
    {
        let mut v: Vec<T> = self.iter.collect();
        v.sort_by(cmp);
        Chain { iter: v.into_iter() }
    }

    pub fn sort_by_key<K: Ord, F: FnMut(&T) -> K>(self, key_fn: F) -> Chain<alloc::vec::IntoIter<T>> {
        let mut v: Vec<T> = self.iter.collect();
        v.sort_by_key(key_fn);
        Chain { iter: v.into_iter() }
    }

    pub fn distinct(self) -> Chain<alloc::vec::IntoIter<T>>
    where
        T: core::hash::Hash + Eq + Clone,
    {
        let mut seen = indexmap::IndexSet::new();
        let mut out = Vec::new();
        for item in self.iter {
            if seen.insert(item.clone()) {
                out.push(item);
            }
        }
        Chain { iter: out.into_iter() }
    }

    pub fn group_by<K, F>(self, mut key_fn: F) -> Chain<alloc::vec::IntoIter<(K, Vec<T>)>>
    where
        K: core::hash::Hash + Eq,
        F: FnMut(&T) -> K,
    {
        let mut groups: indexmap::IndexMap<K, Vec<T>> = indexmap::IndexMap::new();
        for item in self.iter {
            let key = key_fn(&item);
            groups.entry(key).or_default().push(item);
        }
        Chain { iter: groups.into_iter().collect::<Vec<_>>().into_iter() }
    }

    // -- terminals --------------------------------------------------------

    pub fn fold<Acc, F: FnMut(Acc, T) -> Acc>(self, init: Acc, f: F) -> Acc {
        self.iter.fold(init, f)
    }

    pub fn any<F: FnMut(T) -> bool>(mut self, f: F) -> bool {
        self.iter.any(f)
    }

    pub fn all<F: FnMut(T) -> bool>(mut self, f: F) -> bool {
        self.iter.all(f)
    }

    pub fn find<F: FnMut(&T) -> bool>(mut self, mut predicate: F) -> Option<T> {
        self.iter.find(|item| predicate(item))
    }

    pub fn find_index<F: FnMut(&T) -> bool>(mut self, mut predicate: F) -> Option<usize> {
        self.iter.position(|item| predicate(&item))
    }

    pub fn min(self) -> Option<T>
    where
        T: Ord,
    {
        self.iter.min()
    }

    pub fn max(self) -> Option<T>
    where
        T: Ord,
    {
        self.iter.max()
    }

    pub fn sum<S: core::iter::Sum<T>>(self) -> S {
        self.iter.sum()
    }

    pub fn to_sequence(self) -> Vec<T> {
        self.iter.collect()
    }

    /// Materializes the chain and re-enters it as a [`ParChain`].
    #[cfg(feature = "parallel")]
    pub fn as_parallel(self) -> ParChain<rayon::vec::IntoIter<T>>
    where
        T: Send,
    {
        let v: Vec<T> = self.iter.collect();
        ParChain { iter: v.into_par_iter() }
    }
}

/// A parallel operator chain, entered via [`from_parallel`]. See module
/// docs for which nodes stay lazy/fused versus which materialize.
#[cfg(feature = "parallel")]
pub struct ParChain<I> {
    iter: I,
}

/// Entry point: wraps any collection as a [`ParChain`].
#[cfg(feature = "parallel")]
pub fn from_parallel<T: Send, C>(collection: C) -> ParChain<C::Iter>
where
    C: rayon::iter::IntoParallelIterator<Item = T>,
{
    ParChain { iter: collection.into_par_iter() }
}

#[cfg(feature = "parallel")]
impl<T: Send, I: ParallelIterator<Item = T>> ParChain<I> {
    // -- stateless-per-element (fused) ------------------------------------

    pub fn filter<F>(self, predicate: F) -> ParChain<rayon::iter::Filter<I, F>>
    where
        F: Fn(&T) -> bool + Sync + Send,
    {
        ParChain { iter: self.iter.filter(predicate) }
    }

    pub fn transform<U: Send, F>(self, f: F) -> ParChain<rayon::iter::Map<I, F>>
    where
        F: Fn(T) -> U + Sync + Send,
    {
        ParChain { iter: self.iter.map(f) }
    }

    // -- order-preserving stateful (materializing) ------------------------

    pub fn take(self, n: usize) -> ParChain<rayon::vec::IntoIter<T>> {
        let mut v: Vec<T> = self.iter.collect();
        v.truncate(n);
        ParChain { iter: v.into_par_iter() }
    }

    pub fn skip(self, n: usize) -> ParChain<rayon::vec::IntoIter<T>> {
        let v: Vec<T> = self.iter.collect();
        let v: Vec<T> = v.into_iter().skip(n).collect();
        ParChain { iter: v.into_par_iter() }
    }

    /// Inherently sequential (each output depends on the one before it);
    /// materializes and scans in order, then re-enters the parallel
    /// iterator over the fully computed results.
    pub fn scan(self, mut op: impl FnMut(&T, &T) -> T) -> ParChain<rayon::vec::IntoIter<T>>
    where
        T: Clone,
    {
        let v: Vec<T> = self.iter.collect();
        let mut out = Vec::with_capacity(v.len());
        let mut iter = v.into_iter();
        if let Some(first) = iter.next() {
            let mut acc = first.clone();
            out.push(first);
            for item in iter {
                acc = op(&acc, &item);
                out.push(acc.clone());
            }
        }
        ParChain { iter: out.into_par_iter() }
    }

    // -- collection-wide (materializing) ----------------------------------

    pub fn sort(self) -> ParChain<rayon::vec::IntoIter<T>>
    where
        T: Ord,
    {
        let mut v: Vec<T> = self.iter.collect();
        v.par_sort(); // stable
        ParChain { iter: v.into_par_iter() }
    }

    pub fn sort_by<F>(self, cmp: F) -> ParChain<rayon::vec::IntoIter<T>>
    where
        F: Fn(&T, &T) -> core::cmp::Ordering + Sync,
    {
        let mut v: Vec<T> = self.iter.collect();
        v.par_sort_by(cmp);
        ParChain { iter: v.into_par_iter() }
    }

    pub fn distinct(self) -> ParChain<rayon::vec::IntoIter<T>>
    where
        T: core::hash::Hash + Eq + Clone,
    {
        let v: Vec<T> = self.iter.collect();
        let mut seen = indexmap::IndexSet::new();
        let mut out = Vec::new();
        for item in v {
            if seen.insert(item.clone()) {
                out.push(item);
            }
        }
        ParChain { iter: out.into_par_iter() }
    }

    // -- terminals ----------------------------------------------------------

    /// Parallel reduce: `op` must be associative, as `fold`/`reduce` are
    /// described in Core §4.10 and the scan-law property in Core §8.
    pub fn fold<F>(self, identity: T, op: F) -> T
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Sync + Send,
    {
        self.iter.reduce(|| identity.clone(), op)
    }

    pub fn any<F: Fn(&T) -> bool + Sync + Send>(self, predicate: F) -> bool {
        self.iter.any(|item| predicate(&item))
    }

    pub fn all<F: Fn(&T) -> bool + Sync + Send>(self, predicate: F) -> bool {
        self.iter.all(|item| predicate(&item))
    }

    /// Returns the earliest match by input index, not by which worker
    /// finishes first (Core §4.10).
    pub fn find<F: Fn(&T) -> bool + Sync + Send>(self, predicate: F) -> Option<T> {
        self.iter.find_first(predicate)
    }

    pub fn find_index<F: Fn(&T) -> bool + Sync + Send>(self, predicate: F) -> Option<usize> {
        let v: Vec<T> = self.iter.collect();
        v.iter().position(|item| predicate(item))
    }

    pub fn min(self) -> Option<T>
    where
        T: Ord,
    {
        self.iter.min()
    }

    pub fn max(self) -> Option<T>
    where
        T: Ord,
    {
        self.iter.max()
    }

    pub fn sum<S>(self) -> S
    where
        S: Send + core::iter::Sum<T> + core::iter::Sum<S>,
    {
        self.iter.sum()
    }

    pub fn to_sequence(self) -> Vec<T> {
        self.iter.collect()
    }

    /// Materializes the chain and re-enters it as a sequential [`Chain`].
    pub fn as_sequential(self) -> Chain<alloc::vec::IntoIter<T>> {
        let v: Vec<T> = self.iter.collect();
        Chain { iter: v.into_iter() }
    }
}
