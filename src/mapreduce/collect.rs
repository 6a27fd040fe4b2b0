// src/mapreduce/collect.rs

//! Named specializations of [`Scheduler::try_map_reduce`].
//!
//! Every operation comes in an infallible form and a `try_` form. The
//! mapping forms check key uniqueness on every insert: with
//! [`Duplicates::Reject`] a collision is reported as a
//! [`DuplicateKeyError`], even from the infallible form.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use crate::errors::DuplicateKeyError;

use super::scheduler::Scheduler;

/// What a mapping specialization does when two results share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Duplicates {
    /// Fail the whole operation with [`DuplicateKeyError`].
    #[default]
    Reject,
    /// Keep the value combined last (completion order, not source order).
    Overwrite,
}

impl Scheduler {
    /// Run `body` for every element; results are discarded.
    pub async fn for_each<I, F, Fut>(&self, source: I, body: F)
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.map_reduce(source, (), body, |_, ()| {}).await
    }

    pub async fn try_for_each<I, E, F, Fut>(&self, source: I, body: F) -> Result<(), E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
    {
        self.try_map_reduce(source, (), body, |_, ()| Ok(())).await
    }

    /// Collect every result. The output is in completion order; key the
    /// results if source order matters.
    pub async fn map<I, T, F, Fut>(&self, source: I, body: F) -> Vec<T>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.map_reduce(source, Vec::new(), body, |out, value| out.push(value))
            .await
    }

    pub async fn try_map<I, T, E, F, Fut>(&self, source: I, body: F) -> Result<Vec<T>, E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.try_map_reduce(source, Vec::new(), body, |out, value| {
            out.push(value);
            Ok(())
        })
        .await
    }

    /// Collect the `Some` results, in completion order.
    pub async fn filter_map<I, T, F, Fut>(&self, source: I, body: F) -> Vec<T>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Option<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.map_reduce(source, Vec::new(), body, |out, value| out.extend(value))
            .await
    }

    pub async fn try_filter_map<I, T, E, F, Fut>(
        &self,
        source: I,
        body: F,
    ) -> Result<Vec<T>, E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.try_map_reduce(source, Vec::new(), body, |out, value| {
            out.extend(value);
            Ok(())
        })
        .await
    }

    /// Build a mapping from `(key, value)` results.
    pub async fn map_to_map<I, K, V, F, Fut>(
        &self,
        source: I,
        duplicates: Duplicates,
        body: F,
    ) -> Result<HashMap<K, V>, DuplicateKeyError>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = (K, V)> + Send + 'static,
        K: Eq + Hash + Debug + Send + 'static,
        V: Send + 'static,
    {
        self.try_map_to_map(source, duplicates, |element| {
            let pending = body(element);
            async move { Ok::<_, DuplicateKeyError>(pending.await) }
        })
        .await
    }

    pub async fn try_map_to_map<I, K, V, E, F, Fut>(
        &self,
        source: I,
        duplicates: Duplicates,
        body: F,
    ) -> Result<HashMap<K, V>, E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<(K, V), E>> + Send + 'static,
        K: Eq + Hash + Debug + Send + 'static,
        V: Send + 'static,
        E: From<DuplicateKeyError> + Send + 'static,
    {
        self.try_map_reduce(source, HashMap::new(), body, |map, (key, value)| {
            insert_entry(map, key, value, duplicates).map_err(E::from)
        })
        .await
    }

    /// Build a mapping from the `Some((key, value))` results.
    pub async fn filter_map_to_map<I, K, V, F, Fut>(
        &self,
        source: I,
        duplicates: Duplicates,
        body: F,
    ) -> Result<HashMap<K, V>, DuplicateKeyError>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Option<(K, V)>> + Send + 'static,
        K: Eq + Hash + Debug + Send + 'static,
        V: Send + 'static,
    {
        self.try_filter_map_to_map(source, duplicates, |element| {
            let pending = body(element);
            async move { Ok::<_, DuplicateKeyError>(pending.await) }
        })
        .await
    }

    pub async fn try_filter_map_to_map<I, K, V, E, F, Fut>(
        &self,
        source: I,
        duplicates: Duplicates,
        body: F,
    ) -> Result<HashMap<K, V>, E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<Option<(K, V)>, E>> + Send + 'static,
        K: Eq + Hash + Debug + Send + 'static,
        V: Send + 'static,
        E: From<DuplicateKeyError> + Send + 'static,
    {
        self.try_map_reduce(source, HashMap::new(), body, |map, entry| match entry {
            Some((key, value)) => insert_entry(map, key, value, duplicates).map_err(E::from),
            None => Ok(()),
        })
        .await
    }
}

fn insert_entry<K, V>(
    map: &mut HashMap<K, V>,
    key: K,
    value: V,
    duplicates: Duplicates,
) -> Result<(), DuplicateKeyError>
where
    K: Eq + Hash + Debug,
{
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(mut slot) => match duplicates {
            Duplicates::Overwrite => {
                slot.insert(value);
                Ok(())
            }
            Duplicates::Reject => Err(DuplicateKeyError {
                key: format!("{:?}", slot.key()),
            }),
        },
    }
}
