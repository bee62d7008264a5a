//! Named, bounded worker pools.
//!
//! A pool is a size and a name; each `run` spawns up to `size` scoped threads
//! that pull jobs from a shared queue until it is empty, so nested pools
//! (segment fetches inside an item task) never share slots.

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;

use crate::config::FeedvaultConfig;

#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    size: usize,
}

impl WorkerPool {
    pub fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size: size.max(1),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `f` over every job with at most `size` jobs in flight and returns
    /// the results in job order. Blocks until the queue is drained.
    pub fn run<J, R, F>(&self, jobs: Vec<J>, f: F) -> Vec<R>
    where
        J: Send,
        R: Send,
        F: Fn(J) -> R + Sync,
    {
        let count = jobs.len();
        if count == 0 {
            return Vec::new();
        }
        let work: Mutex<VecDeque<(usize, J)>> = Mutex::new(jobs.into_iter().enumerate().collect());
        let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
        let num_workers = self.size.min(count);
        tracing::trace!(pool = self.name, workers = num_workers, jobs = count, "pool run");

        thread::scope(|s| {
            let (tx, rx) = mpsc::channel();
            for _ in 0..num_workers {
                let tx = tx.clone();
                let work = &work;
                let f = &f;
                s.spawn(move || loop {
                    let next = work
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, job)) = next else {
                        break;
                    };
                    let _ = tx.send((index, f(job)));
                });
            }
            drop(tx);
            for (index, res) in rx {
                slots[index] = Some(res);
            }
        });

        slots.into_iter().flatten().collect()
    }
}

/// The two bounded scopes below the sequential profile loop.
#[derive(Debug, Clone)]
pub struct Pools {
    /// Image and video tasks of one item.
    pub item: WorkerPool,
    /// Segment fetches of one video.
    pub segment: WorkerPool,
}

impl Pools {
    pub fn new(item_workers: usize, segment_workers: usize) -> Self {
        // The item pool needs at least one slot, so the segment pool needs two.
        let segment = segment_workers.max(2);
        let item = item_workers.clamp(1, segment - 1);
        if segment != segment_workers || item != item_workers {
            tracing::warn!(
                item_workers,
                segment_workers,
                item,
                segment,
                "item pool must be smaller than the segment pool; clamping"
            );
        }
        Self {
            item: WorkerPool::new("item", item),
            segment: WorkerPool::new("segment", segment),
        }
    }

    pub fn from_config(cfg: &FeedvaultConfig) -> Self {
        Self::new(cfg.item_workers, cfg.segment_workers)
    }
}
