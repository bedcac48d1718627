use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    assets::{PreparedImage, decode::decode_any_image, fetch::MediaFetcher},
    foundation::error::ReelResult,
};

/// State of one URL in the cache, as seen by the render path.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageLookup {
    /// Decoded and ready to draw.
    Ready(Arc<PreparedImage>),
    /// A load is in flight; draw the placeholder this frame.
    Pending,
    /// Fetch or decode failed; draw the placeholder until the URL is invalidated.
    Failed,
}

enum Slot {
    Pending,
    Ready(Arc<PreparedImage>),
    Failed,
}

type Completion = (String, ReelResult<PreparedImage>);

/// Decoded-image cache keyed by media URL.
///
/// Loads run on the rayon pool and report back over a channel. The render path only ever
/// checks the cache ([`ImageCache::lookup`]); it never waits. At most one load per URL is in
/// flight at any time.
pub struct ImageCache {
    fetcher: Arc<dyn MediaFetcher>,
    slots: HashMap<String, Slot>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
    loads_issued: u64,
}

impl ImageCache {
    pub fn new(fetcher: Arc<dyn MediaFetcher>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            fetcher,
            slots: HashMap::new(),
            tx,
            rx,
            in_flight: 0,
            loads_issued: 0,
        }
    }

    /// Start loading `url` unless it is already cached, failed, or in flight.
    pub fn request(&mut self, url: &str) {
        if self.slots.contains_key(url) {
            return;
        }
        self.slots.insert(url.to_string(), Slot::Pending);
        self.in_flight += 1;
        self.loads_issued += 1;

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let url = url.to_string();
        rayon::spawn(move || {
            let result = fetcher.fetch(&url).and_then(|bytes| decode_any_image(&bytes));
            // The receiver only disappears with the cache itself.
            let _ = tx.send((url, result));
        });
    }

    /// Move finished loads into the cache. Returns how many completed.
    pub fn poll(&mut self) -> usize {
        let mut done = 0;
        while let Ok((url, result)) = self.rx.try_recv() {
            self.complete(url, result);
            done += 1;
        }
        done
    }

    /// Non-blocking lookup; a miss issues a load and reports [`ImageLookup::Pending`].
    pub fn lookup(&mut self, url: &str) -> ImageLookup {
        self.request(url);
        match self.slots.get(url) {
            Some(Slot::Ready(img)) => ImageLookup::Ready(Arc::clone(img)),
            Some(Slot::Failed) => ImageLookup::Failed,
            Some(Slot::Pending) | None => ImageLookup::Pending,
        }
    }

    /// Ready image for `url`, without issuing a load.
    pub fn get(&self, url: &str) -> Option<Arc<PreparedImage>> {
        match self.slots.get(url) {
            Some(Slot::Ready(img)) => Some(Arc::clone(img)),
            _ => None,
        }
    }

    /// Block until every in-flight load has completed or `timeout` elapses.
    ///
    /// Returns `true` when nothing is left in flight. Hosts call this between frames (for
    /// example before an export), never from inside a tick.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok((url, result)) => self.complete(url, result),
                Err(_) => break,
            }
        }
        self.poll();
        self.in_flight == 0
    }

    /// Forget `url` so the next lookup loads it again.
    pub fn invalidate(&mut self, url: &str) {
        if let Some(Slot::Ready(_) | Slot::Failed) = self.slots.get(url) {
            self.slots.remove(url);
        }
    }

    /// Drop ready/failed entries whose URL is no longer referenced.
    pub fn retain_urls<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) {
        let live: std::collections::HashSet<&str> = live.into_iter().collect();
        self.slots
            .retain(|url, slot| matches!(slot, Slot::Pending) || live.contains(url.as_str()));
    }

    /// Loads currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Total loads issued since creation.
    pub fn loads_issued(&self) -> u64 {
        self.loads_issued
    }

    fn complete(&mut self, url: String, result: ReelResult<PreparedImage>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let slot = match result {
            Ok(img) => Slot::Ready(Arc::new(img)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "image load failed; using placeholder");
                Slot::Failed
            }
        };
        self.slots.insert(url, slot);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image_cache.rs"]
mod tests;
