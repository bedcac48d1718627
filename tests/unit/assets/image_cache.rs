use std::{
    collections::HashMap,
    io::Cursor,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::foundation::error::ReelError;

struct MapFetcher {
    files: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl MapFetcher {
    fn new(files: &[(&str, Vec<u8>)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MediaFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> ReelResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| ReelError::missing_media(url.to_string()))
    }
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn first_lookup_is_pending_then_ready() {
    let fetcher = Arc::new(MapFetcher::new(&[("a.png", png_bytes(3, 2))]));
    let mut cache = ImageCache::new(fetcher.clone());

    assert_eq!(cache.lookup("a.png"), ImageLookup::Pending);
    assert!(cache.wait_idle(Duration::from_secs(10)));

    let ImageLookup::Ready(img) = cache.lookup("a.png") else {
        panic!("expected ready image");
    };
    assert_eq!((img.width, img.height), (3, 2));
    assert!(cache.get("a.png").is_some());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn repeated_lookups_issue_one_load() {
    let fetcher = Arc::new(MapFetcher::new(&[("a.png", png_bytes(1, 1))]));
    let mut cache = ImageCache::new(fetcher.clone());
    for _ in 0..5 {
        let _ = cache.lookup("a.png");
    }
    assert_eq!(cache.loads_issued(), 1);
    assert!(cache.wait_idle(Duration::from_secs(10)));
    let _ = cache.lookup("a.png");
    assert_eq!(cache.loads_issued(), 1);
    assert_eq!(cache.in_flight(), 0);
}

#[test]
fn failures_stick_until_invalidated() {
    let fetcher = Arc::new(MapFetcher::new(&[("bad.png", b"nope".to_vec())]));
    let mut cache = ImageCache::new(fetcher.clone());

    let _ = cache.lookup("bad.png");
    let _ = cache.lookup("missing.png");
    assert!(cache.wait_idle(Duration::from_secs(10)));
    assert_eq!(cache.lookup("bad.png"), ImageLookup::Failed);
    assert_eq!(cache.lookup("missing.png"), ImageLookup::Failed);
    assert_eq!(cache.loads_issued(), 2);

    cache.invalidate("bad.png");
    assert_eq!(cache.lookup("bad.png"), ImageLookup::Pending);
    assert_eq!(cache.loads_issued(), 3);
    assert!(cache.wait_idle(Duration::from_secs(10)));
}

#[test]
fn retain_urls_drops_unreferenced_entries() {
    let fetcher = Arc::new(MapFetcher::new(&[
        ("a.png", png_bytes(1, 1)),
        ("b.png", png_bytes(1, 1)),
    ]));
    let mut cache = ImageCache::new(fetcher);
    let _ = cache.lookup("a.png");
    let _ = cache.lookup("b.png");
    assert!(cache.wait_idle(Duration::from_secs(10)));

    cache.retain_urls(["b.png"]);
    assert!(cache.get("a.png").is_none());
    assert!(cache.get("b.png").is_some());
}
