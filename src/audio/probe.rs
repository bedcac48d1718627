use crate::{
    assets::{fetch::MediaFetcher, media},
    audio::decode,
    foundation::error::ReelResult,
};

/// Measures the playable length of an audio file.
///
/// Voice-over durations come from here, not from the provider that produced the file.
pub trait MediaProbe: Send + Sync {
    fn duration_secs(&self, bytes: &[u8]) -> ReelResult<f64>;
}

/// Probes with `symphonia` and falls back to `ffprobe` for containers it cannot open.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMediaProbe;

impl MediaProbe for DefaultMediaProbe {
    fn duration_secs(&self, bytes: &[u8]) -> ReelResult<f64> {
        decode::probe_duration_secs(bytes).or_else(|e| {
            tracing::debug!(error = %e, "symphonia probe failed; trying ffprobe");
            media::probe_duration_secs(bytes)
        })
    }
}

/// Fetch `url` and measure it.
#[tracing::instrument(skip(fetcher, probe))]
pub fn measure_duration(
    fetcher: &dyn MediaFetcher,
    probe: &dyn MediaProbe,
    url: &str,
) -> ReelResult<f64> {
    let bytes = fetcher.fetch(url)?;
    probe.duration_secs(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/probe.rs"]
mod tests;
