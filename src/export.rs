pub(crate) mod ffmpeg;
pub(crate) mod pipeline;
pub(crate) mod recorder;
