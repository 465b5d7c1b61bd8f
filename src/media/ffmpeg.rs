use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use image::{RgbImage, RgbaImage};

use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::foundation::math::blend_channel;
use crate::media::decode::ensure_mp4;
use crate::media::sink::{FrameSink, SinkConfig};
use crate::media::source::{FrameSource, VideoInfo};

/// Probe source video metadata through `ffprobe`.
///
/// Frames are counted by decoding (`-count_frames`), so the count matches what
/// [`FfmpegSource`] will yield.
pub fn probe_video(source_path: &Path) -> TracemarkResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        nb_read_frames: Option<String>,
        nb_frames: Option<String>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-count_frames",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| TracemarkError::codec(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(TracemarkError::format(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| TracemarkError::codec(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            TracemarkError::format(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| TracemarkError::format("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| TracemarkError::format("missing video height from ffprobe"))?;
    let frame_count = video_stream
        .nb_read_frames
        .as_deref()
        .or(video_stream.nb_frames.as_deref())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| TracemarkError::format("ffprobe did not report a frame count"))?;
    let fps = match video_stream.r_frame_rate.as_deref() {
        Some(rate) => Fps::parse(rate)?,
        None => Fps::default(),
    };

    Ok(VideoInfo {
        width,
        height,
        frame_count,
        fps,
    })
}

/// Frame source that streams raw `rgb24` frames out of the system `ffmpeg`.
///
/// Decoding is forward-only: skipping ahead discards frames, going back is an error.
pub struct FfmpegSource {
    path: PathBuf,
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    next: u64,
    scratch: Vec<u8>,
}

impl FfmpegSource {
    /// Probe and open an MP4 file.
    pub fn open(path: impl Into<PathBuf>) -> TracemarkResult<Self> {
        let path = path.into();
        ensure_mp4(&path)?;
        let info = probe_video(&path)?;
        if info.width == 0 || info.height == 0 {
            return Err(TracemarkError::format(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            frames = info.frame_count,
            "opened video source"
        );
        Ok(Self {
            path,
            info,
            child: None,
            stdout: None,
            next: 0,
            scratch: Vec::new(),
        })
    }

    fn ensure_started(&mut self) -> TracemarkResult<()> {
        if self.stdout.is_some() {
            return Ok(());
        }
        if !is_ffmpeg_on_path() {
            return Err(TracemarkError::codec(
                "ffmpeg is required for video decoding, but was not found on PATH",
            ));
        }
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&self.path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TracemarkError::codec(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TracemarkError::codec("failed to open ffmpeg stdout (unexpected)"))?;
        self.scratch = vec![0u8; self.info.width as usize * self.info.height as usize * 3];
        self.stdout = Some(BufReader::new(stdout));
        self.child = Some(child);
        Ok(())
    }

    fn read_next(&mut self) -> TracemarkResult<()> {
        let idx = self.next;
        self.next += 1;
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(TracemarkError::codec("ffmpeg decoder is not running"));
        };
        stdout
            .read_exact(&mut self.scratch)
            .map_err(|e| TracemarkError::codec(format!("could not read frame {idx}: {e}")))
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self, idx: FrameIndex) -> TracemarkResult<RgbImage> {
        if idx.0 < self.next {
            return Err(TracemarkError::codec(format!(
                "frame {} was already consumed (forward-only decoder)",
                idx.0
            )));
        }
        self.ensure_started()?;
        while self.next < idx.0 {
            self.read_next()?;
        }
        self.read_next()?;
        RgbImage::from_raw(self.info.width, self.info.height, self.scratch.clone())
            .ok_or_else(|| TracemarkError::codec("decoded frame buffer has the wrong size"))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TracemarkResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(TracemarkError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TracemarkError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(TracemarkError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TracemarkError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(TracemarkError::codec(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Alpha is flattened before writing (push_frame), so the input is opaque rgba.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            TracemarkError::codec(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TracemarkError::codec("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TracemarkError::codec("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width * cfg.height * 4) as usize];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbaImage) -> TracemarkResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TracemarkError::codec("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(TracemarkError::codec(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(TracemarkError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        flatten_over_bg_to_opaque_rgba8(&mut self.scratch, frame.as_raw(), self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TracemarkError::codec("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            TracemarkError::codec(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> TracemarkResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| TracemarkError::codec("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            TracemarkError::codec(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| TracemarkError::codec("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| TracemarkError::codec(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(TracemarkError::codec(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl FfmpegSink {
    /// Kill an encoder that was begun but never ended, and reap it.
    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!(path = %self.opts.out_path.display(), "aborted unfinished ffmpeg sink");
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

fn flatten_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    bg_rgba: [u8; 4],
) -> TracemarkResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TracemarkError::validation(
            "flatten_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        d[0] = blend_channel(bg_rgba[0], s[0], a);
        d[1] = blend_channel(bg_rgba[1], s[1], a);
        d[2] = blend_channel(bg_rgba[2], s[2], a);
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TracemarkResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
