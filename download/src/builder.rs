use super::{Options, ProgressCallback, YtDlp};
use playsync_model::sink::DownloadProgress;
use std::path::PathBuf;

pub struct Builder {
    program: PathBuf,
    options: Options,
    progress: Option<ProgressCallback>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            program: PathBuf::from(super::DEFAULT_PROGRAM),
            options: Options::default(),
            progress: None,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn ffmpeg_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.options.ffmpeg_location = Some(location.into());
        self
    }

    pub fn cookies_file(mut self, cookies: impl Into<PathBuf>) -> Self {
        self.options.cookies_file = Some(cookies.into());
        self
    }

    pub fn on_progress(
        mut self,
        callback: impl Fn(&str, DownloadProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> YtDlp {
        YtDlp {
            program: self.program,
            options: self.options,
            progress: self.progress,
        }
    }
}
