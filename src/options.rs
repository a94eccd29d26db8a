use std::path::PathBuf;

pub const DEFAULT_TEMP_DIR: &str = "./temp";
pub const DEFAULT_FFMPEG_PATH: &str = "./ffmpeg";
pub const DEFAULT_MP4DECRYPT_PATH: &str = "./mp4decrypt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub temp_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub mp4decrypt_path: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
            mp4decrypt_path: PathBuf::from(DEFAULT_MP4DECRYPT_PATH),
        }
    }
}
