use std::env;

pub const FFMPEG_ENV: &str = "CUEBOOK_FFMPEG";
pub const FFPROBE_ENV: &str = "CUEBOOK_FFPROBE";

/// External executables the conversion pipeline shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Tools {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let resolve = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };

        Self {
            ffmpeg: resolve(FFMPEG_ENV, defaults.ffmpeg),
            ffprobe: resolve(FFPROBE_ENV, defaults.ffprobe),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_path_lookup() {
        assert_eq!(Tools::from_lookup(|_| None), Tools::default());
    }

    #[test]
    fn overrides_each_tool_separately() {
        let tools = Tools::from_lookup(|key| match key {
            FFPROBE_ENV => Some("/opt/ffmpeg/bin/ffprobe".to_string()),
            FFMPEG_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(tools.ffprobe, "/opt/ffmpeg/bin/ffprobe");
        assert_eq!(tools.ffmpeg, "ffmpeg");
    }
}
