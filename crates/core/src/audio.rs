use std::fmt;
use std::process::Command;
use std::str::FromStr;
use anyhow::{Context, Error};
use bitflags::bitflags;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("invalid stream type: {0}")]
    InvalidStream(String),
    #[error("cannot recognize flag: {0}")]
    InvalidFlag(String),
    #[error("amixer failed: {0}")]
    Mixer(String),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StreamType {
    Music,
    Alarm,
    Notification,
}

impl StreamType {
    /// The ALSA simple control carrying this stream.
    fn control(self) -> &'static str {
        match self {
            StreamType::Music => "Master",
            StreamType::Alarm => "Beep",
            StreamType::Notification => "Speaker",
        }
    }
}

impl FromStr for StreamType {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<StreamType, AudioError> {
        match s {
            "music" => Ok(StreamType::Music),
            "alarm" => Ok(StreamType::Alarm),
            "notification" => Ok(StreamType::Notification),
            _ => Err(AudioError::InvalidStream(s.to_string())),
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StreamType::Music => write!(f, "music"),
            StreamType::Alarm => write!(f, "alarm"),
            StreamType::Notification => write!(f, "notification"),
        }
    }
}

bitflags! {
    /// Platform volume-change flags, with their historical bit values.
    /// ALSA has no analogue: they are accepted, not forwarded.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
    pub struct VolumeFlags: u32 {
        const SHOW_UI = 1;
        const PLAY_SOUND = 4;
        const VIBRATE = 16;
    }
}

impl VolumeFlags {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<VolumeFlags, AudioError> {
        let mut flags = VolumeFlags::empty();
        for name in names {
            flags |= match name.as_ref() {
                "show-ui" => VolumeFlags::SHOW_UI,
                "play-sound" => VolumeFlags::PLAY_SOUND,
                "vibrate" => VolumeFlags::VIBRATE,
                other => return Err(AudioError::InvalidFlag(other.to_string())),
            };
        }
        Ok(flags)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct VolumeRange {
    pub min: i32,
    pub max: i32,
}

pub trait Mixer {
    fn volume(&mut self, stream: StreamType) -> Result<i32, Error>;
    fn set_volume(&mut self, stream: StreamType, volume: i32, flags: VolumeFlags) -> Result<(), Error>;
    fn range(&mut self, stream: StreamType) -> Result<VolumeRange, Error>;
}

pub struct AlsaMixer {
    card: Option<String>,
}

impl AlsaMixer {
    pub fn new(card: Option<String>) -> AlsaMixer {
        AlsaMixer { card }
    }

    fn amixer(&self, args: &[&str]) -> Result<String, Error> {
        let mut command = Command::new("amixer");
        if let Some(ref card) = self.card {
            command.arg("-c").arg(card);
        }
        let output = command.args(args).output().context("can't run amixer")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AudioError::Mixer(stderr).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Mixer for AlsaMixer {
    fn volume(&mut self, stream: StreamType) -> Result<i32, Error> {
        let output = self.amixer(&["sget", stream.control()])?;
        parse_value(&output)
            .ok_or_else(|| Error::from(AudioError::Mixer(format!("no volume reported for {}", stream))))
    }

    fn set_volume(&mut self, stream: StreamType, volume: i32, _flags: VolumeFlags) -> Result<(), Error> {
        self.amixer(&["sset", stream.control(), &volume.to_string()])?;
        Ok(())
    }

    fn range(&mut self, stream: StreamType) -> Result<VolumeRange, Error> {
        let output = self.amixer(&["sget", stream.control()])?;
        parse_limits(&output)
            .map(|(min, max)| VolumeRange { min, max })
            .ok_or_else(|| Error::from(AudioError::Mixer(format!("no limits reported for {}", stream))))
    }
}

// "  Limits: Playback 0 - 65536"
fn parse_limits(output: &str) -> Option<(i32, i32)> {
    let line = output.lines().find(|line| line.trim_start().starts_with("Limits:"))?;
    let mut numbers = line.split_whitespace().filter_map(|word| word.parse::<i32>().ok());
    let min = numbers.next()?;
    let max = numbers.next()?;
    Some((min, max))
}

// "  Mono: Playback 52 [81%] [on]"
fn parse_value(output: &str) -> Option<i32> {
    output.lines()
          .filter(|line| line.contains('['))
          .find_map(|line| line.split_whitespace().find_map(|word| word.parse::<i32>().ok()))
}

pub struct FakeMixer {
    volumes: [i32; 3],
    range: VolumeRange,
}

impl FakeMixer {
    pub fn new() -> FakeMixer {
        FakeMixer { volumes: [8, 8, 8], range: VolumeRange { min: 0, max: 15 } }
    }
}

impl Mixer for FakeMixer {
    fn volume(&mut self, stream: StreamType) -> Result<i32, Error> {
        Ok(self.volumes[stream as usize])
    }

    fn set_volume(&mut self, stream: StreamType, volume: i32, _flags: VolumeFlags) -> Result<(), Error> {
        self.volumes[stream as usize] = volume.clamp(self.range.min, self.range.max);
        Ok(())
    }

    fn range(&mut self, _stream: StreamType) -> Result<VolumeRange, Error> {
        Ok(self.range)
    }
}
