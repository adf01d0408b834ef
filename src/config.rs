use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use serde::Deserialize;
use crate::error::Error;


/// How chatty diagnostics are. Each level includes the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(from = "RawVerbosity")]
pub enum Verbosity {
    None,
    #[default]
    Concise,
    Verbose,
    Debug
}

impl Verbosity {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::None,
            1 => Verbosity::Concise,
            2 => Verbosity::Verbose,
            _ => Verbosity::Debug
        }
    }
}

// unknown names fall back to concise
impl From<&str> for Verbosity {
    fn from(name: &str) -> Self {
        match name {
            "none" => Verbosity::None,
            "verbose" => Verbosity::Verbose,
            "DEBUG" | "debug" => Verbosity::Debug,
            _ => Verbosity::Concise
        }
    }
}

impl FromStr for Verbosity {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Verbosity::from(name))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVerbosity {
    Level(u8),
    Name(String)
}

impl From<RawVerbosity> for Verbosity {
    fn from(raw: RawVerbosity) -> Self {
        match raw {
            RawVerbosity::Level(level) => Verbosity::from_level(level),
            RawVerbosity::Name(name) => Verbosity::from(name.as_str())
        }
    }
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub verbosity: Verbosity,
    pub template_root: PathBuf,
    /// Upper bound on include expansions in one render.
    pub max_steps: usize
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbosity: Verbosity::default(),
            template_root: PathBuf::from("./"),
            max_steps: 10_000
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str::<Config>(text)?)
    }
}
