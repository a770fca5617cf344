//! Generator configuration and the fixture variants it can produce.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::alphabet::Alphabet;
use crate::error::{GarbageError, Result};

/// Default payload size: 200 MiB
pub const DEFAULT_SIZE: u64 = 200 * 1024 * 1024;

pub const DEFAULT_OUTPUT_DIR: &str = "public";

pub const HTML_FILENAME: &str = "garbage.html";
pub const BLOB_FILENAME: &str = "garbage.blob";
pub const TESTPATH_FILENAME: &str = "testpath.blob";

/// Fixed content of the companion testpath file
pub const TESTPATH_CONTENT: &[u8] = b"Hello World!\n";

/// How the payload is wrapped on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Embedded in a small HTML document
    Html,
    /// Raw payload plus a trailing newline
    Blob,
}

/// Order of the characters inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// One run per character, in alphabet order
    Sequential,
    /// Random permutation of the sequential payload
    Shuffled,
}

/// The kinds of fixture the generator knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// `garbage.html`, sequential uppercase runs
    #[default]
    Html,
    /// `garbage.blob` plus `testpath.blob`, sequential runs
    Blob,
    /// `garbage.blob` plus `testpath.blob`, shuffled characters
    Shuffled,
}

impl Variant {
    pub fn layout(self) -> Layout {
        match self {
            Variant::Html => Layout::Html,
            Variant::Blob | Variant::Shuffled => Layout::Blob,
        }
    }

    pub fn order(self) -> Order {
        match self {
            Variant::Html | Variant::Blob => Order::Sequential,
            Variant::Shuffled => Order::Shuffled,
        }
    }

    pub fn default_alphabet(self) -> Alphabet {
        match self {
            Variant::Html => Alphabet::uppercase(),
            Variant::Blob | Variant::Shuffled => Alphabet::letters(),
        }
    }

    /// Whether the variant also writes `testpath.blob`.
    pub fn writes_testpath(self) -> bool {
        self.layout() == Layout::Blob
    }

    /// Name of the main payload file.
    pub fn filename(self) -> &'static str {
        match self.layout() {
            Layout::Html => HTML_FILENAME,
            Layout::Blob => BLOB_FILENAME,
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Variant::Html),
            "blob" => Ok(Variant::Blob),
            "shuffled" => Ok(Variant::Shuffled),
            other => Err(format!(
                "unknown variant '{other}' (expected html, blob or shuffled)"
            )),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Html => "html",
            Variant::Blob => "blob",
            Variant::Shuffled => "shuffled",
        };
        f.write_str(name)
    }
}

/// Everything needed to produce one set of fixture files.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub variant: Variant,
    /// Target payload size in bytes, before rounding down to a multiple of the alphabet
    pub size: u64,
    pub alphabet: Alphabet,
    pub output_dir: PathBuf,
    /// Seed for the shuffled variant; `None` draws from the thread RNG
    pub seed: Option<u64>,
    /// Create `output_dir` if it does not exist
    pub create_dirs: bool,
}

impl GeneratorConfig {
    /// Defaults for `variant`, including its alphabet.
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            size: DEFAULT_SIZE,
            alphabet: variant.default_alphabet(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: None,
            create_dirs: false,
        }
    }

    pub fn payload_path(&self) -> PathBuf {
        self.output_dir.join(self.variant.filename())
    }

    pub fn testpath_path(&self) -> PathBuf {
        self.output_dir.join(TESTPATH_FILENAME)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

// Byte count with an optional binary K, M or G suffix, overflow-checked
pub fn parse_size(s: &str) -> Result<u64> {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let s = s.trim();
    let Some(last_char) = s.chars().last() else {
        return Err(GarbageError::InvalidSize("empty size".to_string()));
    };

    let (number_part, multiplier) = match last_char.to_ascii_uppercase() {
        'K' => (&s[..s.len() - 1], KB),
        'M' => (&s[..s.len() - 1], MB),
        'G' => (&s[..s.len() - 1], GB),
        _ if last_char.is_ascii_digit() => (s, 1),
        _ => {
            return Err(GarbageError::InvalidSize(format!(
                "unknown suffix '{last_char}'"
            )))
        }
    };

    let number: u64 = number_part
        .parse()
        .map_err(|_| GarbageError::InvalidSize(format!("not a number: '{number_part}'")))?;

    number
        .checked_mul(multiplier)
        .ok_or_else(|| GarbageError::InvalidSize(format!("'{s}' is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_html_script() {
        let config = GeneratorConfig::default();
        assert_eq!(config.variant, Variant::Html);
        assert_eq!(config.size, 209_715_200);
        assert_eq!(config.alphabet, Alphabet::uppercase());
        assert_eq!(config.payload_path(), PathBuf::from("public/garbage.html"));
        assert!(!config.create_dirs);
    }

    #[test]
    fn variant_presets() {
        assert_eq!(Variant::Blob.layout(), Layout::Blob);
        assert_eq!(Variant::Blob.order(), Order::Sequential);
        assert_eq!(Variant::Shuffled.order(), Order::Shuffled);
        assert!(Variant::Shuffled.writes_testpath());
        assert!(!Variant::Html.writes_testpath());
        assert_eq!(Variant::Shuffled.filename(), BLOB_FILENAME);
        assert_eq!(Variant::Blob.default_alphabet().len(), 52);
    }

    #[test]
    fn variant_names_round_trip_through_display() {
        for variant in [Variant::Html, Variant::Blob, Variant::Shuffled] {
            assert_eq!(variant.to_string().parse::<Variant>(), Ok(variant));
        }
        assert_eq!("HTML".parse::<Variant>(), Ok(Variant::Html));
        assert!("zip".parse::<Variant>().is_err());
    }

    #[test]
    fn parse_size_units() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("4k").unwrap(), 4096);
        assert_eq!(parse_size("200M").unwrap(), DEFAULT_SIZE);
        assert_eq!(parse_size(" 1G ").unwrap(), 1 << 30);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("M").is_err());
        assert!(parse_size("12X").is_err());
        assert!(parse_size("-1K").is_err());
        assert!(parse_size("1.5M").is_err());
        assert!(parse_size(&format!("{}G", u64::MAX)).is_err());
    }
}
