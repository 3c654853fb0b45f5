//! Eco tip of the day
//!
//! Tips come from a flat text file, one per line. Lines exported from a
//! list literal carry stray quotes and trailing commas, which are stripped.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::Result;

/// Loaded list of tips, read-only after startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipBook {
    tips: Vec<String>,
}

impl TipBook {
    /// Parse tip file contents
    ///
    /// Blank lines are skipped; a line holding only quotes and commas still
    /// counts as an (empty) tip.
    pub fn parse(text: &str) -> Self {
        let tips = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.trim_matches(|c: char| c == '"' || c == ','))
            .map(str::to_string)
            .collect();
        Self { tips }
    }

    /// Read and parse a UTF-8 tip file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let book = Self::parse(&text);
        debug!("Loaded {} tips from {}", book.len(), path.display());
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    /// Uniform choice using the given random source
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.tips.choose(rng).cloned()
    }
}

/// Random source for per-session tip selection
///
/// `Entropy` is the runtime default; `Seeded` gives a reproducible sequence.
#[derive(Debug, Default)]
pub enum TipPicker {
    #[default]
    Entropy,
    Seeded(Mutex<StdRng>),
}

impl TipPicker {
    pub fn seeded(seed: u64) -> Self {
        TipPicker::Seeded(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(TipPicker::Entropy, TipPicker::seeded)
    }

    pub fn pick(&self, book: &TipBook) -> Option<String> {
        match self {
            TipPicker::Entropy => book.choose(&mut rand::thread_rng()),
            TipPicker::Seeded(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                book.choose(&mut *rng)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_strips_list_artifacts() {
        let text = "\"Carry a reusable bag.\",\n  \"Unplug chargers.\",  \n\n\"\",\nCompost scraps\n";
        let book = TipBook::parse(text);
        assert_eq!(
            book.tips(),
            &[
                "Carry a reusable bag.".to_string(),
                "Unplug chargers.".to_string(),
                String::new(),
                "Compost scraps".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_skips_whitespace_only_lines() {
        let book = TipBook::parse("  \t \n\r\n\"Walk short trips.\",\n   \n");
        assert_eq!(book.tips(), &["Walk short trips.".to_string()]);
    }

    #[test]
    fn test_parse_keeps_inner_punctuation() {
        let book = TipBook::parse("\"Reduce, reuse, recycle.\",");
        assert_eq!(book.tips(), &["Reduce, reuse, recycle.".to_string()]);
    }

    #[test]
    fn test_bundled_tip_file() {
        let book = TipBook::parse(include_str!("../../tips.txt"));
        assert_eq!(book.len(), 10);
        assert!(book
            .tips()
            .iter()
            .all(|tip| !tip.starts_with('"') && !tip.ends_with(',')));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tips.txt");
        std::fs::write(&path, "\"One\",\n\"Two\",\n").unwrap();

        let book = TipBook::load(&path).unwrap();
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = TipBook::load(&temp_dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let book = TipBook::parse("a\nb\nc\nd\ne\nf\ng\n");
        let first = TipPicker::seeded(42);
        let second = TipPicker::seeded(42);

        let a: Vec<_> = (0..10).map(|_| first.pick(&book)).collect();
        let b: Vec<_> = (0..10).map(|_| second.pick(&book)).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|tip| tip.is_some()));
    }

    #[test]
    fn test_pick_from_empty_book() {
        let book = TipBook::default();
        assert!(book.is_empty());
        assert_eq!(TipPicker::Entropy.pick(&book), None);
        assert_eq!(TipPicker::seeded(1).pick(&book), None);
    }

    #[test]
    fn test_entropy_picker_returns_member() {
        let book = TipBook::parse("only tip");
        assert_eq!(TipPicker::from_seed(None).pick(&book).as_deref(), Some("only tip"));
    }
}
