//! Reading fixtures back and checking their content.

use std::fs::File;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

use log::{debug, info};
use memchr::memmem;

use crate::alphabet::Alphabet;
use crate::config::{GeneratorConfig, Layout, Order, TESTPATH_CONTENT};
use crate::error::{GarbageError, Result};
use crate::payload::chunk_size;

/// Smallest slice handed to a counting worker
pub const MIN_COUNT_CHUNK: usize = 1024 * 1024;

/// A maximal sequence of one repeated byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub byte: u8,
    pub start: usize,
    pub len: usize,
}

/// Iterator over the runs of a byte slice, see [`runs`].
pub struct Runs<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let start = self.pos;
        let byte = *self.data.get(start)?;
        let len = self.data[start..]
            .iter()
            .position(|&b| b != byte)
            .unwrap_or(self.data.len() - start);
        self.pos += len;
        Some(Run { byte, start, len })
    }
}

pub fn runs(data: &[u8]) -> Runs<'_> {
    Runs { data, pos: 0 }
}

/// Statistics of one payload.
#[derive(Debug, Clone)]
pub struct Summary {
    pub total_bytes: usize,
    pub runs: usize,
    pub distinct: usize,
    pub counts: [u64; 256],
}

impl Summary {
    /// `(byte, count)` for every byte that occurs, in byte order.
    pub fn frequencies(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .map(|b| (b, self.counts[b as usize]))
            .filter(|&(_, n)| n > 0)
    }
}

/// What a fixture is supposed to contain.
#[derive(Debug, Clone)]
pub struct Expectation {
    pub layout: Layout,
    pub order: Order,
    pub alphabet: Alphabet,
    pub size: u64,
}

impl Expectation {
    pub fn for_config(config: &GeneratorConfig) -> Self {
        Self {
            layout: config.variant.layout(),
            order: config.variant.order(),
            alphabet: config.alphabet.clone(),
            size: config.size,
        }
    }
}

// Reads the whole fixture file
pub fn read_fixture(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(GarbageError::io(path))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).map_err(GarbageError::io(path))?;
    info!("loaded {}: {} bytes", path.display(), buffer.len());
    Ok(buffer)
}

/// Strips the layout wrapper and returns the bare payload, or
/// [`GarbageError::Malformed`] if the wrapper is missing or incomplete.
pub fn extract_payload(bytes: &[u8], layout: Layout) -> Result<&[u8]> {
    match layout {
        Layout::Blob => bytes
            .strip_suffix(b"\n")
            .ok_or_else(|| GarbageError::Malformed("blob does not end with a newline".to_string())),
        Layout::Html => {
            for marker in ["<html>", "<body>", "</html>"] {
                if memmem::find(bytes, marker.as_bytes()).is_none() {
                    return Err(GarbageError::Malformed(format!("missing {marker}")));
                }
            }
            let open = memmem::find(bytes, b"<p>")
                .ok_or_else(|| GarbageError::Malformed("missing <p>".to_string()))?;
            let close = memmem::rfind(bytes, b"</p>")
                .filter(|&close| close >= open + 3)
                .ok_or_else(|| GarbageError::Malformed("missing </p>".to_string()))?;

            let body = &bytes[open + 3..close];
            body.strip_suffix(b"\n").ok_or_else(|| {
                GarbageError::Malformed("paragraph does not end with a newline".to_string())
            })
        }
    }
}

// Counts every byte value in a slice
fn tally(data: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    counts
}

/// Per-byte occurrence counts, computed on scoped worker threads.
pub fn count_chars(payload: &[u8]) -> Result<[u64; 256]> {
    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let chunk_len = payload.len().div_ceil(workers).max(MIN_COUNT_CHUNK);

    let partials = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = payload
            .chunks(chunk_len)
            .enumerate()
            .map(|(i, chunk)| {
                s.spawn(move |_| {
                    debug!("counting chunk at offset 0x{:X}", i * chunk_len);
                    tally(chunk)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| GarbageError::Worker))
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|_| GarbageError::Worker)??;

    let mut counts = [0u64; 256];
    for partial in &partials {
        for (total, n) in counts.iter_mut().zip(partial) {
            *total += n;
        }
    }
    Ok(counts)
}

pub fn summarize(payload: &[u8]) -> Result<Summary> {
    let counts = count_chars(payload)?;
    Ok(Summary {
        total_bytes: payload.len(),
        runs: runs(payload).count(),
        distinct: counts.iter().filter(|&&n| n > 0).count(),
        counts,
    })
}

fn mismatch(msg: String) -> GarbageError {
    GarbageError::Verification(msg)
}

/// Checks a whole fixture file against `expect` and returns its summary.
///
/// # Errors
///
/// Returns [`GarbageError::Malformed`] if the wrapper is wrong and
/// [`GarbageError::Verification`] for the first content mismatch found.
pub fn verify(bytes: &[u8], expect: &Expectation) -> Result<Summary> {
    let payload = extract_payload(bytes, expect.layout)?;
    let alphabet = expect.alphabet.as_bytes();
    let chunk = chunk_size(expect.size, alphabet.len());
    let expected_len = chunk * alphabet.len() as u64;

    if payload.len() as u64 != expected_len {
        return Err(mismatch(format!(
            "payload is {} bytes, expected {} ({} x {})",
            payload.len(),
            expected_len,
            alphabet.len(),
            chunk
        )));
    }

    let summary = summarize(payload)?;
    for (byte, &count) in summary.counts.iter().enumerate() {
        let byte = byte as u8;
        let want = if expect.alphabet.contains(byte) { chunk } else { 0 };
        if count != want {
            return Err(mismatch(format!(
                "{:?} appears {} times, expected {}",
                char::from(byte),
                count,
                want
            )));
        }
    }

    if expect.order == Order::Sequential && chunk > 0 {
        let mut found = runs(payload);
        for (index, &ch) in alphabet.iter().enumerate() {
            let Some(run) = found.next() else {
                return Err(mismatch("payload ends early".to_string()));
            };
            if run.byte != ch {
                let position = expect.alphabet.position(run.byte).unwrap_or(index);
                return Err(mismatch(format!(
                    "run at offset {} is {:?}, alphabet position {} where position {} was expected",
                    run.start,
                    char::from(run.byte),
                    position,
                    index
                )));
            }
            if run.len as u64 != chunk {
                return Err(mismatch(format!(
                    "run of {:?} at offset {} is {} long, expected {}",
                    char::from(ch),
                    run.start,
                    run.len,
                    chunk
                )));
            }
        }
        if let Some(run) = found.next() {
            return Err(mismatch(format!("unexpected run at offset {}", run.start)));
        }
    }

    debug!(
        "verified {} bytes: {} runs over {} characters",
        summary.total_bytes, summary.runs, summary.distinct
    );
    Ok(summary)
}

pub fn verify_testpath(bytes: &[u8]) -> Result<()> {
    if bytes == TESTPATH_CONTENT {
        Ok(())
    } else {
        Err(mismatch(format!(
            "testpath holds {:?}, expected {:?}",
            String::from_utf8_lossy(bytes),
            String::from_utf8_lossy(TESTPATH_CONTENT)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::output::{HTML_HEAD, HTML_TAIL};
    use crate::payload::build_sequential;

    fn expectation(variant: Variant, alphabet: &str, size: u64) -> Expectation {
        Expectation {
            layout: variant.layout(),
            order: variant.order(),
            alphabet: Alphabet::new(alphabet).unwrap(),
            size,
        }
    }

    fn html(payload: &[u8]) -> Vec<u8> {
        [HTML_HEAD, payload, HTML_TAIL].concat()
    }

    #[test]
    fn runs_split_on_byte_changes() {
        let found: Vec<_> = runs(b"aaabccc").collect();
        assert_eq!(
            found,
            vec![
                Run { byte: b'a', start: 0, len: 3 },
                Run { byte: b'b', start: 3, len: 1 },
                Run { byte: b'c', start: 4, len: 3 },
            ]
        );
        assert_eq!(runs(b"").count(), 0);
    }

    #[test]
    fn extracts_blob_and_html_payloads() {
        assert_eq!(extract_payload(b"AABB\n", Layout::Blob).unwrap(), b"AABB");
        assert_eq!(extract_payload(&html(b"AABB"), Layout::Html).unwrap(), b"AABB");
        assert_eq!(extract_payload(&html(b""), Layout::Html).unwrap(), b"");
    }

    #[test]
    fn rejects_broken_wrappers() {
        assert!(matches!(
            extract_payload(b"AABB", Layout::Blob),
            Err(GarbageError::Malformed(_))
        ));
        assert!(matches!(
            extract_payload(b"<html><body><p>AB\n</p></body>", Layout::Html),
            Err(GarbageError::Malformed(_))
        ));
        assert!(matches!(
            extract_payload(b"<html><body><p>AB</p></body></html>", Layout::Html),
            Err(GarbageError::Malformed(_))
        ));
    }

    #[test]
    fn parallel_counts_match_serial_tally() {
        let data: Vec<u8> = (0..3 * MIN_COUNT_CHUNK + 17).map(|i| (i % 7) as u8 + b'a').collect();
        assert_eq!(count_chars(&data).unwrap(), tally(&data));
        assert_eq!(count_chars(&[]).unwrap(), [0u64; 256]);
    }

    #[test]
    fn summary_reports_runs_and_frequencies() {
        let summary = summarize(b"xxyyyx").unwrap();
        assert_eq!(summary.total_bytes, 6);
        assert_eq!(summary.runs, 3);
        assert_eq!(summary.distinct, 2);
        assert_eq!(summary.frequencies().collect::<Vec<_>>(), vec![(b'x', 3), (b'y', 3)]);
    }

    #[test]
    fn sequential_fixture_verifies() {
        let payload = build_sequential(&Alphabet::new("ABC").unwrap(), 10).unwrap();
        let summary = verify(&html(payload.as_bytes()), &expectation(Variant::Html, "ABC", 10)).unwrap();
        assert_eq!(summary.runs, 3);
    }

    #[test]
    fn out_of_order_runs_fail_sequential_check() {
        let err = verify(b"BBBAAACCC\n", &expectation(Variant::Blob, "ABC", 9)).unwrap_err();
        assert!(matches!(err, GarbageError::Verification(_)));
        assert!(err.to_string().contains("alphabet position 1 where position 0"));
    }

    #[test]
    fn shuffled_fixture_only_needs_matching_counts() {
        let expect = expectation(Variant::Shuffled, "ABC", 9);
        verify(b"CABBACACB\n", &expect).unwrap();

        let err = verify(b"CABBACACA\n", &expect).unwrap_err();
        assert!(matches!(err, GarbageError::Verification(_)));
    }

    #[test]
    fn wrong_length_is_reported() {
        let err = verify(b"AABBCC\n", &expectation(Variant::Blob, "ABC", 9)).unwrap_err();
        assert!(err.to_string().contains("expected 9"));
    }

    #[test]
    fn foreign_characters_are_reported() {
        let err = verify(b"AAABBBCCD\n", &expectation(Variant::Shuffled, "ABC", 9)).unwrap_err();
        assert!(matches!(err, GarbageError::Verification(_)));
    }

    #[test]
    fn empty_payload_when_size_below_alphabet() {
        verify(b"\n", &expectation(Variant::Blob, "ABC", 2)).unwrap();
    }

    #[test]
    fn testpath_content() {
        verify_testpath(b"Hello World!\n").unwrap();
        assert!(verify_testpath(b"Hello World!").is_err());
        assert!(verify_testpath(b"Hello World!\n\n").is_err());
    }
}
