//! Orderlist discovery
//!
//! Orderlists are runs of small sequence indices closed by a `0xFF`
//! terminator. Candidate runs are collected over the whole image as pure
//! `(candidate, length)` pairs; overlapping candidates are deduplicated by
//! keeping the longest first (address order breaking ties), the three
//! winners are assigned to voices 1-3 in address order, and missing voices
//! are padded with the trivial fallback orderlist.

use sidforge_model::{MemoryImage, NUM_VOICES, OrderEntry, OrderList, Warnings};

use crate::scanner::ScanOptions;
use crate::{ORDERLIST_SCAN_LIMIT, ORDERLIST_TERMINATOR};

/// A candidate orderlist run: `length` index bytes followed by a terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    /// Buffer offset of the first index byte
    pub offset: usize,
    /// Number of index bytes before the terminator
    pub length: usize,
}

impl Candidate {
    /// Offset one past the terminator byte
    fn end(&self) -> usize {
        self.offset + self.length + 1
    }

    fn overlaps(&self, other: &Candidate) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Discover the three voice orderlists.
///
/// Returns the orderlists in address order plus the buffer offset one past
/// the last accepted orderlist, which anchors the sequence scan.
pub(crate) fn discover(
    image: &MemoryImage,
    warnings: &mut Warnings,
    options: &ScanOptions,
) -> ([OrderList; NUM_VOICES], usize) {
    let candidates = collect_candidates(image.data(), options);
    let chosen = select_non_overlapping(candidates);

    if chosen.len() < NUM_VOICES {
        warnings.push(format!(
            "orderlist discovery found {} of {} voices, padding with a trivial orderlist",
            chosen.len(),
            NUM_VOICES
        ));
    }

    let anchor = chosen.iter().map(Candidate::end).max().unwrap_or(0);

    let mut orderlists: [OrderList; NUM_VOICES] = Default::default();
    for (voice, orderlist) in orderlists.iter_mut().enumerate() {
        *orderlist = match chosen.get(voice) {
            Some(candidate) => read_orderlist(image.data(), candidate),
            None => OrderList::fallback(),
        };
    }

    (orderlists, anchor)
}

/// Collect every run of index bytes closed by a terminator.
///
/// A run qualifies when every byte before the terminator is at or below the
/// index ceiling, at least one of them is nonzero, and the terminator shows
/// up within the scan limit.
fn collect_candidates(data: &[u8], options: &ScanOptions) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for offset in 0..data.len() {
        let mut nonzero = false;
        for (length, &byte) in data[offset..]
            .iter()
            .take(ORDERLIST_SCAN_LIMIT)
            .enumerate()
        {
            if byte == ORDERLIST_TERMINATOR {
                if length > 0 && nonzero {
                    candidates.push(Candidate { offset, length });
                }
                break;
            }
            if byte > options.max_orderlist_index {
                break;
            }
            if byte != 0 {
                nonzero = true;
            }
        }
    }

    candidates
}

/// Keep the three longest non-overlapping candidates, in address order.
///
/// Tie-break is explicit: longest first, then lowest address. Suffixes of a
/// longer run are themselves valid runs, which is why overlap rejection is
/// required at all.
fn select_non_overlapping(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.length.cmp(&a.length).then(a.offset.cmp(&b.offset)));

    let mut chosen: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if chosen.len() == NUM_VOICES {
            break;
        }
        if chosen.iter().all(|c| !c.overlaps(&candidate)) {
            chosen.push(candidate);
        }
    }

    chosen.sort_by_key(|c| c.offset);
    chosen
}

fn read_orderlist(data: &[u8], candidate: &Candidate) -> OrderList {
    let entries = data[candidate.offset..candidate.offset + candidate.length]
        .iter()
        .map(|&byte| OrderEntry {
            transpose: 0,
            sequence: byte,
        })
        .collect();
    OrderList { entries }
}
