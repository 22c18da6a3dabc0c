//! Streaming literal find/replace.
//!
//! A [ReplaceChain] holds one [StreamReplacer] per placeholder. Every chunk is
//! passed through the stages in order, each stage scanning what the previous
//! one emitted. A stage only holds back the shortest tail that could still be
//! the start of its marker, so a marker split over two chunks is still found.

use crate::PlaceholderMap;

#[derive(Debug)]
struct StreamReplacer {
    needle: Vec<u8>,
    replacement: Vec<u8>,
    pending: Vec<u8>,
}

impl StreamReplacer {
    fn new(needle: &str, replacement: &str) -> Self {
        Self {
            needle: needle.as_bytes().to_vec(),
            replacement: replacement.as_bytes().to_vec(),
            pending: Vec::new(),
        }
    }

    /// Append every byte that can no longer be part of a match to `out`.
    fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        self.pending.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(pos) = find(&self.pending[start..], &self.needle) {
            out.extend_from_slice(&self.pending[start..start + pos]);
            out.extend_from_slice(&self.replacement);
            start += pos + self.needle.len();
        }

        let rest = &self.pending[start..];
        let keep = partial_match_len(rest, &self.needle);
        let emit_until = start + rest.len() - keep;
        out.extend_from_slice(&self.pending[start..emit_until]);
        self.pending.drain(..emit_until);
    }

    /// The source is exhausted; whatever is held back can't match anymore.
    fn finish(&mut self, out: &mut Vec<u8>) {
        out.append(&mut self.pending);
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Length of the longest suffix of `data` that is a proper prefix of `needle`.
fn partial_match_len(data: &[u8], needle: &[u8]) -> usize {
    let max = data.len().min(needle.len().saturating_sub(1));
    (1..=max)
        .rev()
        .find(|&len| data[data.len() - len..] == needle[..len])
        .unwrap_or(0)
}

/// Ordered pipeline of streaming replacers built from a [PlaceholderMap].
#[derive(Debug)]
pub struct ReplaceChain {
    stages: Vec<StreamReplacer>,
}

impl ReplaceChain {
    /// Markers without a replacement and empty markers are skipped.
    pub fn new(placeholders: &PlaceholderMap) -> Self {
        let stages = placeholders
            .iter()
            .filter(|(marker, _)| !marker.is_empty())
            .filter_map(|(marker, replacement)| {
                replacement.map(|replacement| StreamReplacer::new(marker, replacement))
            })
            .collect();
        Self { stages }
    }

    /// Number of active stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Push one chunk through every stage and return what came out the end.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut data = chunk.to_vec();
        for stage in self.stages.iter_mut() {
            let mut out = Vec::with_capacity(data.len());
            stage.feed(&data, &mut out);
            data = out;
        }
        data
    }

    /// Drain the chain once the source has closed.
    ///
    /// Stage `i` is flushed through stages `i + 1..` before stage `i + 1`
    /// itself is flushed, so held-back bytes leave in source order.
    pub fn finish(mut self) -> Vec<u8> {
        let mut output = Vec::new();
        for i in 0..self.stages.len() {
            let (head, tail) = self.stages.split_at_mut(i + 1);
            let mut flushed = Vec::new();
            head[i].finish(&mut flushed);
            for stage in tail.iter_mut() {
                let mut out = Vec::with_capacity(flushed.len());
                stage.feed(&flushed, &mut out);
                flushed = out;
            }
            output.extend_from_slice(&flushed);
        }
        output
    }
}

/// Apply all placeholders to an in-memory buffer.
pub fn replace_all(input: &[u8], placeholders: &PlaceholderMap) -> Vec<u8> {
    let mut chain = ReplaceChain::new(placeholders);
    let mut output = chain.push(input);
    output.extend(chain.finish());
    output
}
