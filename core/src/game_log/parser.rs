use super::*;
use crate::game_data::{EXEMPT_ITEM_ID, PRICE_SAMPLE_SIZE, UNKNOWN_PRICE, markers};
use memchr::{memchr, memchr_iter, memmem};
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Leading ASCII digits of `s` parsed as `T`, plus the remainder.
fn take_number<T: FromStr>(s: &str) -> Option<(T, &str)> {
    let end = s
        .as_bytes()
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse::<T>().ok()?;
    Some((value, &s[end..]))
}

/// Stateless extraction of inventory, price and scene events from raw log
/// text. Nothing here fails loudly: a malformed or truncated line yields no
/// event and the next absolute write for the same slot supersedes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTextParser;

impl LogTextParser {
    pub fn new() -> Self {
        Self
    }

    /// Run every extractor over one chunk.
    pub fn parse_chunk(&self, text: &str) -> LogChunk {
        let slot_writes_before_bulk_init =
            memmem::rfind(text.as_bytes(), markers::BAG_INIT.as_bytes())
                .map_or(0, |pos| self.extract_slot_writes(&text[..pos]).len());
        LogChunk {
            slot_writes: self.extract_slot_writes(text),
            slot_writes_before_bulk_init,
            bulk_init_writes: self.extract_bulk_init_writes(text),
            price_quotes: self.extract_price_quotes(text),
            map_transition: self.detect_map_transition(text),
            login_detected: self.detect_login(text),
        }
    }

    /// Per-mutation `BagMgr@:Modfy BagItem` writes, in log order.
    pub fn extract_slot_writes(&self, text: &str) -> Vec<SlotWrite> {
        Self::extract_bag_lines(text, markers::BAG_MODIFY)
    }

    /// `BagMgr@:InitBagData` writes, emitted only by the in-game sort action.
    pub fn extract_bulk_init_writes(&self, text: &str) -> Vec<SlotWrite> {
        Self::extract_bag_lines(text, markers::BAG_INIT)
    }

    fn extract_bag_lines(text: &str, marker: &str) -> Vec<SlotWrite> {
        let finder = memmem::Finder::new(marker);
        let bytes = text.as_bytes();
        let mut writes = Vec::new();
        let mut start = 0;

        for end in memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
            if end > start {
                let line = &text[start..end];
                if let Some(pos) = finder.find(line.as_bytes())
                    && let Some(write) = Self::parse_bag_line(line, pos, marker.len())
                {
                    writes.push(write);
                }
            }
            start = end + 1;
        }
        writes
    }

    // [2024.05.01-12.00.00:000][ 12]GameLog: Display: [Game] BagMgr@:Modfy BagItem PageId = 102 SlotId = 3 ConfigBaseId = 5028 Num = 17
    fn parse_bag_line(line: &str, marker_pos: usize, marker_len: usize) -> Option<SlotWrite> {
        let prefix = &line[..marker_pos];
        let header = prefix.strip_suffix(markers::GAME_LINE)?;
        if !header.ends_with(']') || memchr(b'[', header.as_bytes()).is_none() {
            return None;
        }

        let rest = &line[marker_pos + marker_len..];
        let (page_id, rest) = take_number::<u32>(rest)?;
        let (slot_id, rest) = take_number::<u32>(rest.strip_prefix(markers::SLOT_ID)?)?;
        let (item_id, rest) = take_number::<u64>(rest.strip_prefix(markers::CONFIG_BASE_ID)?)?;
        let (quantity, _) = take_number::<u32>(rest.strip_prefix(markers::NUM)?)?;

        Some(SlotWrite::new(page_id, slot_id, item_id, quantity))
    }

    /// Average price for every price search whose response block is present
    /// in `text`. Requests for the base currency are ignored; a response
    /// without listings yields [`UNKNOWN_PRICE`].
    pub fn extract_price_quotes(&self, text: &str) -> Vec<PriceQuote> {
        let bytes = text.as_bytes();
        let requests: Vec<usize> = memmem::find_iter(bytes, markers::PRICE_REQUEST).collect();
        let mut quotes = Vec::new();

        for (idx, &pos) in requests.iter().enumerate() {
            // response headers repeat the request marker
            if text[..pos].ends_with(markers::RESPONSE_BOUNDARY) {
                continue;
            }

            let body_start = pos + markers::PRICE_REQUEST.len();
            let Some((syn_id, _)) = take_number::<u64>(&text[body_start..]) else {
                continue;
            };

            let window_end = requests.get(idx + 1).copied().unwrap_or(text.len());
            let window = &text[body_start..window_end];
            let Some(refer_pos) = memmem::find(window.as_bytes(), markers::PRICE_REFER.as_bytes())
            else {
                continue;
            };
            let Some((item_id, rest)) =
                take_number::<u64>(&window[refer_pos + markers::PRICE_REFER.len()..])
            else {
                continue;
            };
            if !rest.starts_with(']') || item_id == EXEMPT_ITEM_ID {
                continue;
            }

            if let Some(price) = Self::average_response_price(text, syn_id) {
                quotes.push(PriceQuote {
                    item_id: ItemId(item_id),
                    price,
                });
            }
        }

        quotes
    }

    /// Locate the response block for `syn_id` and average its first
    /// [`PRICE_SAMPLE_SIZE`] `+index [value]` samples, rounded to 4 decimals.
    fn average_response_price(text: &str, syn_id: u64) -> Option<f64> {
        let bytes = text.as_bytes();
        let block = memmem::find_iter(bytes, markers::PRICE_RESPONSE).find_map(|pos| {
            let after = &text[pos + markers::PRICE_RESPONSE.len()..];
            let (id, rest) = take_number::<u64>(after)?;
            (id == syn_id).then_some(rest)
        })?;

        let block_end = memmem::find(block.as_bytes(), markers::RESPONSE_BOUNDARY.as_bytes())
            .unwrap_or(block.len());
        let block = &block[..block_end];

        let samples: Vec<f64> = Self::price_samples(block).take(PRICE_SAMPLE_SIZE).collect();
        if samples.is_empty() {
            return Some(UNKNOWN_PRICE);
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        Some((mean * 10_000.0).round() / 10_000.0)
    }

    // +1 [0.35]
    fn price_samples(block: &str) -> impl Iterator<Item = f64> + '_ {
        memchr_iter(b'+', block.as_bytes()).filter_map(move |pos| {
            let (_, rest) = take_number::<u64>(&block[pos + 1..])?;
            let trimmed = rest.trim_start();
            if trimmed.len() == rest.len() {
                return None;
            }
            let value = trimmed.strip_prefix('[')?;
            let end = value
                .as_bytes()
                .iter()
                .position(|b| !(b.is_ascii_digit() || *b == b'.'))?;
            if end == 0 || value.as_bytes()[end] != b']' {
                return None;
            }
            value[..end].parse::<f64>().ok()
        })
    }

    /// Entering and exiting are reported independently; one chunk can
    /// legitimately contain both.
    pub fn detect_map_transition(&self, text: &str) -> MapTransition {
        let bytes = text.as_bytes();
        MapTransition {
            entering: memmem::find(bytes, markers::MAP_ENTER.as_bytes()).is_some(),
            exiting: memmem::find(bytes, markers::MAP_EXIT.as_bytes()).is_some(),
        }
    }

    /// Character login or client re-initialization.
    pub fn detect_login(&self, text: &str) -> bool {
        markers::LOGIN
            .iter()
            .any(|marker| memmem::find(text.as_bytes(), marker.as_bytes()).is_some())
    }
}
