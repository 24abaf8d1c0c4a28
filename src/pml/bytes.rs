//! Little-endian byte primitives over immutable windows of a capture.
//!
//! Every region of an event (envelope, stack trace, detail region, extra
//! detail region) is handed to its decoder as its own [`ByteReader`], so no
//! decoder ever has to seek back into bytes another decoder already consumed.

use scroll::{LE, Pread};

/// A read that would have gone past the end of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun {
    pub at: usize,
    pub wanted: usize,
}

pub type ReadResult<T> = std::result::Result<T, Overrun>;

/// The packed 16-bit word in front of every variable-length detail string.
///
/// Bit 15 selects ASCII (set) or UTF-16LE (clear); bits 0..15 hold the
/// character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringInfo {
    pub is_ascii: bool,
    pub char_count: u16,
}

impl StringInfo {
    pub fn from_raw(raw: u16) -> Self {
        Self {
            is_ascii: raw >> 15 == 1,
            char_count: raw & 0x7fff,
        }
    }

    pub fn to_raw(self) -> u16 {
        (u16::from(self.is_ascii) << 15) | (self.char_count & 0x7fff)
    }

    /// Number of bytes the string occupies after the info word.
    pub fn byte_len(self) -> usize {
        if self.is_ascii {
            self.char_count as usize
        } else {
            self.char_count as usize * 2
        }
    }
}

/// Cursor over a borrowed byte window.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Bytes not consumed yet.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn overrun(&self, wanted: usize) -> Overrun {
        Overrun {
            at: self.pos,
            wanted,
        }
    }

    pub fn seek(&mut self, pos: usize) -> ReadResult<()> {
        if pos > self.data.len() {
            return Err(self.overrun(pos - self.pos.min(pos)));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> ReadResult<()> {
        if count > self.remaining() {
            return Err(self.overrun(count));
        }
        self.pos += count;
        Ok(())
    }

    pub fn bytes(&mut self, count: usize) -> ReadResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(self.overrun(count));
        }
        let out = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(out)
    }

    /// Splits the next `count` bytes off as an independent reader.
    pub fn window(&mut self, count: usize) -> ReadResult<ByteReader<'a>> {
        self.bytes(count).map(ByteReader::new)
    }

    pub fn array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> ReadResult<u8> {
        self.data
            .gread_with::<u8>(&mut self.pos, LE)
            .map_err(|_| self.overrun(1))
    }

    pub fn u16(&mut self) -> ReadResult<u16> {
        self.data
            .gread_with::<u16>(&mut self.pos, LE)
            .map_err(|_| self.overrun(2))
    }

    pub fn u32(&mut self) -> ReadResult<u32> {
        self.data
            .gread_with::<u32>(&mut self.pos, LE)
            .map_err(|_| self.overrun(4))
    }

    pub fn u64(&mut self) -> ReadResult<u64> {
        self.data
            .gread_with::<u64>(&mut self.pos, LE)
            .map_err(|_| self.overrun(8))
    }

    /// Pointer-sized value: 8 bytes in 64-bit captures, 4 bytes otherwise.
    pub fn pvoid(&mut self, is_64bit: bool) -> ReadResult<u64> {
        if is_64bit {
            self.u64()
        } else {
            self.u32().map(u64::from)
        }
    }

    pub fn string_info(&mut self) -> ReadResult<StringInfo> {
        self.u16().map(StringInfo::from_raw)
    }

    /// Reads a detail string described by `info`, consuming exactly
    /// [`StringInfo::byte_len`] bytes.
    pub fn detail_string(&mut self, info: StringInfo) -> ReadResult<String> {
        let raw = self.bytes(info.byte_len())?;
        if info.is_ascii {
            let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
            Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
        } else {
            Ok(decode_utf16(raw))
        }
    }

    /// Reads a UTF-16LE field that occupies exactly `size` bytes; the text
    /// ends at the first NUL unit.
    pub fn utf16(&mut self, size: usize) -> ReadResult<String> {
        self.bytes(size).map(decode_utf16)
    }

    /// Reads a multi-string: NUL separated UTF-16 words ended by an empty
    /// word. `size` bounds the field in bytes; `None` reads to the end of
    /// the window. A trailing empty word is dropped.
    pub fn utf16_multisz(&mut self, size: Option<usize>) -> Vec<String> {
        let size = size.unwrap_or(usize::MAX).min(self.remaining());
        let raw = &self.data[self.pos..self.pos + size];
        self.pos += size;
        decode_utf16_multisz(raw)
    }
}

fn utf16_units(raw: &[u8]) -> impl Iterator<Item = u16> + '_ {
    raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]))
}

/// Decodes UTF-16LE up to the first NUL unit, replacing invalid sequences.
pub fn decode_utf16(raw: &[u8]) -> String {
    let units: Vec<u16> = utf16_units(raw).take_while(|u| *u != 0).collect();
    String::from_utf16_lossy(&units)
}

pub fn decode_utf16_multisz(raw: &[u8]) -> Vec<String> {
    let mut words = Vec::new();
    let mut current: Vec<u16> = Vec::new();
    let mut previous_was_nul = false;

    for unit in utf16_units(raw) {
        if unit == 0 {
            if previous_was_nul {
                break;
            }
            previous_was_nul = true;
            words.push(String::from_utf16_lossy(&current));
            current.clear();
        } else {
            previous_was_nul = false;
            current.push(unit);
        }
    }
    if !current.is_empty() {
        words.push(String::from_utf16_lossy(&current));
    }
    if words.last().is_some_and(|w| w.is_empty()) {
        words.pop();
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn reads_little_endian_integers() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.u16().unwrap(), 0x0302);
        assert_eq!(r.u32().unwrap(), 0x0706_0504);
        assert_eq!(r.remaining(), 2);
        assert!(r.u32().is_err());
        // a failed read does not move the cursor
        assert_eq!(r.pos(), 7);
    }

    #[test]
    fn pvoid_follows_bitness() {
        let data = 0x1122_3344_5566_7788u64.to_le_bytes();
        assert_eq!(ByteReader::new(&data).pvoid(true).unwrap(), 0x1122_3344_5566_7788);
        assert_eq!(ByteReader::new(&data).pvoid(false).unwrap(), 0x5566_7788);
    }

    #[test]
    fn string_info_packs_selector_and_count() {
        let info = StringInfo::from_raw(0x8005);
        assert!(info.is_ascii);
        assert_eq!(info.char_count, 5);
        assert_eq!(info.byte_len(), 5);

        let info = StringInfo::from_raw(0x0005);
        assert!(!info.is_ascii);
        assert_eq!(info.byte_len(), 10);
        assert_eq!(info.to_raw(), 0x0005);
    }

    #[test]
    fn detail_string_consumes_exact_length() {
        let mut data = utf16le("C:\\x");
        data.extend_from_slice(b"tail");
        let mut r = ByteReader::new(&data);
        let s = r
            .detail_string(StringInfo {
                is_ascii: false,
                char_count: 4,
            })
            .unwrap();
        assert_eq!(s, "C:\\x");
        assert_eq!(r.rest(), b"tail");

        let mut r = ByteReader::new(b"abcdef");
        let s = r
            .detail_string(StringInfo {
                is_ascii: true,
                char_count: 3,
            })
            .unwrap();
        assert_eq!(s, "abc");
        assert_eq!(r.pos(), 3);
    }

    #[test]
    fn invalid_utf16_is_replaced() {
        // lone high surrogate
        let raw = [0x00, 0xd8, 0x41, 0x00];
        assert_eq!(decode_utf16(&raw), "\u{fffd}A");
    }

    #[test]
    fn multisz_drops_trailing_empty_word() {
        let mut raw = utf16le("A=1\0B=2\0\0");
        raw.extend_from_slice(&[0xff, 0xff]);
        assert_eq!(decode_utf16_multisz(&raw), vec!["A=1", "B=2"]);
        assert!(decode_utf16_multisz(&utf16le("\0")).is_empty());
        assert_eq!(decode_utf16_multisz(&utf16le("one")), vec!["one"]);
    }

    #[test]
    fn multisz_is_bounded_by_size() {
        let raw = utf16le("ab\0cd\0");
        let mut r = ByteReader::new(&raw);
        assert_eq!(r.utf16_multisz(Some(6)), vec!["ab"]);
        assert_eq!(r.pos(), 6);
    }
}
