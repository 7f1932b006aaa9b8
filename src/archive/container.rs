use crate::archive::compress::decompress_entry;
use crate::foundation::error::{FigError, FigResult};

const EOCD_SIG: u32 = 0x0605_4B50;
const CENTRAL_SIG: u32 = 0x0201_4B50;
const LOCAL_SIG: u32 = 0x0403_4B50;

/// Minimum byte length of the end-of-central-directory record.
const EOCD_MIN_LEN: usize = 22;
/// The trailing comment length field is a u16, so the EOCD signature can sit
/// at most this far from the end of the file.
const MAX_COMMENT_LEN: usize = 65_535;

/// One file entry as described by the central directory.
///
/// Local file headers in this container format may carry zero sizes
/// (trailing size descriptors), so sizes and the compression method are only
/// trustworthy here.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) method: u16,
    pub(crate) compressed_size: usize,
    pub(crate) uncompressed_size: usize,
    pub(crate) local_header_offset: usize,
}

impl Entry {
    pub(crate) fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Parsed container: the raw bytes plus the central-directory entry list.
#[derive(Debug)]
pub(crate) struct Container<'a> {
    data: &'a [u8],
    entries: Vec<Entry>,
}

impl<'a> Container<'a> {
    /// Parse the central directory of `data`.
    pub(crate) fn parse(data: &'a [u8]) -> FigResult<Self> {
        let eocd = find_eocd(data)?;
        let entry_count = read_u16(data, eocd + 10)? as usize;
        let central_offset = read_u32(data, eocd + 16)? as usize;

        let mut entries = Vec::with_capacity(entry_count);
        let mut pos = central_offset;
        for _ in 0..entry_count {
            let (entry, next) = parse_central_entry(data, pos)?;
            entries.push(entry);
            pos = next;
        }

        Ok(Self { data, entries })
    }

    /// Non-directory entry names in directory order.
    pub(crate) fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir())
            .map(|e| e.name.as_str())
            .collect()
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Locate an entry by exact name.
    pub(crate) fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Extract and decompress a single entry.
    pub(crate) fn read(&self, entry: &Entry) -> FigResult<Vec<u8>> {
        let off = entry.local_header_offset;
        let sig = read_u32(self.data, off)?;
        if sig != LOCAL_SIG {
            return Err(FigError::not_archive(format!(
                "bad local header signature for \"{}\"",
                entry.name
            )));
        }

        // The local header carries its own name/extra lengths, which can
        // differ from the central directory's.
        let name_len = read_u16(self.data, off + 26)? as usize;
        let extra_len = read_u16(self.data, off + 28)? as usize;
        let data_start = off + 30 + name_len + extra_len;
        let data_end = data_start
            .checked_add(entry.compressed_size)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                FigError::corrupt(data_start, format!("entry \"{}\" overruns file", entry.name))
            })?;

        decompress_entry(entry.method, &self.data[data_start..data_end])
    }
}

/// Scan backwards from end-of-file for the EOCD signature.
fn find_eocd(data: &[u8]) -> FigResult<usize> {
    if data.len() < EOCD_MIN_LEN {
        return Err(FigError::not_archive("file shorter than directory record"));
    }
    let lowest = data.len().saturating_sub(EOCD_MIN_LEN + MAX_COMMENT_LEN);
    let mut pos = data.len() - EOCD_MIN_LEN;
    loop {
        if read_u32(data, pos)? == EOCD_SIG {
            return Ok(pos);
        }
        if pos == lowest {
            return Err(FigError::not_archive("no end-of-central-directory marker"));
        }
        pos -= 1;
    }
}

fn parse_central_entry(data: &[u8], pos: usize) -> FigResult<(Entry, usize)> {
    if read_u32(data, pos)? != CENTRAL_SIG {
        return Err(FigError::not_archive(format!(
            "bad central directory signature at {pos}"
        )));
    }

    let method = read_u16(data, pos + 10)?;
    let compressed_size = read_u32(data, pos + 20)? as usize;
    let uncompressed_size = read_u32(data, pos + 24)? as usize;
    let name_len = read_u16(data, pos + 28)? as usize;
    let extra_len = read_u16(data, pos + 30)? as usize;
    let comment_len = read_u16(data, pos + 32)? as usize;
    let local_header_offset = read_u32(data, pos + 42)? as usize;

    let name_start = pos + 46;
    let name_end = name_start
        .checked_add(name_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| FigError::corrupt(name_start, "entry name overruns file"))?;
    let name = String::from_utf8_lossy(&data[name_start..name_end]).into_owned();

    let next = name_end + extra_len + comment_len;
    Ok((
        Entry {
            name,
            method,
            compressed_size,
            uncompressed_size,
            local_header_offset,
        },
        next,
    ))
}

fn read_u16(data: &[u8], pos: usize) -> FigResult<u16> {
    let end = pos
        .checked_add(2)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| FigError::corrupt(pos, "truncated u16"))?;
    Ok(u16::from_le_bytes([data[pos], data[end - 1]]))
}

fn read_u32(data: &[u8], pos: usize) -> FigResult<u32> {
    let end = pos
        .checked_add(4)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| FigError::corrupt(pos, "truncated u32"))?;
    Ok(u32::from_le_bytes([
        data[pos],
        data[pos + 1],
        data[pos + 2],
        data[pos + 3],
    ]))
}

#[cfg(test)]
#[path = "../../tests/unit/archive/container.rs"]
mod tests;
