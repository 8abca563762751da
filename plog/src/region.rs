//! Hardware memory provider seam.
//!
//! A [`MemoryRegion`] is a bounds-checked byte range shared with another
//! processor. Raw addresses never leave this module: callers work in region
//! offsets only. `flush` forces written data back so the remote side's reads
//! observe it, and is equally used to refresh a range before reading.

use crate::error::{PlogError, PlogResult};
use memmap2::MmapMut;
use parking_lot::RwLock;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

/// Byte-range access to a shared or fixed memory region.
pub trait MemoryRegion: Send + Sync {
    /// Region size in bytes.
    fn len(&self) -> usize;

    /// True when the region has zero length.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `buf.len()` bytes out of the region starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> PlogResult<()>;

    /// Copy `data` into the region starting at `offset`.
    fn write(&self, offset: usize, data: &[u8]) -> PlogResult<()>;

    /// Write the range back so a remote reader observes everything in
    /// `offset..offset + len`; also used to refresh before reading.
    fn flush(&self, offset: usize, len: usize) -> PlogResult<()>;

    /// Read a little-endian 32-bit word.
    fn read_u32(&self, offset: usize) -> PlogResult<u32> {
        let mut word = [0u8; 4];
        self.read(offset, &mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Write a little-endian 32-bit word.
    fn write_u32(&self, offset: usize, value: u32) -> PlogResult<()> {
        self.write(offset, &value.to_le_bytes())
    }

    /// Set `len` bytes starting at `offset` to `value`.
    fn fill(&self, offset: usize, value: u8, len: usize) -> PlogResult<()> {
        // Chunked so implementations never see an unbounded temporary.
        let chunk = [value; 64];
        let mut done = 0;
        while done < len {
            let step = (len - done).min(chunk.len());
            self.write(offset + done, &chunk[..step])?;
            done += step;
        }
        Ok(())
    }
}

fn check_bounds(region_len: usize, offset: usize, len: usize) -> PlogResult<()> {
    if offset.checked_add(len).is_none_or(|end| end > region_len) {
        return Err(PlogError::OutOfBounds { offset, len });
    }
    Ok(())
}

/// Memory-mapped region, file-backed (shared with other processes or a
/// device mapping) or anonymous (tests and benches).
pub struct MappedRegion {
    map: RwLock<MmapMut>,
    len: usize,
    file_backed: bool,
}

impl MappedRegion {
    /// Map `len` bytes of `path`, creating and sizing the file on demand.
    pub fn open(path: &Path, len: usize) -> PlogResult<MappedRegion> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        if file.metadata()?.len() < len as u64 {
            file.set_len(len as u64)?;
        }

        let map = unsafe { MmapMut::map_mut(&file)? };
        debug!(path = %path.display(), len, "mapped shared region");

        Ok(MappedRegion {
            map: RwLock::new(map),
            len,
            file_backed: true,
        })
    }

    /// Anonymous mapping of `len` bytes.
    pub fn anon(len: usize) -> PlogResult<MappedRegion> {
        let map = MmapMut::map_anon(len)?;
        Ok(MappedRegion {
            map: RwLock::new(map),
            len,
            file_backed: false,
        })
    }
}

impl MemoryRegion for MappedRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> PlogResult<()> {
        check_bounds(self.len, offset, buf.len())?;
        let map = self.map.read();
        buf.copy_from_slice(&map[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&self, offset: usize, data: &[u8]) -> PlogResult<()> {
        check_bounds(self.len, offset, data.len())?;
        let mut map = self.map.write();
        map[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn flush(&self, offset: usize, len: usize) -> PlogResult<()> {
        check_bounds(self.len, offset, len)?;
        if self.file_backed {
            self.map.read().flush_range(offset, len)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anon_read_write_round_trip() {
        let region = MappedRegion::anon(4096).unwrap();
        region.write(128, b"boot record").unwrap();

        let mut buf = [0u8; 11];
        region.read(128, &mut buf).unwrap();
        assert_eq!(&buf, b"boot record");
    }

    #[test]
    fn test_u32_words_are_little_endian() {
        let region = MappedRegion::anon(4096).unwrap();
        region.write_u32(8, 0x0102_0304).unwrap();

        let mut raw = [0u8; 4];
        region.read(8, &mut raw).unwrap();
        assert_eq!(raw, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(region.read_u32(8).unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let region = MappedRegion::anon(4096).unwrap();
        let mut buf = [0u8; 8];

        assert!(matches!(
            region.read(4092, &mut buf),
            Err(PlogError::OutOfBounds { .. })
        ));
        assert!(matches!(
            region.write(usize::MAX, b"x"),
            Err(PlogError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_fill_zeroes_range() {
        let region = MappedRegion::anon(4096).unwrap();
        region.write(0, &[0xAB; 300]).unwrap();
        region.fill(10, 0, 200).unwrap();

        let mut buf = [0u8; 300];
        region.read(0, &mut buf).unwrap();
        assert!(buf[..10].iter().all(|&b| b == 0xAB));
        assert!(buf[10..210].iter().all(|&b| b == 0));
        assert!(buf[210..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_file_backed_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let region = MappedRegion::open(&path, 4096).unwrap();
        region.write(0, b"persisted").unwrap();
        region.flush(0, 9).unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(&on_disk[..9], b"persisted");
    }
}
