//! On-disk dataset framing.
//!
//! A stored dataset is the 8-byte magic number, little-endian, followed by
//! the raw nodes. Anything that does not match this framing for the expected
//! size is reported as absent so the caller regenerates it.

use std::io::{ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};

use crate::Error;

pub const DAG_MAGIC_NUM_SIZE: usize = 8;
pub const DAG_MAGIC_NUM: u64 = 0xFEE1DEADBADDCAFE;

/// Write the magic number and the dataset.
pub fn write_dataset<W: Write>(writer: &mut W, dataset: &[u8]) -> Result<(), Error> {
    writer.write_u64::<LittleEndian>(DAG_MAGIC_NUM)?;
    writer.write_all(dataset)?;
    writer.flush()?;
    Ok(())
}

/// Read a dataset of exactly `full_size` bytes written by [`write_dataset`].
///
/// Returns `Ok(None)` when the magic number is wrong, the stream ends early
/// or bytes follow the dataset.
pub fn read_dataset<R: Read>(
    reader: &mut R,
    full_size: usize,
) -> Result<Option<Vec<u8>>, Error> {
    let magic = match reader.read_u64::<LittleEndian>() {
        Ok(magic) => magic,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            debug!("stored dataset is empty");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    if magic != DAG_MAGIC_NUM {
        warn!("stored dataset has magic {:#018x}, ignoring it", magic);
        return Ok(None);
    }

    let mut dataset = Vec::new();
    dataset
        .try_reserve_exact(full_size)
        .map_err(|_| Error::Allocation(full_size))?;
    dataset.resize(full_size, 0);
    match reader.read_exact(&mut dataset) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            warn!("stored dataset is shorter than {} bytes", full_size);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        warn!("stored dataset is longer than {} bytes", full_size);
        return Ok(None);
    }
    Ok(Some(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stored(dataset: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_dataset(&mut out, dataset).unwrap();
        out
    }

    #[test]
    fn magic_is_little_endian() {
        let out = stored(&[1, 2, 3]);
        assert_eq!(&out[..8], &[0xfe, 0xca, 0xdd, 0xba, 0xad, 0xde, 0xe1, 0xfe]);
        assert_eq!(&out[8..], &[1, 2, 3]);
    }

    #[test]
    fn reads_back_what_was_written() {
        let dataset: Vec<u8> = (0..=255).collect();
        let out = stored(&dataset);
        let read = read_dataset(&mut Cursor::new(out), 256).unwrap();
        assert_eq!(read, Some(dataset));
    }

    #[test]
    fn mismatches_are_absent() {
        let dataset = vec![7u8; 128];
        let mut bad_magic = stored(&dataset);
        bad_magic[0] ^= 1;
        assert!(read_dataset(&mut Cursor::new(bad_magic), 128).unwrap().is_none());

        let good = stored(&dataset);
        assert!(read_dataset(&mut Cursor::new(&good[..100]), 128).unwrap().is_none());
        assert!(read_dataset(&mut Cursor::new(&good), 64).unwrap().is_none());
        assert!(read_dataset(&mut Cursor::new(&good[..3]), 128).unwrap().is_none());
        assert!(read_dataset(&mut Cursor::new(Vec::new()), 128).unwrap().is_none());
    }
}
