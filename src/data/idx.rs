//! Reader for the IDX binary format used by MNIST and its derivatives.
//!
//! ```text
//! image file (IDX3)                      label file (IDX1)
//! bytes  0-1   0x00 0x00 (reserved)      bytes 0-1   0x00 0x00
//! byte   2     0x08 (uint8)              byte  2     0x08
//! byte   3     0x03 (dimensions)         byte  3     0x01
//! bytes  4-7   N     (big-endian u32)    bytes 4-7   N
//! bytes  8-11  rows                      bytes 8..   N label bytes
//! bytes 12-15  cols
//! bytes 16..   N * rows * cols pixels
//! ```

use std::fs;
use std::path::Path;

use crate::data::data_set::DataSet;
use crate::error::{NetworkError, Result};

const IMAGE_HEADER: usize = 16;
const LABEL_HEADER: usize = 8;

fn format_error(message: String) -> NetworkError {
    NetworkError::InvalidDataFormat(message)
}

fn be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

/// Checks the magic prefix and returns the declared dimension sizes.
fn read_header(bytes: &[u8], dims: u8, what: &str) -> Result<Vec<usize>> {
    let header_len = 4 + 4 * dims as usize;
    if bytes.len() < header_len {
        return Err(format_error(format!(
            "{} file too short: expected at least {} header bytes, got {}",
            what, header_len, bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(format_error(format!(
            "{} file: reserved bytes must be 0x00 0x00, got 0x{:02X} 0x{:02X}",
            what, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(format_error(format!(
            "{} file: dtype must be 0x08 (uint8), got 0x{:02X}",
            what, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(format_error(format!(
            "{} file: expected {} dimensions, got {}",
            what, dims, bytes[3]
        )));
    }
    Ok((0..dims as usize).map(|d| be_u32(bytes, 4 + 4 * d)).collect())
}

/// Parses an IDX3 image file and its IDX1 label file into a `DataSet`.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<DataSet> {
    let image_dims = read_header(image_bytes, 3, "IDX image")?;
    let (n_items, rows, cols) = (image_dims[0], image_dims[1], image_dims[2]);
    let label_dims = read_header(label_bytes, 1, "IDX label")?;
    let n_labels = label_dims[0];

    if n_labels != n_items {
        return Err(NetworkError::LabelCountMismatch { images: n_items, labels: n_labels });
    }

    let n_pixels = rows.checked_mul(cols)
        .ok_or_else(|| format_error(format!("IDX image file: {}x{} pixels overflow", rows, cols)))?;
    let image_len = n_items.checked_mul(n_pixels)
        .and_then(|n| n.checked_add(IMAGE_HEADER))
        .ok_or_else(|| format_error("IDX image file: data length overflows".to_owned()))?;
    if image_bytes.len() < image_len {
        return Err(format_error(format!(
            "IDX image file too short: {} images of {}x{} need {} bytes, file has {}",
            n_items, rows, cols, image_len, image_bytes.len()
        )));
    }
    let label_len = LABEL_HEADER + n_items;
    if label_bytes.len() < label_len {
        return Err(format_error(format!(
            "IDX label file too short: {} labels need {} bytes, file has {}",
            n_items, label_len, label_bytes.len()
        )));
    }

    let images = if n_pixels == 0 {
        vec![Vec::new(); n_items]
    } else {
        image_bytes[IMAGE_HEADER..image_len]
            .chunks_exact(n_pixels)
            .map(<[u8]>::to_vec)
            .collect()
    };
    let labels = label_bytes[LABEL_HEADER..label_len].to_vec();
    DataSet::from_parts(images, labels)
}

/// Reads and parses an image/label file pair from disk.
pub fn load_idx_pair(image_path: impl AsRef<Path>, label_path: impl AsRef<Path>) -> Result<DataSet> {
    let image_bytes = read_file(image_path.as_ref())?;
    let label_bytes = read_file(label_path.as_ref())?;
    parse_idx_pair(&image_bytes, &label_bytes)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(NetworkError::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Encodes a data set whose points are `rows * cols` bytes back into an
/// IDX3/IDX1 pair.
pub fn encode_idx_pair(set: &DataSet, rows: usize, cols: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    if !set.is_empty() && set.point_len() != rows * cols {
        return Err(NetworkError::LengthMismatch {
            what: "IDX image",
            expected: rows * cols,
            found: set.point_len(),
        });
    }
    let as_u32 = |n: usize| {
        u32::try_from(n).map_err(|_| format_error(format!("{} does not fit an IDX header", n)))
    };

    let mut images = vec![0x00, 0x00, 0x08, 0x03];
    images.extend_from_slice(&as_u32(set.len())?.to_be_bytes());
    images.extend_from_slice(&as_u32(rows)?.to_be_bytes());
    images.extend_from_slice(&as_u32(cols)?.to_be_bytes());
    let mut labels = vec![0x00, 0x00, 0x08, 0x01];
    labels.extend_from_slice(&as_u32(set.len())?.to_be_bytes());

    for point in set {
        images.extend_from_slice(point.data());
        labels.push(point.label());
    }
    Ok((images, labels))
}
