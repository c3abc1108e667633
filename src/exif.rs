//! Minimal embedded-metadata reader for capture-date tags.
//!
//! Pulls date strings out of the three places cameras actually write them:
//! - JPEG: EXIF block in the APP1 marker (a TIFF structure).
//! - TIFF and TIFF-based raws (CR2, NEF, ARW, DNG): IFD0 `DateTime` plus the
//!   Exif sub-IFD's `DateTimeOriginal` / `DateTimeDigitized`.
//! - MP4/MOV family: the `mvhd` movie-header creation time, converted to the
//!   same `YYYY:MM:DD HH:MM:SS` string form the EXIF tags use.
//!
//! Returns a tag-name → raw-string map. Every failure mode — unreadable
//! file, truncated structure, unknown container — degrades to an empty map;
//! this module never raises. Date validation (zeroed timestamps, pre-epoch
//! garbage) is the caller's job.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

const TAG_DATE_TIME: u16 = 0x0132;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Read all date-bearing tags from a file, dispatching by extension.
pub fn read_date_tags(path: &Path) -> HashMap<String, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => read_whole(path).map(|b| tags_from_jpeg(&b)).unwrap_or_default(),
        "tif" | "tiff" | "cr2" | "nef" | "arw" | "dng" => {
            read_whole(path).map(|b| tags_from_tiff(&b)).unwrap_or_default()
        }
        "mp4" | "mov" | "m4v" | "3gp" => tags_from_mp4(path).unwrap_or_default(),
        _ => HashMap::new(),
    }
}

fn read_whole(path: &Path) -> Option<Vec<u8>> {
    std::fs::read(path).ok()
}

// ---------------------------------------------------------------------------
// JPEG: locate the APP1 Exif segment
// ---------------------------------------------------------------------------

fn tags_from_jpeg(data: &[u8]) -> HashMap<String, String> {
    find_jpeg_exif_tiff(data)
        .map(tags_from_tiff)
        .unwrap_or_default()
}

/// Find the TIFF structure embedded in a JPEG's APP1 `Exif\0\0` segment.
fn find_jpeg_exif_tiff(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 0;
    while pos + 4 < data.len() {
        if data[pos] == 0xFF && data[pos + 1] == 0xE1 {
            let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            let seg_start = pos + 4;
            let seg_end = (pos + 2 + seg_len).min(data.len());
            // A declared length < 2 puts the segment end before its start;
            // treat the segment as absent rather than slicing backwards
            if let Some(segment) = data.get(seg_start..seg_end)
                && let Some(tiff) = segment.strip_prefix(EXIF_HEADER)
            {
                return Some(tiff);
            }
        }

        // Advance: if 0xFF, skip marker + length; otherwise byte-by-byte
        if data[pos] == 0xFF && pos + 3 < data.len() && data[pos + 1] != 0x00 {
            let marker = data[pos + 1];
            // SOS (0xDA) means image data starts — stop scanning
            if marker == 0xDA {
                break;
            }
            // Markers without length field
            if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
                pos += 2;
            } else {
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                pos += 2 + len;
            }
        } else {
            pos += 1;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF: walk IFD0 and the Exif sub-IFD for ASCII date tags
// ---------------------------------------------------------------------------

fn tags_from_tiff(data: &[u8]) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    if data.len() < 8 {
        return tags;
    }

    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return tags,
    };

    let read_u16 = |offset: usize| -> u16 {
        if big_endian {
            u16::from_be_bytes([data[offset], data[offset + 1]])
        } else {
            u16::from_le_bytes([data[offset], data[offset + 1]])
        }
    };

    let read_u32 = |offset: usize| -> u32 {
        if big_endian {
            u32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ])
        } else {
            u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ])
        }
    };

    // Verify TIFF magic (42)
    if read_u16(2) != 42 {
        return tags;
    }

    // ASCII tag values: count is the byte length including the trailing NUL;
    // four bytes or fewer live inline in the value field, longer ones at an
    // offset elsewhere in the file.
    let read_ascii = |entry_offset: usize, count: usize| -> Option<String> {
        let start = if count <= 4 {
            entry_offset + 8
        } else {
            read_u32(entry_offset + 8) as usize
        };
        if start + count > data.len() {
            return None;
        }
        let value = String::from_utf8_lossy(&data[start..start + count])
            .trim_end_matches('\0')
            .trim()
            .to_string();
        (!value.is_empty()).then_some(value)
    };

    let mut walk_ifd = |ifd_offset: usize, tags: &mut HashMap<String, String>| -> Option<usize> {
        if ifd_offset == 0 || ifd_offset + 2 > data.len() {
            return None;
        }
        let entry_count = read_u16(ifd_offset) as usize;
        let entries_start = ifd_offset + 2;
        let mut exif_ifd = None;

        for i in 0..entry_count {
            let entry_offset = entries_start + i * 12;
            if entry_offset + 12 > data.len() {
                return exif_ifd;
            }

            let tag = read_u16(entry_offset);
            let typ = read_u16(entry_offset + 2);
            let count = read_u32(entry_offset + 4) as usize;

            match tag {
                TAG_DATE_TIME if typ == 2 => {
                    if let Some(v) = read_ascii(entry_offset, count) {
                        tags.insert("DateTime".to_string(), v);
                    }
                }
                TAG_DATE_TIME_ORIGINAL if typ == 2 => {
                    if let Some(v) = read_ascii(entry_offset, count) {
                        tags.insert("DateTimeOriginal".to_string(), v);
                    }
                }
                TAG_DATE_TIME_DIGITIZED if typ == 2 => {
                    if let Some(v) = read_ascii(entry_offset, count) {
                        tags.insert("DateTimeDigitized".to_string(), v);
                    }
                }
                TAG_EXIF_IFD_POINTER if typ == 4 => {
                    exif_ifd = Some(read_u32(entry_offset + 8) as usize);
                }
                _ => {}
            }
        }

        exif_ifd
    };

    let ifd0 = read_u32(4) as usize;
    if let Some(sub_ifd) = walk_ifd(ifd0, &mut tags) {
        walk_ifd(sub_ifd, &mut tags);
    }

    tags
}

// ---------------------------------------------------------------------------
// MP4/MOV: movie-header creation time
// ---------------------------------------------------------------------------

/// Creation time from the `mvhd` box, counted in seconds from the QuickTime
/// epoch (1904-01-01). Seeks over box bodies instead of reading the file,
/// since `moov` commonly sits after gigabytes of media data.
fn tags_from_mp4(path: &Path) -> Option<HashMap<String, String>> {
    let mut file = File::open(path).ok()?;
    let len = file.metadata().ok()?.len();
    let creation = find_mvhd_creation(&mut file, 0, len).ok()??;

    let epoch = NaiveDate::from_ymd_opt(1904, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let dt = epoch.checked_add_signed(Duration::seconds(i64::try_from(creation).ok()?))?;

    let mut tags = HashMap::new();
    tags.insert(
        "CreateDate".to_string(),
        dt.format("%Y:%m:%d %H:%M:%S").to_string(),
    );
    Some(tags)
}

/// Walk ISO-BMFF boxes in `[pos, end)` looking for `moov`/`mvhd`.
fn find_mvhd_creation(file: &mut File, mut pos: u64, end: u64) -> io::Result<Option<u64>> {
    while pos + 8 <= end {
        file.seek(SeekFrom::Start(pos))?;
        let mut header = [0u8; 8];
        file.read_exact(&mut header)?;

        let mut size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let box_type = &header[4..8];
        let mut body = pos + 8;

        if size == 1 {
            // 64-bit largesize follows the type field
            let mut large = [0u8; 8];
            file.read_exact(&mut large)?;
            size = u64::from_be_bytes(large);
            body = pos + 16;
        } else if size == 0 {
            // Box extends to end of file
            size = end - pos;
        }
        if size < 8 || pos + size > end {
            return Ok(None);
        }

        if box_type == b"moov" {
            if let Some(t) = find_mvhd_creation(file, body, pos + size)? {
                return Ok(Some(t));
            }
        } else if box_type == b"mvhd" {
            file.seek(SeekFrom::Start(body))?;
            let mut version_flags = [0u8; 4];
            file.read_exact(&mut version_flags)?;
            let creation = if version_flags[0] == 1 {
                let mut buf = [0u8; 8];
                file.read_exact(&mut buf)?;
                u64::from_be_bytes(buf)
            } else {
                let mut buf = [0u8; 4];
                file.read_exact(&mut buf)?;
                u32::from_be_bytes(buf) as u64
            };
            return Ok(Some(creation));
        }

        pos += size;
    }
    Ok(None)
}
