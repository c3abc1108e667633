//! Shared helpers for unit tests: tiny on-disk fixtures and hand-built
//! metadata blobs small enough to verify by eye.

use std::fs;
use std::path::Path;

/// Write `contents` to `path`, creating parent directories as needed.
pub(crate) fn make_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A minimal little-endian TIFF whose Exif sub-IFD carries one
/// `DateTimeOriginal` tag with the given `YYYY:MM:DD HH:MM:SS` value.
///
/// Layout (all offsets from the start of the TIFF):
///
/// ```text
///  0  "II" 42 <IFD0 offset = 8>
///  8  IFD0: 1 entry — ExifIFDPointer (0x8769, LONG) → 26
/// 26  sub-IFD: 1 entry — DateTimeOriginal (0x9003, ASCII, count 20) → 44
/// 44  the 19-char date string plus trailing NUL
/// ```
pub(crate) fn exif_tiff_bytes(date: &str) -> Vec<u8> {
    assert_eq!(date.len(), 19, "date must be YYYY:MM:DD HH:MM:SS");

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    // IFD0
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0x8769u16.to_le_bytes()); // ExifIFDPointer
    out.extend_from_slice(&4u16.to_le_bytes()); // LONG
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&26u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

    // Exif sub-IFD
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0x9003u16.to_le_bytes()); // DateTimeOriginal
    out.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    out.extend_from_slice(&20u32.to_le_bytes()); // 19 chars + NUL
    out.extend_from_slice(&44u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    out.extend_from_slice(date.as_bytes());
    out.push(0);
    out
}

/// A minimal JPEG wrapping [`exif_tiff_bytes`] in an APP1 `Exif\0\0` segment.
pub(crate) fn exif_jpeg_bytes(date: &str) -> Vec<u8> {
    let tiff = exif_tiff_bytes(date);
    let seg_len = (2 + 6 + tiff.len()) as u16;

    let mut out = Vec::new();
    out.extend_from_slice(&[0xFF, 0xD8]); // SOI
    out.extend_from_slice(&[0xFF, 0xE1]); // APP1
    out.extend_from_slice(&seg_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&[0xFF, 0xD9]); // EOI
    out
}

/// A minimal ISO-BMFF file: an `ftyp` box followed by `moov` containing a
/// version-0 `mvhd` whose creation time is `creation_secs` (seconds since
/// the QuickTime 1904 epoch).
pub(crate) fn mp4_bytes(creation_secs: u64) -> Vec<u8> {
    let creation = u32::try_from(creation_secs).unwrap();

    let mut mvhd = Vec::new();
    mvhd.extend_from_slice(&108u32.to_be_bytes());
    mvhd.extend_from_slice(b"mvhd");
    mvhd.extend_from_slice(&[0, 0, 0, 0]); // version 0 + flags
    mvhd.extend_from_slice(&creation.to_be_bytes());
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // modification
    mvhd.extend_from_slice(&1000u32.to_be_bytes()); // timescale
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // duration
    mvhd.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate 1.0
    mvhd.extend_from_slice(&0x0100u16.to_be_bytes()); // volume 1.0
    mvhd.extend_from_slice(&[0u8; 10]); // reserved
    mvhd.extend_from_slice(&[0u8; 36]); // matrix
    mvhd.extend_from_slice(&[0u8; 24]); // pre_defined
    mvhd.extend_from_slice(&1u32.to_be_bytes()); // next track id
    assert_eq!(mvhd.len(), 108);

    let mut out = Vec::new();
    out.extend_from_slice(&16u32.to_be_bytes());
    out.extend_from_slice(b"ftyp");
    out.extend_from_slice(b"isom");
    out.extend_from_slice(&0u32.to_be_bytes());

    out.extend_from_slice(&(8 + mvhd.len() as u32).to_be_bytes());
    out.extend_from_slice(b"moov");
    out.extend_from_slice(&mvhd);
    out
}
