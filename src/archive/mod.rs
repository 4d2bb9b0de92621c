//! Archive Loading
//!
//! Materializes the initial virtual filesystem from a ustar tar archive,
//! optionally gzip-compressed (detected by magic bytes). Only regular
//! files and directories become entries; symlinks and special files are
//! skipped. Entry names are stored archive-relative: leading `./` and `/`
//! stripped, directory markers keeping their trailing slash.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::fs::VfsEntry;

const BLOCK_SIZE: usize = 512;

/// Archive loading errors. Any of these is fatal at startup: the
/// interpreter cannot run without its initial data.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("cannot read archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed archive: {0}")]
    Malformed(String),

    #[error("entry '{path}' is not valid UTF-8 text")]
    Decode { path: String },
}

/// Load the initial filesystem mapping from a tar or tar.gz archive.
pub fn load(path: impl AsRef<Path>) -> Result<HashMap<String, VfsEntry>, ArchiveError> {
    let raw = std::fs::read(path)?;
    let data = if is_gzip(&raw) {
        decompress_gzip(&raw)?
    } else {
        raw
    };
    parse_entries(&data)
}

/// Check for the gzip magic bytes.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ArchiveError::Malformed(format!("gzip: {}", e)))?;
    Ok(out)
}

/// Read a null-terminated string from a fixed-size header field.
fn read_string(header: &[u8], offset: usize, len: usize) -> String {
    let slice = &header[offset..offset + len];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&slice[..end]).to_string()
}

/// Read an octal ASCII value from a fixed-size header field.
fn read_octal(header: &[u8], offset: usize, len: usize) -> u64 {
    let s = read_string(header, offset, len);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0;
    }
    u64::from_str_radix(trimmed, 8).unwrap_or(0)
}

/// Check if a 512-byte block is all zeros (end-of-archive marker).
fn is_zero_block(block: &[u8]) -> bool {
    block.iter().all(|&b| b == 0)
}

/// Sum of all header bytes, with the checksum field (148..156) read as
/// spaces.
fn checksum(header: &[u8; BLOCK_SIZE]) -> u32 {
    let mut sum: u32 = 0;
    for (i, &byte) in header.iter().enumerate() {
        if (148..156).contains(&i) {
            sum += 0x20u32;
        } else {
            sum += byte as u32;
        }
    }
    sum
}

fn verify_checksum(header: &[u8; BLOCK_SIZE]) -> bool {
    let stored = read_octal(header, 148, 8) as u32;
    stored == checksum(header)
}

/// Strip leading `./` and `/` from an archive entry name.
fn normalize_key(name: &str) -> &str {
    name.trim_start_matches("./").trim_start_matches('/')
}

/// Walk the ustar blocks of an uncompressed archive into vfs entries.
fn parse_entries(data: &[u8]) -> Result<HashMap<String, VfsEntry>, ArchiveError> {
    let mut entries = HashMap::new();
    let mut offset = 0;
    let mut zero_blocks = 0;

    while offset + BLOCK_SIZE <= data.len() {
        let block = &data[offset..offset + BLOCK_SIZE];

        if is_zero_block(block) {
            zero_blocks += 1;
            offset += BLOCK_SIZE;
            if zero_blocks >= 2 {
                break;
            }
            continue;
        }
        zero_blocks = 0;

        let header: [u8; BLOCK_SIZE] = block
            .try_into()
            .map_err(|_| ArchiveError::Malformed("invalid header block".to_string()))?;

        if !verify_checksum(&header) {
            return Err(ArchiveError::Malformed(
                "invalid header checksum".to_string(),
            ));
        }

        let name = read_string(&header, 0, 100);
        let prefix = read_string(&header, 345, 155);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };
        let size = read_octal(&header, 124, 12) as usize;
        let type_flag = header[156];

        offset += BLOCK_SIZE;

        // Content blocks are consumed for every entry type, even skipped
        // ones, to keep the walk aligned.
        let content = if size > 0 {
            let end = offset + size;
            if end > data.len() {
                return Err(ArchiveError::Malformed(
                    "unexpected end of archive".to_string(),
                ));
            }
            let content = &data[offset..end];
            let blocks = (size + BLOCK_SIZE - 1) / BLOCK_SIZE;
            offset += blocks * BLOCK_SIZE;
            content
        } else {
            &[][..]
        };

        let key = normalize_key(&path);
        if key.is_empty() {
            continue;
        }

        if type_flag == b'5' {
            let key = if key.ends_with('/') {
                key.to_string()
            } else {
                format!("{}/", key)
            };
            entries.insert(key, VfsEntry::Dir);
        } else if type_flag == b'0' || type_flag == 0 {
            // pre-POSIX archives mark directories only by the trailing slash
            if key.ends_with('/') {
                entries.insert(key.to_string(), VfsEntry::Dir);
            } else {
                let text = String::from_utf8(content.to_vec()).map_err(|_| {
                    ArchiveError::Decode {
                        path: key.to_string(),
                    }
                })?;
                entries.insert(key.to_string(), VfsEntry::File(text));
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// Write a null-terminated string into a fixed-size field.
    fn write_string(header: &mut [u8], offset: usize, len: usize, s: &str) {
        let bytes = s.as_bytes();
        let copy_len = bytes.len().min(len);
        header[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
    }

    /// Write an octal ASCII value into a fixed-size field, null-terminated.
    fn write_octal(header: &mut [u8], offset: usize, len: usize, value: u64) {
        let s = format!("{:0>width$o}", value, width = len - 1);
        header[offset..offset + s.len()].copy_from_slice(s.as_bytes());
        header[offset + s.len()] = 0;
    }

    fn header_block(path: &str, size: u64, type_flag: u8) -> [u8; BLOCK_SIZE] {
        let mut header = [0u8; BLOCK_SIZE];
        write_string(&mut header, 0, 100, path);
        write_octal(&mut header, 100, 8, 0o644);
        write_octal(&mut header, 108, 8, 0);
        write_octal(&mut header, 116, 8, 0);
        write_octal(&mut header, 124, 12, size);
        write_octal(&mut header, 136, 12, 0);
        header[148..156].copy_from_slice(b"        ");
        header[156] = type_flag;
        header[257..263].copy_from_slice(b"ustar\0");
        header[263..265].copy_from_slice(b"00");
        let sum = checksum(&header);
        let cksum = format!("{:06o}\0 ", sum);
        header[148..156].copy_from_slice(&cksum.as_bytes()[..8]);
        header
    }

    /// Build a tar archive; `None` content marks a directory entry.
    fn tar_with(members: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
        let mut data = Vec::new();
        for (path, content) in members {
            match content {
                Some(bytes) => {
                    data.extend_from_slice(&header_block(path, bytes.len() as u64, b'0'));
                    data.extend_from_slice(bytes);
                    let remainder = bytes.len() % BLOCK_SIZE;
                    if remainder != 0 {
                        data.extend(std::iter::repeat(0u8).take(BLOCK_SIZE - remainder));
                    }
                }
                None => data.extend_from_slice(&header_block(path, 0, b'5')),
            }
        }
        data.extend(std::iter::repeat(0u8).take(BLOCK_SIZE * 2));
        data
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("vshell-archive-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_files_and_directories() {
        let data = tar_with(&[
            ("Folder/", None),
            ("Folder/a.txt", Some(b"alpha")),
            ("Folder/sub/b.txt", Some(b"beta")),
            ("Empty/", None),
        ]);
        let entries = parse_entries(&data).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries.get("Folder/a.txt"),
            Some(&VfsEntry::File("alpha".to_string()))
        );
        assert_eq!(
            entries.get("Folder/sub/b.txt"),
            Some(&VfsEntry::File("beta".to_string()))
        );
        assert_eq!(entries.get("Empty/"), Some(&VfsEntry::Dir));
        assert_eq!(entries.get("Folder/"), Some(&VfsEntry::Dir));
    }

    #[test]
    fn test_parse_strips_leading_dot_slash() {
        let data = tar_with(&[("./Folder/a.txt", Some(b"alpha")), ("./Folder/", None)]);
        let entries = parse_entries(&data).unwrap();
        assert!(entries.contains_key("Folder/a.txt"));
        assert!(entries.contains_key("Folder/"));
    }

    #[test]
    fn test_parse_skips_symlinks() {
        let mut data = Vec::new();
        let mut link = header_block("link", 0, b'2');
        write_string(&mut link, 157, 100, "Folder/a.txt");
        // the link target changed the header, so re-stamp the checksum
        let sum = checksum(&link);
        let cksum = format!("{:06o}\0 ", sum);
        link[148..156].copy_from_slice(&cksum.as_bytes()[..8]);
        data.extend_from_slice(&link);
        data.extend_from_slice(&header_block("a.txt", 1, b'0'));
        data.extend_from_slice(b"x");
        data.extend(std::iter::repeat(0u8).take(BLOCK_SIZE - 1));
        data.extend(std::iter::repeat(0u8).take(BLOCK_SIZE * 2));

        let entries = parse_entries(&data).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("a.txt"));
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let mut data = tar_with(&[("a.txt", Some(b"x"))]);
        data[0] ^= 0xff;
        let err = parse_entries(&data).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_truncated_content() {
        let data = tar_with(&[("a.txt", Some(b"x"))]);
        // cut off the content block
        let err = parse_entries(&data[..BLOCK_SIZE]).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_non_utf8_content() {
        let data = tar_with(&[("bin.dat", Some(&[0xff, 0xfe, 0x00][..]))]);
        let err = parse_entries(&data).unwrap_err();
        match err {
            ArchiveError::Decode { path } => assert_eq!(path, "bin.dat"),
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_load_plain_and_gzipped() {
        let data = tar_with(&[("hello.txt", Some(b"hi"))]);

        let plain = temp_path("plain.tar");
        std::fs::write(&plain, &data).unwrap();
        let entries = load(&plain).unwrap();
        assert_eq!(
            entries.get("hello.txt"),
            Some(&VfsEntry::File("hi".to_string()))
        );
        std::fs::remove_file(&plain).unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).unwrap();
        let gzipped = temp_path("gz.tar.gz");
        std::fs::write(&gzipped, encoder.finish().unwrap()).unwrap();
        let entries = load(&gzipped).unwrap();
        assert_eq!(
            entries.get("hello.txt"),
            Some(&VfsEntry::File("hi".to_string()))
        );
        std::fs::remove_file(&gzipped).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load(temp_path("does-not-exist.tar")).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }
}
