/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! APK Signing Block reader (signature schemes v2 and v3).
//!
//! The block sits right before the ZIP central directory:
//!
//! ```text
//! u64 size | (u64 len, u32 id, value)* | u64 size | "APK Sig Block 42"
//! ```
//!
//! Scheme values are nested little-endian `u32` length-prefixed sequences:
//! signers > signer > signed data > certificates > certificate.

use crate::{error::KeyHashError, package::Signature};
use std::io::{Read, Seek, SeekFrom};

pub const APK_SIG_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";
pub const V2_BLOCK_ID: u32 = 0x7109_871a;
pub const V3_BLOCK_ID: u32 = 0xf053_68c0;

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const EOCD_MIN_LEN: u64 = 22;
const EOCD_MAX_COMMENT: u64 = 0xFFFF;
const FOOTER_LEN: u64 = 24;

/// Which signature scheme a package's signatures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    V1,
    V2,
    V3,
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::V1 => write!(f, "v1 (JAR)"),
            Scheme::V2 => write!(f, "v2"),
            Scheme::V3 => write!(f, "v3"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SigningBlock {
    pairs: Vec<(u32, Vec<u8>)>,
}

impl SigningBlock {
    /// Locates and reads the block. `Ok(None)` when the archive has none.
    pub fn find<R: Read + Seek>(reader: &mut R) -> Result<Option<Self>, KeyHashError> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        let cd_offset = match Self::central_directory_offset(reader, file_len)? {
            Some(o) => o,
            None => return Ok(None),
        };
        if cd_offset < FOOTER_LEN || cd_offset > file_len {
            return Ok(None);
        }

        reader.seek(SeekFrom::Start(cd_offset - FOOTER_LEN))?;
        let mut footer = [0u8; FOOTER_LEN as usize];
        reader.read_exact(&mut footer)?;
        if &footer[8..] != APK_SIG_BLOCK_MAGIC {
            return Ok(None);
        }

        let block_size = u64::from_le_bytes(le8(&footer[..8]));
        let total = block_size
            .checked_add(8)
            .filter(|t| *t >= FOOTER_LEN + 8 && *t <= cd_offset)
            .ok_or_else(|| {
                KeyHashError::SigningBlock(format!("block size {} out of range", block_size))
            })?;
        let start = cd_offset - total;

        reader.seek(SeekFrom::Start(start))?;
        let mut block = vec![0u8; total as usize];
        reader.read_exact(&mut block)?;
        if u64::from_le_bytes(le8(&block[..8])) != block_size {
            return Err(KeyHashError::SigningBlock(
                "header and footer sizes differ".into(),
            ));
        }

        let pairs_end = block.len() - FOOTER_LEN as usize;
        Self::parse_pairs(&block[8..pairs_end]).map(Some)
    }

    fn parse_pairs(mut data: &[u8]) -> Result<Self, KeyHashError> {
        let mut pairs = Vec::new();
        while !data.is_empty() {
            if data.len() < 8 {
                return Err(KeyHashError::SigningBlock("truncated ID-value pair".into()));
            }
            let len = u64::from_le_bytes(le8(&data[..8]));
            let rest = &data[8..];
            if len < 4 || len > rest.len() as u64 {
                return Err(KeyHashError::SigningBlock(format!(
                    "ID-value pair length {} out of range",
                    len
                )));
            }
            let len = len as usize;
            let id = u32::from_le_bytes(le4(&rest[..4]));
            pairs.push((id, rest[4..len].to_vec()));
            data = &rest[len..];
        }
        Ok(Self { pairs })
    }

    fn central_directory_offset<R: Read + Seek>(
        reader: &mut R,
        file_len: u64,
    ) -> Result<Option<u64>, KeyHashError> {
        if file_len < EOCD_MIN_LEN {
            return Ok(None);
        }
        let window = file_len.min(EOCD_MIN_LEN + EOCD_MAX_COMMENT);
        reader.seek(SeekFrom::Start(file_len - window))?;
        let mut tail = vec![0u8; window as usize];
        reader.read_exact(&mut tail)?;

        let last = tail.len() - EOCD_MIN_LEN as usize;
        for pos in (0..=last).rev() {
            if u32::from_le_bytes(le4(&tail[pos..pos + 4])) != EOCD_SIGNATURE {
                continue;
            }
            let comment_len = u16::from_le_bytes([tail[pos + 20], tail[pos + 21]]) as usize;
            if pos + EOCD_MIN_LEN as usize + comment_len != tail.len() {
                continue;
            }
            let offset = u32::from_le_bytes(le4(&tail[pos + 16..pos + 20]));
            if offset == u32::MAX {
                // ZIP64 archives are not used for APKs
                return Ok(None);
            }
            return Ok(Some(offset as u64));
        }
        Ok(None)
    }

    pub fn value(&self, id: u32) -> Option<&[u8]> {
        self.pairs
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, v)| v.as_slice())
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.pairs.iter().map(|(id, _)| *id)
    }

    /// Signing certificates from the newest scheme present, v3 before v2.
    pub fn signer_certificates(&self) -> Result<Option<(Scheme, Vec<Signature>)>, KeyHashError> {
        for (scheme, id) in [(Scheme::V3, V3_BLOCK_ID), (Scheme::V2, V2_BLOCK_ID)] {
            if let Some(value) = self.value(id) {
                return Ok(Some((scheme, Self::certificates_of(value, scheme)?)));
            }
        }
        Ok(None)
    }

    /// First certificate of every signer in a scheme value.
    fn certificates_of(value: &[u8], scheme: Scheme) -> Result<Vec<Signature>, KeyHashError> {
        let (signers, _) = length_prefixed(value, "signers")?;
        let mut out = Vec::new();
        let mut remaining = signers;
        while !remaining.is_empty() {
            let (signer, rest) = length_prefixed(remaining, "signer")?;
            let (signed_data, _) = length_prefixed(signer, "signed data")?;
            let (_digests, after_digests) = length_prefixed(signed_data, "digests")?;
            let (certificates, _) = length_prefixed(after_digests, "certificates")?;
            if certificates.is_empty() {
                return Err(KeyHashError::SigningBlock(format!(
                    "{} signer without certificates",
                    scheme
                )));
            }
            let (certificate, _) = length_prefixed(certificates, "certificate")?;
            out.push(Signature::new(certificate.to_vec()));
            remaining = rest;
        }
        if out.is_empty() {
            return Err(KeyHashError::SigningBlock(format!("{} block has no signers", scheme)));
        }
        Ok(out)
    }
}

/// Splits a `u32` length-prefixed slice off the front of `data`.
fn length_prefixed<'a>(data: &'a [u8], what: &str) -> Result<(&'a [u8], &'a [u8]), KeyHashError> {
    if data.len() < 4 {
        return Err(KeyHashError::SigningBlock(format!("truncated {}", what)));
    }
    let len = u32::from_le_bytes(le4(&data[..4])) as usize;
    let body = &data[4..];
    if len > body.len() {
        return Err(KeyHashError::SigningBlock(format!(
            "{} length {} exceeds {} remaining bytes",
            what,
            len,
            body.len()
        )));
    }
    Ok((&body[..len], &body[len..]))
}

fn le4(b: &[u8]) -> [u8; 4] {
    [b[0], b[1], b[2], b[3]]
}

fn le8(b: &[u8]) -> [u8; 8] {
    [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lp(body: &[u8]) -> Vec<u8> {
        let mut out = (body.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    fn scheme_value(certs_per_signer: &[&[u8]]) -> Vec<u8> {
        let mut signers = Vec::new();
        for cert in certs_per_signer {
            let signed_data = [lp(&[]), lp(&lp(cert)), lp(&[])].concat();
            let signer = [lp(&signed_data), lp(&[]), lp(&[])].concat();
            signers.extend(lp(&signer));
        }
        lp(&signers)
    }

    fn block(pairs: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (id, value) in pairs {
            body.extend(((value.len() + 4) as u64).to_le_bytes());
            body.extend(id.to_le_bytes());
            body.extend(value);
        }
        let size = (body.len() + FOOTER_LEN as usize) as u64;
        let mut out = size.to_le_bytes().to_vec();
        out.extend(body);
        out.extend(size.to_le_bytes());
        out.extend(APK_SIG_BLOCK_MAGIC);
        out
    }

    /// Fake archive: padding, signing block, then an empty EOCD pointing at
    /// the byte after the block.
    fn archive(block: &[u8]) -> Vec<u8> {
        let mut out = vec![0xAAu8; 16];
        out.extend_from_slice(block);
        let cd_offset = out.len() as u32;
        out.extend(EOCD_SIGNATURE.to_le_bytes());
        out.extend([0u8; 12]);
        out.extend(cd_offset.to_le_bytes());
        out.extend([0u8; 2]);
        out
    }

    #[test]
    fn prefers_v3_over_v2() {
        let data = archive(&block(&[
            (V2_BLOCK_ID, scheme_value(&[b"v2-cert"])),
            (V3_BLOCK_ID, scheme_value(&[b"v3-cert"])),
        ]));
        let found = SigningBlock::find(&mut Cursor::new(data)).unwrap().unwrap();
        let (scheme, sigs) = found.signer_certificates().unwrap().unwrap();
        assert_eq!(scheme, Scheme::V3);
        assert_eq!(sigs, vec![Signature::new(b"v3-cert".to_vec())]);
    }

    #[test]
    fn one_certificate_per_signer() {
        let data = archive(&block(&[(V2_BLOCK_ID, scheme_value(&[b"first", b"second"]))]));
        let found = SigningBlock::find(&mut Cursor::new(data)).unwrap().unwrap();
        let (scheme, sigs) = found.signer_certificates().unwrap().unwrap();
        assert_eq!(scheme, Scheme::V2);
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[1].as_bytes(), b"second");
    }

    #[test]
    fn unrelated_pairs_only() {
        let data = archive(&block(&[(0x4272_7265, vec![0u8; 8])]));
        let found = SigningBlock::find(&mut Cursor::new(data)).unwrap().unwrap();
        assert_eq!(found.ids().collect::<Vec<_>>(), vec![0x4272_7265]);
        assert!(found.signer_certificates().unwrap().is_none());
    }

    #[test]
    fn no_magic_means_no_block() {
        let data = archive(&[0u8; 40]);
        assert!(SigningBlock::find(&mut Cursor::new(data)).unwrap().is_none());
    }

    #[test]
    fn truncated_value_is_an_error() {
        let mut value = scheme_value(&[b"cert"]);
        value.truncate(value.len() - 3);
        let data = archive(&block(&[(V2_BLOCK_ID, value)]));
        let found = SigningBlock::find(&mut Cursor::new(data)).unwrap().unwrap();
        assert!(matches!(
            found.signer_certificates(),
            Err(KeyHashError::SigningBlock(_))
        ));
    }
}
