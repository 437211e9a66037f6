/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Certificate extraction from a v1 (JAR) signature block.
//!
//! `META-INF/*.RSA|DSA|EC` hold a PKCS#7 ContentInfo wrapping SignedData:
//!
//! ```text
//! ContentInfo ::= SEQUENCE { contentType OID, content [0] EXPLICIT SignedData }
//! SignedData  ::= SEQUENCE { version, digestAlgorithms SET, contentInfo,
//!                            certificates [0] IMPLICIT SET OF Certificate OPTIONAL,
//!                            crls [1] IMPLICIT OPTIONAL, signerInfos SET }
//! ```

use crate::{error::KeyHashError, package::Signature};
use asn1_rs::{Any, Class, FromBer, Tag};
use x509_parser::prelude::{FromDer, X509Certificate};

/// DER content octets of OID 1.2.840.113549.1.7.2 (signedData).
const OID_SIGNED_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02];

struct Item<'a> {
    any: Any<'a>,
    /// The whole TLV, header included.
    raw: &'a [u8],
}

impl Item<'_> {
    fn is(&self, class: Class, tag: Tag) -> bool {
        self.any.header.class() == class && self.any.header.tag() == tag
    }

    fn is_universal(&self, tag: Tag) -> bool {
        self.is(Class::Universal, tag)
    }
}

fn parse_one(input: &[u8]) -> Result<(&[u8], Item<'_>), KeyHashError> {
    let (rest, any) =
        Any::from_ber(input).map_err(|e| KeyHashError::Pkcs7(format!("bad DER: {}", e)))?;
    let raw = &input[..input.len() - rest.len()];
    Ok((rest, Item { any, raw }))
}

fn children(mut input: &[u8]) -> Result<Vec<Item<'_>>, KeyHashError> {
    let mut out = Vec::new();
    while !input.is_empty() {
        let (rest, item) = parse_one(input)?;
        // end-of-contents of an indefinite length parent
        if !(item.is_universal(Tag(0)) && item.any.data.is_empty()) {
            out.push(item);
        }
        input = rest;
    }
    Ok(out)
}

fn expect<'a, 'b>(
    item: Option<&'b Item<'a>>,
    tag: Tag,
    what: &str,
) -> Result<&'b Item<'a>, KeyHashError> {
    match item {
        Some(i) if i.is_universal(tag) => Ok(i),
        _ => Err(KeyHashError::Pkcs7(format!("expected {}", what))),
    }
}

/// Signing certificates of a PKCS#7 signature block, in block order.
///
/// Every SignerInfo contributes the certificate matching its issuer and
/// serial number. A block without SignerInfos yields all its certificates.
pub fn signer_certificates(block: &[u8]) -> Result<Vec<Signature>, KeyHashError> {
    let (_, content_info) = parse_one(block)?;
    if !content_info.is_universal(Tag::Sequence) {
        return Err(KeyHashError::Pkcs7("ContentInfo is not a SEQUENCE".into()));
    }
    let ci = children(content_info.any.data)?;
    let oid = expect(ci.first(), Tag::Oid, "contentType OID")?;
    if oid.any.data != OID_SIGNED_DATA {
        return Err(KeyHashError::Pkcs7("content type is not signedData".into()));
    }
    let wrapper = ci
        .get(1)
        .filter(|i| i.is(Class::ContextSpecific, Tag(0)))
        .ok_or_else(|| KeyHashError::Pkcs7("missing signedData content".into()))?;

    let inner = children(wrapper.any.data)?;
    let signed_data = expect(inner.first(), Tag::Sequence, "SignedData SEQUENCE")?;
    let fields = children(signed_data.any.data)?;

    let mut certificates: Vec<&[u8]> = Vec::new();
    let mut signer_infos: Vec<Item<'_>> = Vec::new();
    // version, digestAlgorithms and contentInfo come first
    for field in fields.iter().skip(3) {
        if field.is(Class::ContextSpecific, Tag(0)) {
            for cert in children(field.any.data)? {
                certificates.push(cert.raw);
            }
        } else if field.is_universal(Tag::Set) {
            signer_infos = children(field.any.data)?;
        }
    }

    if certificates.is_empty() {
        return Err(KeyHashError::Pkcs7("signature block carries no certificates".into()));
    }

    if signer_infos.is_empty() {
        return Ok(certificates.into_iter().map(|c| Signature::new(c.to_vec())).collect());
    }

    signer_infos
        .iter()
        .map(|si| {
            let (issuer, serial) = signer_identifier(si)?;
            certificates
                .iter()
                .find(|der| matches_signer(der, issuer, serial))
                .map(|der| Signature::new(der.to_vec()))
                .ok_or_else(|| {
                    KeyHashError::Pkcs7("no certificate matches the SignerInfo".into())
                })
        })
        .collect()
}

/// Raw issuer Name TLV and serial INTEGER content of a SignerInfo.
fn signer_identifier<'a>(signer_info: &Item<'a>) -> Result<(&'a [u8], &'a [u8]), KeyHashError> {
    let fields = children(signer_info.any.data)?;
    let sid = expect(fields.get(1), Tag::Sequence, "issuerAndSerialNumber")?;
    let parts = children(sid.any.data)?;
    let issuer = expect(parts.first(), Tag::Sequence, "issuer Name")?;
    let serial = expect(parts.get(1), Tag::Integer, "serialNumber")?;
    Ok((issuer.raw, serial.any.data))
}

fn matches_signer(der: &[u8], issuer: &[u8], serial: &[u8]) -> bool {
    match X509Certificate::from_der(der) {
        Ok((_, cert)) => {
            cert.tbs_certificate.issuer.as_raw() == issuer
                && cert.tbs_certificate.raw_serial() == serial
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            signer_certificates(b"not a signature block"),
            Err(KeyHashError::Pkcs7(_))
        ));
    }

    #[test]
    fn rejects_non_signed_data() {
        // SEQUENCE { OID 1.2.840.113549.1.7.1 (data) }
        let block = [
            0x30, 0x0B, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01,
        ];
        let err = signer_certificates(&block).unwrap_err();
        assert!(err.to_string().contains("not signedData"));
    }
}
