//! Property tests for the wire encoders.

use proptest::prelude::*;
use winant_core::multipart::{BOUNDARY_LEN, generate_boundary};
use winant_core::{Headers, Multipart, Parameters, percent_encode};

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
            out.push(u8::from_str_radix(hex, 16).unwrap());
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

proptest! {
    #[test]
    fn percent_encoding_is_reversible(s in "\\PC*") {
        let encoded = percent_encode(&s);
        prop_assert_eq!(percent_decode(&encoded), s.as_bytes().to_vec());
    }

    #[test]
    fn percent_encoding_uses_safe_alphabet(s in "\\PC*") {
        let encoded = percent_encode(&s);
        let mut chars = encoded.chars();
        while let Some(c) = chars.next() {
            if c == '%' {
                let hi = chars.next().unwrap();
                let lo = chars.next().unwrap();
                prop_assert!(hi.is_ascii_digit() || ('A'..='F').contains(&hi));
                prop_assert!(lo.is_ascii_digit() || ('A'..='F').contains(&lo));
            } else {
                prop_assert!(c.is_ascii_alphanumeric() || "-_.~".contains(c));
            }
        }
    }

    #[test]
    fn query_keeps_every_pair_in_order(
        pairs in prop::collection::vec(("[a-z]{1,8}", "[ -~]{0,12}"), 1..8)
    ) {
        let params: Parameters = pairs.iter().cloned().collect();
        let query = params.to_query_string();
        let segments: Vec<&str> = query.split('&').collect();
        prop_assert_eq!(segments.len(), pairs.len());
        for (segment, (key, value)) in segments.iter().zip(&pairs) {
            prop_assert_eq!(*segment, format!("{key}={}", percent_encode(value)));
        }
    }

    #[test]
    fn header_block_is_sorted_and_terminated(
        entries in prop::collection::btree_map("[A-Za-z-]{1,12}", "[!-~]{0,16}", 0..6)
    ) {
        let headers: Headers = entries.clone().into_iter().collect();
        let block = headers.to_wire_string();
        prop_assert!(block.ends_with("\r\n"));

        let lines: Vec<&str> = block.split("\r\n").collect();
        // n header lines, the terminating empty line, and the empty tail.
        prop_assert_eq!(lines.len(), entries.len() + 2);
        for (line, (key, value)) in lines.iter().zip(&entries) {
            if value.is_empty() {
                prop_assert_eq!(*line, format!("{key}:"));
            } else {
                prop_assert_eq!(*line, format!("{key}: {value}"));
            }
        }
    }

    #[test]
    fn multipart_values_follow_files(
        values in prop::collection::vec(("[a-z]{1,6}", "[a-z0-9]{0,6}"), 1..4)
    ) {
        let mut multipart = Multipart::new();
        for pair in &values {
            multipart.add_value(pair.clone());
        }
        multipart.add_file(winant_core::MultipartFile::new("upload", "f.bin", vec![0u8, 1, 2]));

        let content = multipart.to_content_with_boundary("B0UNDARY");
        let body = content.body();
        let file_at = find(body, b"filename=\"f.bin\"").unwrap();
        for (name, _) in &values {
            let needle = format!("name=\"{name}\"\r\n\r\n");
            let value_at = find(body, needle.as_bytes()).unwrap();
            prop_assert!(file_at < value_at);
        }
        prop_assert!(body.ends_with(b"--B0UNDARY--\r\n"));
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[test]
fn boundaries_are_alphanumeric_and_fresh() {
    let a = generate_boundary();
    let b = generate_boundary();
    assert_eq!(a.len(), BOUNDARY_LEN);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(a, b);
}
