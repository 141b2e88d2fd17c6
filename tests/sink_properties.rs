use std::io::Write;

use arkforge::exec::sink::clean_line;
use arkforge::exec::{LineSink, Stream};
use arkforge_test_utils::LogCapture;
use proptest::prelude::*;

// Lines made of visible characters only, so cleaning never changes them and
// the emitted text can be compared byte for byte with the input.
fn visible_line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./:%\\[\\]-]{1,20}"
}

// Raw bytes biased towards the ones the sink treats specially: newlines,
// CR, tabs, escape sequences and invalid UTF-8.
fn noisy_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![
            4 => b'a'..=b'z',
            2 => Just(b'\n'),
            1 => Just(b'\r'),
            1 => Just(b'\t'),
            1 => Just(b' '),
            1 => Just(0x1b),
            1 => Just(b'['),
            1 => Just(b'm'),
            1 => Just(0xff),
            1 => Just(0xc3),
            1 => any::<u8>(),
        ],
        0..200,
    )
}

fn write_in_chunks(sink: &mut LineSink, bytes: &[u8], cuts: &[usize]) {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
    points.push(0);
    points.push(bytes.len());
    points.sort_unstable();
    points.dedup();
    for pair in points.windows(2) {
        sink.write_all(&bytes[pair[0]..pair[1]]).unwrap();
    }
}

proptest! {
    #[test]
    fn every_byte_is_emitted_pending_or_a_delimiter(
        input in noisy_bytes(),
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
    ) {
        let capture = LogCapture::new();
        let mut sink = LineSink::new(capture.dispatch(), Stream::Stderr);
        write_in_chunks(&mut sink, &input, &cuts);

        let delimiters = input.iter().filter(|&&b| b == b'\n').count();
        let (consumed, tail) = match input.iter().rposition(|&b| b == b'\n') {
            Some(idx) => (&input[..idx], &input[idx + 1..]),
            None => (&input[..0], &input[..]),
        };
        prop_assert_eq!(sink.pending(), tail);

        let segments: Vec<&[u8]> = if delimiters == 0 {
            Vec::new()
        } else {
            consumed.split(|&b| b == b'\n').collect()
        };
        prop_assert_eq!(segments.len(), delimiters);
        let segment_bytes: usize = segments.iter().map(|s| s.len()).sum();
        prop_assert_eq!(segment_bytes + delimiters + sink.pending().len(), input.len());

        let expected: Vec<String> = segments
            .iter()
            .filter_map(|s| clean_line(&String::from_utf8_lossy(s)))
            .collect();
        prop_assert_eq!(capture.messages(), expected);
    }

    #[test]
    fn no_bytes_are_lost_between_emitted_and_pending(
        lines in proptest::collection::vec(visible_line(), 0..8),
        tail in proptest::option::of(visible_line()),
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
    ) {
        let mut input = String::new();
        for line in &lines {
            input.push_str(line);
            input.push('\n');
        }
        if let Some(tail) = &tail {
            input.push_str(tail);
        }
        let bytes = input.as_bytes();

        let capture = LogCapture::new();
        let mut sink = LineSink::new(capture.dispatch(), Stream::Stdout);
        write_in_chunks(&mut sink, bytes, &cuts);

        let mut rebuilt = String::new();
        for line in capture.messages() {
            rebuilt.push_str(&line);
            rebuilt.push('\n');
        }
        rebuilt.push_str(&String::from_utf8_lossy(sink.pending()));
        prop_assert_eq!(&rebuilt, &input);
        prop_assert_eq!(capture.messages(), lines.clone());

        sink.flush().unwrap();
        let mut expected = lines;
        expected.extend(tail);
        prop_assert_eq!(capture.messages(), expected);
        prop_assert!(sink.pending().is_empty());
    }
}
