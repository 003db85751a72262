#![no_main]
use libfuzzer_sys::fuzz_target;
use weigh_core::{Dialect, LineFramer};

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (cut, data) = input;
    let cut = usize::from(cut).min(data.len());

    // Arbitrary serial noise split at an arbitrary point
    let mut framer = LineFramer::new();
    let mut lines: Vec<String> = framer.feed(&data[..cut]).map(|l| l.into_string()).collect();
    lines.extend(framer.feed(&data[cut..]).map(|l| l.into_string()));

    for line in &lines {
        assert!(!line.contains('\n'));
        for dialect in [Dialect::Ohaus, Dialect::Si] {
            // Anything that decodes must survive being printed and decoded again
            if let Ok(reading) = dialect.decode(line) {
                let again = dialect.decode(&dialect.encode(&reading));
                assert_eq!(again, Ok(reading));
            }
        }
    }
});
