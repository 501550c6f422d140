//! Declarative test helpers shared by the integration tests, in the spirit
//! of the teacher's own `tests/macros.rs` contract assumed by
//! `#[macro_use] mod macros;` in `tests/content-exists.rs`.

macro_rules! test {
    ($(#[$attr:meta])* $func:ident, $input:expr, $output:expr) => {
        $(#[$attr])*
        #[test]
        fn $func() {
            let mut buf = Vec::new();
            grasscss::StyleSheet::new($input)
                .expect("failed to compile")
                .print_as_css(&mut buf)
                .expect("failed to print css");
            assert_eq!(
                String::from_utf8(buf).expect("produced invalid utf8"),
                $output
            );
        }
    };
}

macro_rules! error {
    ($(#[$attr:meta])* $func:ident, $input:expr, $expected_substring:expr) => {
        $(#[$attr])*
        #[test]
        fn $func() {
            match grasscss::StyleSheet::new($input) {
                Ok(sheet) => panic!("expected a compile error, got: {}", sheet),
                Err(e) => {
                    let message = e.to_string();
                    assert!(
                        message.contains($expected_substring),
                        "expected error message to contain {:?}, got {:?}",
                        $expected_substring,
                        message
                    );
                }
            }
        }
    };
}
