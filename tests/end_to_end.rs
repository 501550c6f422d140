#![cfg(test)]

#[macro_use]
mod macros;

use grasscss::{MemoryFileSystem, Options, StyleSheet};

test!(
    parent_selector_join,
    ".a {\n  .b {\n    color: red;\n  }\n  & + .c {\n    color: blue;\n  }\n}\n",
    ".a .b {\n  color: red;\n}\n\n.a + .c {\n  color: blue;\n}\n"
);

test!(
    for_loop_inclusive,
    "@for $i from 1 through 3 {\n  .x-#{$i} {\n    width: #{$i}px;\n  }\n}\n",
    ".x-1 {\n  width: 1px;\n}\n\n.x-2 {\n  width: 2px;\n}\n\n.x-3 {\n  width: 3px;\n}\n"
);

test!(
    mixin_defaults_and_named_args,
    "@mixin box($w: 10px, $h: 20px) {\n  width: $w;\n  height: $h;\n}\n\n.a {\n  @include box($h: 5px);\n}\n",
    ".a {\n  width: 10px;\n  height: 5px;\n}\n"
);

test!(
    spread_in_include,
    "@mixin abc($a, $b, $c) {\n  a: $a;\n  b: $b;\n  c: $c;\n}\n\n$d: 2 3;\n\n.x {\n  @include abc(1, $d...);\n}\n",
    ".x {\n  a: 1;\n  b: 2;\n  c: 3;\n}\n"
);

test!(
    css_import_preservation,
    "@import url(\"reset.css\");\n.a {\n  color: red;\n}\n",
    "@import url(\"reset.css\");\n.a {\n  color: red;\n}\n"
);

#[test]
fn import_cycle_is_rejected() {
    let mut fs = MemoryFileSystem::new();
    fs.add("a.scss", "@import \"b\";\n");
    fs.add("_b.scss", "@import \"a\";\n");

    let options = Options::new().fs(&fs);
    match StyleSheet::from_path_with_options("a.scss", options) {
        Ok(sheet) => panic!("expected an import cycle error, got: {}", sheet),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains("cycle"),
                "expected error message to mention an import cycle, got {:?}",
                message
            );
        }
    }
}
