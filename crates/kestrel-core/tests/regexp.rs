//! RegExp compiler integration tests

use kestrel_core::regexp::{self, INFINITE, RegExpBytecode, RegExpFlags, RegExpOpcode};
use kestrel_core::{ErrorKind, FrontendConfig};

fn opcodes(bytecode: &RegExpBytecode) -> Vec<RegExpOpcode> {
    bytecode.instructions().unwrap().iter().map(|i| i.opcode).collect()
}

#[test]
fn test_alternation() {
    let bytecode = regexp::compile("a|b", "").unwrap();
    assert_eq!(
        opcodes(&bytecode),
        vec![
            RegExpOpcode::SaveAtStart,
            RegExpOpcode::Char,
            RegExpOpcode::Alternative,
            RegExpOpcode::Char,
            RegExpOpcode::SaveAndMatch,
            RegExpOpcode::Eof,
        ]
    );
    assert_eq!(bytecode.capture_count(), 1);
    assert_eq!(bytecode.non_capture_count(), 0);
}

#[test]
fn test_starred_group_operands() {
    let bytecode = regexp::compile("(a)*", "").unwrap();
    let instructions = bytecode.instructions().unwrap();

    let start = &instructions[1];
    assert_eq!(start.opcode, RegExpOpcode::CaptureGreedyZeroGroupStart);
    let end = &instructions[3];
    assert_eq!(end.opcode, RegExpOpcode::CaptureGreedyGroupEnd);
    // Same group index, and both jumps cover the same span.
    assert_eq!(start.operands[0], end.operands[0]);
    assert_eq!(end.operands[1..3], [0, INFINITE]);
    assert_eq!(start.operands[1], end.operands[3]);
    assert_eq!(bytecode.capture_slot_count(), 4);
}

#[test]
fn test_flags_are_recorded_in_the_header() {
    let bytecode = regexp::compile("x", "mig").unwrap();
    let flags = bytecode.flags();
    assert!(flags.contains(RegExpFlags::GLOBAL));
    assert!(flags.contains(RegExpFlags::IGNORE_CASE));
    assert!(flags.contains(RegExpFlags::MULTILINE));
    assert_eq!(flags.to_string(), "gim");
    assert!(bytecode.disassemble().starts_with("; flags: /gim/"));
}

#[test]
fn test_bad_flags_fail_before_the_pattern() {
    for flags in ["gg", "z", "gig"] {
        let err = regexp::compile("(", flags).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{flags}");
        assert!(err.to_string().contains("Invalid RegExp flags"), "{err}");
    }
}

#[test]
fn test_pattern_errors() {
    for pattern in ["*a", "a{3,2}", "a{1,,2}", "[b-a]", "[abc", "\\", "(?<x>a)", "a)", "(a"] {
        let err = regexp::compile(pattern, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{pattern}");
    }
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}a{}", "(".repeat(8), ")".repeat(8));
    assert!(regexp::compile(&deep, "").is_ok());

    let err = regexp::compile_with_limit(&deep, "", 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    let config = FrontendConfig {
        regexp_recursion_limit: 4,
        ..FrontendConfig::default()
    };
    assert_eq!(config.compile_regexp(&deep, "").unwrap_err().kind(), ErrorKind::Range);
}

#[test]
fn test_words_validate_on_reload() {
    let bytecode = regexp::compile(r"^[\w.]+@\S+$", "i").unwrap();
    let reloaded = RegExpBytecode::from_words(bytecode.words().to_vec()).unwrap();
    assert_eq!(reloaded, bytecode);

    let mut truncated = bytecode.words().to_vec();
    truncated.pop();
    assert!(RegExpBytecode::from_words(truncated).is_err());
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_compile_matches_sequential() {
    use kestrel_core::parallel::ParallelCompiler;

    let patterns = [("a|b", ""), ("(x)+", "g"), ("[", ""), ("\\d{2,}", "m")];
    let compiler = ParallelCompiler::new(FrontendConfig::default()).unwrap();
    let results = compiler.compile_regexps(&patterns);

    for ((pattern, flags), result) in patterns.iter().zip(results) {
        match regexp::compile(pattern, flags) {
            Ok(expected) => assert_eq!(result.unwrap(), expected),
            Err(expected) => assert_eq!(result.unwrap_err().kind(), expected.kind()),
        }
    }
}
