//! Property tests for suite validation and exit code mapping

use proctor::{ExitCode, ProctorError, Suite};
use proctor_config::MAX_TIMEOUT_SECS;
use proptest::prelude::*;
use std::path::Path;

fn shell_check(timeout_secs: u64) -> String {
    format!("[[check]]\nkind = \"shell\"\ntarget = \"run.sh\"\ntimeout_secs = {timeout_secs}\n")
}

proptest! {
    #[test]
    fn timeouts_in_range_are_accepted(secs in 1..=MAX_TIMEOUT_SECS) {
        let suite = Suite::parse(&shell_check(secs), Path::new("suite.toml")).unwrap();
        prop_assert_eq!(suite.checks[0].timeout_secs, Some(secs));
    }

    #[test]
    fn timeouts_out_of_range_name_the_check(secs in (MAX_TIMEOUT_SECS + 1)..(i64::MAX as u64)) {
        let err = Suite::parse(&shell_check(secs), Path::new("suite.toml")).unwrap_err();
        prop_assert!(matches!(&err, ProctorError::Suite { reason, .. } if reason.starts_with("check #1 (shell)")), "unexpected error: {:?}", err);
        prop_assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
    }

    #[test]
    fn check_numbers_are_one_based(valid in 0usize..8) {
        let mut content = String::new();
        for _ in 0..valid {
            content.push_str(&shell_check(5));
        }
        content.push_str("[[check]]\nkind = \"javac\"\n");
        let err = Suite::parse(&content, Path::new("suite.toml")).unwrap_err();
        let expected = format!("check #{} (javac)", valid + 1);
        prop_assert!(matches!(&err, ProctorError::Suite { reason, .. } if reason.starts_with(&expected)), "unexpected error: {:?}", err);
    }

    #[test]
    fn signal_exit_codes_stay_above_128(signal in 1i32..=64) {
        let code = ExitCode::from_signal(signal).as_i32();
        prop_assert_eq!(code, 128 + signal);
    }
}
