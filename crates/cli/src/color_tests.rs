// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn status_colors_known_words_and_leaves_others_plain() {
    std::env::set_var("COLOR", "1");
    assert!(status("succeeded").contains("32m"));
    assert!(status("failed").contains("31m"));
    assert_eq!(status("pending"), "pending");
    std::env::remove_var("COLOR");
}

#[test]
fn no_color_env_var_disables_colorization_even_when_forced() {
    std::env::set_var("NO_COLOR", "1");
    std::env::set_var("COLOR", "1");
    assert_eq!(header("x"), "x");
    std::env::remove_var("NO_COLOR");
    std::env::remove_var("COLOR");
}
